// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the version-control facade.

use scaffold_common_http::RetryableError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GithubError>;

/// Errors that can occur when talking to the version-control host.
#[derive(Debug, Error)]
pub enum GithubError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	#[error("Request timed out")]
	Timeout,

	#[error("Unauthorized: token rejected by GitHub")]
	Unauthorized,

	#[error("Forbidden or insufficient permissions")]
	Forbidden,

	#[error("Rate limit exceeded")]
	RateLimited,

	#[error("Not found: {0}")]
	NotFound(String),

	/// The resource already exists (repository, ref) or is in a conflicting state.
	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("GitHub API error: {status} - {message}")]
	ApiError { status: u16, message: String },

	#[error("Invalid response from GitHub: {0}")]
	InvalidResponse(String),

	#[error("Configuration error: {0}")]
	Config(String),

	/// Sealing a secret value with the repository public key failed.
	#[error("Secret encryption failed: {0}")]
	Encryption(String),
}

impl RetryableError for GithubError {
	fn is_retryable(&self) -> bool {
		match self {
			GithubError::Network(e) => e.is_retryable(),
			GithubError::Timeout => true,
			GithubError::RateLimited => true,
			GithubError::ApiError { status, .. } => *status >= 500,
			_ => false,
		}
	}
}

impl GithubError {
	pub fn api_error(status: u16, message: impl Into<String>) -> Self {
		Self::ApiError {
			status,
			message: message.into(),
		}
	}

	pub fn is_not_found(&self) -> bool {
		matches!(self, GithubError::NotFound(_))
	}

	pub fn is_conflict(&self) -> bool {
		matches!(self, GithubError::Conflict(_))
	}
}
