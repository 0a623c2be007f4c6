// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("not found: {0}")]
	NotFound(String),

	#[error("access denied: {0}")]
	AccessDenied(String),

	#[error("throttled: {0}")]
	Throttled(String),

	#[error("store error for {context}: {message}")]
	Service { context: String, message: String },

	#[error("invalid bundle {context}: {reason}")]
	InvalidBundle { context: String, reason: String },

	#[error("configuration error: {0}")]
	Config(String),
}

impl StoreError {
	/// Classify an AWS service error by its error code.
	pub(crate) fn from_service(context: &str, code: Option<&str>, message: String) -> Self {
		match code {
			Some("ResourceNotFoundException") | Some("ParameterNotFound") => {
				StoreError::NotFound(context.to_string())
			}
			Some("AccessDeniedException") | Some("AccessDenied") => {
				StoreError::AccessDenied(context.to_string())
			}
			Some("ThrottlingException") | Some("TooManyRequestsException") => {
				StoreError::Throttled(context.to_string())
			}
			_ => StoreError::Service {
				context: context.to_string(),
				message,
			},
		}
	}

	pub(crate) fn invalid(context: &str, reason: impl Into<String>) -> Self {
		StoreError::InvalidBundle {
			context: context.to_string(),
			reason: reason.into(),
		}
	}
}
