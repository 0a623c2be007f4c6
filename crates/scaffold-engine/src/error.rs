// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;

use scaffold_bundle_store::StoreError;
use scaffold_github::GithubError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Stages of the create and destroy state machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
	Validated,
	Resolved,
	Rendered,
	Tokenized,
	Committed,
	PrOpened,
	SecretsApplied,
	TopicsSet,
	TeamAccess,
	WorkflowTriggered,
	TokenValidated,
	SecretsRemoved,
	RepoDeleted,
}

impl Stage {
	pub fn as_str(self) -> &'static str {
		match self {
			Stage::Validated => "validated",
			Stage::Resolved => "resolved",
			Stage::Rendered => "rendered",
			Stage::Tokenized => "tokenized",
			Stage::Committed => "committed",
			Stage::PrOpened => "pr_opened",
			Stage::SecretsApplied => "secrets_applied",
			Stage::TopicsSet => "topics_set",
			Stage::TeamAccess => "team_access",
			Stage::WorkflowTriggered => "workflow_triggered",
			Stage::TokenValidated => "token_validated",
			Stage::SecretsRemoved => "secrets_removed",
			Stage::RepoDeleted => "repo_deleted",
		}
	}
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
	pub stage: Stage,
	pub message: String,
}

impl StageFailure {
	pub fn new(stage: Stage, message: impl Into<String>) -> Self {
		Self {
			stage,
			message: message.into(),
		}
	}
}

/// Outcome of a create that mutated the remote and then hit failures.
#[derive(Debug, Clone, Default)]
pub struct PartialFailure {
	pub repository_url: Option<String>,
	pub pull_request_url: Option<String>,
	pub completed: Vec<Stage>,
	pub failed: Vec<StageFailure>,
}

impl PartialFailure {
	pub fn failed_stages(&self) -> Vec<String> {
		self.failed.iter().map(|f| f.stage.to_string()).collect()
	}
}

impl fmt::Display for PartialFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let details: Vec<String> = self
			.failed
			.iter()
			.map(|failure| format!("{}: {}", failure.stage, failure.message))
			.collect();
		write!(f, "{}", details.join("; "))
	}
}

#[derive(Debug, Error)]
pub enum EngineError {
	/// Malformed input. No remote calls were made.
	#[error("validation error: {0}")]
	Validation(String),

	#[error("not found: {0}")]
	NotFound(String),

	/// Destroy token mismatch.
	#[error("unauthorized: {0}")]
	Unauthorized(String),

	#[error("conflict: {0}")]
	Conflict(String),

	#[error("render error in {path}: {message}")]
	Render { path: String, message: String },

	#[error("remote error: {0}")]
	Remote(String),

	#[error("partial failure: {0}")]
	PartialFailure(Box<PartialFailure>),
}

impl EngineError {
	pub fn render(path: impl Into<String>, message: impl Into<String>) -> Self {
		EngineError::Render {
			path: path.into(),
			message: message.into(),
		}
	}

	/// Short machine-readable kind, used in logs.
	pub fn kind(&self) -> &'static str {
		match self {
			EngineError::Validation(_) => "validation",
			EngineError::NotFound(_) => "not_found",
			EngineError::Unauthorized(_) => "unauthorized",
			EngineError::Conflict(_) => "conflict",
			EngineError::Render { .. } => "render",
			EngineError::Remote(_) => "remote",
			EngineError::PartialFailure(_) => "partial_failure",
		}
	}
}

impl From<GithubError> for EngineError {
	fn from(err: GithubError) -> Self {
		match err {
			GithubError::NotFound(resource) => EngineError::NotFound(resource),
			GithubError::Conflict(message) => EngineError::Conflict(message),
			other => EngineError::Remote(other.to_string()),
		}
	}
}

impl From<StoreError> for EngineError {
	fn from(err: StoreError) -> Self {
		EngineError::Remote(err.to_string())
	}
}
