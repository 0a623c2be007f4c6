// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Outbound responses.

use serde::Serialize;

use crate::engine::CreateOutcome;
use crate::error::EngineError;

/// Message returned for every rejected destroy, whatever the cause.
pub const DESTROY_REJECTED: &str = "destroy request rejected: repository or destroy token invalid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
	Success,
	Partial,
	Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateResponse {
	pub status: Status,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub repository_url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pull_request_url: Option<String>,
	pub message: String,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub failed_stages: Vec<String>,
}

impl CreateResponse {
	pub fn from_result(project_name: &str, result: Result<CreateOutcome, EngineError>) -> Self {
		match result {
			Ok(outcome) => Self {
				status: Status::Success,
				repository_url: Some(outcome.repository_url),
				pull_request_url: Some(outcome.pull_request_url),
				message: format!(
					"Created {project_name}; review and merge branch {} to adopt the template",
					outcome.branch
				),
				failed_stages: Vec::new(),
			},
			Err(EngineError::PartialFailure(partial)) => Self {
				status: Status::Partial,
				repository_url: partial.repository_url.clone(),
				pull_request_url: partial.pull_request_url.clone(),
				message: format!("Created {project_name} with failures: {partial}"),
				failed_stages: partial.failed_stages(),
			},
			Err(e) => Self {
				status: Status::Error,
				repository_url: None,
				pull_request_url: None,
				message: e.to_string(),
				failed_stages: Vec::new(),
			},
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestroyResponse {
	pub status: Status,
	pub message: String,
}

impl DestroyResponse {
	/// Token mismatch and a missing repository or token file produce the same message.
	pub fn from_result(project_name: &str, result: Result<(), EngineError>) -> Self {
		match result {
			Ok(()) => Self {
				status: Status::Success,
				message: format!("Destroyed {project_name}"),
			},
			Err(EngineError::Unauthorized(_) | EngineError::NotFound(_)) => Self {
				status: Status::Error,
				message: DESTROY_REJECTED.to_string(),
			},
			Err(e) => Self {
				status: Status::Error,
				message: e.to_string(),
			},
		}
	}
}

/// Requests that could not be parsed or validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedResponse {
	pub status: Status,
	pub message: String,
}

impl RejectedResponse {
	pub fn new(error: &EngineError) -> Self {
		Self {
			status: Status::Error,
			message: error.to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
	Create(CreateResponse),
	Destroy(DestroyResponse),
	Rejected(RejectedResponse),
}

impl Response {
	pub fn status(&self) -> Status {
		match self {
			Response::Create(r) => r.status,
			Response::Destroy(r) => r.status,
			Response::Rejected(r) => r.status,
		}
	}

	pub fn message(&self) -> &str {
		match self {
			Response::Create(r) => &r.message,
			Response::Destroy(r) => &r.message,
			Response::Rejected(r) => &r.message,
		}
	}
}
