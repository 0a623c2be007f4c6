// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Inbound action requests and their validation.
//!
//! Requests are parsed into a tagged enum keyed on `action`, so a create
//! can never carry a destroy token and a destroy can never carry settings.
//! Free-form template variables are the only untyped part and are limited
//! to scalars.

use std::collections::BTreeMap;

use scaffold_common_secret::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

const MAX_REPO_NAME_LEN: usize = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TemplateRequest {
	Create(CreateRequest),
	Destroy(DestroyRequest),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
	pub project_name: String,
	pub template_settings: TemplateSettings,
	/// Team granted admin on the new repository.
	#[serde(default)]
	pub owning_team: Option<String>,
	/// Dispatch the init workflow on the init branch after the pull request opens.
	#[serde(default)]
	pub trigger_init_workflow: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DestroyRequest {
	pub project_name: String,
	pub destroy_token: SecretString,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSettings {
	/// Template category; also selects the secret and variable scope.
	#[serde(rename = "type")]
	pub template_type: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub environment: Option<String>,
	/// Subdirectory of the template repository. `None` means the whole repository.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_path: Option<String>,
	#[serde(default)]
	pub variables: BTreeMap<String, VariableValue>,
	#[serde(default)]
	pub tags: BTreeMap<String, String>,
}

/// A template variable. Nested values are rejected at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
	Bool(bool),
	Integer(i64),
	Float(f64),
	Text(String),
}

impl TemplateRequest {
	/// Parse and validate a JSON request.
	pub fn from_json(raw: &str) -> Result<Self> {
		let request: TemplateRequest =
			serde_json::from_str(raw).map_err(|e| EngineError::Validation(e.to_string()))?;
		request.validate()
	}

	/// Parse and validate an already-decoded JSON value.
	pub fn from_value(value: serde_json::Value) -> Result<Self> {
		let request: TemplateRequest =
			serde_json::from_value(value).map_err(|e| EngineError::Validation(e.to_string()))?;
		request.validate()
	}

	pub fn project_name(&self) -> &str {
		match self {
			TemplateRequest::Create(create) => &create.project_name,
			TemplateRequest::Destroy(destroy) => &destroy.project_name,
		}
	}

	pub fn action(&self) -> &'static str {
		match self {
			TemplateRequest::Create(_) => "create",
			TemplateRequest::Destroy(_) => "destroy",
		}
	}

	/// Check field contents and normalize `source_path`.
	pub fn validate(self) -> Result<Self> {
		match self {
			TemplateRequest::Create(mut create) => {
				validate_repo_name(&create.project_name)?;
				create.template_settings = create.template_settings.validate()?;
				if let Some(team) = &create.owning_team {
					if team.trim().is_empty() {
						return Err(EngineError::Validation(
							"owning_team must not be empty".to_string(),
						));
					}
				}
				Ok(TemplateRequest::Create(create))
			}
			TemplateRequest::Destroy(destroy) => {
				validate_repo_name(&destroy.project_name)?;
				if destroy.destroy_token.is_blank() {
					return Err(EngineError::Validation(
						"destroy_token must not be empty".to_string(),
					));
				}
				Ok(TemplateRequest::Destroy(destroy))
			}
		}
	}
}

impl TemplateSettings {
	pub fn validate(mut self) -> Result<Self> {
		validate_template_type(&self.template_type)?;
		self.source_path = match self.source_path.take() {
			Some(raw) => normalize_source_path(&raw)?,
			None => None,
		};
		for name in self.variables.keys() {
			if name.trim().is_empty() {
				return Err(EngineError::Validation(
					"variable names must not be empty".to_string(),
				));
			}
		}
		Ok(self)
	}
}

/// Repository names: 1-100 of `[A-Za-z0-9._-]`, not starting with `.` or `-`,
/// never containing `..`.
pub fn validate_repo_name(name: &str) -> Result<()> {
	if name.is_empty() || name.len() > MAX_REPO_NAME_LEN {
		return Err(EngineError::Validation(
			"project_name must be 1-100 characters".into(),
		));
	}

	if name.starts_with('.') || name.starts_with('-') {
		return Err(EngineError::Validation(
			"project_name cannot start with '.' or '-'".into(),
		));
	}

	if name.contains("..") {
		return Err(EngineError::Validation(
			"project_name cannot contain '..'".into(),
		));
	}

	if !name
		.chars()
		.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
	{
		return Err(EngineError::Validation(
			"project_name can only contain letters, numbers, dash, underscore, dot".into(),
		));
	}

	Ok(())
}

/// The type doubles as a bundle scope and a branch-name component.
fn validate_template_type(template_type: &str) -> Result<()> {
	if template_type.is_empty()
		|| !template_type
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
	{
		return Err(EngineError::Validation(format!(
			"template type '{template_type}' must be non-empty and contain only letters, numbers, dash, underscore"
		)));
	}
	Ok(())
}

/// Normalize a template subdirectory.
///
/// Empty (after trimming `./` and slashes) means the whole repository.
/// Anything containing `..` or looking absolute is rejected.
pub fn normalize_source_path(raw: &str) -> Result<Option<String>> {
	let trimmed = raw.trim();

	if trimmed.contains("..") {
		return Err(EngineError::Validation(format!(
			"source_path '{raw}' must not contain '..'"
		)));
	}

	let bytes = trimmed.as_bytes();
	let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
	if trimmed.starts_with('/') || trimmed.starts_with('\\') || has_drive {
		return Err(EngineError::Validation(format!(
			"source_path '{raw}' must be relative"
		)));
	}

	let segments: Vec<&str> = trimmed
		.split('/')
		.filter(|segment| !segment.is_empty() && *segment != ".")
		.collect();

	if segments.is_empty() {
		Ok(None)
	} else {
		Ok(Some(segments.join("/")))
	}
}
