// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Engine configuration.

use scaffold_common_config::{env_bool, env_list, env_or, env_parse, require_env, EnvError};
use scaffold_github::TeamPermission;

use crate::orchestrator::BranchCollision;

const DEFAULT_SETTINGS_FILE: &str = "config.json";
const DEFAULT_TOPIC: &str = "infrastructure";
const DEFAULT_PARAM_PREFIX: &str = "/template-automation";
const DEFAULT_BRANCH_PREFIX: &str = "init";
const DEFAULT_PR_LABEL: &str = "automated";
const DEFAULT_PR_TITLE: &str = "Initialize {{ repo_name }} from template";
const DEFAULT_INIT_WORKFLOW: &str = "initialize.yml";

/// Settings that shape every create and destroy.
///
/// Loaded once and shared read-only by invocations.
#[derive(Debug, Clone)]
pub struct EngineConfig {
	/// Template repository in the host's organization.
	pub template_repo: String,
	/// Branch, tag or sha to read templates from. Defaults to the template
	/// repository's default branch.
	pub template_ref: Option<String>,
	/// File at the new repository root holding the serialized template settings.
	pub settings_file: String,
	pub topics: Vec<String>,
	/// Root path for secret and variable bundles.
	pub param_prefix: String,
	pub branch_prefix: String,
	pub branch_collision: BranchCollision,
	pub private_repos: bool,
	pub pr_labels: Vec<String>,
	/// Pull request title, rendered with the template context.
	pub pr_title: String,
	pub init_workflow: String,
	pub owning_team_permission: TeamPermission,
}

impl EngineConfig {
	pub fn new(template_repo: impl Into<String>) -> Self {
		Self {
			template_repo: template_repo.into(),
			template_ref: None,
			settings_file: DEFAULT_SETTINGS_FILE.to_string(),
			topics: vec![DEFAULT_TOPIC.to_string()],
			param_prefix: DEFAULT_PARAM_PREFIX.to_string(),
			branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
			branch_collision: BranchCollision::default(),
			private_repos: true,
			pr_labels: vec![DEFAULT_PR_LABEL.to_string()],
			pr_title: DEFAULT_PR_TITLE.to_string(),
			init_workflow: DEFAULT_INIT_WORKFLOW.to_string(),
			owning_team_permission: TeamPermission::Admin,
		}
	}

	/// Load from `SCAFFOLD_*` environment variables.
	///
	/// `SCAFFOLD_TEMPLATE_REPO` is required; everything else has a default.
	pub fn from_env() -> Result<Self, EnvError> {
		let template_repo = require_env("SCAFFOLD_TEMPLATE_REPO")?;
		let template_ref = Some(env_or("SCAFFOLD_TEMPLATE_REF", "")).filter(|r| !r.is_empty());

		let branch_prefix = env_or("SCAFFOLD_BRANCH_PREFIX", DEFAULT_BRANCH_PREFIX);
		if branch_prefix.contains(char::is_whitespace) || branch_prefix.ends_with('-') {
			return Err(EnvError::Invalid {
				var: "SCAFFOLD_BRANCH_PREFIX".to_string(),
				value: branch_prefix,
				reason: "must not contain whitespace or end with '-'".to_string(),
			});
		}

		Ok(Self {
			template_ref,
			settings_file: env_or("SCAFFOLD_CONFIG_FILE", DEFAULT_SETTINGS_FILE),
			topics: env_list("SCAFFOLD_TOPICS", &[DEFAULT_TOPIC]),
			param_prefix: env_or("SCAFFOLD_PARAM_PREFIX", DEFAULT_PARAM_PREFIX),
			branch_prefix,
			branch_collision: env_parse("SCAFFOLD_BRANCH_COLLISION", BranchCollision::default())?,
			private_repos: env_bool("SCAFFOLD_PRIVATE_REPOS", true)?,
			pr_labels: env_list("SCAFFOLD_PR_LABELS", &[DEFAULT_PR_LABEL]),
			..Self::new(template_repo)
		})
	}

	pub fn with_template_ref(mut self, git_ref: impl Into<String>) -> Self {
		self.template_ref = Some(git_ref.into());
		self
	}

	pub fn with_branch_collision(mut self, policy: BranchCollision) -> Self {
		self.branch_collision = policy;
		self
	}
}
