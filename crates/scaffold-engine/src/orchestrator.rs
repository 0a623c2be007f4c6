// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Init branch, single commit and pull request.
//!
//! Branches are never overwritten. The rendered tree lands on a fresh branch
//! off the default branch head in one commit, and a pull request is opened
//! for human review. Nothing here merges.

use std::str::FromStr;

use scaffold_github::{CommitRequest, PullRequest, PullRequestSpec, RepoHost, Repository, TreeFile};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{EngineError, Result};

/// Upper bound on suffixed branch names tried before giving up.
const MAX_SUFFIX: u32 = 100;

/// What to do when the init branch name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchCollision {
	/// Fail with a conflict.
	#[default]
	Fail,
	/// Append `-2`, `-3`, ... until a free name is found.
	Suffix,
}

impl FromStr for BranchCollision {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"fail" => Ok(Self::Fail),
			"suffix" => Ok(Self::Suffix),
			other => Err(format!(
				"unknown branch collision policy '{other}' (expected fail or suffix)"
			)),
		}
	}
}

/// `{prefix}-{template_type}`, lower-cased.
pub fn init_branch_name(prefix: &str, template_type: &str) -> String {
	format!("{prefix}-{}", template_type.to_ascii_lowercase())
}

/// Pick the init branch name for `repo`, given the branches that already exist.
#[instrument(skip(host))]
pub async fn choose_branch(
	host: &dyn RepoHost,
	repo: &str,
	base: &str,
	policy: BranchCollision,
) -> Result<String> {
	let taken = host.list_branches(repo, base).await?;
	pick_free_name(base, &taken, policy)
}

fn pick_free_name(base: &str, taken: &[String], policy: BranchCollision) -> Result<String> {
	if !taken.iter().any(|name| name == base) {
		return Ok(base.to_string());
	}

	match policy {
		BranchCollision::Fail => Err(EngineError::Conflict(format!(
			"branch '{base}' already exists"
		))),
		BranchCollision::Suffix => (2..=MAX_SUFFIX)
			.map(|n| format!("{base}-{n}"))
			.find(|candidate| !taken.contains(candidate))
			.ok_or_else(|| {
				EngineError::Conflict(format!("no free branch name derived from '{base}'"))
			}),
	}
}

/// Create `branch` off the default branch head. Returns the head sha the
/// branch points at.
///
/// Branch creation is never retried and an existing branch is a conflict.
#[instrument(skip(host, repository), fields(repo = %repository.name))]
pub async fn create_init_branch(
	host: &dyn RepoHost,
	repository: &Repository,
	branch: &str,
) -> Result<String> {
	let repo = repository.name.as_str();
	let head = host
		.branch_head(repo, &repository.default_branch)
		.await?
		.ok_or_else(|| {
			EngineError::NotFound(format!(
				"default branch '{}' of {repo}",
				repository.default_branch
			))
		})?;

	host.create_branch(repo, branch, &head).await?;
	debug!(repo, branch, from = %head, "Created init branch");
	Ok(head)
}

/// Commit `files` onto `branch` as a single commit on top of `parent_sha`.
#[instrument(skip(host, files, message), fields(files = files.len()))]
pub async fn commit_rendered_tree(
	host: &dyn RepoHost,
	repo: &str,
	branch: &str,
	parent_sha: String,
	files: Vec<TreeFile>,
	message: String,
) -> Result<String> {
	let commit = CommitRequest {
		branch: branch.to_string(),
		parent_sha,
		message,
		files,
	};
	let sha = host.commit_tree(repo, &commit).await?;
	info!(repo, branch, sha = %sha, "Committed init branch");
	Ok(sha)
}

/// Open the init pull request and apply labels.
///
/// Label failures are logged; they do not fail the pull request.
#[instrument(skip(host, spec, labels), fields(head = %spec.head))]
pub async fn open_pull_request(
	host: &dyn RepoHost,
	repo: &str,
	spec: &PullRequestSpec,
	labels: &[String],
) -> Result<PullRequest> {
	let pull = host.open_pull_request(repo, spec).await?;

	if let Err(e) = host.add_labels(repo, pull.number, labels).await {
		warn!(repo, number = pull.number, error = %e, "Failed to label pull request");
	}

	Ok(pull)
}

/// Pull request description: template origin and the committed files.
pub fn pull_request_body<'a>(
	template_repo: &str,
	git_ref: &str,
	source_path: Option<&str>,
	paths: impl Iterator<Item = &'a str>,
) -> String {
	let mut body = String::from("Initial content generated from a template.\n\n");
	body.push_str(&format!("- Template repository: `{template_repo}`\n"));
	body.push_str(&format!("- Template version: `{git_ref}`\n"));
	body.push_str(&format!("- Source path: `{}`\n", source_path.unwrap_or("/")));
	body.push_str("\nFiles:\n");
	for path in paths {
		body.push_str(&format!("- `{path}`\n"));
	}
	body.push_str("\nReview and merge to adopt the template. Nothing is merged automatically.\n");
	body
}
