// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The version-control seam.
//!
//! Every method is scoped to the host's configured organization and takes a
//! bare repository name. Implementations must make [`RepoHost::commit_tree`]
//! atomic: either the branch advances to a commit containing every file, or
//! it does not move.

use async_trait::async_trait;
use scaffold_common_config::SecretString;

use crate::error::Result;
use crate::types::{
	CommitRequest, CreateRepoOptions, PullRequest, PullRequestSpec, PullRequestSummary,
	RepoHandle, Repository, TeamPermission, TreeEntry,
};

#[async_trait]
pub trait RepoHost: Send + Sync {
	/// The organization all calls are scoped to.
	fn org(&self) -> &str;

	async fn get_repo(&self, repo: &str) -> Result<Option<Repository>>;

	/// Return the repository, creating it (initialized with a default branch) if absent.
	/// [`RepoHandle::created`] is false when the repository already existed.
	async fn get_or_create_repo(&self, repo: &str, options: &CreateRepoOptions)
		-> Result<RepoHandle>;

	/// Recursive tree listing of `git_ref`.
	async fn list_tree(&self, repo: &str, git_ref: &str) -> Result<Vec<TreeEntry>>;

	async fn get_blob(&self, repo: &str, sha: &str) -> Result<Vec<u8>>;

	/// File content at `path`, or `None` if no file exists there.
	async fn get_file(&self, repo: &str, path: &str, git_ref: Option<&str>)
		-> Result<Option<Vec<u8>>>;

	/// Head commit of `branch`, or `None` if the branch does not exist.
	async fn branch_head(&self, repo: &str, branch: &str) -> Result<Option<String>>;

	/// Whether any commit reachable from `git_ref` ever touched `path`.
	async fn path_has_history(&self, repo: &str, path: &str, git_ref: &str) -> Result<bool>;

	/// Branch names starting with `prefix`.
	async fn list_branches(&self, repo: &str, prefix: &str) -> Result<Vec<String>>;

	/// Create `branch` at `from_sha`. An existing branch is a conflict.
	async fn create_branch(&self, repo: &str, branch: &str, from_sha: &str) -> Result<()>;

	/// Write all files in one commit and advance the branch. Returns the commit sha.
	async fn commit_tree(&self, repo: &str, commit: &CommitRequest) -> Result<String>;

	async fn open_pull_request(&self, repo: &str, spec: &PullRequestSpec) -> Result<PullRequest>;

	/// Pull requests of any state into `base`, oldest first.
	async fn list_pull_requests(&self, repo: &str, base: &str) -> Result<Vec<PullRequestSummary>>;

	async fn add_labels(&self, repo: &str, number: u64, labels: &[String]) -> Result<()>;

	async fn set_secret(&self, repo: &str, name: &str, value: &SecretString) -> Result<()>;

	async fn set_variable(&self, repo: &str, name: &str, value: &str) -> Result<()>;

	async fn list_secrets(&self, repo: &str) -> Result<Vec<String>>;

	async fn list_variables(&self, repo: &str) -> Result<Vec<String>>;

	/// Delete a secret. Deleting a missing secret succeeds.
	async fn delete_secret(&self, repo: &str, name: &str) -> Result<()>;

	/// Delete a variable. Deleting a missing variable succeeds.
	async fn delete_variable(&self, repo: &str, name: &str) -> Result<()>;

	async fn delete_repo(&self, repo: &str) -> Result<()>;

	async fn set_topics(&self, repo: &str, topics: &[String]) -> Result<()>;

	async fn grant_team(&self, repo: &str, team: &str, permission: TeamPermission) -> Result<()>;

	async fn dispatch_workflow(&self, repo: &str, workflow: &str, git_ref: &str) -> Result<()>;
}
