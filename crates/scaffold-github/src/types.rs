// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Domain types exchanged across the [`RepoHost`](crate::RepoHost) seam.

use serde::{Deserialize, Serialize};

/// Repository metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
	pub name: String,
	pub full_name: String,
	pub html_url: String,
	pub default_branch: String,
	#[serde(default)]
	pub private: bool,
}

/// Result of a get-or-create.
#[derive(Debug, Clone)]
pub struct RepoHandle {
	pub repository: Repository,
	/// True when this call created the repository.
	pub created: bool,
}

/// Options used when a repository has to be created.
#[derive(Debug, Clone, Default)]
pub struct CreateRepoOptions {
	pub private: bool,
	pub description: Option<String>,
}

/// Kind of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
	Blob,
	Tree,
	/// Submodule pointer.
	Commit,
}

/// One entry of a recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
	pub path: String,
	pub kind: EntryKind,
	pub sha: String,
	pub mode: String,
}

impl TreeEntry {
	pub fn is_blob(&self) -> bool {
		self.kind == EntryKind::Blob
	}

	pub fn is_tree(&self) -> bool {
		self.kind == EntryKind::Tree
	}
}

/// Git file mode of a committed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileMode {
	#[default]
	Regular,
	Executable,
}

impl FileMode {
	/// Maps a git tree mode; anything other than `100755` is a regular file.
	pub fn from_git_mode(mode: &str) -> Self {
		if mode == "100755" {
			FileMode::Executable
		} else {
			FileMode::Regular
		}
	}

	pub fn as_git_mode(self) -> &'static str {
		match self {
			FileMode::Regular => "100644",
			FileMode::Executable => "100755",
		}
	}
}

/// A file to be written by [`commit_tree`](crate::RepoHost::commit_tree).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFile {
	pub path: String,
	pub content: Vec<u8>,
	pub mode: FileMode,
}

impl TreeFile {
	pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
		Self {
			path: path.into(),
			content: content.into(),
			mode: FileMode::Regular,
		}
	}

	pub fn with_mode(mut self, mode: FileMode) -> Self {
		self.mode = mode;
		self
	}
}

/// A single commit of many files on top of `parent_sha`, advancing `branch`.
#[derive(Debug, Clone)]
pub struct CommitRequest {
	pub branch: String,
	pub parent_sha: String,
	pub message: String,
	pub files: Vec<TreeFile>,
}

/// Commit author and committer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
	pub name: String,
	pub email: String,
}

impl CommitAuthor {
	pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			email: email.into(),
		}
	}
}

/// Pull request to open.
#[derive(Debug, Clone)]
pub struct PullRequestSpec {
	pub title: String,
	pub body: String,
	pub head: String,
	pub base: String,
}

/// An opened pull request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
	pub number: u64,
	pub html_url: String,
}

/// Whether a pull request is still open. Merged pull requests are closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullState {
	Open,
	Closed,
}

/// A pull request as listed against a base branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSummary {
	pub number: u64,
	pub state: PullState,
	/// Head branch name.
	pub head: String,
}

/// Team permission on a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamPermission {
	Pull,
	Triage,
	Push,
	Maintain,
	Admin,
}

impl TeamPermission {
	pub fn as_str(self) -> &'static str {
		match self {
			TeamPermission::Pull => "pull",
			TeamPermission::Triage => "triage",
			TeamPermission::Push => "push",
			TeamPermission::Maintain => "maintain",
			TeamPermission::Admin => "admin",
		}
	}
}
