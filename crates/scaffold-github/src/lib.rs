// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Version-control facade for scaffold.
//!
//! [`RepoHost`] is the seam the engine talks through. [`GithubClient`]
//! implements it against the GitHub REST API (github.com or Enterprise):
//! repositories, the git data API for single-commit trees, pull requests and
//! Actions secrets/variables.

pub mod client;
pub mod config;
pub mod error;
pub mod host;
pub mod sealed;
pub mod types;

pub use client::GithubClient;
pub use config::GithubConfig;
pub use error::{GithubError, Result};
pub use host::RepoHost;
pub use scaffold_common_http::{CallKind, RetryConfig, RetryScope};
pub use types::{
	CommitAuthor, CommitRequest, CreateRepoOptions, EntryKind, FileMode, PullRequest,
	PullRequestSpec, PullRequestSummary, PullState, RepoHandle, Repository, TeamPermission,
	TreeEntry, TreeFile,
};
