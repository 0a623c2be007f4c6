// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Destroy tokens.
//!
//! A token is generated at create time and committed as `.destroy-token` in
//! the same commit as the rendered template. That file is the only copy.
//! Validation always reads the live file from the repository, so editing or
//! deleting it revokes destroy capability.

use rand::rngs::OsRng;
use rand::RngCore;
use scaffold_common_secret::SecretString;
use scaffold_github::{PullState, RepoHost};
use tracing::{debug, instrument};

use crate::error::{EngineError, Result};

pub const TOKEN_FILE: &str = ".destroy-token";

/// 256 bits.
const TOKEN_BYTES: usize = 32;

const HEADER: &[&str] = &[
	"# DESTROY TOKEN - DO NOT SHARE",
	"# Anyone holding the value below can delete this repository.",
	"# Editing or deleting this file permanently revokes that ability.",
];

/// A freshly generated destroy token.
#[derive(Clone)]
pub struct DestroyToken {
	value: SecretString,
}

impl std::fmt::Debug for DestroyToken {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DestroyToken")
			.field("value", &self.value)
			.finish()
	}
}

impl DestroyToken {
	/// Generate a token from the OS random source. Performs no I/O.
	pub fn generate() -> Self {
		let mut bytes = [0u8; TOKEN_BYTES];
		OsRng.fill_bytes(&mut bytes);
		Self {
			value: SecretString::new(hex::encode(bytes)),
		}
	}

	pub fn value(&self) -> &SecretString {
		&self.value
	}

	/// Body of the `.destroy-token` file: the warning header, then the token on its own line.
	pub fn file_body(&self) -> String {
		let mut body = HEADER.join("\n");
		body.push('\n');
		body.push_str(self.value.expose());
		body.push('\n');
		body
	}
}

/// Extract the token from a `.destroy-token` file.
///
/// The token is the last non-empty line that is not a `#` comment. Returns
/// `None` for files that are not UTF-8 or contain no token line.
pub fn parse_token_file(content: &[u8]) -> Option<SecretString> {
	let text = std::str::from_utf8(content).ok()?;
	text
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty() && !line.starts_with('#'))
		.last()
		.map(|line| SecretString::new(line.to_string()))
}

/// Where to look for the token file in a repository.
#[derive(Debug, Clone)]
pub struct TokenLocation<'a> {
	pub default_branch: &'a str,
	/// Prefix of init branches, which hold the token until the init pull request merges.
	pub init_branch_prefix: &'a str,
}

/// Read the live token file from `repo`.
///
/// The default branch is authoritative once it has ever held the file:
/// deleting the file there revokes destroy for good. Before that, the
/// token is read from the head branch of the init pull request, and only
/// while that pull request is open.
pub async fn read_live_token(
	host: &dyn RepoHost,
	repo: &str,
	location: &TokenLocation<'_>,
) -> Result<SecretString> {
	let default_branch = location.default_branch;
	if let Some(content) = host.get_file(repo, TOKEN_FILE, Some(default_branch)).await? {
		debug!(repo, branch = default_branch, "Found token file");
		return token_from(repo, &content);
	}

	if host.path_has_history(repo, TOKEN_FILE, default_branch).await? {
		return Err(EngineError::NotFound(format!(
			"{TOKEN_FILE} was removed from {repo}@{default_branch}"
		)));
	}

	let Some(branch) = pending_init_branch(host, repo, location).await? else {
		return Err(EngineError::NotFound(format!("{TOKEN_FILE} in {repo}")));
	};
	match host.get_file(repo, TOKEN_FILE, Some(&branch)).await? {
		Some(content) => {
			debug!(repo, branch = %branch, "Found token file on init branch");
			token_from(repo, &content)
		}
		None => Err(EngineError::NotFound(format!("{TOKEN_FILE} in {repo}@{branch}"))),
	}
}

/// Head branch of the init pull request while it is still open.
///
/// The init pull request is the earliest pull request into the default
/// branch from an init branch. Later ones never carry the token.
async fn pending_init_branch(
	host: &dyn RepoHost,
	repo: &str,
	location: &TokenLocation<'_>,
) -> Result<Option<String>> {
	let init = host
		.list_pull_requests(repo, location.default_branch)
		.await?
		.into_iter()
		.filter(|pull| pull.head.starts_with(location.init_branch_prefix))
		.min_by_key(|pull| pull.number);

	Ok(match init {
		Some(pull) if pull.state == PullState::Open => Some(pull.head),
		Some(pull) => {
			debug!(repo, number = pull.number, "Init pull request is closed");
			None
		}
		None => None,
	})
}

fn token_from(repo: &str, content: &[u8]) -> Result<SecretString> {
	parse_token_file(content)
		.ok_or_else(|| EngineError::NotFound(format!("{TOKEN_FILE} in {repo} has no token")))
}

/// Check `provided` against the live token file in constant time.
///
/// Fails with `NotFound` when the file is missing or holds no token and
/// with `Unauthorized` on mismatch. Never mutates anything.
#[instrument(skip(host, provided, location))]
pub async fn validate(
	host: &dyn RepoHost,
	repo: &str,
	provided: &SecretString,
	location: &TokenLocation<'_>,
) -> Result<()> {
	let stored = read_live_token(host, repo, location).await?;

	if provided.ct_eq_str(stored.expose()) {
		Ok(())
	} else {
		Err(EngineError::Unauthorized(format!(
			"destroy token does not match {TOKEN_FILE} in {repo}"
		)))
	}
}
