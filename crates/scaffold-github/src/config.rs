// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration for the GitHub client.

use std::time::Duration;

use reqwest::Url;
use scaffold_common_config::{env_bool, env_or, require_env, SecretString};
use scaffold_common_http::RetryConfig;
use tracing::warn;

use crate::error::GithubError;
use crate::types::CommitAuthor;

const DEFAULT_BASE_URL: &str = "https://api.github.com/";
const DEFAULT_AUTHOR_NAME: &str = "Template Automation";
const DEFAULT_AUTHOR_EMAIL: &str = "automation@example.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`GithubClient`](crate::GithubClient).
///
/// The token is held as a [`SecretString`] so it never lands in logs. All
/// repository operations are scoped to a single organization.
#[derive(Clone)]
pub struct GithubConfig {
	token: SecretString,
	org: String,
	/// Always ends with `/` so relative joins append rather than replace.
	base_url: Url,
	author: CommitAuthor,
	verify_tls: bool,
	allow_insecure: bool,
	request_timeout: Duration,
	pub retry_config: RetryConfig,
}

impl std::fmt::Debug for GithubConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GithubConfig")
			.field("token", &self.token)
			.field("org", &self.org)
			.field("base_url", &self.base_url.as_str())
			.field("author", &self.author)
			.field("verify_tls", &self.verify_tls)
			.field("request_timeout", &self.request_timeout)
			.field("retry_config", &self.retry_config)
			.finish()
	}
}

impl GithubConfig {
	/// Parse a base URL and normalize it to end with a single `/`.
	///
	/// Only `https` is accepted unless `allow_insecure` is set, which local
	/// test servers need.
	fn normalize_base_url(raw: &str, allow_insecure: bool) -> Result<Url, GithubError> {
		let trimmed = raw.trim().trim_end_matches('/');
		let url = Url::parse(&format!("{trimmed}/"))
			.map_err(|e| GithubError::Config(format!("Invalid GitHub base URL '{raw}': {e}")))?;

		match url.scheme() {
			"https" => {}
			"http" if allow_insecure => {}
			other => {
				return Err(GithubError::Config(format!(
					"GitHub base URL must use https, got '{other}'"
				)))
			}
		}

		if url.host_str().is_none() {
			return Err(GithubError::Config(
				"GitHub base URL must include a host".to_string(),
			));
		}

		Ok(url)
	}

	/// Create a configuration for `org` against api.github.com.
	pub fn new(token: SecretString, org: impl Into<String>) -> Self {
		Self {
			token,
			org: org.into(),
			base_url: Url::parse(DEFAULT_BASE_URL).expect("default URL is valid"),
			author: CommitAuthor::new(DEFAULT_AUTHOR_NAME, DEFAULT_AUTHOR_EMAIL),
			verify_tls: true,
			allow_insecure: false,
			request_timeout: DEFAULT_TIMEOUT,
			retry_config: RetryConfig::default(),
		}
	}

	/// Create configuration from environment variables.
	///
	/// The token is resolved by the caller because it may come from the
	/// environment or from a secret store.
	///
	/// Required:
	/// - `SCAFFOLD_GITHUB_ORG`: organization that owns templates and new repositories
	///
	/// Optional:
	/// - `SCAFFOLD_GITHUB_API`: API base URL (defaults to https://api.github.com)
	/// - `SCAFFOLD_COMMIT_AUTHOR_NAME` / `SCAFFOLD_COMMIT_AUTHOR_EMAIL`
	/// - `SCAFFOLD_VERIFY_TLS`: set `false` to accept any certificate
	pub fn from_env(token: SecretString) -> Result<Self, GithubError> {
		let org = require_env("SCAFFOLD_GITHUB_ORG").map_err(|e| GithubError::Config(e.to_string()))?;
		let base_url_raw = env_or("SCAFFOLD_GITHUB_API", DEFAULT_BASE_URL);
		let base_url = Self::normalize_base_url(&base_url_raw, false)?;
		let verify_tls =
			env_bool("SCAFFOLD_VERIFY_TLS", true).map_err(|e| GithubError::Config(e.to_string()))?;
		let author = CommitAuthor::new(
			env_or("SCAFFOLD_COMMIT_AUTHOR_NAME", DEFAULT_AUTHOR_NAME),
			env_or("SCAFFOLD_COMMIT_AUTHOR_EMAIL", DEFAULT_AUTHOR_EMAIL),
		);

		Ok(Self {
			base_url,
			verify_tls,
			author,
			..Self::new(token, org)
		})
	}

	/// Set a custom base URL (GitHub Enterprise or a test server).
	///
	/// If validation fails, logs a warning and keeps the previous value.
	pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
		let url_str = url.into();
		match Self::normalize_base_url(&url_str, self.allow_insecure) {
			Ok(validated) => self.base_url = validated,
			Err(e) => {
				warn!(error = %e, url = %url_str, "Invalid base_url in with_base_url, keeping previous value");
			}
		}
		self
	}

	/// Permit plain-http base URLs. Must be set before [`with_base_url`](Self::with_base_url).
	pub fn allow_insecure(mut self) -> Self {
		self.allow_insecure = true;
		self
	}

	pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
		self.retry_config = config;
		self
	}

	pub fn with_author(mut self, author: CommitAuthor) -> Self {
		self.author = author;
		self
	}

	pub fn with_verify_tls(mut self, verify: bool) -> Self {
		self.verify_tls = verify;
		self
	}

	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	pub fn org(&self) -> &str {
		&self.org
	}

	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	pub fn author(&self) -> &CommitAuthor {
		&self.author
	}

	pub fn verify_tls(&self) -> bool {
		self.verify_tls
	}

	pub fn request_timeout(&self) -> Duration {
		self.request_timeout
	}

	pub(crate) fn token(&self) -> &SecretString {
		&self.token
	}
}
