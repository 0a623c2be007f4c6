// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secrets and variables distribution.
//!
//! Bundles are resolved fresh for every repository and applied key by key.
//! A failing key never stops the others; every failure is collected.

use std::fmt;

use scaffold_bundle_store::{resolve_merged, BundleStore, RejectedKey};
use scaffold_github::RepoHost;
use tracing::{info, instrument, warn};

/// Prefix reserved by GitHub Actions.
const RESERVED_PREFIX: &str = "GITHUB_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFailure {
	/// `secret:NAME`, `variable:NAME` or a whole-bundle label.
	pub key: String,
	pub reason: String,
}

impl KeyFailure {
	fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			reason: reason.into(),
		}
	}
}

/// What happened to each key of one apply or remove pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionReport {
	pub applied: Vec<String>,
	pub failed: Vec<KeyFailure>,
}

impl DistributionReport {
	pub fn is_clean(&self) -> bool {
		self.failed.is_empty()
	}
}

impl fmt::Display for DistributionReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let failures: Vec<String> = self
			.failed
			.iter()
			.map(|failure| format!("{} ({})", failure.key, failure.reason))
			.collect();
		write!(
			f,
			"{} applied, {} failed: {}",
			self.applied.len(),
			self.failed.len(),
			failures.join(", ")
		)
	}
}

/// Upper-case `raw` and check it against Actions naming rules.
pub fn normalize_name(raw: &str) -> Result<String, String> {
	let name = raw.trim().to_ascii_uppercase();

	if name.is_empty() {
		return Err("name is empty".to_string());
	}
	if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
		return Err("name may only contain letters, digits and underscores".to_string());
	}
	if name.starts_with(|c: char| c.is_ascii_digit()) {
		return Err("name must not start with a digit".to_string());
	}
	if name.starts_with(RESERVED_PREFIX) {
		return Err(format!("name must not start with {RESERVED_PREFIX}"));
	}

	Ok(name)
}

/// Resolve the merged secret and variable bundles for `scope` and write every key to `repo`.
#[instrument(skip(host, secrets, variables))]
pub async fn apply(
	host: &dyn RepoHost,
	repo: &str,
	secrets: &dyn BundleStore,
	variables: &dyn BundleStore,
	scope: &str,
) -> DistributionReport {
	let mut report = DistributionReport::default();

	match resolve_merged(secrets, scope, &normalize_name).await {
		Ok(resolved) => {
			reject(&mut report, "secret", resolved.rejected);
			for (name, value) in &resolved.bundle {
				let outcome = host
					.set_secret(repo, name, value)
					.await
					.map_err(|e| e.to_string());
				record(&mut report, format!("secret:{name}"), outcome);
			}
		}
		Err(e) => {
			warn!(repo, scope, error = %e, "Failed to resolve secret bundle");
			report
				.failed
				.push(KeyFailure::new(format!("{}:{scope}", secrets.kind()), e.to_string()));
		}
	}

	match resolve_merged(variables, scope, &normalize_name).await {
		Ok(resolved) => {
			reject(&mut report, "variable", resolved.rejected);
			for (name, value) in &resolved.bundle {
				let outcome = host
					.set_variable(repo, name, value.expose())
					.await
					.map_err(|e| e.to_string());
				record(&mut report, format!("variable:{name}"), outcome);
			}
		}
		Err(e) => {
			warn!(repo, scope, error = %e, "Failed to resolve variable bundle");
			report
				.failed
				.push(KeyFailure::new(format!("{}:{scope}", variables.kind()), e.to_string()));
		}
	}

	info!(
		repo,
		applied = report.applied.len(),
		failed = report.failed.len(),
		"Distributed secrets and variables"
	);
	report
}

/// Delete every secret and variable currently set on `repo`.
#[instrument(skip(host))]
pub async fn remove(host: &dyn RepoHost, repo: &str) -> DistributionReport {
	let mut report = DistributionReport::default();

	match host.list_secrets(repo).await {
		Ok(names) => {
			for name in names {
				let outcome = host.delete_secret(repo, &name).await.map_err(|e| e.to_string());
				record(&mut report, format!("secret:{name}"), outcome);
			}
		}
		Err(e) => report.failed.push(KeyFailure::new("secrets", e.to_string())),
	}

	match host.list_variables(repo).await {
		Ok(names) => {
			for name in names {
				let outcome = host
					.delete_variable(repo, &name)
					.await
					.map_err(|e| e.to_string());
				record(&mut report, format!("variable:{name}"), outcome);
			}
		}
		Err(e) => report.failed.push(KeyFailure::new("variables", e.to_string())),
	}

	if !report.is_clean() {
		warn!(repo, failed = report.failed.len(), "Some secrets or variables were not removed");
	}
	report
}

fn reject(report: &mut DistributionReport, kind: &str, rejected: Vec<RejectedKey>) {
	for key in rejected {
		record(report, format!("{kind}:{}", key.name), Err(key.reason));
	}
}

fn record(report: &mut DistributionReport, key: String, outcome: Result<(), String>) {
	match outcome {
		Ok(()) => report.applied.push(key),
		Err(reason) => {
			warn!(key = %key, reason = %reason, "Key failed");
			report.failed.push(KeyFailure::new(key, reason));
		}
	}
}
