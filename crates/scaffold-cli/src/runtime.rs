// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Builds an invocation context from the environment.

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use scaffold_bundle_store::{load_aws_config, ParameterStore, SecretsManagerStore};
use scaffold_common_config::{env_or, env_parse, load_secret_env, EnvError};
use scaffold_common_http::{RetryConfig, RetryScope};
use scaffold_engine::{EngineConfig, InvocationContext, Status};
use scaffold_github::{GithubClient, GithubConfig};
use tracing::info;

const TOKEN_VAR: &str = "SCAFFOLD_GITHUB_TOKEN";
const TOKEN_SECRET_VAR: &str = "SCAFFOLD_GITHUB_TOKEN_SECRET_NAME";

/// Retry policy for GitHub calls.
pub fn retry_config_from_env() -> Result<RetryConfig, EnvError> {
	let defaults = RetryConfig::default();
	let scope = env_parse("SCAFFOLD_RETRY_SCOPE", RetryScope::default())?;
	let max_attempts = env_parse("SCAFFOLD_RETRY_MAX_ATTEMPTS", defaults.max_attempts)?;
	if max_attempts == 0 {
		return Err(EnvError::Invalid {
			var: "SCAFFOLD_RETRY_MAX_ATTEMPTS".to_string(),
			value: "0".to_string(),
			reason: "must be at least 1".to_string(),
		});
	}

	Ok(RetryConfig {
		max_attempts,
		scope,
		..defaults
	})
}

/// Read the request from `path`, or stdin when `path` is `-`.
pub fn read_request(path: &Path) -> Result<String> {
	if path == Path::new("-") {
		let mut raw = String::new();
		io::stdin()
			.read_to_string(&mut raw)
			.context("failed to read request from stdin")?;
		return Ok(raw);
	}

	fs::read_to_string(path).with_context(|| format!("failed to read request {}", path.display()))
}

/// 0 on success, 1 on error, 2 on partial failure.
pub fn exit_code(status: Status) -> u8 {
	match status {
		Status::Success => 0,
		Status::Error => 1,
		Status::Partial => 2,
	}
}

/// Load every collaborator and wrap them in a fresh context.
pub async fn build_context() -> Result<InvocationContext> {
	let engine_config = EngineConfig::from_env().context("invalid engine configuration")?;
	let retry = retry_config_from_env().context("invalid retry configuration")?;
	let sdk_config = load_aws_config().await;

	let token = match load_secret_env(TOKEN_VAR).with_context(|| format!("failed to load {TOKEN_VAR}"))? {
		Some(token) => token,
		None => {
			let secret_id = env_or(TOKEN_SECRET_VAR, "");
			if secret_id.is_empty() {
				anyhow::bail!("set {TOKEN_VAR}, {TOKEN_VAR}_FILE or {TOKEN_SECRET_VAR}");
			}
			info!(secret_id = %secret_id, "Loading GitHub token from Secrets Manager");
			SecretsManagerStore::from_conf(&sdk_config, &engine_config.param_prefix)
				.get_secret_string(&secret_id)
				.await
				.with_context(|| format!("failed to load GitHub token from {secret_id}"))?
		}
	};

	let github_config = GithubConfig::from_env(token)
		.context("invalid GitHub configuration")?
		.with_retry_config(retry);
	let host = GithubClient::new(github_config).context("failed to create GitHub client")?;

	let secrets = SecretsManagerStore::from_conf(&sdk_config, &engine_config.param_prefix);
	let variables = ParameterStore::from_conf(&sdk_config, &engine_config.param_prefix);

	Ok(InvocationContext::new(
		Arc::new(host),
		Arc::new(secrets),
		Arc::new(variables),
		Arc::new(engine_config),
	))
}
