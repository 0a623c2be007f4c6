// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Environment variable helpers.
//!
//! Secrets follow the `VAR` / `VAR_FILE` convention so the GitHub token can
//! come from a mounted secret file instead of the process environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::{env, fs};

use scaffold_common_secret::Secret;
use thiserror::Error;

/// Errors that can occur when loading secrets from environment variables.
#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// Error returned when a required secret is not found.
#[derive(Debug, Error)]
pub enum RequiredSecretError {
	#[error("required secret not found: set either {var} or {file_var}")]
	Missing { var: String, file_var: String },

	#[error(transparent)]
	Load(#[from] SecretEnvError),
}

/// Errors for plain (non-secret) settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
	#[error("{var} is not set")]
	Missing { var: String },

	#[error("{var} has invalid value '{value}': {reason}")]
	Invalid {
		var: String,
		value: String,
		reason: String,
	},
}

/// Load a secret using the `VAR` / `VAR_FILE` convention.
///
/// `{var}_FILE` wins over `{var}`. A single trailing newline is stripped from
/// file content. Returns `Ok(None)` when neither is set.
pub fn load_secret_env(var: &str) -> Result<Option<Secret<String>>, SecretEnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|source| SecretEnvError::Io {
			path: path.clone(),
			source,
		})?;

		let secret = content.strip_suffix('\n').unwrap_or(&content).to_string();
		return Ok(Some(Secret::new(secret)));
	}

	Ok(env::var(var).ok().map(Secret::new))
}

/// Like [`load_secret_env`] but fails when the secret is absent.
pub fn require_secret_env(var: &str) -> Result<Secret<String>, RequiredSecretError> {
	load_secret_env(var)?.ok_or_else(|| RequiredSecretError::Missing {
		var: var.to_string(),
		file_var: format!("{var}_FILE"),
	})
}

/// Read `var`, treating unset and empty the same way.
fn non_empty(var: &str) -> Option<String> {
	env::var(var)
		.ok()
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
}

/// Read a setting or fall back to `default`.
pub fn env_or(var: &str, default: &str) -> String {
	non_empty(var).unwrap_or_else(|| default.to_string())
}

/// Read a required setting.
pub fn require_env(var: &str) -> Result<String, EnvError> {
	non_empty(var).ok_or_else(|| EnvError::Missing {
		var: var.to_string(),
	})
}

/// Read a boolean setting. Accepts `1/0`, `true/false`, `yes/no`, `on/off`.
pub fn env_bool(var: &str, default: bool) -> Result<bool, EnvError> {
	let Some(value) = non_empty(var) else {
		return Ok(default);
	};
	match value.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(EnvError::Invalid {
			var: var.to_string(),
			value,
			reason: "expected a boolean".to_string(),
		}),
	}
}

/// Read a comma-separated list, dropping empty items.
pub fn env_list(var: &str, default: &[&str]) -> Vec<String> {
	match non_empty(var) {
		Some(value) => value
			.split(',')
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(str::to_string)
			.collect(),
		None => default.iter().map(|s| s.to_string()).collect(),
	}
}

/// Parse a setting with [`FromStr`], falling back to `default` when unset.
pub fn env_parse<T>(var: &str, default: T) -> Result<T, EnvError>
where
	T: FromStr,
	T::Err: std::fmt::Display,
{
	match non_empty(var) {
		Some(value) => value.parse::<T>().map_err(|e| EnvError::Invalid {
			var: var.to_string(),
			reason: e.to_string(),
			value,
		}),
		None => Ok(default),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[test]
	fn secret_returns_none_when_not_set() {
		let var = "SCAFFOLD_TEST_SECRET_UNSET_7781";
		env::remove_var(var);
		env::remove_var(format!("{var}_FILE"));

		assert!(load_secret_env(var).unwrap().is_none());
	}

	#[test]
	fn secret_file_var_takes_precedence_and_strips_newline() {
		let var = "SCAFFOLD_TEST_SECRET_FILE_7782";
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "from-file").unwrap();

		env::set_var(var, "from-env");
		env::set_var(format!("{var}_FILE"), file.path().to_str().unwrap());

		let secret = load_secret_env(var).unwrap().unwrap();
		assert_eq!(secret.expose(), "from-file");

		env::remove_var(var);
		env::remove_var(format!("{var}_FILE"));
	}

	#[test]
	fn secret_empty_file_path_is_an_error() {
		let var = "SCAFFOLD_TEST_SECRET_EMPTY_PATH_7783";
		env::set_var(format!("{var}_FILE"), "");

		assert!(matches!(
			load_secret_env(var),
			Err(SecretEnvError::EmptyPath { .. })
		));

		env::remove_var(format!("{var}_FILE"));
	}

	#[test]
	fn require_secret_reports_both_names() {
		let var = "SCAFFOLD_TEST_SECRET_REQUIRED_7784";
		env::remove_var(var);
		env::remove_var(format!("{var}_FILE"));

		let err = require_secret_env(var).unwrap_err();
		assert!(err.to_string().contains(var));
		assert!(err.to_string().contains("_FILE"));
	}

	#[test]
	fn bool_parsing() {
		let var = "SCAFFOLD_TEST_BOOL_7785";
		env::set_var(var, "No");
		assert_eq!(env_bool(var, true), Ok(false));
		env::set_var(var, "on");
		assert_eq!(env_bool(var, false), Ok(true));
		env::set_var(var, "maybe");
		assert!(matches!(env_bool(var, false), Err(EnvError::Invalid { .. })));
		env::remove_var(var);
		assert_eq!(env_bool(var, true), Ok(true));
	}

	#[test]
	fn list_parsing_drops_blanks() {
		let var = "SCAFFOLD_TEST_LIST_7786";
		env::set_var(var, "infrastructure, ,eks ,");
		assert_eq!(env_list(var, &[]), vec!["infrastructure", "eks"]);
		env::remove_var(var);
		assert_eq!(env_list(var, &["automated"]), vec!["automated"]);
	}

	#[test]
	fn parse_names_variable_on_error() {
		let var = "SCAFFOLD_TEST_PARSE_7787";
		env::set_var(var, "three");
		let err = env_parse::<u32>(var, 3).unwrap_err();
		assert!(err.to_string().starts_with(var));
		env::set_var(var, "5");
		assert_eq!(env_parse::<u32>(var, 3), Ok(5));
		env::remove_var(var);
	}

	#[test]
	fn required_setting_treats_blank_as_missing() {
		let var = "SCAFFOLD_TEST_REQUIRED_7788";
		env::set_var(var, "   ");
		assert_eq!(
			require_env(var),
			Err(EnvError::Missing {
				var: var.to_string()
			})
		);
		env::remove_var(var);
	}
}
