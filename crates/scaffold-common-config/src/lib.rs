// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration primitives shared by the scaffold crates.
//!
//! - [`load_secret_env`] / [`require_secret_env`]: secrets from `VAR` or
//!   `VAR_FILE`
//! - [`env_or`], [`require_env`], [`env_bool`], [`env_list`], [`env_parse`]:
//!   typed access to plain settings with errors that name the variable

pub mod env;

pub use scaffold_common_secret::{Secret, SecretString, REDACTED};

pub use env::{
	env_bool, env_list, env_or, env_parse, load_secret_env, require_env, require_secret_env,
	EnvError, RequiredSecretError, SecretEnvError,
};
