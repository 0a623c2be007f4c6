// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secret and variable bundles for scaffold.
//!
//! A bundle is a flat `name -> value` map resolved for one scope: `global`
//! or a template type. Secrets live in AWS Secrets Manager as one JSON
//! object per scope; variables live in SSM Parameter Store, one parameter
//! per variable under a per-scope path. A scope that does not exist yields
//! an empty bundle.

mod bundle;
mod error;
mod parameter_store;
mod secrets_manager;

pub use bundle::{
	merge_bundles, normalize_bundle, parse_json_bundle, resolve_merged, Bundle, BundleStore,
	KeyNormalizer, RejectedKey, ResolvedBundle, GLOBAL_SCOPE,
};
pub use error::{Result, StoreError};
pub use parameter_store::ParameterStore;
pub use secrets_manager::SecretsManagerStore;

/// Load the shared AWS configuration from the default provider chain.
pub async fn load_aws_config() -> aws_config::SdkConfig {
	aws_config::defaults(aws_config::BehaviorVersion::latest())
		.load()
		.await
}
