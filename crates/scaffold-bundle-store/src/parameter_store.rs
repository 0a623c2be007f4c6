// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Variable bundles backed by SSM Parameter Store.
//!
//! Scope `S` under prefix `P` is every parameter below `P/variables/S`,
//! fetched recursively with decryption. The variable name is the last path
//! segment of the parameter name, and must be unique within the scope.

use async_trait::async_trait;
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_ssm::Client;
use scaffold_common_secret::SecretString;
use tracing::{debug, instrument};

use crate::bundle::{Bundle, BundleStore};
use crate::error::{Result, StoreError};
use crate::secrets_manager::{check_scope, normalize_prefix};

pub struct ParameterStore {
	client: Client,
	prefix: String,
}

impl ParameterStore {
	pub fn new(client: Client, prefix: &str) -> Self {
		Self {
			client,
			prefix: normalize_prefix(prefix),
		}
	}

	pub fn from_conf(config: &aws_config::SdkConfig, prefix: &str) -> Self {
		Self::new(Client::new(config), prefix)
	}

	pub fn scope_path(&self, scope: &str) -> String {
		format!("{}/variables/{scope}", self.prefix)
	}
}

#[async_trait]
impl BundleStore for ParameterStore {
	fn kind(&self) -> &'static str {
		"variables"
	}

	#[instrument(skip(self))]
	async fn get_bundle(&self, scope: &str) -> Result<Bundle> {
		check_scope(scope)?;
		let path = self.scope_path(scope);
		let mut bundle = Bundle::new();
		let mut next_token: Option<String> = None;

		loop {
			let output = self
				.client
				.get_parameters_by_path()
				.path(&path)
				.recursive(true)
				.with_decryption(true)
				.set_next_token(next_token.take())
				.send()
				.await
				.map_err(|err| {
					let code = err.as_service_error().and_then(|e| e.code());
					StoreError::from_service(&path, code, DisplayErrorContext(&err).to_string())
				})?;

			for parameter in output.parameters() {
				let (Some(name), Some(value)) = (parameter.name(), parameter.value()) else {
					continue;
				};
				insert_parameter(&mut bundle, &path, name, value)?;
			}

			match output.next_token() {
				Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
				_ => break,
			}
		}

		debug!(path = %path, keys = bundle.len(), "Loaded variable bundle");
		Ok(bundle)
	}
}

fn variable_name(parameter_name: &str) -> Option<&str> {
	parameter_name
		.rsplit('/')
		.next()
		.filter(|segment| !segment.is_empty())
}

/// Add one parameter to `bundle`. Two parameters sharing a last segment,
/// such as `a/LEVEL` and `b/LEVEL`, make the whole bundle invalid.
fn insert_parameter(bundle: &mut Bundle, path: &str, parameter_name: &str, value: &str) -> Result<()> {
	let Some(key) = variable_name(parameter_name) else {
		return Ok(());
	};
	if bundle.contains_key(key) {
		return Err(StoreError::invalid(
			path,
			format!("more than one parameter is named '{key}'"),
		));
	}
	bundle.insert(key.to_string(), SecretString::new(value.to_string()));
	Ok(())
}
