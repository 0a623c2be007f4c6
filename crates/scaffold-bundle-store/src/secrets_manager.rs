// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secret bundles backed by AWS Secrets Manager.
//!
//! Scope `S` under prefix `P` is the secret named `P/secrets/S`, holding a
//! JSON object.

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_secretsmanager::Client;
use scaffold_common_secret::SecretString;
use tracing::{debug, instrument};

use crate::bundle::{parse_json_bundle, Bundle, BundleStore};
use crate::error::{Result, StoreError};

pub struct SecretsManagerStore {
	client: Client,
	prefix: String,
}

impl SecretsManagerStore {
	pub fn new(client: Client, prefix: &str) -> Self {
		Self {
			client,
			prefix: normalize_prefix(prefix),
		}
	}

	pub fn from_conf(config: &aws_config::SdkConfig, prefix: &str) -> Self {
		Self::new(Client::new(config), prefix)
	}

	pub fn secret_id(&self, scope: &str) -> String {
		format!("{}/secrets/{scope}", self.prefix)
	}

	/// Fetch a plain string secret, such as an API token.
	#[instrument(skip(self))]
	pub async fn get_secret_string(&self, secret_id: &str) -> Result<SecretString> {
		self
			.fetch(secret_id)
			.await?
			.ok_or_else(|| StoreError::NotFound(secret_id.to_string()))
	}

	async fn fetch(&self, secret_id: &str) -> Result<Option<SecretString>> {
		let output = match self
			.client
			.get_secret_value()
			.secret_id(secret_id)
			.send()
			.await
		{
			Ok(output) => output,
			Err(err) => {
				let code = err.as_service_error().and_then(|e| e.code());
				let mapped =
					StoreError::from_service(secret_id, code, DisplayErrorContext(&err).to_string());
				return match mapped {
					StoreError::NotFound(_) => Ok(None),
					other => Err(other),
				};
			}
		};

		match output.secret_string() {
			Some(value) => Ok(Some(SecretString::new(value.trim().to_string()))),
			None => Err(StoreError::invalid(secret_id, "secret has no string value")),
		}
	}
}

#[async_trait]
impl BundleStore for SecretsManagerStore {
	fn kind(&self) -> &'static str {
		"secrets"
	}

	#[instrument(skip(self))]
	async fn get_bundle(&self, scope: &str) -> Result<Bundle> {
		check_scope(scope)?;
		let secret_id = self.secret_id(scope);

		match self.fetch(&secret_id).await? {
			Some(raw) => {
				let bundle = parse_json_bundle(&secret_id, raw.expose())?;
				debug!(secret_id = %secret_id, keys = bundle.len(), "Loaded secret bundle");
				Ok(bundle)
			}
			None => {
				debug!(secret_id = %secret_id, "No secret bundle for scope");
				Ok(Bundle::new())
			}
		}
	}
}

/// Trim whitespace and trailing slashes and ensure a leading slash.
pub(crate) fn normalize_prefix(raw: &str) -> String {
	let trimmed = raw.trim().trim_matches('/');
	format!("/{trimmed}")
}

pub(crate) fn check_scope(scope: &str) -> Result<()> {
	if scope.is_empty() || scope.contains('/') || scope.contains("..") {
		return Err(StoreError::Config(format!("invalid bundle scope '{scope}'")));
	}
	Ok(())
}
