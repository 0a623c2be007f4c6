// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use scaffold_common_secret::SecretString;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, StoreError};

/// Scope shared by every template type.
pub const GLOBAL_SCOPE: &str = "global";

/// Resolved `name -> value` map for one scope. Values stay wrapped so they
/// never reach logs.
pub type Bundle = BTreeMap<String, SecretString>;

/// A source of per-scope bundles.
#[async_trait]
pub trait BundleStore: Send + Sync {
	/// What this store holds, for logs and error messages.
	fn kind(&self) -> &'static str;

	/// Fetch the bundle for `scope`. A scope with nothing stored is an empty bundle.
	async fn get_bundle(&self, scope: &str) -> Result<Bundle>;
}

/// Overlay `scoped` on `global`; the scoped value wins on collision.
pub fn merge_bundles(global: Bundle, scoped: Bundle) -> Bundle {
	let mut merged = global;
	merged.extend(scoped);
	merged
}

/// Maps a stored key to the name it is published under, or explains why it can't be.
pub type KeyNormalizer<'a> = &'a (dyn Fn(&str) -> std::result::Result<String, String> + Sync);

/// A stored key that was dropped during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedKey {
	pub scope: String,
	pub name: String,
	pub reason: String,
}

/// A merged bundle keyed by normalized names, plus the keys that were dropped.
#[derive(Debug, Clone, Default)]
pub struct ResolvedBundle {
	pub bundle: Bundle,
	pub rejected: Vec<RejectedKey>,
}

/// Rewrite the keys of one scope's bundle with `normalize`.
///
/// Keys the normalizer rejects are dropped. So is every spelling of a name
/// that appears more than once in the scope (`db_password` and
/// `DB_PASSWORD`), since neither can be preferred.
pub fn normalize_bundle(
	scope: &str,
	bundle: Bundle,
	normalize: KeyNormalizer<'_>,
	rejected: &mut Vec<RejectedKey>,
) -> Bundle {
	let mut normalized = Bundle::new();
	let mut ambiguous = BTreeSet::new();

	for (raw, value) in bundle {
		match normalize(&raw) {
			Ok(name) if normalized.contains_key(&name) => {
				ambiguous.insert(name);
			}
			Ok(name) => {
				normalized.insert(name, value);
			}
			Err(reason) => rejected.push(RejectedKey {
				scope: scope.to_string(),
				name: raw,
				reason,
			}),
		}
	}

	for name in ambiguous {
		normalized.remove(&name);
		rejected.push(RejectedKey {
			scope: scope.to_string(),
			reason: format!("'{name}' is spelled more than one way in scope '{scope}'"),
			name,
		});
	}

	normalized
}

/// Fetch the global and `scope` bundles, normalize each, then merge them.
///
/// Merging happens on normalized names, so the type scope wins even when
/// the two scopes spell a key differently.
pub async fn resolve_merged(
	store: &dyn BundleStore,
	scope: &str,
	normalize: KeyNormalizer<'_>,
) -> Result<ResolvedBundle> {
	let mut rejected = Vec::new();
	let global = normalize_bundle(
		GLOBAL_SCOPE,
		store.get_bundle(GLOBAL_SCOPE).await?,
		normalize,
		&mut rejected,
	);
	if scope == GLOBAL_SCOPE {
		return Ok(ResolvedBundle {
			bundle: global,
			rejected,
		});
	}
	let scoped = normalize_bundle(scope, store.get_bundle(scope).await?, normalize, &mut rejected);

	debug!(
		kind = store.kind(),
		scope,
		global_keys = global.len(),
		scoped_keys = scoped.len(),
		rejected = rejected.len(),
		"Resolved bundle"
	);

	Ok(ResolvedBundle {
		bundle: merge_bundles(global, scoped),
		rejected,
	})
}

/// Parse a JSON object of scalar values into a bundle.
///
/// Errors name the offending key but never include a value.
pub fn parse_json_bundle(context: &str, raw: &str) -> Result<Bundle> {
	let value: Value = serde_json::from_str(raw)
		.map_err(|e| StoreError::invalid(context, format!("not valid JSON (line {})", e.line())))?;

	let Value::Object(entries) = value else {
		return Err(StoreError::invalid(context, "expected a JSON object"));
	};

	entries
		.into_iter()
		.map(|(key, value)| {
			let text = match value {
				Value::String(s) => s,
				Value::Number(n) => n.to_string(),
				Value::Bool(b) => b.to_string(),
				Value::Null | Value::Array(_) | Value::Object(_) => {
					return Err(StoreError::invalid(
						context,
						format!("value of '{key}' must be a string, number or boolean"),
					))
				}
			};
			Ok((key, SecretString::new(text)))
		})
		.collect()
}
