// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Retry with exponential backoff for remote calls.
//!
//! Whether a call may be retried at all is decided by two things: the
//! error must report itself retryable, and the call's [`CallKind`] must be
//! allowed by the configured [`RetryScope`]. Branch creation, repository
//! creation and pull request creation are [`CallKind::NonIdempotentWrite`]
//! and are never replayed regardless of scope.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Classification of a remote call for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
	/// Reads with no side effects.
	Read,
	/// Writes whose replay converges to the same state (PUT upserts, DELETE).
	IdempotentWrite,
	/// Writes that must run at most once.
	NonIdempotentWrite,
}

/// Which call kinds are eligible for automatic retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryScope {
	/// Never retry.
	None,
	/// Retry reads only.
	#[default]
	Reads,
	/// Retry reads and idempotent writes.
	Idempotent,
}

impl RetryScope {
	pub fn allows(self, kind: CallKind) -> bool {
		match (self, kind) {
			(_, CallKind::NonIdempotentWrite) => false,
			(RetryScope::None, _) => false,
			(RetryScope::Reads, CallKind::Read) => true,
			(RetryScope::Reads, CallKind::IdempotentWrite) => false,
			(RetryScope::Idempotent, _) => true,
		}
	}
}

impl FromStr for RetryScope {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"none" => Ok(Self::None),
			"reads" => Ok(Self::Reads),
			"idempotent" => Ok(Self::Idempotent),
			other => Err(format!(
				"unknown retry scope '{other}' (expected none, reads or idempotent)"
			)),
		}
	}
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
	pub backoff_factor: f64,
	pub jitter: bool,
	pub scope: RetryScope,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_millis(200),
			max_delay: Duration::from_secs(5),
			backoff_factor: 2.0,
			jitter: true,
			scope: RetryScope::default(),
		}
	}
}

impl RetryConfig {
	/// A config that performs exactly one attempt.
	pub fn disabled() -> Self {
		Self {
			max_attempts: 1,
			scope: RetryScope::None,
			..Self::default()
		}
	}
}

pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

impl RetryableError for reqwest::Error {
	fn is_retryable(&self) -> bool {
		if self.is_timeout() || self.is_connect() {
			return true;
		}

		self
			.status()
			.map(|status| status.as_u16() == 429 || status.as_u16() == 408 || status.is_server_error())
			.unwrap_or(false)
	}
}

fn calculate_delay(cfg: &RetryConfig, attempt: u32) -> Duration {
	let exponential_delay = cfg.base_delay.as_secs_f64() * cfg.backoff_factor.powi(attempt as i32);
	let capped_delay = exponential_delay.min(cfg.max_delay.as_secs_f64());

	let final_delay = if cfg.jitter {
		capped_delay * (0.5 + fastrand::f64())
	} else {
		capped_delay
	};

	Duration::from_secs_f64(final_delay)
}

/// Run `f` under the retry policy for a call of the given kind.
///
/// Calls whose kind is outside the configured scope run exactly once.
pub async fn retry_call<F, Fut, T, E>(cfg: &RetryConfig, kind: CallKind, mut f: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: std::future::Future<Output = Result<T, E>>,
	E: RetryableError + std::fmt::Debug,
{
	if cfg.scope.allows(kind) {
		retry(cfg, f).await
	} else {
		f().await
	}
}

/// Run `f` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` is reached.
pub async fn retry<F, Fut, T, E>(cfg: &RetryConfig, mut f: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: std::future::Future<Output = Result<T, E>>,
	E: RetryableError + std::fmt::Debug,
{
	let mut attempt = 0;

	loop {
		match f().await {
			Ok(result) => return Ok(result),
			Err(err) => {
				attempt += 1;

				if !err.is_retryable() {
					return Err(err);
				}

				if attempt >= cfg.max_attempts {
					warn!(
						error = ?err,
						attempt,
						max_attempts = cfg.max_attempts,
						"max retry attempts exhausted"
					);
					return Err(err);
				}

				let delay = calculate_delay(cfg, attempt - 1);
				warn!(
					error = ?err,
					attempt,
					max_attempts = cfg.max_attempts,
					delay_ms = delay.as_millis(),
					"retrying after error"
				);

				tokio::time::sleep(delay).await;
			}
		}
	}
}
