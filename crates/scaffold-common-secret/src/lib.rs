// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for sensitive values handled by scaffold.
//!
//! Destroy tokens, the GitHub API token and every value pulled from a secret
//! bundle travel through the engine as a [`Secret`]. The wrapper:
//!
//! - prints `[REDACTED]` for `Debug`, `Display` and `Serialize`
//! - zeroizes its memory on drop
//! - has no `Deref`; callers opt in with `.expose()`
//! - compares string secrets in constant time via [`SecretString::ct_eq_str`]
//!
//! ```
//! use scaffold_common_secret::SecretString;
//!
//! let token = SecretString::new("d41d8cd98f00b204".to_string());
//! assert_eq!(format!("{token}"), "[REDACTED]");
//! assert!(token.ct_eq_str("d41d8cd98f00b204"));
//! ```

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Placeholder emitted wherever a secret would otherwise be rendered.
pub const REDACTED: &str = "[REDACTED]";

/// A value that must never reach logs, responses or serialized output.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

/// The common case: a secret string.
pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Access the wrapped value. Every call site is a place a secret leaves
	/// the wrapper, so keep them few and obvious.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl Secret<String> {
	/// Constant-time comparison against a candidate string.
	///
	/// Length differences return early; only the byte comparison is
	/// constant-time, which is sufficient for fixed-length tokens.
	pub fn ct_eq_str(&self, candidate: &str) -> bool {
		let expected = self.inner.as_bytes();
		let candidate = candidate.as_bytes();
		if expected.len() != candidate.len() {
			return false;
		}
		expected.ct_eq(candidate).into()
	}

	/// Whether the wrapped string is empty after trimming whitespace.
	pub fn is_blank(&self) -> bool {
		self.inner.trim().is_empty()
	}
}

impl From<String> for Secret<String> {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for Secret<String> {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

#[cfg(feature = "serde")]
mod serde_impl {
	use super::{Secret, REDACTED};
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	impl<T> Serialize for Secret<T>
	where
		T: Serialize + Zeroize,
	{
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_and_display_are_redacted() {
		let secret = SecretString::from("ghp_abcdef");
		assert_eq!(format!("{secret}"), REDACTED);
		assert_eq!(format!("{secret:?}"), "Secret(\"[REDACTED]\")");
	}

	#[test]
	fn option_secret_debug_is_redacted() {
		let secret = Some(SecretString::from("token-value"));
		let debug = format!("{secret:?}");
		assert!(debug.contains(REDACTED));
		assert!(!debug.contains("token-value"));
	}

	#[test]
	fn ct_eq_str_matches_exact_value_only() {
		let secret = SecretString::from("abc123");
		assert!(secret.ct_eq_str("abc123"));
		assert!(!secret.ct_eq_str("abc124"));
		assert!(!secret.ct_eq_str("abc1234"));
		assert!(!secret.ct_eq_str(""));
	}

	#[test]
	fn blank_detection_trims() {
		assert!(SecretString::from("  \n").is_blank());
		assert!(!SecretString::from(" x ").is_blank());
	}

	#[test]
	fn serialize_is_redacted() {
		let secret = SecretString::from("super-secret-value");
		let json = serde_json::to_string(&secret).unwrap();
		assert_eq!(json, format!("\"{REDACTED}\""));
	}

	#[test]
	fn deserialize_populates_secret() {
		let secret: SecretString = serde_json::from_str(r#""from-json""#).unwrap();
		assert_eq!(secret.expose(), "from-json");
	}

	proptest! {
		#[test]
		fn display_never_leaks(inner in "[a-zA-Z0-9_/+=-]{3,64}") {
			prop_assume!(!inner.contains("REDACTED"));
			let secret = SecretString::new(inner.clone());
			let displayed = format!("{secret}");
			prop_assert!(!displayed.contains(&inner));
			prop_assert!(!serde_json::to_string(&secret).unwrap().contains(&inner));
		}

		#[test]
		fn ct_eq_agrees_with_string_eq(a in "[a-f0-9]{0,16}", b in "[a-f0-9]{0,16}") {
			let secret = SecretString::new(a.clone());
			prop_assert_eq!(secret.ct_eq_str(&b), a == b);
		}
	}
}
