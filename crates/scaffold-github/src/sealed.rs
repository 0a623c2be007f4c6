// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Sealed-box encryption for Actions secrets.
//!
//! GitHub only accepts secret values encrypted to the repository's
//! X25519 public key with a libsodium sealed box.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use crypto_box::aead::OsRng;
use crypto_box::{PublicKey, KEY_SIZE};

use crate::error::GithubError;

/// Seal `plaintext` to a base64 public key and return the base64 ciphertext.
pub fn seal_for_repository(public_key_b64: &str, plaintext: &[u8]) -> Result<String, GithubError> {
	let key_bytes = STANDARD
		.decode(public_key_b64.trim())
		.map_err(|e| GithubError::Encryption(format!("public key is not base64: {e}")))?;

	let key: [u8; KEY_SIZE] = key_bytes.as_slice().try_into().map_err(|_| {
		GithubError::Encryption(format!(
			"public key must be {KEY_SIZE} bytes, got {}",
			key_bytes.len()
		))
	})?;

	let sealed = PublicKey::from(key)
		.seal(&mut OsRng, plaintext)
		.map_err(|_| GithubError::Encryption("sealing failed".to_string()))?;

	Ok(STANDARD.encode(sealed))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crypto_box::SecretKey;

	#[test]
	fn sealed_value_opens_with_matching_secret_key() {
		let secret_key = SecretKey::generate(&mut OsRng);
		let public_b64 = STANDARD.encode(secret_key.public_key().as_bytes());

		let sealed_b64 = seal_for_repository(&public_b64, b"hunter2").unwrap();
		let sealed = STANDARD.decode(sealed_b64).unwrap();
		let opened = secret_key.unseal(&sealed).unwrap();

		assert_eq!(opened, b"hunter2");
	}

	#[test]
	fn ciphertext_differs_per_call() {
		let secret_key = SecretKey::generate(&mut OsRng);
		let public_b64 = STANDARD.encode(secret_key.public_key().as_bytes());

		let a = seal_for_repository(&public_b64, b"same").unwrap();
		let b = seal_for_repository(&public_b64, b"same").unwrap();
		assert_ne!(a, b);
	}

	#[test]
	fn rejects_malformed_keys() {
		assert!(matches!(
			seal_for_repository("not base64!!", b"x"),
			Err(GithubError::Encryption(_))
		));
		let short = STANDARD.encode([0u8; 16]);
		assert!(matches!(
			seal_for_repository(&short, b"x"),
			Err(GithubError::Encryption(_))
		));
	}
}
