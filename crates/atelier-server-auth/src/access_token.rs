// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer access tokens.
//!
//! Tokens are random, prefixed with `at_`, and stored only as a SHA-256
//! hash. The plaintext is shown once when the token is issued.

use atelier_common_core::{AccessTokenId, UserId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default lifetime of an issued token.
pub const ACCESS_TOKEN_EXPIRY_DAYS: i64 = 30;

/// Number of random bytes in an access token (produces 64 hex chars).
pub const ACCESS_TOKEN_BYTES: usize = 32;

pub const ACCESS_TOKEN_PREFIX: &str = "at_";

/// A stored access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
	pub id: AccessTokenId,
	pub user_id: UserId,
	/// SHA-256 hash of the token (the actual token is never stored).
	pub token_hash: String,
	pub label: String,
	pub created_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
	pub revoked_at: Option<DateTime<Utc>>,
}

impl AccessToken {
	/// Creates a token record and returns it with the plaintext token.
	pub fn new(user_id: UserId, label: impl Into<String>, ttl_days: i64) -> (Self, String) {
		let (plaintext_token, token_hash) = generate_access_token();
		let now = Utc::now();

		let access_token = Self {
			id: AccessTokenId::generate(),
			user_id,
			token_hash,
			label: label.into(),
			created_at: now,
			expires_at: now + Duration::days(ttl_days),
			revoked_at: None,
		};

		(access_token, plaintext_token)
	}

	pub fn is_expired(&self) -> bool {
		Utc::now() > self.expires_at
	}

	pub fn is_valid(&self) -> bool {
		!self.is_expired() && self.revoked_at.is_none()
	}
}

/// Returns `(plaintext_token, sha256_hash)`.
pub fn generate_access_token() -> (String, String) {
	use rand::Rng;
	let mut rng = rand::thread_rng();
	let bytes: [u8; ACCESS_TOKEN_BYTES] = rng.gen();
	let token = format!("{}{}", ACCESS_TOKEN_PREFIX, hex::encode(bytes));
	let hash = hash_token(&token);
	(token, hash)
}

/// Hashes a bearer token or session cookie for lookup.
pub fn hash_token(token: &str) -> String {
	use sha2::{Digest, Sha256};
	let mut hasher = Sha256::new();
	hasher.update(token.as_bytes());
	hex::encode(hasher.finalize())
}

pub fn is_valid_access_token_format(token: &str) -> bool {
	if let Some(hex_part) = token.strip_prefix(ACCESS_TOKEN_PREFIX) {
		hex_part.len() == ACCESS_TOKEN_BYTES * 2 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
	} else {
		false
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	#[test]
	fn generated_token_has_expected_shape() {
		let (token, hash) = generate_access_token();
		assert!(is_valid_access_token_format(&token));
		assert_eq!(hash.len(), 64);
		assert_eq!(hash_token(&token), hash);
	}

	#[test]
	fn tokens_are_unique() {
		let tokens: HashSet<String> = (0..50).map(|_| generate_access_token().0).collect();
		assert_eq!(tokens.len(), 50);
	}

	#[test]
	fn rejects_foreign_formats() {
		assert!(!is_valid_access_token_format("lt_abcd"));
		assert!(!is_valid_access_token_format("at_xyz"));
	}

	#[test]
	fn new_token_is_valid_until_expiry() {
		let (token, _) = AccessToken::new(UserId::generate(), "cli", 30);
		assert!(token.is_valid());

		let (mut expired, _) = AccessToken::new(UserId::generate(), "cli", 30);
		expired.expires_at = Utc::now() - Duration::seconds(1);
		assert!(!expired.is_valid());
	}
}
