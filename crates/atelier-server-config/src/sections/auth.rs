// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication configuration.

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Authenticate every request as `dev_user_email`. Never allowed in
	/// production.
	pub dev_mode: bool,
	pub environment: String,
	pub token_ttl_days: i64,
	pub session_cookie_name: String,
	pub dev_user_email: Option<String>,
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub dev_mode: Option<bool>,
	#[serde(default)]
	pub environment: Option<String>,
	#[serde(default)]
	pub token_ttl_days: Option<i64>,
	#[serde(default)]
	pub session_cookie_name: Option<String>,
	#[serde(default)]
	pub dev_user_email: Option<String>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.dev_mode.is_some() {
			self.dev_mode = other.dev_mode;
		}
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.token_ttl_days.is_some() {
			self.token_ttl_days = other.token_ttl_days;
		}
		if other.session_cookie_name.is_some() {
			self.session_cookie_name = other.session_cookie_name;
		}
		if other.dev_user_email.is_some() {
			self.dev_user_email = other.dev_user_email;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			dev_mode: self.dev_mode.unwrap_or(false),
			environment: self
				.environment
				.unwrap_or_else(|| "development".to_string()),
			token_ttl_days: self.token_ttl_days.unwrap_or(30),
			session_cookie_name: self
				.session_cookie_name
				.unwrap_or_else(|| "atelier_session".to_string()),
			dev_user_email: self.dev_user_email,
		}
	}
}
