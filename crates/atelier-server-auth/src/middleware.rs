// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request authentication context.
//!
//! - [`CurrentUser`] - authenticated user extracted from a request
//! - [`AuthContext`] - auth state carried as a request extension
//! - [`AuthConfig`] - runtime authentication settings
//! - Helpers for pulling the session cookie and bearer token out of headers
//!
//! Token values are never logged.

use atelier_common_core::{AccessTokenId, User};
use http::header::{AUTHORIZATION, COOKIE};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Default name for the session cookie.
pub const SESSION_COOKIE_NAME: &str = "atelier_session";

/// The currently authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
	pub user: User,
	/// Token used to authenticate, if any. Dev-mode requests carry none.
	pub token_id: Option<AccessTokenId>,
}

impl CurrentUser {
	pub fn from_access_token(user: User, token_id: AccessTokenId) -> Self {
		Self {
			user,
			token_id: Some(token_id),
		}
	}

	pub fn from_dev_mode(user: User) -> Self {
		Self {
			user,
			token_id: None,
		}
	}

	pub fn is_superuser(&self) -> bool {
		self.user.is_superuser
	}
}

/// Authentication state passed through the request pipeline.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
	pub is_authenticated: bool,
	pub current_user: Option<CurrentUser>,
}

impl AuthContext {
	pub fn unauthenticated() -> Self {
		Self {
			is_authenticated: false,
			current_user: None,
		}
	}

	pub fn authenticated(current_user: CurrentUser) -> Self {
		Self {
			is_authenticated: true,
			current_user: Some(current_user),
		}
	}

	pub fn user(&self) -> Option<&CurrentUser> {
		self.current_user.as_ref()
	}

	/// Require authentication, returning the current user or an error.
	pub fn require_user(&self) -> Result<&CurrentUser, AuthRequired> {
		self.current_user.as_ref().ok_or(AuthRequired)
	}
}

/// Error returned when authentication is required but not present.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("authentication required")]
pub struct AuthRequired;

/// Configuration for authentication middleware.
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Authenticate unauthenticated requests as the configured dev user.
	pub dev_mode: bool,
	pub session_cookie_name: String,
	/// Lifetime of newly issued access tokens.
	pub token_ttl_days: i64,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			dev_mode: false,
			session_cookie_name: SESSION_COOKIE_NAME.to_string(),
			token_ttl_days: crate::access_token::ACCESS_TOKEN_EXPIRY_DAYS,
		}
	}
}

impl AuthConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_dev_mode(mut self, enabled: bool) -> Self {
		self.dev_mode = enabled;
		self
	}

	pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
		self.session_cookie_name = name.into();
		self
	}

	pub fn with_token_ttl_days(mut self, days: i64) -> Self {
		self.token_ttl_days = days;
		self
	}
}

/// Extracts a cookie value by name from the Cookie header.
pub fn extract_session_cookie_with_name(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get(COOKIE)?
		.to_str()
		.ok()?
		.split(';')
		.find_map(|cookie| {
			let cookie = cookie.trim();
			let (name, value) = cookie.split_once('=')?;

			if name == cookie_name {
				Some(value.to_string())
			} else {
				None
			}
		})
}

/// Extracts the token from `Authorization: Bearer <token>`.
#[instrument(level = "trace", skip_all)]
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
	let auth_header = headers.get(AUTHORIZATION)?;
	let auth_str = auth_header.to_str().ok()?;
	auth_str
		.strip_prefix("Bearer ")
		.map(|token| token.trim().to_string())
		.filter(|token| !token.is_empty())
}
