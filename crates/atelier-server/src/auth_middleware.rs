// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication middleware for Axum.
//!
//! [`auth_layer`] resolves the caller from a session cookie or a bearer
//! access token and stores an [`AuthContext`] as a request extension.
//! Handlers then use the [`RequireAuth`] extractor.
//!
//! # Security Properties
//!
//! - Tokens are hashed with SHA-256 before lookup and never logged
//! - Expired and revoked tokens are rejected on every request
//! - In dev mode, requests without credentials are authenticated as the
//!   configured dev user. This must never be enabled in production.

use atelier_server_auth::{
	extract_bearer_token, extract_session_cookie_with_name, hash_token, AuthContext, CurrentUser,
};
use atelier_server_db::UserRepository;
use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{request::Parts, Request},
	middleware::Next,
	response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::{api::AppState, error::ApiError};

/// Attaches an [`AuthContext`] to every request.
///
/// The session cookie is tried first, then the bearer token. A request with
/// no valid credentials continues unauthenticated; rejecting it is left to
/// [`RequireAuth`].
#[instrument(
	name = "auth_layer",
	skip(state, request, next),
	fields(
		auth_method = tracing::field::Empty,
		user_id = tracing::field::Empty,
	)
)]
pub async fn auth_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let headers = request.headers();
	let span = tracing::Span::current();

	let candidates = [
		(
			"session",
			extract_session_cookie_with_name(headers, &state.auth_config.session_cookie_name),
		),
		("access_token", extract_bearer_token(headers)),
	];

	for (method, token) in candidates {
		let Some(token) = token else {
			continue;
		};
		if let Some(current_user) = authenticate_access_token(&token, &state.user_repo).await {
			span.record("auth_method", method);
			span.record("user_id", tracing::field::display(&current_user.user.id));
			request
				.extensions_mut()
				.insert(AuthContext::authenticated(current_user));
			return next.run(request).await;
		}
	}

	if state.auth_config.dev_mode {
		if let Some(ref dev_user) = state.dev_user {
			span.record("auth_method", "dev_mode");
			span.record("user_id", tracing::field::display(&dev_user.id));
			tracing::debug!("dev mode: authenticating as dev user");
			request
				.extensions_mut()
				.insert(AuthContext::authenticated(CurrentUser::from_dev_mode(
					dev_user.clone(),
				)));
			return next.run(request).await;
		}
	}

	span.record("auth_method", "none");
	request
		.extensions_mut()
		.insert(AuthContext::unauthenticated());
	next.run(request).await
}

/// Validates an access token and loads its user.
#[instrument(skip(token, user_repo), fields(token_id = tracing::field::Empty))]
async fn authenticate_access_token(token: &str, user_repo: &UserRepository) -> Option<CurrentUser> {
	let token_hash = hash_token(token);

	let access_token = match user_repo.get_access_token_by_hash(&token_hash).await {
		Ok(Some(t)) => t,
		Ok(None) => {
			tracing::debug!("access token not found for token hash");
			return None;
		}
		Err(e) => {
			tracing::error!(error = %e, "failed to look up access token");
			return None;
		}
	};

	tracing::Span::current().record("token_id", tracing::field::display(&access_token.id));

	if !access_token.is_valid() {
		tracing::debug!(token_id = %access_token.id, "access token expired or revoked");
		return None;
	}

	match user_repo.get_user_by_id(&access_token.user_id).await {
		Ok(Some(user)) => Some(CurrentUser::from_access_token(user, access_token.id)),
		Ok(None) => {
			tracing::warn!(user_id = %access_token.user_id, "user not found for access token");
			None
		}
		Err(e) => {
			tracing::error!(error = %e, "failed to look up user");
			None
		}
	}
}

/// Extractor that requires authentication. Rejects with 401.
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
	S: Send + Sync,
{
	type Rejection = Response;

	#[instrument(name = "RequireAuth::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth_ctx = parts
			.extensions
			.get::<AuthContext>()
			.cloned()
			.unwrap_or_else(AuthContext::unauthenticated);

		match auth_ctx.current_user {
			Some(user) => Ok(RequireAuth(user)),
			None => {
				tracing::debug!("authentication required: no valid credentials");
				Err(ApiError::Unauthorized.into_response())
			}
		}
	}
}
