// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User directory and access token repository.

use atelier_common_core::{AccessTokenId, User, UserId};
use atelier_server_auth::AccessToken;
use sqlx::{sqlite::SqlitePool, Row};
use std::collections::HashMap;

use crate::convert::{fmt_ts, json_id_list, now_ts, parse_opt_ts, parse_ts, parse_uuid};
use crate::error::{conflict_on_unique, DbError};

/// Fields for a new user.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub job_title: Option<String>,
	pub profile_picture: Option<String>,
	pub is_superuser: bool,
}

#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a user.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the email is already registered.
	#[tracing::instrument(skip(self, new_user), fields(email = %new_user.email))]
	pub async fn create_user(&self, new_user: &NewUser) -> Result<User, DbError> {
		let id = UserId::generate();
		let (now, now_text) = now_ts();

		sqlx::query(
			r#"
			INSERT INTO users (id, email, first_name, last_name, job_title, profile_picture, is_superuser, created_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(id.to_string())
		.bind(&new_user.email)
		.bind(&new_user.first_name)
		.bind(&new_user.last_name)
		.bind(&new_user.job_title)
		.bind(&new_user.profile_picture)
		.bind(new_user.is_superuser as i32)
		.bind(now_text)
		.execute(&self.pool)
		.await
		.map_err(|e| conflict_on_unique(e, "A user with this email already exists"))?;

		tracing::debug!(user_id = %id, "user created");
		Ok(User {
			id,
			email: new_user.email.clone(),
			first_name: new_user.first_name.clone(),
			last_name: new_user.last_name.clone(),
			job_title: new_user.job_title.clone(),
			profile_picture: new_user.profile_picture.clone(),
			is_superuser: new_user.is_superuser,
			created_at: now,
		})
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, email, first_name, last_name, job_title, profile_picture, is_superuser, created_at
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	#[tracing::instrument(skip(self, email))]
	pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, email, first_name, last_name, job_title, profile_picture, is_superuser, created_at
			FROM users
			WHERE email = ?
			"#,
		)
		.bind(email)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	/// Fetch several users in one query, keyed by id. Unknown ids are skipped.
	#[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
	pub async fn get_users_by_ids(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>, DbError> {
		if ids.is_empty() {
			return Ok(HashMap::new());
		}

		let rows = sqlx::query(
			r#"
			SELECT id, email, first_name, last_name, job_title, profile_picture, is_superuser, created_at
			FROM users
			WHERE id IN (SELECT value FROM json_each(?))
			"#,
		)
		.bind(json_id_list(ids))
		.fetch_all(&self.pool)
		.await?;

		rows
			.iter()
			.map(|row| row_to_user(row).map(|user| (user.id, user)))
			.collect()
	}

	// =========================================================================
	// Access tokens
	// =========================================================================

	/// Persist an access token. Only the hash is stored.
	#[tracing::instrument(skip(self, token), fields(token_id = %token.id, user_id = %token.user_id))]
	pub async fn create_access_token(&self, token: &AccessToken) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO access_tokens (id, user_id, token_hash, label, created_at, expires_at, revoked_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(token.id.to_string())
		.bind(token.user_id.to_string())
		.bind(&token.token_hash)
		.bind(&token.label)
		.bind(fmt_ts(&token.created_at))
		.bind(fmt_ts(&token.expires_at))
		.bind(token.revoked_at.as_ref().map(fmt_ts))
		.execute(&self.pool)
		.await?;

		tracing::debug!(token_id = %token.id, "access token created");
		Ok(())
	}

	/// Look up a token by hash. Expiry and revocation are the caller's
	/// concern.
	#[tracing::instrument(skip(self, token_hash))]
	pub async fn get_access_token_by_hash(
		&self,
		token_hash: &str,
	) -> Result<Option<AccessToken>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, user_id, token_hash, label, created_at, expires_at, revoked_at
			FROM access_tokens
			WHERE token_hash = ?
			"#,
		)
		.bind(token_hash)
		.fetch_optional(&self.pool)
		.await?;

		let Some(row) = row else {
			return Ok(None);
		};

		let id: String = row.get("id");
		let user_id: String = row.get("user_id");
		let created_at: String = row.get("created_at");
		let expires_at: String = row.get("expires_at");

		Ok(Some(AccessToken {
			id: AccessTokenId::new(parse_uuid(&id, "token id")?),
			user_id: UserId::new(parse_uuid(&user_id, "user_id")?),
			token_hash: row.get("token_hash"),
			label: row.get("label"),
			created_at: parse_ts(&created_at, "created_at")?,
			expires_at: parse_ts(&expires_at, "expires_at")?,
			revoked_at: parse_opt_ts(row.get("revoked_at"), "revoked_at")?,
		}))
	}
}

pub(crate) fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, DbError> {
	let id: String = row.get("id");
	let created_at: String = row.get("created_at");
	let is_superuser: i32 = row.get("is_superuser");

	Ok(User {
		id: UserId::new(parse_uuid(&id, "user ID")?),
		email: row.get("email"),
		first_name: row.get("first_name"),
		last_name: row.get("last_name"),
		job_title: row.get("job_title"),
		profile_picture: row.get("profile_picture"),
		is_superuser: is_superuser != 0,
		created_at: parse_ts(&created_at, "created_at")?,
	})
}
