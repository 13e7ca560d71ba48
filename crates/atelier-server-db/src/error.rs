// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	/// A write was rejected because it would break a data invariant.
	#[error("Invalid {field}: {message}")]
	Invalid {
		field: &'static str,
		message: String,
	},

	#[error("Internal: {0}")]
	Internal(String),
}

impl DbError {
	pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
		DbError::Invalid {
			field,
			message: message.into(),
		}
	}
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Maps a unique-constraint violation to [`DbError::Conflict`].
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> DbError {
	match e {
		sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
			DbError::Conflict(message.to_string())
		}
		_ => DbError::Sqlx(e),
	}
}
