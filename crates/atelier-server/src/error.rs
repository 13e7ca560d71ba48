// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP error type shared by every handler.

use atelier_server_api::ErrorResponse;
use atelier_server_db::DbError;
use axum::{
	extract::rejection::JsonRejection,
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};

use crate::blob::BlobError;
use crate::tree::TreeError;
use crate::validation::IdParseError;

/// Errors a handler can return. Converted to a `{error, message}` body at
/// the boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	/// Malformed or invalid input. `code` is the stable error identifier.
	#[error("{code}: {message}")]
	Validation { code: &'static str, message: String },

	/// Missing, or outside the caller's scope.
	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Authentication required")]
	Unauthorized,

	#[error("Forbidden")]
	Forbidden,

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Database error: {0}")]
	Db(DbError),

	#[error("Task tree error: {0}")]
	Tree(#[from] TreeError),

	#[error("Blob store error: {0}")]
	Blob(#[from] BlobError),

	#[error("Internal error: {0}")]
	Internal(String),
}

impl ApiError {
	pub fn invalid_field(field: &str, message: impl std::fmt::Display) -> Self {
		ApiError::Validation {
			code: "invalid_field",
			message: format!("{field}: {message}"),
		}
	}

	pub fn not_found(what: impl Into<String>) -> Self {
		ApiError::NotFound(what.into())
	}
}

impl From<DbError> for ApiError {
	fn from(e: DbError) -> Self {
		match e {
			DbError::NotFound(msg) => ApiError::NotFound(msg),
			DbError::Conflict(msg) => ApiError::Conflict(msg),
			DbError::Invalid { field, message } => ApiError::Validation {
				code: if field == "parent_task_id" {
					"invalid_parent"
				} else {
					"invalid_field"
				},
				message: format!("{field}: {message}"),
			},
			other => ApiError::Db(other),
		}
	}
}

impl From<IdParseError> for ApiError {
	fn from(e: IdParseError) -> Self {
		ApiError::Validation {
			code: "invalid_id",
			message: e.message,
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		ApiError::Validation {
			code: "invalid_body",
			message: rejection.body_text(),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let (status, body) = match self {
			ApiError::Validation { code, message } => {
				(StatusCode::BAD_REQUEST, ErrorResponse::new(code, message))
			}
			ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new("not_found", msg)),
			ApiError::Unauthorized => (
				StatusCode::UNAUTHORIZED,
				ErrorResponse::new("unauthorized", "Authentication required"),
			),
			ApiError::Forbidden => (
				StatusCode::FORBIDDEN,
				ErrorResponse::new("forbidden", "Insufficient permissions"),
			),
			ApiError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::new("conflict", msg)),
			ApiError::Db(e) => {
				tracing::error!(error = %e, "database error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("database_error", "A database error occurred"),
				)
			}
			ApiError::Tree(e) => {
				tracing::error!(error = %e, "stored task hierarchy is corrupt");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("internal_error", "An internal error occurred"),
				)
			}
			ApiError::Blob(e) => {
				tracing::error!(error = %e, "blob store error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("storage_error", "Failed to store file"),
				)
			}
			ApiError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("internal_error", "An internal error occurred"),
				)
			}
		};

		(status, Json(body)).into_response()
	}
}
