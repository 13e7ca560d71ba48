// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for domain parsing and validation.

use thiserror::Error;

/// Errors raised while parsing or validating domain values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
	#[error("invalid project status: {0}")]
	InvalidProjectStatus(String),

	#[error("invalid project role: {0}")]
	InvalidProjectRole(String),

	#[error("invalid task status: {0}")]
	InvalidTaskStatus(String),

	#[error("invalid task priority: {0}")]
	InvalidTaskPriority(String),

	#[error("invalid feedback type: {0}")]
	InvalidFeedbackType(String),

	#[error("invalid feedback status: {0}")]
	InvalidFeedbackStatus(String),

	#[error("invalid entity kind: {0}")]
	InvalidEntityKind(String),

	#[error("invalid tag color: {0}")]
	InvalidTagColor(String),

	#[error("invalid decimal value: {0}")]
	InvalidDecimal(String),
}

/// Result type for core domain operations.
pub type Result<T> = std::result::Result<T, CoreError>;
