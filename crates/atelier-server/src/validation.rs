// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared validation utilities for API handlers.
//!
//! Field limits mirror the column constraints; handlers call these before
//! touching the database so a bad request never opens a transaction.

use atelier_common_core::{validate_color, validate_decimal};
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::error::ApiError;

pub const MAX_PROJECT_NAME_LEN: usize = 200;
pub const MAX_TASK_TITLE_LEN: usize = 255;
pub const MAX_FEEDBACK_SUMMARY_LEN: usize = 255;

/// `budget` is DECIMAL(12, 2).
pub const BUDGET_DIGITS: (usize, usize) = (12, 2);
/// `estimated_hours` is DECIMAL(5, 2).
pub const ESTIMATED_HOURS_DIGITS: (usize, usize) = (5, 2);

static URL_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap());

/// Error type for ID parsing failures.
#[derive(Debug, Clone)]
pub struct IdParseError {
	pub error: String,
	pub message: String,
}

impl IdParseError {
	pub fn invalid(field: &str) -> Self {
		Self {
			error: "invalid_id".to_string(),
			message: format!("{field} is not a valid identifier"),
		}
	}
}

/// Parse a path or body identifier into a typed id.
pub fn parse_id<T: From<Uuid>>(raw: &str, field: &str) -> Result<T, IdParseError> {
	Uuid::parse_str(raw)
		.map(T::from)
		.map_err(|_| IdParseError::invalid(field))
}

pub fn parse_opt_id<T: From<Uuid>>(raw: Option<&str>, field: &str) -> Result<Option<T>, IdParseError> {
	raw.map(|r| parse_id(r, field)).transpose()
}

pub fn parse_ids<T: From<Uuid>>(raws: &[String], field: &str) -> Result<Vec<T>, IdParseError> {
	raws.iter().map(|r| parse_id(r, field)).collect()
}

/// Checks `value` is between `min` and `max` characters after trimming.
pub fn validate_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ApiError> {
	let len = value.trim().chars().count();
	if len < min {
		return Err(ApiError::invalid_field(field, "may not be blank"));
	}
	if len > max {
		return Err(ApiError::invalid_field(
			field,
			format!("must be at most {max} characters"),
		));
	}
	Ok(())
}

pub fn validate_url(field: &str, value: Option<&str>) -> Result<(), ApiError> {
	match value {
		Some(url) if !URL_REGEX.is_match(url) => {
			Err(ApiError::invalid_field(field, "must be an http(s) URL"))
		}
		_ => Ok(()),
	}
}

pub fn validate_decimal_field(
	field: &str,
	value: Option<&str>,
	(max_digits, places): (usize, usize),
) -> Result<(), ApiError> {
	match value {
		Some(v) => validate_decimal(v, max_digits, places).map_err(|e| ApiError::invalid_field(field, e)),
		None => Ok(()),
	}
}

pub fn validate_tag_color(color: &str) -> Result<(), ApiError> {
	validate_color(color).map_err(|e| ApiError::invalid_field("color", e))
}

#[cfg(test)]
mod tests {
	use super::*;
	use atelier_common_core::TaskId;

	#[test]
	fn parses_valid_ids() {
		let id: TaskId = parse_id("550e8400-e29b-41d4-a716-446655440000", "task_id").unwrap();
		assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
	}

	#[test]
	fn rejects_malformed_ids() {
		let err = parse_id::<TaskId>("not-a-uuid", "task_id").unwrap_err();
		assert_eq!(err.error, "invalid_id");
		assert!(err.message.contains("task_id"));
	}

	#[test]
	fn length_counts_characters_not_bytes() {
		assert!(validate_length("name", "ação", 1, 4).is_ok());
		assert!(validate_length("name", "   ", 1, 10).is_err());
		assert!(validate_length("name", &"x".repeat(201), 1, MAX_PROJECT_NAME_LEN).is_err());
	}

	#[test]
	fn urls_must_be_http() {
		assert!(validate_url("live_url", Some("https://example.com/app")).is_ok());
		assert!(validate_url("live_url", None).is_ok());
		assert!(validate_url("live_url", Some("ftp://example.com")).is_err());
		assert!(validate_url("live_url", Some("not a url")).is_err());
	}

	#[test]
	fn decimals_respect_column_precision() {
		assert!(validate_decimal_field("estimated_hours", Some("999.99"), ESTIMATED_HOURS_DIGITS).is_ok());
		assert!(validate_decimal_field("estimated_hours", Some("1000"), ESTIMATED_HOURS_DIGITS).is_err());
		assert!(validate_decimal_field("budget", Some("12.345"), BUDGET_DIGITS).is_err());
	}
}
