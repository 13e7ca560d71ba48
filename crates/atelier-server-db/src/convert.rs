// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Column encoding shared by the repositories.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings in UTC so that
//! lexical order matches chronological order. Dates are `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use uuid::Uuid;

use crate::error::DbError;

pub(crate) fn fmt_ts(ts: &DateTime<Utc>) -> String {
	ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time truncated to the stored precision, with its column text.
pub(crate) fn now_ts() -> (DateTime<Utc>, String) {
	let now = Utc::now().trunc_subsecs(6);
	let text = fmt_ts(&now);
	(now, text)
}

pub(crate) fn parse_ts(value: &str, column: &str) -> Result<DateTime<Utc>, DbError> {
	chrono::DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

pub(crate) fn parse_opt_ts(
	value: Option<String>,
	column: &str,
) -> Result<Option<DateTime<Utc>>, DbError> {
	value.map(|v| parse_ts(&v, column)).transpose()
}

pub(crate) fn fmt_date(date: &NaiveDate) -> String {
	date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_opt_date(
	value: Option<String>,
	column: &str,
) -> Result<Option<NaiveDate>, DbError> {
	value
		.map(|v| {
			NaiveDate::parse_from_str(&v, "%Y-%m-%d")
				.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
		})
		.transpose()
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> Result<Uuid, DbError> {
	Uuid::parse_str(value).map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

pub(crate) fn parse_opt_uuid(value: Option<String>, column: &str) -> Result<Option<Uuid>, DbError> {
	value.map(|v| parse_uuid(&v, column)).transpose()
}

/// Encodes ids as a JSON array for `IN (SELECT value FROM json_each(?))`,
/// so a whole batch binds as one parameter.
pub(crate) fn json_id_list<T: ToString>(ids: &[T]) -> String {
	serde_json::Value::from(ids.iter().map(ToString::to_string).collect::<Vec<_>>()).to_string()
}

/// Parses an enum column through its `FromStr` impl.
pub(crate) fn parse_enum<T>(value: &str, column: &str) -> Result<T, DbError>
where
	T: std::str::FromStr,
	T::Err: std::fmt::Display,
{
	value
		.parse()
		.map_err(|e: T::Err| DbError::Internal(format!("Invalid {column}: {e}")))
}
