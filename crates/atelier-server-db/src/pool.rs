// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{
	SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;

use crate::error::DbError;

/// Connection limits applied on top of the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
	pub max_connections: u32,
	pub busy_timeout: Duration,
}

impl Default for PoolSettings {
	fn default() -> Self {
		Self {
			max_connections: 8,
			busy_timeout: Duration::from_secs(5),
		}
	}
}

/// Opens the pool with [`PoolSettings::default`].
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, DbError> {
	create_pool_with(database_url, PoolSettings::default()).await
}

/// Opens a WAL-journaled pool. Every connection enforces foreign keys, which
/// the membership and task cascades depend on.
///
/// # Errors
/// `DbError::Internal` for a URL that is not `sqlite:`; `DbError::Sqlx` when
/// the file cannot be opened.
#[tracing::instrument(skip(database_url), fields(max_connections = settings.max_connections))]
pub async fn create_pool_with(
	database_url: &str,
	settings: PoolSettings,
) -> Result<SqlitePool, DbError> {
	let options = connect_options(database_url)?.busy_timeout(settings.busy_timeout);

	let pool = SqlitePoolOptions::new()
		.max_connections(settings.max_connections)
		.connect_with(options)
		.await?;

	tracing::debug!("sqlite pool ready");
	Ok(pool)
}

fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, DbError> {
	// sqlx reads a scheme-less string as a file name
	if !database_url.starts_with("sqlite:") {
		return Err(DbError::Internal(format!("not a sqlite URL: {database_url}")));
	}

	Ok(SqliteConnectOptions::from_str(database_url)
		.map_err(|e| DbError::Internal(format!("Invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.foreign_keys(true)
		.create_if_missing(true))
}
