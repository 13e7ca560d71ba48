// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schema migrations.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const MIGRATIONS: &[(&str, &str)] = &[
	("001_users", include_str!("../migrations/001_users.sql")),
	("002_projects", include_str!("../migrations/002_projects.sql")),
	("003_tasks", include_str!("../migrations/003_tasks.sql")),
	("004_annotations", include_str!("../migrations/004_annotations.sql")),
];

/// Run all database migrations (001-004).
///
/// # Note
/// Migrations are idempotent - safe to run multiple times.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for (name, sql) in MIGRATIONS {
		for stmt in sql.split(';').filter(|s| !s.trim().is_empty()) {
			if let Err(e) = sqlx::query(stmt).execute(pool).await {
				let msg = e.to_string();
				if !msg.contains("already exists") && !msg.contains("duplicate column") {
					tracing::error!(migration = %name, error = %e, "migration failed");
					return Err(e.into());
				}
			}
		}
		tracing::debug!(migration = %name, "migration applied");
	}
	Ok(())
}
