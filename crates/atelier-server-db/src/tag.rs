// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tag catalogue repository.

use atelier_common_core::{Tag, TagId};
use sqlx::{sqlite::SqlitePool, Row};

use crate::convert::{json_id_list, now_ts, parse_ts, parse_uuid};
use crate::error::{conflict_on_unique, DbError};

#[derive(Clone)]
pub struct TagRepository {
	pool: SqlitePool,
}

impl TagRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a tag.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if a tag with this name exists.
	#[tracing::instrument(skip(self), fields(name = %name))]
	pub async fn create_tag(&self, name: &str, color: &str) -> Result<Tag, DbError> {
		let id = TagId::generate();
		let (now, now_text) = now_ts();

		sqlx::query("INSERT INTO tags (id, name, color, created_at) VALUES (?, ?, ?, ?)")
			.bind(id.to_string())
			.bind(name)
			.bind(color)
			.bind(now_text)
			.execute(&self.pool)
			.await
			.map_err(|e| conflict_on_unique(e, "A tag with this name already exists"))?;

		tracing::debug!(tag_id = %id, "tag created");
		Ok(Tag {
			id,
			name: name.to_string(),
			color: color.to_string(),
			created_at: now,
		})
	}

	#[tracing::instrument(skip(self), fields(tag_id = %id))]
	pub async fn get_tag_by_id(&self, id: &TagId) -> Result<Option<Tag>, DbError> {
		let row = sqlx::query("SELECT id, name, color, created_at FROM tags WHERE id = ?")
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| row_to_tag(&r)).transpose()
	}

	/// All tags, ordered by name.
	#[tracing::instrument(skip(self))]
	pub async fn list_tags(&self) -> Result<Vec<Tag>, DbError> {
		let rows = sqlx::query("SELECT id, name, color, created_at FROM tags ORDER BY name ASC")
			.fetch_all(&self.pool)
			.await?;

		rows.iter().map(row_to_tag).collect()
	}
}

pub(crate) fn row_to_tag(row: &sqlx::sqlite::SqliteRow) -> Result<Tag, DbError> {
	let id: String = row.get("id");
	let created_at: String = row.get("created_at");

	Ok(Tag {
		id: TagId::new(parse_uuid(&id, "tag ID")?),
		name: row.get("name"),
		color: row.get("color"),
		created_at: parse_ts(&created_at, "created_at")?,
	})
}

/// Fails with `NotFound` unless every tag id exists. Runs on the caller's
/// connection so it can sit inside a transaction.
pub(crate) async fn ensure_tags_exist(
	conn: &mut sqlx::SqliteConnection,
	tag_ids: &[TagId],
) -> Result<(), DbError> {
	if tag_ids.is_empty() {
		return Ok(());
	}

	let missing: Option<String> = sqlx::query_scalar(
		"SELECT value FROM json_each(?) WHERE value NOT IN (SELECT id FROM tags) LIMIT 1",
	)
	.bind(json_id_list(tag_ids))
	.fetch_optional(&mut *conn)
	.await?;

	match missing {
		Some(tag_id) => Err(DbError::NotFound(format!("Tag {tag_id} not found"))),
		None => Ok(()),
	}
}
