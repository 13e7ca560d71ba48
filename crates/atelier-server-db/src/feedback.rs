// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Feedback repository.

use atelier_common_core::{Feedback, FeedbackId, FeedbackStatus, FeedbackType, ProjectId, UserId};
use atelier_server_auth::FeedbackScope;
use sqlx::{sqlite::SqlitePool, Row};

use crate::annotation::purge_annotations_for_feedback;
use crate::convert::{now_ts, parse_enum, parse_opt_uuid, parse_ts, parse_uuid};
use crate::error::DbError;
use crate::scope::{bind_feedback_scope, feedback_in_scope};

const FEEDBACK_COLUMNS: &str =
	"f.id, f.project_id, f.summary, f.description, f.feedback_type, f.status, f.submitted_by, f.created_at";

/// Fields accepted when submitting feedback.
#[derive(Debug, Clone, Default)]
pub struct NewFeedback {
	pub summary: String,
	pub description: String,
	pub feedback_type: FeedbackType,
}

#[derive(Clone)]
pub struct FeedbackRepository {
	pool: SqlitePool,
}

impl FeedbackRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, new_feedback), fields(project_id = %project_id))]
	pub async fn create_feedback(
		&self,
		project_id: &ProjectId,
		submitted_by: Option<&UserId>,
		new_feedback: &NewFeedback,
	) -> Result<Feedback, DbError> {
		let id = FeedbackId::generate();
		let (now, now_text) = now_ts();

		sqlx::query(
			r#"
			INSERT INTO feedback (id, project_id, summary, description, feedback_type, status, submitted_by, created_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(id.to_string())
		.bind(project_id.to_string())
		.bind(&new_feedback.summary)
		.bind(&new_feedback.description)
		.bind(new_feedback.feedback_type.as_str())
		.bind(FeedbackStatus::Received.as_str())
		.bind(submitted_by.map(|u| u.to_string()))
		.bind(now_text)
		.execute(&self.pool)
		.await?;

		tracing::debug!(feedback_id = %id, "feedback created");
		Ok(Feedback {
			id,
			project_id: *project_id,
			summary: new_feedback.summary.clone(),
			description: new_feedback.description.clone(),
			feedback_type: new_feedback.feedback_type,
			status: FeedbackStatus::Received,
			submitted_by: submitted_by.copied(),
			created_at: now,
		})
	}

	#[tracing::instrument(skip(self), fields(feedback_id = %id))]
	pub async fn get_feedback_by_id(&self, id: &FeedbackId) -> Result<Option<Feedback>, DbError> {
		let sql = format!("SELECT {FEEDBACK_COLUMNS} FROM feedback f WHERE f.id = ?");
		let row = sqlx::query(&sql)
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| row_to_feedback(&r)).transpose()
	}

	#[tracing::instrument(skip(self, scope), fields(feedback_id = %id))]
	pub async fn get_feedback_in_scope(
		&self,
		id: &FeedbackId,
		scope: &FeedbackScope,
	) -> Result<Option<Feedback>, DbError> {
		let sql = format!(
			"SELECT {FEEDBACK_COLUMNS} FROM feedback f JOIN projects p ON p.id = f.project_id WHERE f.id = ? AND {}",
			feedback_in_scope!()
		);
		let query = sqlx::query(&sql).bind(id.to_string());
		let row = bind_feedback_scope(query, scope)
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| row_to_feedback(&r)).transpose()
	}

	/// Feedback inside `scope`, newest first.
	#[tracing::instrument(skip(self, scope))]
	pub async fn list_feedback(&self, scope: &FeedbackScope) -> Result<Vec<Feedback>, DbError> {
		let sql = format!(
			"SELECT {FEEDBACK_COLUMNS} FROM feedback f JOIN projects p ON p.id = f.project_id WHERE {} \
			ORDER BY f.created_at DESC, f.rowid DESC",
			feedback_in_scope!()
		);
		let rows = bind_feedback_scope(sqlx::query(&sql), scope)
			.fetch_all(&self.pool)
			.await?;

		rows.iter().map(row_to_feedback).collect()
	}

	/// # Returns
	/// `true` if the feedback existed.
	#[tracing::instrument(skip(self), fields(feedback_id = %id, status = %status))]
	pub async fn update_feedback_status(
		&self,
		id: &FeedbackId,
		status: FeedbackStatus,
	) -> Result<bool, DbError> {
		let result = sqlx::query("UPDATE feedback SET status = ? WHERE id = ?")
			.bind(status.as_str())
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		let updated = result.rows_affected() > 0;
		if updated {
			tracing::debug!(feedback_id = %id, "feedback status updated");
		}
		Ok(updated)
	}

	/// Delete feedback and its annotations. Tasks that originated from it keep
	/// existing with the link cleared. Returns the blob references of the
	/// purged attachments, or `None` if nothing was deleted.
	#[tracing::instrument(skip(self), fields(feedback_id = %id))]
	pub async fn delete_feedback(&self, id: &FeedbackId) -> Result<Option<Vec<String>>, DbError> {
		let mut tx = self.pool.begin().await?;

		let files = purge_annotations_for_feedback(&mut tx, id).await?;

		let result = sqlx::query("DELETE FROM feedback WHERE id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;

		if result.rows_affected() == 0 {
			return Ok(None);
		}
		tracing::debug!(feedback_id = %id, purged_files = files.len(), "feedback deleted");
		Ok(Some(files))
	}
}

fn row_to_feedback(row: &sqlx::sqlite::SqliteRow) -> Result<Feedback, DbError> {
	let id: String = row.get("id");
	let project_id: String = row.get("project_id");
	let feedback_type: String = row.get("feedback_type");
	let status: String = row.get("status");
	let created_at: String = row.get("created_at");

	Ok(Feedback {
		id: FeedbackId::new(parse_uuid(&id, "feedback ID")?),
		project_id: ProjectId::new(parse_uuid(&project_id, "project_id")?),
		summary: row.get("summary"),
		description: row.get("description"),
		feedback_type: parse_enum(&feedback_type, "feedback_type")?,
		status: parse_enum(&status, "status")?,
		submitted_by: parse_opt_uuid(row.get("submitted_by"), "submitted_by")?.map(UserId::new),
		created_at: parse_ts(&created_at, "created_at")?,
	})
}
