// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Polymorphic annotation store.
//!
//! Comments and attachments point at their target through a
//! `(target_kind, target_id)` pair rather than a foreign key per entity
//! type. Every lookup filters on both columns, so annotations on a task and
//! on a feedback item that happen to share a UUID never mix.
//!
//! Because no foreign key backs the pair, the repositories that delete tasks,
//! feedback and projects call the `purge_*` helpers here inside their own
//! transactions.

use async_trait::async_trait;
use atelier_common_core::{
	Attachment, AttachmentId, Comment, CommentId, EntityKind, EntityRef, FeedbackId, ProjectId,
	TaskId, UserId,
};
use sqlx::{sqlite::SqlitePool, Row, SqliteConnection};

use crate::convert::{now_ts, parse_enum, parse_ts, parse_uuid};
use crate::error::DbError;

/// What is being attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationPayload {
	Comment { text: String },
	Attachment { file: String, description: String },
}

/// A stored annotation of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
	Comment(Comment),
	Attachment(Attachment),
}

impl Annotation {
	pub fn target(&self) -> EntityRef {
		match self {
			Annotation::Comment(c) => c.target,
			Annotation::Attachment(a) => a.target,
		}
	}
}

/// Attach and list annotations on any [`EntityRef`].
#[async_trait]
pub trait AnnotationStore: Send + Sync {
	/// Attach `payload` to `target` on behalf of `actor`.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the target does not exist.
	async fn attach(
		&self,
		target: EntityRef,
		payload: AnnotationPayload,
		actor: &UserId,
	) -> Result<Annotation, DbError>;

	/// Comments on `target`, oldest first.
	async fn list_comments(&self, target: EntityRef) -> Result<Vec<Comment>, DbError>;

	/// Attachments on `target` in upload order.
	async fn list_attachments(&self, target: EntityRef) -> Result<Vec<Attachment>, DbError>;

	async fn attach_comment(
		&self,
		target: EntityRef,
		author_id: &UserId,
		text: &str,
	) -> Result<Comment, DbError> {
		let payload = AnnotationPayload::Comment {
			text: text.to_string(),
		};
		match self.attach(target, payload, author_id).await? {
			Annotation::Comment(comment) => Ok(comment),
			Annotation::Attachment(_) => Err(DbError::Internal(
				"comment payload produced an attachment".to_string(),
			)),
		}
	}

	async fn attach_attachment(
		&self,
		target: EntityRef,
		uploaded_by: &UserId,
		file: &str,
		description: &str,
	) -> Result<Attachment, DbError> {
		let payload = AnnotationPayload::Attachment {
			file: file.to_string(),
			description: description.to_string(),
		};
		match self.attach(target, payload, uploaded_by).await? {
			Annotation::Attachment(attachment) => Ok(attachment),
			Annotation::Comment(_) => Err(DbError::Internal(
				"attachment payload produced a comment".to_string(),
			)),
		}
	}
}

#[derive(Clone)]
pub struct AnnotationRepository {
	pool: SqlitePool,
}

impl AnnotationRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl AnnotationStore for AnnotationRepository {
	#[tracing::instrument(skip(self, payload), fields(target = %target, actor = %actor))]
	async fn attach(
		&self,
		target: EntityRef,
		payload: AnnotationPayload,
		actor: &UserId,
	) -> Result<Annotation, DbError> {
		let (now, now_text) = now_ts();

		let mut tx = self.pool.begin().await?;

		if !target_exists(&mut tx, &target).await? {
			return Err(DbError::NotFound(format!(
				"{} {} not found",
				target.kind, target.id
			)));
		}

		let annotation = match payload {
			AnnotationPayload::Comment { text } => {
				let id = CommentId::generate();
				sqlx::query(
					r#"
					INSERT INTO comments (id, target_kind, target_id, author_id, text, created_at)
					VALUES (?, ?, ?, ?, ?, ?)
					"#,
				)
				.bind(id.to_string())
				.bind(target.kind.as_str())
				.bind(target.id.to_string())
				.bind(actor.to_string())
				.bind(&text)
				.bind(&now_text)
				.execute(&mut *tx)
				.await?;

				Annotation::Comment(Comment {
					id,
					target,
					author_id: *actor,
					text,
					created_at: now,
				})
			}
			AnnotationPayload::Attachment { file, description } => {
				let id = AttachmentId::generate();
				sqlx::query(
					r#"
					INSERT INTO attachments (id, target_kind, target_id, uploaded_by, file, description, uploaded_at)
					VALUES (?, ?, ?, ?, ?, ?, ?)
					"#,
				)
				.bind(id.to_string())
				.bind(target.kind.as_str())
				.bind(target.id.to_string())
				.bind(actor.to_string())
				.bind(&file)
				.bind(&description)
				.bind(&now_text)
				.execute(&mut *tx)
				.await?;

				Annotation::Attachment(Attachment {
					id,
					target,
					uploaded_by: *actor,
					file,
					description,
					uploaded_at: now,
				})
			}
		};

		tx.commit().await?;

		tracing::debug!(target = %target, "annotation attached");
		Ok(annotation)
	}

	#[tracing::instrument(skip(self), fields(target = %target))]
	async fn list_comments(&self, target: EntityRef) -> Result<Vec<Comment>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, target_kind, target_id, author_id, text, created_at
			FROM comments
			WHERE target_kind = ? AND target_id = ?
			ORDER BY created_at ASC, rowid ASC
			"#,
		)
		.bind(target.kind.as_str())
		.bind(target.id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_comment).collect()
	}

	#[tracing::instrument(skip(self), fields(target = %target))]
	async fn list_attachments(&self, target: EntityRef) -> Result<Vec<Attachment>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, target_kind, target_id, uploaded_by, file, description, uploaded_at
			FROM attachments
			WHERE target_kind = ? AND target_id = ?
			ORDER BY uploaded_at ASC, rowid ASC
			"#,
		)
		.bind(target.kind.as_str())
		.bind(target.id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_attachment).collect()
	}
}

/// Existence resolver, one table per kind.
async fn target_exists(conn: &mut SqliteConnection, target: &EntityRef) -> Result<bool, DbError> {
	let sql = match target.kind {
		EntityKind::Task => "SELECT 1 FROM tasks WHERE id = ?",
		EntityKind::Feedback => "SELECT 1 FROM feedback WHERE id = ?",
	};
	let row = sqlx::query(sql)
		.bind(target.id.to_string())
		.fetch_optional(&mut *conn)
		.await?;
	Ok(row.is_some())
}

/// Deletes comments and attachments matching `filter`, a predicate over
/// `target_kind`/`target_id` whose placeholders all take `bind`. Returns the
/// blob references of the removed attachments so the caller can drop the bytes.
async fn purge_annotations(
	conn: &mut SqliteConnection,
	filter: &str,
	binds: usize,
	bind: &str,
) -> Result<Vec<String>, DbError> {
	let comments = format!("DELETE FROM comments WHERE {filter}");
	let mut query = sqlx::query(&comments);
	for _ in 0..binds {
		query = query.bind(bind);
	}
	query.execute(&mut *conn).await?;

	let attachments = format!("DELETE FROM attachments WHERE {filter} RETURNING file");
	let mut query = sqlx::query_scalar::<_, String>(&attachments);
	for _ in 0..binds {
		query = query.bind(bind);
	}
	Ok(query.fetch_all(&mut *conn).await?)
}

/// Removes annotations on `task_id` and every task beneath it.
pub(crate) async fn purge_annotations_for_task_subtree(
	conn: &mut SqliteConnection,
	task_id: &TaskId,
) -> Result<Vec<String>, DbError> {
	let filter = r#"target_kind = 'task' AND target_id IN (
			WITH RECURSIVE subtree(id) AS (
				SELECT ?
				UNION
				SELECT t.id FROM tasks t JOIN subtree s ON t.parent_task_id = s.id
			)
			SELECT id FROM subtree
		)"#;
	purge_annotations(conn, filter, 1, &task_id.to_string()).await
}

pub(crate) async fn purge_annotations_for_feedback(
	conn: &mut SqliteConnection,
	feedback_id: &FeedbackId,
) -> Result<Vec<String>, DbError> {
	let filter = "target_kind = 'feedback' AND target_id = ?";
	purge_annotations(conn, filter, 1, &feedback_id.to_string()).await
}

/// Removes annotations on every task and feedback item of a project.
pub(crate) async fn purge_annotations_for_project(
	conn: &mut SqliteConnection,
	project_id: &ProjectId,
) -> Result<Vec<String>, DbError> {
	let filter = r#"(target_kind = 'task' AND target_id IN (SELECT id FROM tasks WHERE project_id = ?))
			OR (target_kind = 'feedback' AND target_id IN (SELECT id FROM feedback WHERE project_id = ?))"#;
	purge_annotations(conn, filter, 2, &project_id.to_string()).await
}

fn row_to_target(row: &sqlx::sqlite::SqliteRow) -> Result<EntityRef, DbError> {
	let kind: String = row.get("target_kind");
	let id: String = row.get("target_id");
	Ok(EntityRef::new(
		parse_enum(&kind, "target_kind")?,
		parse_uuid(&id, "target_id")?,
	))
}

fn row_to_comment(row: &sqlx::sqlite::SqliteRow) -> Result<Comment, DbError> {
	let id: String = row.get("id");
	let author_id: String = row.get("author_id");
	let created_at: String = row.get("created_at");

	Ok(Comment {
		id: CommentId::new(parse_uuid(&id, "comment ID")?),
		target: row_to_target(row)?,
		author_id: UserId::new(parse_uuid(&author_id, "author_id")?),
		text: row.get("text"),
		created_at: parse_ts(&created_at, "created_at")?,
	})
}

fn row_to_attachment(row: &sqlx::sqlite::SqliteRow) -> Result<Attachment, DbError> {
	let id: String = row.get("id");
	let uploaded_by: String = row.get("uploaded_by");
	let uploaded_at: String = row.get("uploaded_at");

	Ok(Attachment {
		id: AttachmentId::new(parse_uuid(&id, "attachment ID")?),
		target: row_to_target(row)?,
		uploaded_by: UserId::new(parse_uuid(&uploaded_by, "uploaded_by")?),
		file: row.get("file"),
		description: row.get("description"),
		uploaded_at: parse_ts(&uploaded_at, "uploaded_at")?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::feedback::{FeedbackRepository, NewFeedback};
	use crate::project::ProjectRepository;
	use crate::testing::{create_test_pool, make_project, make_task, make_user};
	use uuid::Uuid;

	#[tokio::test]
	async fn missing_target_is_not_found() {
		let pool = create_test_pool().await;
		let user = make_user(&pool, "u@example.com").await;
		let repo = AnnotationRepository::new(pool);

		let err = repo
			.attach_comment(TaskId::generate().into(), &user.id, "hello")
			.await
			.unwrap_err();
		assert!(matches!(err, DbError::NotFound(_)));
	}

	#[tokio::test]
	async fn comments_are_oldest_first() {
		let pool = create_test_pool().await;
		let user = make_user(&pool, "u@example.com").await;
		let project = make_project(&pool, &user, "A").await;
		let task = make_task(&pool, project.id, "t").await;
		let repo = AnnotationRepository::new(pool);

		for text in ["first", "second", "third"] {
			repo.attach_comment(task.id.into(), &user.id, text).await.unwrap();
		}

		let texts: Vec<String> = repo
			.list_comments(task.id.into())
			.await
			.unwrap()
			.into_iter()
			.map(|c| c.text)
			.collect();
		assert_eq!(texts, vec!["first", "second", "third"]);
	}

	#[tokio::test]
	async fn kinds_never_mix_for_a_shared_id() {
		let pool = create_test_pool().await;
		let user = make_user(&pool, "u@example.com").await;
		let project = make_project(&pool, &user, "A").await;
		let task = make_task(&pool, project.id, "t").await;

		// Give a feedback row the task's UUID so the two refs collide on id.
		let shared = task.id.into_inner();
		sqlx::query(
			"INSERT INTO feedback (id, project_id, summary, created_at) VALUES (?, ?, 'dup', '2025-01-01T00:00:00.000000Z')",
		)
		.bind(shared.to_string())
		.bind(project.id.to_string())
		.execute(&pool)
		.await
		.unwrap();

		let repo = AnnotationRepository::new(pool);
		let feedback_ref = EntityRef::new(EntityKind::Feedback, shared);
		repo.attach_comment(feedback_ref, &user.id, "on feedback").await.unwrap();
		repo.attach_attachment(feedback_ref, &user.id, "attachments/x.pdf", "")
			.await
			.unwrap();

		assert!(repo.list_comments(task.id.into()).await.unwrap().is_empty());
		assert!(repo.list_attachments(task.id.into()).await.unwrap().is_empty());
		assert_eq!(repo.list_comments(feedback_ref).await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn attachments_keep_upload_order() {
		let pool = create_test_pool().await;
		let user = make_user(&pool, "u@example.com").await;
		let project = make_project(&pool, &user, "A").await;
		let feedback = FeedbackRepository::new(pool.clone())
			.create_feedback(
				&project.id,
				Some(&user.id),
				&NewFeedback {
					summary: "s".to_string(),
					..Default::default()
				},
			)
			.await
			.unwrap();
		let repo = AnnotationRepository::new(pool);

		let a = repo
			.attach_attachment(feedback.id.into(), &user.id, "attachments/a.png", "a")
			.await
			.unwrap();
		let b = repo
			.attach_attachment(feedback.id.into(), &user.id, "attachments/b.png", "b")
			.await
			.unwrap();

		let ids: Vec<AttachmentId> = repo
			.list_attachments(feedback.id.into())
			.await
			.unwrap()
			.iter()
			.map(|a| a.id)
			.collect();
		assert_eq!(ids, vec![a.id, b.id]);
		assert_eq!(a.target.kind, EntityKind::Feedback);
	}

	#[tokio::test]
	async fn project_delete_purges_feedback_annotations() {
		let pool = create_test_pool().await;
		let user = make_user(&pool, "u@example.com").await;
		let project = make_project(&pool, &user, "A").await;
		let feedback = FeedbackRepository::new(pool.clone())
			.create_feedback(
				&project.id,
				None,
				&NewFeedback {
					summary: "s".to_string(),
					..Default::default()
				},
			)
			.await
			.unwrap();
		let repo = AnnotationRepository::new(pool.clone());
		repo.attach_comment(feedback.id.into(), &user.id, "c").await.unwrap();
		repo.attach_attachment(feedback.id.into(), &user.id, "shot.png", "")
			.await
			.unwrap();

		let files = ProjectRepository::new(pool)
			.delete_project(&project.id)
			.await
			.unwrap();
		assert_eq!(files, Some(vec!["shot.png".to_string()]));
		assert!(repo.list_comments(feedback.id.into()).await.unwrap().is_empty());
		assert!(repo.list_attachments(feedback.id.into()).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn feedback_delete_reports_only_its_own_files() {
		let pool = create_test_pool().await;
		let user = make_user(&pool, "u@example.com").await;
		let project = make_project(&pool, &user, "A").await;
		let task = make_task(&pool, project.id, "t").await;
		let feedback_repo = FeedbackRepository::new(pool.clone());
		let feedback = feedback_repo
			.create_feedback(
				&project.id,
				None,
				&NewFeedback {
					summary: "s".to_string(),
					..Default::default()
				},
			)
			.await
			.unwrap();
		let repo = AnnotationRepository::new(pool.clone());
		repo.attach_attachment(feedback.id.into(), &user.id, "fb.txt", "")
			.await
			.unwrap();
		repo.attach_attachment(task.id.into(), &user.id, "task.txt", "")
			.await
			.unwrap();

		let files = feedback_repo.delete_feedback(&feedback.id).await.unwrap();
		assert_eq!(files, Some(vec!["fb.txt".to_string()]));
		assert_eq!(repo.list_attachments(task.id.into()).await.unwrap().len(), 1);
	}

	#[test]
	fn annotation_reports_its_target() {
		let target = EntityRef::new(EntityKind::Task, Uuid::new_v4());
		let comment = Annotation::Comment(Comment {
			id: CommentId::generate(),
			target,
			author_id: UserId::generate(),
			text: "x".to_string(),
			created_at: chrono::Utc::now(),
		});
		assert_eq!(comment.target(), target);
	}
}
