// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Task repository.
//!
//! Tasks form a forest inside each project through `parent_task_id`. Writes
//! keep that forest acyclic and confined to one project; readers may still
//! guard against corrupt data on their own.

use atelier_common_core::{
	FeedbackId, NewTask, ProjectId, Tag, TagId, Task, TaskChanges, TaskId, UserId,
};
use atelier_server_auth::TaskScope;
use sqlx::{sqlite::SqlitePool, Row, SqliteConnection};
use std::collections::HashMap;

use crate::annotation::purge_annotations_for_task_subtree;
use crate::convert::{
	fmt_date, fmt_ts, json_id_list, now_ts, parse_enum, parse_opt_date, parse_opt_ts, parse_opt_uuid,
	parse_ts, parse_uuid,
};
use crate::error::DbError;
use crate::scope::{bind_task_scope, task_in_scope};
use crate::tag::{ensure_tags_exist, row_to_tag};

const TASK_COLUMNS: &str = "t.id, t.project_id, t.parent_task_id, t.title, t.description, t.status, \
	t.priority, t.assignee_id, t.originating_feedback_id, t.start_date, t.due_date, t.estimated_hours, \
	t.created_at, t.updated_at";

/// Listing order: most urgent first, then newest.
const TASK_ORDER: &str = "ORDER BY t.priority_rank DESC, t.created_at DESC, t.rowid DESC";

#[derive(Clone)]
pub struct TaskRepository {
	pool: SqlitePool,
}

impl TaskRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a task in `project_id`.
	///
	/// # Errors
	/// - `DbError::Invalid` if the parent task or originating feedback is
	///   missing or belongs to another project, or the assignee is unknown.
	/// - `DbError::NotFound` if a tag id does not exist.
	#[tracing::instrument(skip(self, new_task), fields(project_id = %project_id, title = %new_task.title))]
	pub async fn create_task(
		&self,
		project_id: &ProjectId,
		new_task: &NewTask,
	) -> Result<Task, DbError> {
		let id = TaskId::generate();
		let (now, now_text) = now_ts();

		let mut tx = self.pool.begin().await?;

		if let Some(parent_id) = &new_task.parent_task_id {
			ensure_parent_in_project(&mut tx, parent_id, project_id).await?;
		}
		if let Some(feedback_id) = &new_task.originating_feedback_id {
			ensure_feedback_in_project(&mut tx, feedback_id, project_id).await?;
		}
		if let Some(assignee_id) = &new_task.assignee_id {
			ensure_user_exists(&mut tx, assignee_id).await?;
		}
		ensure_tags_exist(&mut tx, &new_task.tag_ids).await?;

		sqlx::query(
			r#"
			INSERT INTO tasks (id, project_id, parent_task_id, title, description, status, priority, priority_rank,
				assignee_id, originating_feedback_id, start_date, due_date, estimated_hours, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(id.to_string())
		.bind(project_id.to_string())
		.bind(new_task.parent_task_id.map(|p| p.to_string()))
		.bind(&new_task.title)
		.bind(&new_task.description)
		.bind(new_task.status.as_str())
		.bind(new_task.priority.as_str())
		.bind(new_task.priority.rank())
		.bind(new_task.assignee_id.map(|u| u.to_string()))
		.bind(new_task.originating_feedback_id.map(|f| f.to_string()))
		.bind(new_task.start_date.as_ref().map(fmt_ts))
		.bind(new_task.due_date.as_ref().map(fmt_date))
		.bind(&new_task.estimated_hours)
		.bind(&now_text)
		.bind(&now_text)
		.execute(&mut *tx)
		.await?;

		replace_task_tags(&mut tx, &id, &new_task.tag_ids).await?;

		tx.commit().await?;

		tracing::debug!(task_id = %id, "task created");
		Ok(Task {
			id,
			project_id: *project_id,
			parent_task_id: new_task.parent_task_id,
			title: new_task.title.clone(),
			description: new_task.description.clone(),
			status: new_task.status,
			priority: new_task.priority,
			assignee_id: new_task.assignee_id,
			originating_feedback_id: new_task.originating_feedback_id,
			start_date: new_task.start_date,
			due_date: new_task.due_date,
			estimated_hours: new_task.estimated_hours.clone(),
			created_at: now,
			updated_at: now,
		})
	}

	#[tracing::instrument(skip(self), fields(task_id = %id))]
	pub async fn get_task_by_id(&self, id: &TaskId) -> Result<Option<Task>, DbError> {
		let sql = format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?");
		let row = sqlx::query(&sql)
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| row_to_task(&r)).transpose()
	}

	/// Get a task only if it falls inside `scope`.
	#[tracing::instrument(skip(self, scope), fields(task_id = %id))]
	pub async fn get_task_in_scope(
		&self,
		id: &TaskId,
		scope: &TaskScope,
	) -> Result<Option<Task>, DbError> {
		let sql = format!(
			"SELECT {TASK_COLUMNS} FROM tasks t JOIN projects p ON p.id = t.project_id WHERE t.id = ? AND {}",
			task_in_scope!()
		);
		let query = sqlx::query(&sql).bind(id.to_string());
		let row = bind_task_scope(query, scope)
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| row_to_task(&r)).transpose()
	}

	/// Tasks inside `scope`, most urgent first then newest.
	#[tracing::instrument(skip(self, scope))]
	pub async fn list_tasks(&self, scope: &TaskScope) -> Result<Vec<Task>, DbError> {
		let sql = format!(
			"SELECT {TASK_COLUMNS} FROM tasks t JOIN projects p ON p.id = t.project_id WHERE {} {TASK_ORDER}",
			task_in_scope!()
		);
		let rows = bind_task_scope(sqlx::query(&sql), scope)
			.fetch_all(&self.pool)
			.await?;

		rows.iter().map(row_to_task).collect()
	}

	/// Every task in `project_ids`, nested or not, in listing order. Used to
	/// assemble subtask trees in one query rather than one per node.
	#[tracing::instrument(skip(self, project_ids), fields(count = project_ids.len()))]
	pub async fn list_tasks_in_projects(
		&self,
		project_ids: &[ProjectId],
	) -> Result<Vec<Task>, DbError> {
		if project_ids.is_empty() {
			return Ok(Vec::new());
		}

		let sql = format!(
			"SELECT {TASK_COLUMNS} FROM tasks t \
			WHERE t.project_id IN (SELECT value FROM json_each(?)) {TASK_ORDER}"
		);
		let rows = sqlx::query(&sql)
			.bind(json_id_list(project_ids))
			.fetch_all(&self.pool)
			.await?;

		rows.iter().map(row_to_task).collect()
	}

	/// Tags for each of `task_ids`, fetched in a single query. Tasks without
	/// tags map to an empty list.
	#[tracing::instrument(skip(self, task_ids), fields(count = task_ids.len()))]
	pub async fn list_task_tags(
		&self,
		task_ids: &[TaskId],
	) -> Result<HashMap<TaskId, Vec<Tag>>, DbError> {
		let mut by_task: HashMap<TaskId, Vec<Tag>> =
			task_ids.iter().map(|id| (*id, Vec::new())).collect();
		if task_ids.is_empty() {
			return Ok(by_task);
		}

		let rows = sqlx::query(
			r#"
			SELECT tt.task_id, tg.id, tg.name, tg.color, tg.created_at
			FROM task_tags tt
			JOIN tags tg ON tg.id = tt.tag_id
			WHERE tt.task_id IN (SELECT value FROM json_each(?))
			ORDER BY tg.name ASC
			"#,
		)
		.bind(json_id_list(task_ids))
		.fetch_all(&self.pool)
		.await?;

		for row in &rows {
			let task_id: String = row.get("task_id");
			let task_id = TaskId::new(parse_uuid(&task_id, "task ID")?);
			by_task.entry(task_id).or_default().push(row_to_tag(row)?);
		}
		Ok(by_task)
	}

	/// Apply a partial update in one transaction.
	///
	/// # Errors
	/// - `DbError::NotFound` if the task or a tag id is missing.
	/// - `DbError::Invalid` if the new parent is in another project or would
	///   put the task beneath itself.
	#[tracing::instrument(skip(self, changes), fields(task_id = %id))]
	pub async fn update_task(&self, id: &TaskId, changes: &TaskChanges) -> Result<Task, DbError> {
		let mut tx = self.pool.begin().await?;

		let sql = format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?");
		let row = sqlx::query(&sql)
			.bind(id.to_string())
			.fetch_optional(&mut *tx)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("Task {id} not found")))?;
		let mut task = row_to_task(&row)?;

		if let Some(parent) = changes.parent_task_id {
			if let Some(parent_id) = &parent {
				ensure_parent_in_project(&mut tx, parent_id, &task.project_id).await?;
				ensure_not_descendant(&mut tx, id, parent_id).await?;
			}
			task.parent_task_id = parent;
		}
		if let Some(feedback) = changes.originating_feedback_id {
			if let Some(feedback_id) = &feedback {
				ensure_feedback_in_project(&mut tx, feedback_id, &task.project_id).await?;
			}
			task.originating_feedback_id = feedback;
		}
		if let Some(assignee) = changes.assignee_id {
			if let Some(assignee_id) = &assignee {
				ensure_user_exists(&mut tx, assignee_id).await?;
			}
			task.assignee_id = assignee;
		}
		if let Some(title) = &changes.title {
			task.title = title.clone();
		}
		if let Some(description) = &changes.description {
			task.description = description.clone();
		}
		if let Some(status) = changes.status {
			task.status = status;
		}
		if let Some(priority) = changes.priority {
			task.priority = priority;
		}
		if let Some(start_date) = changes.start_date {
			task.start_date = start_date;
		}
		if let Some(due_date) = changes.due_date {
			task.due_date = due_date;
		}
		if let Some(estimated_hours) = &changes.estimated_hours {
			task.estimated_hours = estimated_hours.clone();
		}

		let (now, now_text) = now_ts();
		task.updated_at = now;

		sqlx::query(
			r#"
			UPDATE tasks
			SET parent_task_id = ?, title = ?, description = ?, status = ?, priority = ?, priority_rank = ?,
				assignee_id = ?, originating_feedback_id = ?, start_date = ?, due_date = ?, estimated_hours = ?,
				updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(task.parent_task_id.map(|p| p.to_string()))
		.bind(&task.title)
		.bind(&task.description)
		.bind(task.status.as_str())
		.bind(task.priority.as_str())
		.bind(task.priority.rank())
		.bind(task.assignee_id.map(|u| u.to_string()))
		.bind(task.originating_feedback_id.map(|f| f.to_string()))
		.bind(task.start_date.as_ref().map(fmt_ts))
		.bind(task.due_date.as_ref().map(fmt_date))
		.bind(&task.estimated_hours)
		.bind(now_text)
		.bind(id.to_string())
		.execute(&mut *tx)
		.await?;

		if let Some(tag_ids) = &changes.tag_ids {
			ensure_tags_exist(&mut tx, tag_ids).await?;
			replace_task_tags(&mut tx, id, tag_ids).await?;
		}

		tx.commit().await?;

		tracing::debug!(task_id = %id, "task updated");
		Ok(task)
	}

	/// Delete a task, its whole subtree and every annotation on them.
	///
	/// # Returns
	/// `None` if the task did not exist. Otherwise the blob references of the
	/// attachments that went with it.
	#[tracing::instrument(skip(self), fields(task_id = %id))]
	pub async fn delete_task(&self, id: &TaskId) -> Result<Option<Vec<String>>, DbError> {
		let mut tx = self.pool.begin().await?;

		let files = purge_annotations_for_task_subtree(&mut tx, id).await?;

		let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;

		if result.rows_affected() == 0 {
			return Ok(None);
		}
		tracing::debug!(task_id = %id, purged_files = files.len(), "task deleted");
		Ok(Some(files))
	}

	/// Link a tag to a task. Linking an already linked tag is a no-op.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the tag does not exist.
	#[tracing::instrument(skip(self), fields(task_id = %task_id, tag_id = %tag_id))]
	pub async fn add_task_tag(&self, task_id: &TaskId, tag_id: &TagId) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;

		ensure_tags_exist(&mut tx, std::slice::from_ref(tag_id)).await?;
		sqlx::query("INSERT OR IGNORE INTO task_tags (task_id, tag_id) VALUES (?, ?)")
			.bind(task_id.to_string())
			.bind(tag_id.to_string())
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;
		tracing::debug!(task_id = %task_id, tag_id = %tag_id, "tag added to task");
		Ok(())
	}

	/// Unlink a tag from a task. Unlinking a tag that is not linked is a no-op.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the tag does not exist.
	#[tracing::instrument(skip(self), fields(task_id = %task_id, tag_id = %tag_id))]
	pub async fn remove_task_tag(&self, task_id: &TaskId, tag_id: &TagId) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;

		ensure_tags_exist(&mut tx, std::slice::from_ref(tag_id)).await?;
		sqlx::query("DELETE FROM task_tags WHERE task_id = ? AND tag_id = ?")
			.bind(task_id.to_string())
			.bind(tag_id.to_string())
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;
		tracing::debug!(task_id = %task_id, tag_id = %tag_id, "tag removed from task");
		Ok(())
	}
}

async fn ensure_parent_in_project(
	conn: &mut SqliteConnection,
	parent_id: &TaskId,
	project_id: &ProjectId,
) -> Result<(), DbError> {
	let parent_project: Option<String> = sqlx::query_scalar("SELECT project_id FROM tasks WHERE id = ?")
		.bind(parent_id.to_string())
		.fetch_optional(&mut *conn)
		.await?;

	match parent_project {
		None => Err(DbError::invalid(
			"parent_task_id",
			format!("Parent task {parent_id} does not exist"),
		)),
		Some(p) if p != project_id.to_string() => Err(DbError::invalid(
			"parent_task_id",
			"Parent task must belong to the same project",
		)),
		Some(_) => Ok(()),
	}
}

/// Rejects `new_parent` when it is `task_id` itself or one of its
/// descendants. Walks up from `new_parent`; a pre-existing loop in the stored
/// chain stops the walk instead of spinning.
async fn ensure_not_descendant(
	conn: &mut SqliteConnection,
	task_id: &TaskId,
	new_parent: &TaskId,
) -> Result<(), DbError> {
	let mut seen = std::collections::HashSet::new();
	let mut cursor = Some(*new_parent);

	while let Some(current) = cursor {
		if current == *task_id {
			return Err(DbError::invalid(
				"parent_task_id",
				"A task cannot be nested beneath itself or its subtasks",
			));
		}
		if !seen.insert(current) {
			return Err(DbError::invalid(
				"parent_task_id",
				format!("Task hierarchy above {new_parent} contains a cycle"),
			));
		}
		let parent: Option<Option<String>> =
			sqlx::query_scalar("SELECT parent_task_id FROM tasks WHERE id = ?")
				.bind(current.to_string())
				.fetch_optional(&mut *conn)
				.await?;
		cursor = parse_opt_uuid(parent.flatten(), "parent_task_id")?.map(TaskId::new);
	}
	Ok(())
}

async fn ensure_feedback_in_project(
	conn: &mut SqliteConnection,
	feedback_id: &FeedbackId,
	project_id: &ProjectId,
) -> Result<(), DbError> {
	let feedback_project: Option<String> =
		sqlx::query_scalar("SELECT project_id FROM feedback WHERE id = ?")
			.bind(feedback_id.to_string())
			.fetch_optional(&mut *conn)
			.await?;

	match feedback_project {
		None => Err(DbError::invalid(
			"originating_feedback_id",
			format!("Feedback {feedback_id} does not exist"),
		)),
		Some(p) if p != project_id.to_string() => Err(DbError::invalid(
			"originating_feedback_id",
			"Originating feedback must belong to the same project",
		)),
		Some(_) => Ok(()),
	}
}

async fn ensure_user_exists(conn: &mut SqliteConnection, user_id: &UserId) -> Result<(), DbError> {
	let exists = sqlx::query("SELECT 1 FROM users WHERE id = ?")
		.bind(user_id.to_string())
		.fetch_optional(&mut *conn)
		.await?
		.is_some();
	if exists {
		Ok(())
	} else {
		Err(DbError::invalid(
			"assignee_id",
			format!("User {user_id} does not exist"),
		))
	}
}

async fn replace_task_tags(
	conn: &mut SqliteConnection,
	task_id: &TaskId,
	tag_ids: &[TagId],
) -> Result<(), DbError> {
	sqlx::query("DELETE FROM task_tags WHERE task_id = ?")
		.bind(task_id.to_string())
		.execute(&mut *conn)
		.await?;

	sqlx::query(
		"INSERT OR IGNORE INTO task_tags (task_id, tag_id) SELECT ?, value FROM json_each(?)",
	)
	.bind(task_id.to_string())
	.bind(json_id_list(tag_ids))
	.execute(&mut *conn)
	.await?;
	Ok(())
}

fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> Result<Task, DbError> {
	let id: String = row.get("id");
	let project_id: String = row.get("project_id");
	let status: String = row.get("status");
	let priority: String = row.get("priority");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(Task {
		id: TaskId::new(parse_uuid(&id, "task ID")?),
		project_id: ProjectId::new(parse_uuid(&project_id, "project_id")?),
		parent_task_id: parse_opt_uuid(row.get("parent_task_id"), "parent_task_id")?.map(TaskId::new),
		title: row.get("title"),
		description: row.get("description"),
		status: parse_enum(&status, "status")?,
		priority: parse_enum(&priority, "priority")?,
		assignee_id: parse_opt_uuid(row.get("assignee_id"), "assignee_id")?.map(UserId::new),
		originating_feedback_id: parse_opt_uuid(
			row.get("originating_feedback_id"),
			"originating_feedback_id",
		)?
		.map(FeedbackId::new),
		start_date: parse_opt_ts(row.get("start_date"), "start_date")?,
		due_date: parse_opt_date(row.get("due_date"), "due_date")?,
		estimated_hours: row.get("estimated_hours"),
		created_at: parse_ts(&created_at, "created_at")?,
		updated_at: parse_ts(&updated_at, "updated_at")?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::project::ProjectRepository;
	use crate::tag::TagRepository;
	use crate::testing::{create_test_pool, make_project, make_subtask, make_task, make_user};
	use atelier_common_core::{ProjectRole, TaskPriority};
	use atelier_server_auth::{ProjectScope, RouteContext};

	mod create {
		use super::*;

		#[tokio::test]
		async fn parent_in_other_project_is_invalid() {
			let pool = create_test_pool().await;
			let owner = make_user(&pool, "owner@example.com").await;
			let a = make_project(&pool, &owner, "A").await;
			let b = make_project(&pool, &owner, "B").await;
			let foreign_parent = make_task(&pool, b.id, "elsewhere").await;

			let err = TaskRepository::new(pool)
				.create_task(
					&a.id,
					&NewTask {
						title: "child".to_string(),
						parent_task_id: Some(foreign_parent.id),
						..Default::default()
					},
				)
				.await
				.unwrap_err();
			assert!(matches!(err, DbError::Invalid { .. }));
		}

		#[tokio::test]
		async fn unknown_assignee_is_invalid() {
			let pool = create_test_pool().await;
			let owner = make_user(&pool, "owner@example.com").await;
			let project = make_project(&pool, &owner, "A").await;

			let err = TaskRepository::new(pool)
				.create_task(
					&project.id,
					&NewTask {
						title: "t".to_string(),
						assignee_id: Some(UserId::generate()),
						..Default::default()
					},
				)
				.await
				.unwrap_err();
			assert!(matches!(err, DbError::Invalid { .. }));
		}

		#[tokio::test]
		async fn created_task_reads_back_identically() {
			let pool = create_test_pool().await;
			let owner = make_user(&pool, "owner@example.com").await;
			let project = make_project(&pool, &owner, "A").await;
			let repo = TaskRepository::new(pool);

			let task = repo
				.create_task(
					&project.id,
					&NewTask {
						title: "Ship it".to_string(),
						priority: TaskPriority::High,
						assignee_id: Some(owner.id),
						due_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 1),
						estimated_hours: Some("3.50".to_string()),
						..Default::default()
					},
				)
				.await
				.unwrap();

			assert_eq!(repo.get_task_by_id(&task.id).await.unwrap().unwrap(), task);
		}
	}

	mod listing {
		use super::*;

		#[tokio::test]
		async fn ordered_by_priority_then_newest() {
			let pool = create_test_pool().await;
			let owner = make_user(&pool, "owner@example.com").await;
			let project = make_project(&pool, &owner, "A").await;
			let repo = TaskRepository::new(pool.clone());

			let low = repo
				.create_task(
					&project.id,
					&NewTask {
						title: "low".to_string(),
						priority: TaskPriority::Low,
						..Default::default()
					},
				)
				.await
				.unwrap();
			let medium_old = make_task(&pool, project.id, "medium old").await;
			let medium_new = make_task(&pool, project.id, "medium new").await;
			let urgent = repo
				.create_task(
					&project.id,
					&NewTask {
						title: "urgent".to_string(),
						priority: TaskPriority::Urgent,
						..Default::default()
					},
				)
				.await
				.unwrap();

			let ids: Vec<TaskId> = repo
				.list_tasks_in_projects(&[project.id])
				.await
				.unwrap()
				.iter()
				.map(|t| t.id)
				.collect();
			assert_eq!(ids, vec![urgent.id, medium_new.id, medium_old.id, low.id]);
		}

		#[tokio::test]
		async fn forest_fetch_spans_requested_projects_only() {
			let pool = create_test_pool().await;
			let owner = make_user(&pool, "owner@example.com").await;
			let a = make_project(&pool, &owner, "A").await;
			let b = make_project(&pool, &owner, "B").await;
			let c = make_project(&pool, &owner, "C").await;
			let in_a = make_task(&pool, a.id, "in a").await;
			let sub_a = make_subtask(&pool, a.id, Some(&in_a), "sub a").await;
			let in_b = make_task(&pool, b.id, "in b").await;
			make_task(&pool, c.id, "in c").await;
			let repo = TaskRepository::new(pool);

			let mut ids: Vec<TaskId> = repo
				.list_tasks_in_projects(&[a.id, b.id])
				.await
				.unwrap()
				.iter()
				.map(|t| t.id)
				.collect();
			ids.sort();
			let mut expected = vec![in_a.id, sub_a.id, in_b.id];
			expected.sort();
			assert_eq!(ids, expected);

			assert!(repo.list_tasks_in_projects(&[]).await.unwrap().is_empty());
		}

		#[tokio::test]
		async fn nested_listing_is_top_level_only() {
			let pool = create_test_pool().await;
			let owner = make_user(&pool, "owner@example.com").await;
			let project = make_project(&pool, &owner, "A").await;
			let parent = make_task(&pool, project.id, "parent").await;
			let child = make_subtask(&pool, project.id, Some(&parent), "child").await;
			let repo = TaskRepository::new(pool);

			let nested = TaskScope::for_listing(&owner, RouteContext::Nested(project.id));
			let ids: Vec<TaskId> = repo.list_tasks(&nested).await.unwrap().iter().map(|t| t.id).collect();
			assert_eq!(ids, vec![parent.id]);

			let flat = TaskScope::for_listing(&owner, RouteContext::Flat);
			let flat_ids: Vec<TaskId> = repo.list_tasks(&flat).await.unwrap().iter().map(|t| t.id).collect();
			assert_eq!(flat_ids.len(), 2);
			assert!(flat_ids.contains(&child.id));
		}

		#[tokio::test]
		async fn flat_listing_spans_visible_projects_only() {
			let pool = create_test_pool().await;
			let alice = make_user(&pool, "alice@example.com").await;
			let bob = make_user(&pool, "bob@example.com").await;
			let a = make_project(&pool, &alice, "A").await;
			let b = make_project(&pool, &bob, "B").await;
			let shared = make_project(&pool, &bob, "Shared").await;
			ProjectRepository::new(pool.clone())
				.add_member(&shared.id, &alice.id, ProjectRole::Viewer)
				.await
				.unwrap();

			let mine = make_task(&pool, a.id, "mine").await;
			let _hidden = make_task(&pool, b.id, "hidden").await;
			let visible = make_task(&pool, shared.id, "shared").await;

			let repo = TaskRepository::new(pool);
			let scope = TaskScope::for_listing(&alice, RouteContext::Flat);
			let ids: Vec<TaskId> = repo.list_tasks(&scope).await.unwrap().iter().map(|t| t.id).collect();
			assert_eq!(ids.len(), 2);
			assert!(ids.contains(&mine.id));
			assert!(ids.contains(&visible.id));
		}

		#[tokio::test]
		async fn lookup_scope_hides_foreign_tasks() {
			let pool = create_test_pool().await;
			let alice = make_user(&pool, "alice@example.com").await;
			let bob = make_user(&pool, "bob@example.com").await;
			let project = make_project(&pool, &bob, "B").await;
			let task = make_task(&pool, project.id, "secret").await;
			let repo = TaskRepository::new(pool);

			assert!(repo
				.get_task_in_scope(&task.id, &TaskScope::for_lookup(&alice))
				.await
				.unwrap()
				.is_none());
			assert!(repo
				.get_task_in_scope(&task.id, &TaskScope::for_lookup(&bob))
				.await
				.unwrap()
				.is_some());
			assert_eq!(
				TaskScope::for_lookup(&bob).projects,
				ProjectScope::OwnedOrMemberOf(bob.id)
			);
		}
	}

	mod hierarchy {
		use super::*;

		#[tokio::test]
		async fn reparenting_under_own_descendant_is_rejected() {
			let pool = create_test_pool().await;
			let owner = make_user(&pool, "owner@example.com").await;
			let project = make_project(&pool, &owner, "A").await;
			let root = make_task(&pool, project.id, "root").await;
			let child = make_subtask(&pool, project.id, Some(&root), "child").await;
			let grandchild = make_subtask(&pool, project.id, Some(&child), "grandchild").await;
			let repo = TaskRepository::new(pool);

			for new_parent in [root.id, grandchild.id] {
				let err = repo
					.update_task(
						&root.id,
						&TaskChanges {
							parent_task_id: Some(Some(new_parent)),
							..Default::default()
						},
					)
					.await
					.unwrap_err();
				assert!(matches!(err, DbError::Invalid { .. }));
			}

			let moved = repo
				.update_task(
					&grandchild.id,
					&TaskChanges {
						parent_task_id: Some(Some(root.id)),
						..Default::default()
					},
				)
				.await
				.unwrap();
			assert_eq!(moved.parent_task_id, Some(root.id));
		}

		#[tokio::test]
		async fn delete_removes_subtree_and_annotations() {
			let pool = create_test_pool().await;
			let owner = make_user(&pool, "owner@example.com").await;
			let project = make_project(&pool, &owner, "A").await;
			let root = make_task(&pool, project.id, "root").await;
			let child = make_subtask(&pool, project.id, Some(&root), "child").await;
			use crate::annotation::{AnnotationRepository, AnnotationStore};
			let annotations = AnnotationRepository::new(pool.clone());
			annotations
				.attach_comment(child.id.into(), &owner.id, "on the child")
				.await
				.unwrap();
			annotations
				.attach_attachment(root.id.into(), &owner.id, "root.png", "")
				.await
				.unwrap();
			annotations
				.attach_attachment(child.id.into(), &owner.id, "child.log", "")
				.await
				.unwrap();
			let repo = TaskRepository::new(pool.clone());

			let mut files = repo.delete_task(&root.id).await.unwrap().unwrap();
			files.sort();
			assert_eq!(files, vec!["child.log".to_string(), "root.png".to_string()]);
			assert!(repo.get_task_by_id(&child.id).await.unwrap().is_none());

			let comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
				.fetch_one(&pool)
				.await
				.unwrap();
			assert_eq!(comments, 0);
			assert!(repo.delete_task(&root.id).await.unwrap().is_none());
		}
	}

	mod tags {
		use super::*;

		#[tokio::test]
		async fn add_and_remove_are_idempotent() {
			let pool = create_test_pool().await;
			let owner = make_user(&pool, "owner@example.com").await;
			let project = make_project(&pool, &owner, "A").await;
			let task = make_task(&pool, project.id, "t").await;
			let tag = TagRepository::new(pool.clone())
				.create_tag("ui", "#00aaff")
				.await
				.unwrap();
			let repo = TaskRepository::new(pool);

			repo.add_task_tag(&task.id, &tag.id).await.unwrap();
			repo.add_task_tag(&task.id, &tag.id).await.unwrap();
			let tags = repo.list_task_tags(&[task.id]).await.unwrap();
			assert_eq!(tags[&task.id].len(), 1);

			repo.remove_task_tag(&task.id, &tag.id).await.unwrap();
			repo.remove_task_tag(&task.id, &tag.id).await.unwrap();
			let tags = repo.list_task_tags(&[task.id]).await.unwrap();
			assert!(tags[&task.id].is_empty());
		}

		#[tokio::test]
		async fn batched_lookup_groups_by_task() {
			let pool = create_test_pool().await;
			let owner = make_user(&pool, "owner@example.com").await;
			let project = make_project(&pool, &owner, "A").await;
			let both = make_task(&pool, project.id, "both").await;
			let one = make_task(&pool, project.id, "one").await;
			let none = make_task(&pool, project.id, "none").await;
			let unrequested = make_task(&pool, project.id, "unrequested").await;

			let tags = TagRepository::new(pool.clone());
			let ui = tags.create_tag("ui", "#00aaff").await.unwrap();
			let backend = tags.create_tag("backend", "#112233").await.unwrap();
			let repo = TaskRepository::new(pool);

			repo.add_task_tag(&both.id, &ui.id).await.unwrap();
			repo.add_task_tag(&both.id, &backend.id).await.unwrap();
			repo.add_task_tag(&one.id, &ui.id).await.unwrap();
			repo.add_task_tag(&unrequested.id, &backend.id).await.unwrap();

			let by_task = repo.list_task_tags(&[both.id, one.id, none.id]).await.unwrap();
			assert_eq!(by_task.len(), 3);

			let names = |id: &TaskId| -> Vec<String> {
				by_task[id].iter().map(|t| t.name.clone()).collect()
			};
			assert_eq!(names(&both.id), vec!["backend", "ui"]);
			assert_eq!(names(&one.id), vec!["ui"]);
			assert!(names(&none.id).is_empty());
			assert!(!by_task.contains_key(&unrequested.id));

			assert!(repo.list_task_tags(&[]).await.unwrap().is_empty());
		}

		#[tokio::test]
		async fn replacing_tags_keeps_exactly_the_given_set() {
			let pool = create_test_pool().await;
			let owner = make_user(&pool, "owner@example.com").await;
			let project = make_project(&pool, &owner, "A").await;
			let task = make_task(&pool, project.id, "t").await;

			let tags = TagRepository::new(pool.clone());
			let ui = tags.create_tag("ui", "#00aaff").await.unwrap();
			let backend = tags.create_tag("backend", "#112233").await.unwrap();
			let repo = TaskRepository::new(pool);

			repo.update_task(
				&task.id,
				&TaskChanges {
					tag_ids: Some(vec![ui.id, backend.id, ui.id]),
					..Default::default()
				},
			)
			.await
			.unwrap();
			assert_eq!(repo.list_task_tags(&[task.id]).await.unwrap()[&task.id].len(), 2);

			repo.update_task(
				&task.id,
				&TaskChanges {
					tag_ids: Some(vec![backend.id]),
					..Default::default()
				},
			)
			.await
			.unwrap();
			let remaining = &repo.list_task_tags(&[task.id]).await.unwrap()[&task.id];
			assert_eq!(remaining.len(), 1);
			assert_eq!(remaining[0].id, backend.id);

			let err = repo
				.update_task(
					&task.id,
					&TaskChanges {
						tag_ids: Some(vec![ui.id, TagId::generate()]),
						..Default::default()
					},
				)
				.await
				.unwrap_err();
			assert!(matches!(err, DbError::NotFound(_)));
			assert_eq!(repo.list_task_tags(&[task.id]).await.unwrap()[&task.id].len(), 1);
		}

		#[tokio::test]
		async fn unknown_tag_is_not_found() {
			let pool = create_test_pool().await;
			let owner = make_user(&pool, "owner@example.com").await;
			let project = make_project(&pool, &owner, "A").await;
			let task = make_task(&pool, project.id, "t").await;
			let repo = TaskRepository::new(pool);

			let err = repo.add_task_tag(&task.id, &TagId::generate()).await.unwrap_err();
			assert!(matches!(err, DbError::NotFound(_)));
		}
	}
}
