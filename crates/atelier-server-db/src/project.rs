// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Project repository for database operations.
//!
//! This module provides database access for:
//! - Project CRUD, scoped by [`ProjectScope`]
//! - Membership management with a store-level `(project, user)` uniqueness
//!   constraint
//! - Project tags and task progress counts

use atelier_common_core::{
	MembershipId, NewProject, Project, ProjectChanges, ProjectId, ProjectMembership, ProjectRole,
	Tag, TagId, TaskSummary, User, UserId,
};
use atelier_server_auth::ProjectScope;
use sqlx::{sqlite::SqlitePool, Row};
use std::collections::HashMap;

use crate::annotation::purge_annotations_for_project;
use crate::convert::{
	fmt_date, json_id_list, now_ts, parse_enum, parse_opt_date, parse_ts, parse_uuid,
};
use crate::error::{conflict_on_unique, DbError};
use crate::scope::{bind_project_scope, project_visible};
use crate::tag::{ensure_tags_exist, row_to_tag};
use crate::user::row_to_user;

const PROJECT_COLUMNS: &str = "p.id, p.name, p.description, p.status, p.is_archived, p.owner_id, \
	p.start_date, p.due_date, p.budget, p.repository_url, p.live_url, p.created_at, p.updated_at";

/// Repository for project and membership database operations.
#[derive(Clone)]
pub struct ProjectRepository {
	pool: SqlitePool,
}

impl ProjectRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	// =========================================================================
	// Project CRUD
	// =========================================================================

	/// Create a project owned by `owner_id`.
	///
	/// The owner's ADMIN membership and the tag links are written in the same
	/// transaction as the project row.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if a tag id does not exist.
	#[tracing::instrument(skip(self, new_project), fields(owner_id = %owner_id, name = %new_project.name))]
	pub async fn create_project(
		&self,
		owner_id: &UserId,
		new_project: &NewProject,
	) -> Result<Project, DbError> {
		let id = ProjectId::generate();
		let (now, now_text) = now_ts();

		let mut tx = self.pool.begin().await?;

		ensure_tags_exist(&mut tx, &new_project.tag_ids).await?;

		sqlx::query(
			r#"
			INSERT INTO projects (id, name, description, status, is_archived, owner_id, start_date, due_date,
				budget, repository_url, live_url, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(id.to_string())
		.bind(&new_project.name)
		.bind(&new_project.description)
		.bind(new_project.status.as_str())
		.bind(new_project.is_archived as i32)
		.bind(owner_id.to_string())
		.bind(new_project.start_date.as_ref().map(fmt_date))
		.bind(new_project.due_date.as_ref().map(fmt_date))
		.bind(&new_project.budget)
		.bind(&new_project.repository_url)
		.bind(&new_project.live_url)
		.bind(&now_text)
		.bind(&now_text)
		.execute(&mut *tx)
		.await?;

		replace_project_tags(&mut tx, &id, &new_project.tag_ids).await?;

		sqlx::query(
			r#"
			INSERT INTO project_members (id, project_id, user_id, role, joined_at)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(MembershipId::generate().to_string())
		.bind(id.to_string())
		.bind(owner_id.to_string())
		.bind(ProjectRole::Admin.as_str())
		.bind(&now_text)
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;

		tracing::debug!(project_id = %id, "project created");
		Ok(Project {
			id,
			name: new_project.name.clone(),
			description: new_project.description.clone(),
			status: new_project.status,
			is_archived: new_project.is_archived,
			owner_id: *owner_id,
			start_date: new_project.start_date,
			due_date: new_project.due_date,
			budget: new_project.budget.clone(),
			repository_url: new_project.repository_url.clone(),
			live_url: new_project.live_url.clone(),
			created_at: now,
			updated_at: now,
		})
	}

	/// Get a project by id with no visibility check.
	#[tracing::instrument(skip(self), fields(project_id = %id))]
	pub async fn get_project_by_id(&self, id: &ProjectId) -> Result<Option<Project>, DbError> {
		let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = ?");
		let row = sqlx::query(&sql)
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| row_to_project(&r)).transpose()
	}

	/// Get a project only if it is inside `scope`.
	#[tracing::instrument(skip(self, scope), fields(project_id = %id))]
	pub async fn get_project_in_scope(
		&self,
		id: &ProjectId,
		scope: &ProjectScope,
	) -> Result<Option<Project>, DbError> {
		let sql = format!(
			"SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = ? AND {}",
			project_visible!()
		);
		let query = sqlx::query(&sql).bind(id.to_string());
		let row = bind_project_scope(query, scope)
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| row_to_project(&r)).transpose()
	}

	/// Projects visible in `scope`, newest first. Each project appears once
	/// however the user reaches it.
	#[tracing::instrument(skip(self, scope))]
	pub async fn list_projects(&self, scope: &ProjectScope) -> Result<Vec<Project>, DbError> {
		let sql = format!(
			"SELECT {PROJECT_COLUMNS} FROM projects p WHERE {} ORDER BY p.created_at DESC, p.rowid DESC",
			project_visible!()
		);
		let rows = bind_project_scope(sqlx::query(&sql), scope)
			.fetch_all(&self.pool)
			.await?;

		rows.iter().map(row_to_project).collect()
	}

	/// Apply a partial update in one transaction and return the result.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the project or a tag id is missing.
	#[tracing::instrument(skip(self, changes), fields(project_id = %id))]
	pub async fn update_project(
		&self,
		id: &ProjectId,
		changes: &ProjectChanges,
	) -> Result<Project, DbError> {
		let mut tx = self.pool.begin().await?;

		let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = ?");
		let row = sqlx::query(&sql)
			.bind(id.to_string())
			.fetch_optional(&mut *tx)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("Project {id} not found")))?;
		let mut project = row_to_project(&row)?;

		if let Some(name) = &changes.name {
			project.name = name.clone();
		}
		if let Some(description) = &changes.description {
			project.description = description.clone();
		}
		if let Some(status) = changes.status {
			project.status = status;
		}
		if let Some(is_archived) = changes.is_archived {
			project.is_archived = is_archived;
		}
		if let Some(start_date) = changes.start_date {
			project.start_date = start_date;
		}
		if let Some(due_date) = changes.due_date {
			project.due_date = due_date;
		}
		if let Some(budget) = &changes.budget {
			project.budget = budget.clone();
		}
		if let Some(repository_url) = &changes.repository_url {
			project.repository_url = repository_url.clone();
		}
		if let Some(live_url) = &changes.live_url {
			project.live_url = live_url.clone();
		}

		let (now, now_text) = now_ts();
		project.updated_at = now;

		sqlx::query(
			r#"
			UPDATE projects
			SET name = ?, description = ?, status = ?, is_archived = ?, start_date = ?, due_date = ?,
				budget = ?, repository_url = ?, live_url = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&project.name)
		.bind(&project.description)
		.bind(project.status.as_str())
		.bind(project.is_archived as i32)
		.bind(project.start_date.as_ref().map(fmt_date))
		.bind(project.due_date.as_ref().map(fmt_date))
		.bind(&project.budget)
		.bind(&project.repository_url)
		.bind(&project.live_url)
		.bind(now_text)
		.bind(id.to_string())
		.execute(&mut *tx)
		.await?;

		if let Some(tag_ids) = &changes.tag_ids {
			ensure_tags_exist(&mut tx, tag_ids).await?;
			replace_project_tags(&mut tx, id, tag_ids).await?;
		}

		tx.commit().await?;

		tracing::debug!(project_id = %id, "project updated");
		Ok(project)
	}

	/// Delete a project with its tasks, feedback, memberships and every
	/// annotation attached beneath it.
	///
	/// # Returns
	/// `None` if no project was deleted, else the blob references of the
	/// purged attachments.
	#[tracing::instrument(skip(self), fields(project_id = %id))]
	pub async fn delete_project(&self, id: &ProjectId) -> Result<Option<Vec<String>>, DbError> {
		let mut tx = self.pool.begin().await?;

		let files = purge_annotations_for_project(&mut tx, id).await?;

		let result = sqlx::query("DELETE FROM projects WHERE id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;

		if result.rows_affected() == 0 {
			return Ok(None);
		}
		tracing::debug!(project_id = %id, purged_files = files.len(), "project deleted");
		Ok(Some(files))
	}

	// =========================================================================
	// Tags and progress
	// =========================================================================

	#[tracing::instrument(skip(self), fields(project_id = %id))]
	pub async fn list_project_tags(&self, id: &ProjectId) -> Result<Vec<Tag>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT t.id, t.name, t.color, t.created_at
			FROM tags t
			JOIN project_tags pt ON pt.tag_id = t.id
			WHERE pt.project_id = ?
			ORDER BY t.name ASC
			"#,
		)
		.bind(id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_tag).collect()
	}

	/// Count of all tasks in the project and of those that are DONE.
	#[tracing::instrument(skip(self), fields(project_id = %id))]
	pub async fn task_summary(&self, id: &ProjectId) -> Result<TaskSummary, DbError> {
		let row = sqlx::query(
			r#"
			SELECT COUNT(*) AS total,
				COALESCE(SUM(CASE WHEN status = 'DONE' THEN 1 ELSE 0 END), 0) AS completed
			FROM tasks
			WHERE project_id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_one(&self.pool)
		.await?;

		let total: i64 = row.get("total");
		let completed: i64 = row.get("completed");
		Ok(TaskSummary {
			completed: completed as u64,
			total: total as u64,
		})
	}

	// =========================================================================
	// Membership
	// =========================================================================

	/// Add a member.
	///
	/// # Errors
	/// - `DbError::NotFound` if the user does not exist.
	/// - `DbError::Conflict` if the user is already a member. The existing
	///   role is left untouched.
	#[tracing::instrument(skip(self), fields(project_id = %project_id, user_id = %user_id, role = %role))]
	pub async fn add_member(
		&self,
		project_id: &ProjectId,
		user_id: &UserId,
		role: ProjectRole,
	) -> Result<ProjectMembership, DbError> {
		let id = MembershipId::generate();
		let (now, now_text) = now_ts();

		let mut tx = self.pool.begin().await?;

		let user_exists = sqlx::query("SELECT 1 FROM users WHERE id = ?")
			.bind(user_id.to_string())
			.fetch_optional(&mut *tx)
			.await?
			.is_some();
		if !user_exists {
			return Err(DbError::NotFound(format!("User {user_id} not found")));
		}

		sqlx::query(
			r#"
			INSERT INTO project_members (id, project_id, user_id, role, joined_at)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(id.to_string())
		.bind(project_id.to_string())
		.bind(user_id.to_string())
		.bind(role.as_str())
		.bind(now_text)
		.execute(&mut *tx)
		.await
		.map_err(|e| conflict_on_unique(e, "User is already a member of this project"))?;

		tx.commit().await?;

		tracing::debug!(project_id = %project_id, user_id = %user_id, "member added");
		Ok(ProjectMembership {
			id,
			project_id: *project_id,
			user_id: *user_id,
			role,
			joined_at: now,
		})
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id, user_id = %user_id))]
	pub async fn get_membership(
		&self,
		project_id: &ProjectId,
		user_id: &UserId,
	) -> Result<Option<ProjectMembership>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, project_id, user_id, role, joined_at
			FROM project_members
			WHERE project_id = ? AND user_id = ?
			"#,
		)
		.bind(project_id.to_string())
		.bind(user_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_membership(&r)).transpose()
	}

	/// Members with their user records, most recently joined first.
	#[tracing::instrument(skip(self), fields(project_id = %project_id))]
	pub async fn list_members(
		&self,
		project_id: &ProjectId,
	) -> Result<Vec<(ProjectMembership, User)>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT pm.id AS membership_id, pm.project_id, pm.user_id, pm.role, pm.joined_at,
				u.id, u.email, u.first_name, u.last_name, u.job_title, u.profile_picture,
				u.is_superuser, u.created_at
			FROM project_members pm
			JOIN users u ON u.id = pm.user_id
			WHERE pm.project_id = ?
			ORDER BY pm.joined_at DESC, pm.rowid DESC
			"#,
		)
		.bind(project_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter()
			.map(|row| {
				let membership_id: String = row.get("membership_id");
				let project_id: String = row.get("project_id");
				let user_id: String = row.get("user_id");
				let role: String = row.get("role");
				let joined_at: String = row.get("joined_at");
				let membership = ProjectMembership {
					id: MembershipId::new(parse_uuid(&membership_id, "membership ID")?),
					project_id: ProjectId::new(parse_uuid(&project_id, "project_id")?),
					user_id: UserId::new(parse_uuid(&user_id, "user_id")?),
					role: parse_enum(&role, "role")?,
					joined_at: parse_ts(&joined_at, "joined_at")?,
				};
				Ok((membership, row_to_user(row)?))
			})
			.collect()
	}

	/// Member users for several projects in one query, in join order.
	/// Projects without members map to an empty list.
	#[tracing::instrument(skip(self, project_ids), fields(count = project_ids.len()))]
	pub async fn list_member_users(
		&self,
		project_ids: &[ProjectId],
	) -> Result<HashMap<ProjectId, Vec<User>>, DbError> {
		let mut by_project: HashMap<ProjectId, Vec<User>> =
			project_ids.iter().map(|id| (*id, Vec::new())).collect();
		if project_ids.is_empty() {
			return Ok(by_project);
		}

		let rows = sqlx::query(
			r#"
			SELECT pm.project_id, u.id, u.email, u.first_name, u.last_name, u.job_title,
				u.profile_picture, u.is_superuser, u.created_at
			FROM project_members pm
			JOIN users u ON u.id = pm.user_id
			WHERE pm.project_id IN (SELECT value FROM json_each(?))
			ORDER BY pm.joined_at ASC, pm.rowid ASC
			"#,
		)
		.bind(json_id_list(project_ids))
		.fetch_all(&self.pool)
		.await?;

		for row in &rows {
			let project_id: String = row.get("project_id");
			let project_id = ProjectId::new(parse_uuid(&project_id, "project ID")?);
			by_project.entry(project_id).or_default().push(row_to_user(row)?);
		}
		Ok(by_project)
	}

	/// # Returns
	/// `true` if a membership row was updated.
	#[tracing::instrument(skip(self), fields(project_id = %project_id, user_id = %user_id, role = %role))]
	pub async fn update_member_role(
		&self,
		project_id: &ProjectId,
		user_id: &UserId,
		role: ProjectRole,
	) -> Result<bool, DbError> {
		let result =
			sqlx::query("UPDATE project_members SET role = ? WHERE project_id = ? AND user_id = ?")
				.bind(role.as_str())
				.bind(project_id.to_string())
				.bind(user_id.to_string())
				.execute(&self.pool)
				.await?;

		let updated = result.rows_affected() > 0;
		if updated {
			tracing::debug!(project_id = %project_id, user_id = %user_id, "member role updated");
		}
		Ok(updated)
	}

	/// # Returns
	/// `true` if a membership row was removed.
	#[tracing::instrument(skip(self), fields(project_id = %project_id, user_id = %user_id))]
	pub async fn remove_member(
		&self,
		project_id: &ProjectId,
		user_id: &UserId,
	) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM project_members WHERE project_id = ? AND user_id = ?")
			.bind(project_id.to_string())
			.bind(user_id.to_string())
			.execute(&self.pool)
			.await?;

		let removed = result.rows_affected() > 0;
		if removed {
			tracing::debug!(project_id = %project_id, user_id = %user_id, "member removed");
		}
		Ok(removed)
	}
}

async fn replace_project_tags(
	conn: &mut sqlx::SqliteConnection,
	project_id: &ProjectId,
	tag_ids: &[TagId],
) -> Result<(), DbError> {
	sqlx::query("DELETE FROM project_tags WHERE project_id = ?")
		.bind(project_id.to_string())
		.execute(&mut *conn)
		.await?;

	sqlx::query(
		"INSERT OR IGNORE INTO project_tags (project_id, tag_id) SELECT ?, value FROM json_each(?)",
	)
	.bind(project_id.to_string())
	.bind(json_id_list(tag_ids))
	.execute(&mut *conn)
	.await?;
	Ok(())
}

fn row_to_project(row: &sqlx::sqlite::SqliteRow) -> Result<Project, DbError> {
	let id: String = row.get("id");
	let owner_id: String = row.get("owner_id");
	let status: String = row.get("status");
	let is_archived: i32 = row.get("is_archived");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(Project {
		id: ProjectId::new(parse_uuid(&id, "project ID")?),
		name: row.get("name"),
		description: row.get("description"),
		status: parse_enum(&status, "status")?,
		is_archived: is_archived != 0,
		owner_id: UserId::new(parse_uuid(&owner_id, "owner_id")?),
		start_date: parse_opt_date(row.get("start_date"), "start_date")?,
		due_date: parse_opt_date(row.get("due_date"), "due_date")?,
		budget: row.get("budget"),
		repository_url: row.get("repository_url"),
		live_url: row.get("live_url"),
		created_at: parse_ts(&created_at, "created_at")?,
		updated_at: parse_ts(&updated_at, "updated_at")?,
	})
}

fn row_to_membership(row: &sqlx::sqlite::SqliteRow) -> Result<ProjectMembership, DbError> {
	let id: String = row.get("id");
	let project_id: String = row.get("project_id");
	let user_id: String = row.get("user_id");
	let role: String = row.get("role");
	let joined_at: String = row.get("joined_at");

	Ok(ProjectMembership {
		id: MembershipId::new(parse_uuid(&id, "membership ID")?),
		project_id: ProjectId::new(parse_uuid(&project_id, "project_id")?),
		user_id: UserId::new(parse_uuid(&user_id, "user_id")?),
		role: parse_enum(&role, "role")?,
		joined_at: parse_ts(&joined_at, "joined_at")?,
	})
}
