// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use atelier_common_core::{NewProject, NewTask, Project, ProjectId, Task, User};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::migrations::run_migrations;
use crate::project::ProjectRepository;
use crate::task::TaskRepository;
use crate::user::{NewUser, UserRepository};

/// Single-connection in-memory pool with the full schema applied.
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.foreign_keys(true)
		.create_if_missing(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.expect("Failed to create test pool");

	run_migrations(&pool).await.expect("migrations failed");
	pool
}

pub fn new_user(email: &str) -> NewUser {
	let local = email.split('@').next().unwrap_or(email);
	NewUser {
		email: email.to_string(),
		first_name: local.to_string(),
		last_name: "Tester".to_string(),
		..Default::default()
	}
}

pub async fn make_user(pool: &SqlitePool, email: &str) -> User {
	UserRepository::new(pool.clone())
		.create_user(&new_user(email))
		.await
		.unwrap()
}

pub async fn make_project(pool: &SqlitePool, owner: &User, name: &str) -> Project {
	ProjectRepository::new(pool.clone())
		.create_project(
			&owner.id,
			&NewProject {
				name: name.to_string(),
				..Default::default()
			},
		)
		.await
		.unwrap()
}

pub async fn make_task(pool: &SqlitePool, project_id: ProjectId, title: &str) -> Task {
	make_subtask(pool, project_id, None, title).await
}

pub async fn make_subtask(
	pool: &SqlitePool,
	project_id: ProjectId,
	parent: Option<&Task>,
	title: &str,
) -> Task {
	TaskRepository::new(pool.clone())
		.create_task(
			&project_id,
			&NewTask {
				title: title.to_string(),
				parent_task_id: parent.map(|p| p.id),
				..Default::default()
			},
		)
		.await
		.unwrap()
}
