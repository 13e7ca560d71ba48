// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQL renderings of the resource scopes.
//!
//! Each fragment takes its parameters as nullable binds so one statement
//! serves both superusers (`NULL`, no restriction) and ordinary users.

use atelier_server_auth::{FeedbackScope, ProjectScope, TaskScope};
use sqlx::sqlite::{Sqlite, SqliteArguments};

pub(crate) type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Visibility predicate over a `projects` row aliased `p`. Binds the scoped
/// user id three times.
macro_rules! project_visible {
	() => {
		"(? IS NULL OR p.owner_id = ? OR EXISTS (SELECT 1 FROM project_members pm WHERE pm.project_id = p.id AND pm.user_id = ?))"
	};
}

pub(crate) use project_visible;

pub(crate) fn bind_project_scope<'q>(query: SqliteQuery<'q>, scope: &ProjectScope) -> SqliteQuery<'q> {
	let user = scope.restricted_to().map(|u| u.to_string());
	query.bind(user.clone()).bind(user.clone()).bind(user)
}

/// Task predicate over `tasks t JOIN projects p`. Binds the project scope,
/// then the project filter twice, then the top-level flag.
macro_rules! task_in_scope {
	() => {
		concat!(
			crate::scope::project_visible!(),
			" AND (? IS NULL OR t.project_id = ?) AND (? = 0 OR t.parent_task_id IS NULL)"
		)
	};
}

pub(crate) use task_in_scope;

pub(crate) fn bind_task_scope<'q>(query: SqliteQuery<'q>, scope: &TaskScope) -> SqliteQuery<'q> {
	let project = scope.within_project.map(|p| p.to_string());
	bind_project_scope(query, &scope.projects)
		.bind(project.clone())
		.bind(project)
		.bind(scope.top_level_only as i32)
}

/// Feedback predicate over `feedback f JOIN projects p`.
macro_rules! feedback_in_scope {
	() => {
		concat!(
			crate::scope::project_visible!(),
			" AND (? IS NULL OR f.project_id = ?)"
		)
	};
}

pub(crate) use feedback_in_scope;

pub(crate) fn bind_feedback_scope<'q>(
	query: SqliteQuery<'q>,
	scope: &FeedbackScope,
) -> SqliteQuery<'q> {
	let project = scope.within_project.map(|p| p.to_string());
	bind_project_scope(query, &scope.projects)
		.bind(project.clone())
		.bind(project)
}
