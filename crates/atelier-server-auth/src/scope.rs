// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource scoping: which rows a user may enumerate or address at all.
//!
//! Scopes are plain values. The database layer turns them into `WHERE`
//! clauses; the `permits` predicates here state the same rule in memory and
//! are what the tests pin down.
//!
//! Anything outside a user's scope is reported as "not found" by the HTTP
//! layer, so callers cannot probe for the existence of other projects.

use atelier_common_core::{ProjectId, Task, User, UserId};

/// Which projects a user can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectScope {
	/// Superusers see everything.
	Unrestricted,
	/// Projects the user owns or holds a membership row for.
	OwnedOrMemberOf(UserId),
}

impl ProjectScope {
	pub fn for_user(user: &User) -> Self {
		if user.is_superuser {
			ProjectScope::Unrestricted
		} else {
			ProjectScope::OwnedOrMemberOf(user.id)
		}
	}

	/// The user this scope is restricted to, if any.
	pub fn restricted_to(&self) -> Option<UserId> {
		match self {
			ProjectScope::Unrestricted => None,
			ProjectScope::OwnedOrMemberOf(user_id) => Some(*user_id),
		}
	}

	/// Whether a project with this owner, and with or without a membership row
	/// for the scoped user, is visible.
	pub fn permits(&self, owner_id: UserId, has_membership: bool) -> bool {
		match self {
			ProjectScope::Unrestricted => true,
			ProjectScope::OwnedOrMemberOf(user_id) => *user_id == owner_id || has_membership,
		}
	}
}

/// How a request addressed a task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteContext {
	/// `/projects/{id}/tasks`
	Nested(ProjectId),
	/// `/tasks` or `/tasks/{id}`
	Flat,
}

/// Which tasks a request may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskScope {
	pub projects: ProjectScope,
	pub within_project: Option<ProjectId>,
	/// Only tasks without a parent. Subtasks are then reachable only through
	/// their parent's tree.
	pub top_level_only: bool,
}

impl TaskScope {
	/// Scope for listing a task collection. Nested listings show top-level
	/// tasks of that one project.
	pub fn for_listing(user: &User, route: RouteContext) -> Self {
		let projects = ProjectScope::for_user(user);
		match route {
			RouteContext::Nested(project_id) => Self {
				projects,
				within_project: Some(project_id),
				top_level_only: true,
			},
			RouteContext::Flat => Self {
				projects,
				within_project: None,
				top_level_only: false,
			},
		}
	}

	/// Scope for addressing one task by id on the flat route.
	pub fn for_lookup(user: &User) -> Self {
		Self {
			projects: ProjectScope::for_user(user),
			within_project: None,
			top_level_only: false,
		}
	}

	/// In-memory form of the scope. `project_visible` is the result of
	/// [`ProjectScope::permits`] for the task's project.
	pub fn permits(&self, task: &Task, project_visible: bool) -> bool {
		if !project_visible {
			return false;
		}
		if let Some(project_id) = self.within_project {
			if task.project_id != project_id {
				return false;
			}
		}
		!self.top_level_only || task.is_top_level()
	}
}

/// Which feedback items a request may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackScope {
	pub projects: ProjectScope,
	pub within_project: Option<ProjectId>,
}

impl FeedbackScope {
	pub fn for_listing(user: &User, project_id: ProjectId) -> Self {
		Self {
			projects: ProjectScope::for_user(user),
			within_project: Some(project_id),
		}
	}

	pub fn for_lookup(user: &User) -> Self {
		Self {
			projects: ProjectScope::for_user(user),
			within_project: None,
		}
	}
}
