// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Nested task rendering.
//!
//! A [`TaskForest`] holds every task of one or more projects together with
//! their tags and assignees, loaded up front. Rendering a node is then a pure
//! walk over in-memory maps. The walk tracks visited ids and a depth bound so
//! that corrupt parent links produce an error instead of unbounded recursion.

use atelier_common_core::{Tag, Task, TaskId, User, UserId};
use atelier_server_api::TaskResponse;
use std::collections::{HashMap, HashSet};

/// Deepest nesting rendered before giving up.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
	#[error("task {0} appears twice in its own subtree")]
	Cycle(TaskId),

	#[error("task tree below {0} is deeper than {MAX_DEPTH} levels")]
	TooDeep(TaskId),

	#[error("task {0} is not loaded")]
	Missing(TaskId),
}

#[derive(Debug, Default)]
pub struct TaskForest {
	tasks: HashMap<TaskId, Task>,
	/// Children in listing order.
	children: HashMap<TaskId, Vec<TaskId>>,
	tags: HashMap<TaskId, Vec<Tag>>,
	users: HashMap<UserId, User>,
}

impl TaskForest {
	/// `tasks` must already be in listing order; children keep that order.
	pub fn new(
		tasks: Vec<Task>,
		tags: HashMap<TaskId, Vec<Tag>>,
		users: HashMap<UserId, User>,
	) -> Self {
		let mut children: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
		for task in &tasks {
			if let Some(parent) = task.parent_task_id {
				children.entry(parent).or_default().push(task.id);
			}
		}

		Self {
			tasks: tasks.into_iter().map(|t| (t.id, t)).collect(),
			children,
			tags,
			users,
		}
	}

	/// Render `root` with its full subtree.
	pub fn render(&self, root: &TaskId) -> Result<TaskResponse, TreeError> {
		let mut visited = HashSet::new();
		self.render_node(root, 0, &mut visited)
	}

	fn render_node(
		&self,
		id: &TaskId,
		depth: usize,
		visited: &mut HashSet<TaskId>,
	) -> Result<TaskResponse, TreeError> {
		if depth >= MAX_DEPTH {
			return Err(TreeError::TooDeep(*id));
		}
		if !visited.insert(*id) {
			return Err(TreeError::Cycle(*id));
		}

		let task = self.tasks.get(id).ok_or(TreeError::Missing(*id))?;
		let tags = self.tags.get(id).map(Vec::as_slice).unwrap_or_default();
		let assignee = task.assignee_id.and_then(|uid| self.users.get(&uid));

		let mut node = TaskResponse::leaf(task, tags, assignee);
		if let Some(child_ids) = self.children.get(id) {
			node.subtasks = child_ids
				.iter()
				.map(|child| self.render_node(child, depth + 1, visited))
				.collect::<Result<_, _>>()?;
		}
		Ok(node)
	}
}
