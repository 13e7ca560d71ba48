// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Task request and response types.

use atelier_common_core::{Tag, Task, TaskPriority, TaskStatus, User};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::tags::TagResponse;
use crate::users::UserSummaryResponse;

/// A task with its subtree embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TaskResponse {
	pub id: String,
	pub project_id: String,
	pub parent_task_id: Option<String>,
	pub title: String,
	pub description: String,
	pub status: TaskStatus,
	pub priority: TaskPriority,
	pub assignee: Option<UserSummaryResponse>,
	pub originating_feedback_id: Option<String>,
	pub start_date: Option<DateTime<Utc>>,
	pub due_date: Option<NaiveDate>,
	pub estimated_hours: Option<String>,
	pub tags: Vec<TagResponse>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	#[cfg_attr(feature = "openapi", schema(no_recursion))]
	pub subtasks: Vec<TaskResponse>,
}

impl TaskResponse {
	/// A node without children; the tree renderer fills `subtasks`.
	pub fn leaf(task: &Task, tags: &[Tag], assignee: Option<&User>) -> Self {
		Self {
			id: task.id.to_string(),
			project_id: task.project_id.to_string(),
			parent_task_id: task.parent_task_id.map(|id| id.to_string()),
			title: task.title.clone(),
			description: task.description.clone(),
			status: task.status,
			priority: task.priority,
			assignee: assignee.map(UserSummaryResponse::from),
			originating_feedback_id: task.originating_feedback_id.map(|id| id.to_string()),
			start_date: task.start_date,
			due_date: task.due_date,
			estimated_hours: task.estimated_hours.clone(),
			tags: tags.iter().map(TagResponse::from).collect(),
			created_at: task.created_at,
			updated_at: task.updated_at,
			subtasks: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateTaskRequest {
	/// Required on `POST /api/tasks`; ignored on the nested route.
	#[serde(default)]
	pub project_id: Option<String>,
	pub title: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub status: Option<TaskStatus>,
	#[serde(default)]
	pub priority: Option<TaskPriority>,
	#[serde(default)]
	pub parent_task_id: Option<String>,
	#[serde(default)]
	pub assignee_id: Option<String>,
	#[serde(default)]
	pub originating_feedback_id: Option<String>,
	#[serde(default)]
	pub start_date: Option<DateTime<Utc>>,
	#[serde(default)]
	pub due_date: Option<NaiveDate>,
	#[serde(default)]
	pub estimated_hours: Option<String>,
	#[serde(default)]
	pub tag_ids: Vec<String>,
}

/// Body of PUT and PATCH on a task. PUT additionally requires `title`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateTaskRequest {
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub status: Option<TaskStatus>,
	#[serde(default)]
	pub priority: Option<TaskPriority>,
	#[serde(default, deserialize_with = "crate::nullable::deserialize")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
	pub parent_task_id: Option<Option<String>>,
	#[serde(default, deserialize_with = "crate::nullable::deserialize")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
	pub assignee_id: Option<Option<String>>,
	#[serde(default, deserialize_with = "crate::nullable::deserialize")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
	pub originating_feedback_id: Option<Option<String>>,
	#[serde(default, deserialize_with = "crate::nullable::deserialize")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<DateTime<Utc>>))]
	pub start_date: Option<Option<DateTime<Utc>>>,
	#[serde(default, deserialize_with = "crate::nullable::deserialize")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<NaiveDate>))]
	pub due_date: Option<Option<NaiveDate>>,
	#[serde(default, deserialize_with = "crate::nullable::deserialize")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
	pub estimated_hours: Option<Option<String>>,
	#[serde(default)]
	pub tag_ids: Option<Vec<String>>,
}

/// Body of `POST /api/tasks/{id}/manage-tags`.
///
/// `action` stays a string so an unknown value surfaces as `invalid_action`
/// rather than a generic body error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ManageTagsRequest {
	pub tag_id: String,
	/// `add` or `remove`.
	pub action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAction {
	Add,
	Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tag action: {0}")]
pub struct UnknownTagAction(pub String);

impl TagAction {
	pub fn as_str(&self) -> &'static str {
		match self {
			TagAction::Add => "add",
			TagAction::Remove => "remove",
		}
	}
}

impl fmt::Display for TagAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TagAction {
	type Err = UnknownTagAction;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"add" => Ok(TagAction::Add),
			"remove" => Ok(TagAction::Remove),
			_ => Err(UnknownTagAction(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use atelier_common_core::{ProjectId, TaskId};

	#[test]
	fn tag_action_accepts_lowercase_only() {
		assert_eq!("add".parse::<TagAction>().unwrap(), TagAction::Add);
		assert_eq!("remove".parse::<TagAction>().unwrap(), TagAction::Remove);
		assert!("ADD".parse::<TagAction>().is_err());
		assert!("toggle".parse::<TagAction>().is_err());
	}

	#[test]
	fn leaf_has_no_subtasks() {
		let now = Utc::now();
		let task = Task {
			id: TaskId::generate(),
			project_id: ProjectId::generate(),
			parent_task_id: None,
			title: "Write docs".to_string(),
			description: String::new(),
			status: TaskStatus::Todo,
			priority: TaskPriority::High,
			assignee_id: None,
			originating_feedback_id: None,
			start_date: None,
			due_date: None,
			estimated_hours: Some("2.50".to_string()),
			created_at: now,
			updated_at: now,
		};

		let node = TaskResponse::leaf(&task, &[], None);
		let json = serde_json::to_value(&node).unwrap();
		assert_eq!(json["subtasks"], serde_json::json!([]));
		assert_eq!(json["priority"], "HIGH");
		assert!(json["assignee"].is_null());
	}

	#[test]
	fn patch_can_detach_from_parent() {
		let req: UpdateTaskRequest = serde_json::from_str(r#"{"parent_task_id": null}"#).unwrap();
		assert_eq!(req.parent_task_id, Some(None));
		assert_eq!(req.title, None);
	}
}
