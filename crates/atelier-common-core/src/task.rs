// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tasks and their status/priority enums.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::id::{FeedbackId, ProjectId, TagId, TaskId, UserId};
use crate::project::OwningProject;

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
	#[default]
	Todo,
	InProgress,
	InReview,
	Done,
	Blocked,
}

impl TaskStatus {
	pub fn all() -> &'static [TaskStatus] {
		&[
			TaskStatus::Todo,
			TaskStatus::InProgress,
			TaskStatus::InReview,
			TaskStatus::Done,
			TaskStatus::Blocked,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			TaskStatus::Todo => "TODO",
			TaskStatus::InProgress => "IN_PROGRESS",
			TaskStatus::InReview => "IN_REVIEW",
			TaskStatus::Done => "DONE",
			TaskStatus::Blocked => "BLOCKED",
		}
	}
}

impl fmt::Display for TaskStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TaskStatus {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"TODO" => Ok(TaskStatus::Todo),
			"IN_PROGRESS" => Ok(TaskStatus::InProgress),
			"IN_REVIEW" => Ok(TaskStatus::InReview),
			"DONE" => Ok(TaskStatus::Done),
			"BLOCKED" => Ok(TaskStatus::Blocked),
			_ => Err(CoreError::InvalidTaskStatus(s.to_string())),
		}
	}
}

/// Priority of a task. Declaration order is ascending urgency.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
	Low,
	#[default]
	Medium,
	High,
	Urgent,
}

impl TaskPriority {
	pub fn all() -> &'static [TaskPriority] {
		&[
			TaskPriority::Low,
			TaskPriority::Medium,
			TaskPriority::High,
			TaskPriority::Urgent,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			TaskPriority::Low => "LOW",
			TaskPriority::Medium => "MEDIUM",
			TaskPriority::High => "HIGH",
			TaskPriority::Urgent => "URGENT",
		}
	}

	/// Sort key used by listings; higher is more urgent.
	pub fn rank(&self) -> i64 {
		match self {
			TaskPriority::Low => 0,
			TaskPriority::Medium => 1,
			TaskPriority::High => 2,
			TaskPriority::Urgent => 3,
		}
	}
}

impl fmt::Display for TaskPriority {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TaskPriority {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"LOW" => Ok(TaskPriority::Low),
			"MEDIUM" => Ok(TaskPriority::Medium),
			"HIGH" => Ok(TaskPriority::High),
			"URGENT" => Ok(TaskPriority::Urgent),
			_ => Err(CoreError::InvalidTaskPriority(s.to_string())),
		}
	}
}

/// A task inside a project, optionally nested under a parent task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Task {
	pub id: TaskId,
	pub project_id: ProjectId,
	pub parent_task_id: Option<TaskId>,
	pub title: String,
	pub description: String,
	pub status: TaskStatus,
	pub priority: TaskPriority,
	pub assignee_id: Option<UserId>,
	pub originating_feedback_id: Option<FeedbackId>,
	pub start_date: Option<DateTime<Utc>>,
	pub due_date: Option<NaiveDate>,
	/// Decimal with at most two fractional digits, kept as text.
	pub estimated_hours: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Task {
	pub fn is_top_level(&self) -> bool {
		self.parent_task_id.is_none()
	}
}

impl OwningProject for Task {
	fn owning_project_id(&self) -> ProjectId {
		self.project_id
	}
}

/// Fields accepted when creating a task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
	pub title: String,
	pub description: String,
	pub status: TaskStatus,
	pub priority: TaskPriority,
	pub parent_task_id: Option<TaskId>,
	pub assignee_id: Option<UserId>,
	pub originating_feedback_id: Option<FeedbackId>,
	pub start_date: Option<DateTime<Utc>>,
	pub due_date: Option<NaiveDate>,
	pub estimated_hours: Option<String>,
	pub tag_ids: Vec<TagId>,
}

/// A partial update. `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
	pub title: Option<String>,
	pub description: Option<String>,
	pub status: Option<TaskStatus>,
	pub priority: Option<TaskPriority>,
	pub parent_task_id: Option<Option<TaskId>>,
	pub assignee_id: Option<Option<UserId>>,
	pub originating_feedback_id: Option<Option<FeedbackId>>,
	pub start_date: Option<Option<DateTime<Utc>>>,
	pub due_date: Option<Option<NaiveDate>>,
	pub estimated_hours: Option<Option<String>>,
	pub tag_ids: Option<Vec<TagId>>,
}
