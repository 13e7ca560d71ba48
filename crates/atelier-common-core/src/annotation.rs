// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Comments and attachments, and the polymorphic reference they hang off.
//!
//! An annotation does not know the concrete type of the thing it annotates.
//! It stores an [`EntityRef`]: a closed [`EntityKind`] discriminator plus the
//! target's UUID. Lookups always match on both halves, so a task and a
//! feedback item that happen to share an id never see each other's
//! annotations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;
use crate::id::{AttachmentId, CommentId, FeedbackId, TaskId, UserId};

/// The kinds of entity that accept annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
	Task,
	Feedback,
}

impl EntityKind {
	pub fn all() -> &'static [EntityKind] {
		&[EntityKind::Task, EntityKind::Feedback]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			EntityKind::Task => "task",
			EntityKind::Feedback => "feedback",
		}
	}
}

impl fmt::Display for EntityKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for EntityKind {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"task" => Ok(EntityKind::Task),
			"feedback" => Ok(EntityKind::Feedback),
			_ => Err(CoreError::InvalidEntityKind(s.to_string())),
		}
	}
}

/// A typed pointer at an annotatable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EntityRef {
	pub kind: EntityKind,
	pub id: Uuid,
}

impl EntityRef {
	pub fn new(kind: EntityKind, id: Uuid) -> Self {
		Self { kind, id }
	}
}

impl From<TaskId> for EntityRef {
	fn from(id: TaskId) -> Self {
		Self::new(EntityKind::Task, id.into_inner())
	}
}

impl From<FeedbackId> for EntityRef {
	fn from(id: FeedbackId) -> Self {
		Self::new(EntityKind::Feedback, id.into_inner())
	}
}

impl fmt::Display for EntityRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.kind, self.id)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Comment {
	pub id: CommentId,
	pub target: EntityRef,
	pub author_id: UserId,
	pub text: String,
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Attachment {
	pub id: AttachmentId,
	pub target: EntityRef,
	pub uploaded_by: UserId,
	/// Blob store reference, e.g. `attachments/2025/03/10/<uuid>.pdf`.
	pub file: String,
	pub description: String,
	pub uploaded_at: DateTime<Utc>,
}

pub const MAX_ATTACHMENT_DESCRIPTION_LEN: usize = 255;
