// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Atelier project-management server.
//!
//! This crate holds the domain model shared by the auth, database, API and
//! server crates. It has no I/O.
//!
//! # Overview
//!
//! - Projects own tasks, feedback and memberships
//! - Tasks form a tree inside a single project
//! - Tags are global and attach to both projects and tasks
//! - Comments and attachments reference their target through [`EntityRef`]
//! - [`OwningProject`] maps any project-scoped resource to the project whose
//!   membership governs access to it

pub mod annotation;
pub mod error;
pub mod feedback;
pub mod id;
pub mod project;
pub mod tag;
pub mod task;
pub mod user;

pub use annotation::{
	Attachment, Comment, EntityKind, EntityRef, MAX_ATTACHMENT_DESCRIPTION_LEN,
};
pub use error::{CoreError, Result};
pub use feedback::{Feedback, FeedbackStatus, FeedbackType};
pub use id::{
	AccessTokenId, AttachmentId, CommentId, FeedbackId, MembershipId, ProjectId, TagId, TaskId,
	UserId,
};
pub use project::{
	days_remaining, validate_decimal, NewProject, OwningProject, Project, ProjectChanges,
	ProjectMembership, ProjectRole, ProjectStatus, TaskSummary,
};
pub use tag::{validate_color, Tag, DEFAULT_TAG_COLOR, MAX_TAG_NAME_LEN};
pub use task::{NewTask, Task, TaskChanges, TaskPriority, TaskStatus};
pub use user::User;
