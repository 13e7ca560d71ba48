// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire types for the Atelier HTTP API.
//!
//! Identifiers travel as strings; handlers parse them into typed ids.

pub mod annotations;
pub mod error;
pub mod feedback;
pub mod health;
pub mod members;
pub mod nullable;
pub mod projects;
pub mod tags;
pub mod tasks;
pub mod users;

pub use annotations::{AddCommentRequest, AttachmentResponse, CommentResponse};
pub use error::ErrorResponse;
pub use feedback::{CreateFeedbackRequest, FeedbackResponse, UpdateFeedbackRequest};
pub use health::HealthResponse;
pub use members::{AddMemberRequest, MemberDetailResponse, UpdateMemberRoleRequest};
pub use projects::{
	CreateProjectRequest, MemberAvatarResponse, ProjectDetailResponse, ProjectMemberResponse,
	ProjectSummaryResponse, TasksSummaryResponse, UpdateProjectRequest,
};
pub use tags::{CreateTagRequest, TagResponse};
pub use tasks::{
	CreateTaskRequest, ManageTagsRequest, TagAction, TaskResponse, UnknownTagAction,
	UpdateTaskRequest,
};
pub use users::UserSummaryResponse;
