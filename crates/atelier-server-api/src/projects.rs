// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Project request and response types.

use atelier_common_core::{
	days_remaining, Project, ProjectMembership, ProjectRole, ProjectStatus, Tag, TaskSummary, User,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::tags::TagResponse;

/// Avatar entry in the project list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MemberAvatarResponse {
	pub id: String,
	pub full_name: String,
	pub profile_picture: Option<String>,
}

impl From<&User> for MemberAvatarResponse {
	fn from(user: &User) -> Self {
		Self {
			id: user.id.to_string(),
			full_name: user.full_name(),
			profile_picture: user.profile_picture.clone(),
		}
	}
}

/// Row in `GET /api/projects`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ProjectSummaryResponse {
	pub id: String,
	pub name: String,
	pub description: String,
	pub status: ProjectStatus,
	pub is_archived: bool,
	pub due_date: Option<NaiveDate>,
	pub owner_name: String,
	pub members: Vec<MemberAvatarResponse>,
}

impl ProjectSummaryResponse {
	pub fn new(project: &Project, owner: &User, members: &[User]) -> Self {
		Self {
			id: project.id.to_string(),
			name: project.name.clone(),
			description: project.description.clone(),
			status: project.status,
			is_archived: project.is_archived,
			due_date: project.due_date,
			owner_name: owner.full_name(),
			members: members.iter().map(MemberAvatarResponse::from).collect(),
		}
	}
}

/// Membership entry embedded in the project detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ProjectMemberResponse {
	pub id: String,
	pub user_id: String,
	pub full_name: String,
	pub email: String,
	pub role: ProjectRole,
}

impl ProjectMemberResponse {
	pub fn new(membership: &ProjectMembership, user: &User) -> Self {
		Self {
			id: membership.id.to_string(),
			user_id: user.id.to_string(),
			full_name: user.full_name(),
			email: user.email.clone(),
			role: membership.role,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TasksSummaryResponse {
	pub completed: u64,
	pub total: u64,
}

impl From<TaskSummary> for TasksSummaryResponse {
	fn from(summary: TaskSummary) -> Self {
		Self {
			completed: summary.completed,
			total: summary.total,
		}
	}
}

/// Full project view with computed progress figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ProjectDetailResponse {
	pub id: String,
	pub name: String,
	pub description: String,
	pub status: ProjectStatus,
	pub is_archived: bool,
	/// The owner's email.
	pub owner: String,
	pub start_date: Option<NaiveDate>,
	pub due_date: Option<NaiveDate>,
	pub budget: Option<String>,
	pub repository_url: Option<String>,
	pub live_url: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub tags: Vec<TagResponse>,
	pub members: Vec<ProjectMemberResponse>,
	pub progress_percentage: u32,
	pub tasks_summary: TasksSummaryResponse,
	/// Signed; negative once the due date has passed.
	pub days_remaining: Option<i64>,
}

/// Everything the detail view is assembled from.
pub struct ProjectDetailParts<'a> {
	pub project: &'a Project,
	pub owner: &'a User,
	pub tags: &'a [Tag],
	pub members: &'a [(ProjectMembership, User)],
	pub summary: TaskSummary,
	pub today: NaiveDate,
}

impl ProjectDetailResponse {
	pub fn new(parts: ProjectDetailParts<'_>) -> Self {
		let project = parts.project;
		Self {
			id: project.id.to_string(),
			name: project.name.clone(),
			description: project.description.clone(),
			status: project.status,
			is_archived: project.is_archived,
			owner: parts.owner.email.clone(),
			start_date: project.start_date,
			due_date: project.due_date,
			budget: project.budget.clone(),
			repository_url: project.repository_url.clone(),
			live_url: project.live_url.clone(),
			created_at: project.created_at,
			updated_at: project.updated_at,
			tags: parts.tags.iter().map(TagResponse::from).collect(),
			members: parts
				.members
				.iter()
				.map(|(m, u)| ProjectMemberResponse::new(m, u))
				.collect(),
			progress_percentage: parts.summary.progress_percentage(),
			tasks_summary: parts.summary.into(),
			days_remaining: days_remaining(project.due_date, parts.today),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateProjectRequest {
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub status: Option<ProjectStatus>,
	#[serde(default)]
	pub is_archived: bool,
	#[serde(default)]
	pub start_date: Option<NaiveDate>,
	#[serde(default)]
	pub due_date: Option<NaiveDate>,
	/// Decimal string, at most two fractional digits.
	#[serde(default)]
	pub budget: Option<String>,
	#[serde(default)]
	pub repository_url: Option<String>,
	#[serde(default)]
	pub live_url: Option<String>,
	#[serde(default)]
	pub tag_ids: Vec<String>,
}

/// Body of PUT and PATCH. PUT additionally requires `name`.
///
/// For nullable fields an explicit `null` clears the value and an absent key
/// leaves it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateProjectRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub status: Option<ProjectStatus>,
	#[serde(default)]
	pub is_archived: Option<bool>,
	#[serde(default, deserialize_with = "crate::nullable::deserialize")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<NaiveDate>))]
	pub start_date: Option<Option<NaiveDate>>,
	#[serde(default, deserialize_with = "crate::nullable::deserialize")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<NaiveDate>))]
	pub due_date: Option<Option<NaiveDate>>,
	#[serde(default, deserialize_with = "crate::nullable::deserialize")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
	pub budget: Option<Option<String>>,
	#[serde(default, deserialize_with = "crate::nullable::deserialize")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
	pub repository_url: Option<Option<String>>,
	#[serde(default, deserialize_with = "crate::nullable::deserialize")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
	pub live_url: Option<Option<String>>,
	#[serde(default)]
	pub tag_ids: Option<Vec<String>>,
}
