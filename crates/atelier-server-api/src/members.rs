// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use atelier_common_core::{ProjectMembership, ProjectRole, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AddMemberRequest {
	pub user_id: String,
	/// Defaults to DEVELOPER.
	#[serde(default)]
	pub role: Option<ProjectRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateMemberRoleRequest {
	pub role: ProjectRole,
}

/// Entry in `GET /api/projects/{id}/members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MemberDetailResponse {
	pub user_id: String,
	pub full_name: String,
	pub email: String,
	pub job_title: Option<String>,
	pub profile_picture: Option<String>,
	pub role: ProjectRole,
	pub joined_at: DateTime<Utc>,
}

impl MemberDetailResponse {
	pub fn new(membership: &ProjectMembership, user: &User) -> Self {
		Self {
			user_id: user.id.to_string(),
			full_name: user.full_name(),
			email: user.email.clone(),
			job_title: user.job_title.clone(),
			profile_picture: user.profile_picture.clone(),
			role: membership.role,
			joined_at: membership.joined_at,
		}
	}
}
