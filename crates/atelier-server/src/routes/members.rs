// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Project membership HTTP handlers.

use atelier_common_core::{ProjectId, UserId};
use atelier_server_api::ErrorResponse;
use atelier_server_auth::{Action, ResourceAttrs, ResourceType};
use axum::{
	extract::{rejection::JsonRejection, Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};

pub use atelier_server_api::members::*;

use crate::{
	abac_middleware::authorize, api::AppState, auth_middleware::RequireAuth, error::ApiError,
	routes::projects::find_project, validation::parse_id,
};

#[utoipa::path(
    get,
    path = "/api/projects/{id}/members",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Members in join order", body = Vec<MemberDetailResponse>),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "members"
)]
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id, project_id = %id))]
pub async fn list_members(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
	let project_id: ProjectId = parse_id(&id, "project_id")?;
	let project = find_project(&state, &current_user, &project_id).await?;

	authorize(
		&current_user,
		Action::List,
		ResourceAttrs::owned_by(ResourceType::Membership, &project),
		&state.project_repo,
	)
	.await?;

	let members = state.project_repo.list_members(&project_id).await?;
	let body: Vec<MemberDetailResponse> = members
		.iter()
		.map(|(membership, user)| MemberDetailResponse::new(membership, user))
		.collect();
	Ok(Json(body))
}

#[utoipa::path(
    post,
    path = "/api/projects/{id}/members",
    params(("id" = String, Path, description = "Project ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MemberDetailResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Owner or admin required", body = ErrorResponse),
        (status = 404, description = "Project or user not found", body = ErrorResponse),
        (status = 409, description = "Already a member", body = ErrorResponse)
    ),
    tag = "members"
)]
/// Add a user to a project. The role defaults to DEVELOPER.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id, project_id = %id))]
pub async fn add_member(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<AddMemberRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let project_id: ProjectId = parse_id(&id, "project_id")?;
	let project = find_project(&state, &current_user, &project_id).await?;

	authorize(
		&current_user,
		Action::ManageMembers,
		ResourceAttrs::owned_by(ResourceType::Membership, &project),
		&state.project_repo,
	)
	.await?;

	let Json(req) = payload?;
	let member_id: UserId = parse_id(&req.user_id, "user_id")?;
	let role = req.role.unwrap_or_default();

	let membership = state
		.project_repo
		.add_member(&project_id, &member_id, role)
		.await?;
	let user = state
		.user_repo
		.get_user_by_id(&member_id)
		.await?
		.ok_or_else(|| ApiError::not_found("User not found"))?;

	tracing::info!(project_id = %project_id, member_id = %member_id, role = %role, "member added");
	Ok((
		StatusCode::CREATED,
		Json(MemberDetailResponse::new(&membership, &user)),
	))
}

#[utoipa::path(
    patch,
    path = "/api/projects/{id}/members/{user_id}",
    params(
        ("id" = String, Path, description = "Project ID"),
        ("user_id" = String, Path, description = "Member user ID")
    ),
    request_body = UpdateMemberRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = MemberDetailResponse),
        (status = 403, description = "Owner or admin required", body = ErrorResponse),
        (status = 404, description = "Project or member not found", body = ErrorResponse)
    ),
    tag = "members"
)]
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id, project_id = %id, member_id = %member))]
pub async fn update_member_role(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path((id, member)): Path<(String, String)>,
	payload: Result<Json<UpdateMemberRoleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let project_id: ProjectId = parse_id(&id, "project_id")?;
	let member_id: UserId = parse_id(&member, "user_id")?;
	let project = find_project(&state, &current_user, &project_id).await?;

	authorize(
		&current_user,
		Action::ManageMembers,
		ResourceAttrs::owned_by(ResourceType::Membership, &project),
		&state.project_repo,
	)
	.await?;

	let Json(req) = payload?;
	if !state
		.project_repo
		.update_member_role(&project_id, &member_id, req.role)
		.await?
	{
		return Err(ApiError::not_found("Member not found"));
	}

	let membership = state
		.project_repo
		.get_membership(&project_id, &member_id)
		.await?
		.ok_or_else(|| ApiError::not_found("Member not found"))?;
	let user = state
		.user_repo
		.get_user_by_id(&member_id)
		.await?
		.ok_or_else(|| ApiError::not_found("User not found"))?;

	Ok(Json(MemberDetailResponse::new(&membership, &user)))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}/members/{user_id}",
    params(
        ("id" = String, Path, description = "Project ID"),
        ("user_id" = String, Path, description = "Member user ID")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 400, description = "The owner cannot be removed", body = ErrorResponse),
        (status = 403, description = "Owner or admin required", body = ErrorResponse),
        (status = 404, description = "Project or member not found", body = ErrorResponse)
    ),
    tag = "members"
)]
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id, project_id = %id, member_id = %member))]
pub async fn remove_member(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path((id, member)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
	let project_id: ProjectId = parse_id(&id, "project_id")?;
	let member_id: UserId = parse_id(&member, "user_id")?;
	let project = find_project(&state, &current_user, &project_id).await?;

	authorize(
		&current_user,
		Action::ManageMembers,
		ResourceAttrs::owned_by(ResourceType::Membership, &project),
		&state.project_repo,
	)
	.await?;

	if member_id == project.owner_id {
		return Err(ApiError::invalid_field(
			"user_id",
			"the project owner cannot be removed",
		));
	}

	if !state.project_repo.remove_member(&project_id, &member_id).await? {
		return Err(ApiError::not_found("Member not found"));
	}

	tracing::info!(project_id = %project_id, member_id = %member_id, "member removed");
	Ok(StatusCode::NO_CONTENT)
}
