// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Project HTTP handlers.
//!
//! Listing and lookup go through [`ProjectScope`], so a project the caller
//! neither owns nor belongs to answers 404. Mutations are then checked
//! against the caller's role on the project.

use atelier_common_core::{NewProject, Project, ProjectChanges, ProjectId, TagId};
use atelier_server_auth::{Action, CurrentUser, ProjectScope, ResourceAttrs, ResourceType};
use axum::{
	extract::{rejection::JsonRejection, Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use chrono::Utc;

pub use atelier_server_api::projects::*;
use atelier_server_api::ErrorResponse;

use crate::{
	abac_middleware::authorize,
	api::AppState,
	auth_middleware::RequireAuth,
	error::ApiError,
	routes::annotations,
	validation::{
		parse_id, parse_ids, validate_decimal_field, validate_length, validate_url, BUDGET_DIGITS,
		MAX_PROJECT_NAME_LEN,
	},
};

/// Load a project through the caller's scope.
///
/// # Errors
/// [`ApiError::NotFound`] if the project is missing or not visible.
pub(crate) async fn find_project(
	state: &AppState,
	current_user: &CurrentUser,
	project_id: &ProjectId,
) -> Result<Project, ApiError> {
	state
		.project_repo
		.get_project_in_scope(project_id, &ProjectScope::for_user(&current_user.user))
		.await?
		.ok_or_else(|| ApiError::not_found("Project not found"))
}

async fn project_detail(state: &AppState, project: &Project) -> Result<ProjectDetailResponse, ApiError> {
	let owner = state
		.user_repo
		.get_user_by_id(&project.owner_id)
		.await?
		.ok_or_else(|| ApiError::Internal(format!("owner of project {} is missing", project.id)))?;
	let tags = state.project_repo.list_project_tags(&project.id).await?;
	let members = state.project_repo.list_members(&project.id).await?;
	let summary = state.project_repo.task_summary(&project.id).await?;

	Ok(ProjectDetailResponse::new(ProjectDetailParts {
		project,
		owner: &owner,
		tags: &tags,
		members: &members,
		summary,
		today: Utc::now().date_naive(),
	}))
}

fn validate_project_fields(
	name: Option<&str>,
	budget: Option<&str>,
	repository_url: Option<&str>,
	live_url: Option<&str>,
) -> Result<(), ApiError> {
	if let Some(name) = name {
		validate_length("name", name, 1, MAX_PROJECT_NAME_LEN)?;
	}
	validate_decimal_field("budget", budget, BUDGET_DIGITS)?;
	validate_url("repository_url", repository_url)?;
	validate_url("live_url", live_url)?;
	Ok(())
}

#[utoipa::path(
    get,
    path = "/api/projects",
    responses(
        (status = 200, description = "Projects visible to the caller", body = Vec<ProjectSummaryResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "projects"
)]
/// List the projects the caller owns or belongs to, newest first.
///
/// Superusers see every project.
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id))]
pub async fn list_projects(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
	let scope = ProjectScope::for_user(&current_user.user);
	let projects = state.project_repo.list_projects(&scope).await?;

	let project_ids: Vec<ProjectId> = projects.iter().map(|p| p.id).collect();
	let mut owner_ids: Vec<_> = projects.iter().map(|p| p.owner_id).collect();
	owner_ids.sort();
	owner_ids.dedup();

	let owners = state.user_repo.get_users_by_ids(&owner_ids).await?;
	let members = state.project_repo.list_member_users(&project_ids).await?;

	let mut summaries = Vec::with_capacity(projects.len());
	for project in &projects {
		let owner = owners
			.get(&project.owner_id)
			.ok_or_else(|| ApiError::Internal(format!("owner of project {} is missing", project.id)))?;
		let project_members = members.get(&project.id).map(Vec::as_slice).unwrap_or(&[]);
		summaries.push(ProjectSummaryResponse::new(project, owner, project_members));
	}

	Ok(Json(summaries))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectDetailResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Unknown tag", body = ErrorResponse)
    ),
    tag = "projects"
)]
/// Create a project owned by the caller.
///
/// The caller also receives an ADMIN membership.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id))]
pub async fn create_project(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let Json(req) = payload?;

	validate_project_fields(
		Some(&req.name),
		req.budget.as_deref(),
		req.repository_url.as_deref(),
		req.live_url.as_deref(),
	)?;
	let tag_ids: Vec<TagId> = parse_ids(&req.tag_ids, "tag_ids")?;

	let new_project = NewProject {
		name: req.name.trim().to_string(),
		description: req.description,
		status: req.status.unwrap_or_default(),
		is_archived: req.is_archived,
		start_date: req.start_date,
		due_date: req.due_date,
		budget: req.budget,
		repository_url: req.repository_url,
		live_url: req.live_url,
		tag_ids,
	};

	let project = state
		.project_repo
		.create_project(&current_user.user.id, &new_project)
		.await?;

	tracing::info!(project_id = %project.id, "project created");
	let detail = project_detail(&state, &project).await?;
	Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project detail", body = ProjectDetailResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "projects"
)]
/// Project detail with tags, members and task progress.
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id, project_id = %id))]
pub async fn get_project(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
	let project_id: ProjectId = parse_id(&id, "project_id")?;
	let project = find_project(&state, &current_user, &project_id).await?;

	authorize(
		&current_user,
		Action::Read,
		ResourceAttrs::owned_by(ResourceType::Project, &project),
		&state.project_repo,
	)
	.await?;

	Ok(Json(project_detail(&state, &project).await?))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project replaced", body = ProjectDetailResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Owner or admin required", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "projects"
)]
/// Full update. `name` is required.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id, project_id = %id))]
pub async fn replace_project(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let Json(req) = payload?;
	if req.name.is_none() {
		return Err(ApiError::invalid_field("name", "is required"));
	}
	apply_project_update(&state, &current_user, &id, req).await
}

#[utoipa::path(
    patch,
    path = "/api/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectDetailResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Owner or admin required", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "projects"
)]
/// Partial update. Only the given fields change.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id, project_id = %id))]
pub async fn update_project(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let Json(req) = payload?;
	apply_project_update(&state, &current_user, &id, req).await
}

async fn apply_project_update(
	state: &AppState,
	current_user: &CurrentUser,
	id: &str,
	req: UpdateProjectRequest,
) -> Result<Json<ProjectDetailResponse>, ApiError> {
	let project_id: ProjectId = parse_id(id, "project_id")?;
	let project = find_project(state, current_user, &project_id).await?;

	authorize(
		current_user,
		Action::Update,
		ResourceAttrs::owned_by(ResourceType::Project, &project),
		&state.project_repo,
	)
	.await?;

	validate_project_fields(
		req.name.as_deref(),
		req.budget.as_ref().and_then(Option::as_deref),
		req.repository_url.as_ref().and_then(Option::as_deref),
		req.live_url.as_ref().and_then(Option::as_deref),
	)?;
	let tag_ids: Option<Vec<TagId>> = req
		.tag_ids
		.as_deref()
		.map(|ids| parse_ids(ids, "tag_ids"))
		.transpose()?;

	let changes = ProjectChanges {
		name: req.name.map(|n| n.trim().to_string()),
		description: req.description,
		status: req.status,
		is_archived: req.is_archived,
		start_date: req.start_date,
		due_date: req.due_date,
		budget: req.budget,
		repository_url: req.repository_url,
		live_url: req.live_url,
		tag_ids,
	};

	let updated = state.project_repo.update_project(&project_id, &changes).await?;
	Ok(Json(project_detail(state, &updated).await?))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 403, description = "Owner or admin required", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "projects"
)]
/// Delete a project with its tasks, feedback and their annotations.
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id, project_id = %id))]
pub async fn delete_project(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
	let project_id: ProjectId = parse_id(&id, "project_id")?;
	let project = find_project(&state, &current_user, &project_id).await?;

	authorize(
		&current_user,
		Action::Delete,
		ResourceAttrs::owned_by(ResourceType::Project, &project),
		&state.project_repo,
	)
	.await?;

	let Some(files) = state.project_repo.delete_project(&project_id).await? else {
		return Err(ApiError::not_found("Project not found"));
	};
	annotations::remove_blobs(&state, &files).await;

	tracing::info!(project_id = %project_id, "project deleted");
	Ok(StatusCode::NO_CONTENT)
}
