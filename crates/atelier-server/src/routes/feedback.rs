// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Feedback HTTP handlers.
//!
//! Feedback belongs to a project and follows the same scope and role rules
//! as tasks. It can be commented on and carry attachments.

use atelier_common_core::{EntityRef, Feedback, FeedbackId, ProjectId};
use atelier_server_api::{AddCommentRequest, AttachmentResponse, CommentResponse, ErrorResponse};
use atelier_server_auth::{Action, CurrentUser, FeedbackScope, ResourceAttrs, ResourceType};
use atelier_server_db::NewFeedback;
use axum::{
	extract::{rejection::JsonRejection, Multipart, Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};

pub use atelier_server_api::feedback::*;

use crate::{
	abac_middleware::authorize,
	api::AppState,
	auth_middleware::RequireAuth,
	error::ApiError,
	routes::{annotations, projects::find_project},
	validation::{parse_id, validate_length, MAX_FEEDBACK_SUMMARY_LEN},
};

async fn find_feedback(
	state: &AppState,
	current_user: &CurrentUser,
	feedback_id: &FeedbackId,
) -> Result<Feedback, ApiError> {
	state
		.feedback_repo
		.get_feedback_in_scope(feedback_id, &FeedbackScope::for_lookup(&current_user.user))
		.await?
		.ok_or_else(|| ApiError::not_found("Feedback not found"))
}

/// Resolve feedback by its path id and check `action` against its project.
async fn authorized_feedback(
	state: &AppState,
	current_user: &CurrentUser,
	id: &str,
	action: Action,
) -> Result<Feedback, ApiError> {
	let feedback_id: FeedbackId = parse_id(id, "feedback_id")?;
	let feedback = find_feedback(state, current_user, &feedback_id).await?;

	authorize(
		current_user,
		action,
		ResourceAttrs::owned_by(ResourceType::Feedback, &feedback),
		&state.project_repo,
	)
	.await?;

	Ok(feedback)
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}/feedback",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Feedback, newest first", body = Vec<FeedbackResponse>),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "feedback"
)]
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id, project_id = %id))]
pub async fn list_feedback(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
	let project_id: ProjectId = parse_id(&id, "project_id")?;
	let project = find_project(&state, &current_user, &project_id).await?;

	authorize(
		&current_user,
		Action::List,
		ResourceAttrs::owned_by(ResourceType::Feedback, &project),
		&state.project_repo,
	)
	.await?;

	let items = state
		.feedback_repo
		.list_feedback(&FeedbackScope::for_listing(&current_user.user, project_id))
		.await?;
	let body: Vec<FeedbackResponse> = items.iter().map(FeedbackResponse::from).collect();
	Ok(Json(body))
}

#[utoipa::path(
    post,
    path = "/api/projects/{id}/feedback",
    params(("id" = String, Path, description = "Project ID")),
    request_body = CreateFeedbackRequest,
    responses(
        (status = 201, description = "Feedback submitted", body = FeedbackResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "feedback"
)]
/// Submit feedback. New feedback starts as RECEIVED.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id, project_id = %id))]
pub async fn create_feedback(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<CreateFeedbackRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let project_id: ProjectId = parse_id(&id, "project_id")?;
	let project = find_project(&state, &current_user, &project_id).await?;

	authorize(
		&current_user,
		Action::Create,
		ResourceAttrs::owned_by(ResourceType::Feedback, &project),
		&state.project_repo,
	)
	.await?;

	let Json(req) = payload?;
	validate_length("summary", &req.summary, 1, MAX_FEEDBACK_SUMMARY_LEN)?;

	let new_feedback = NewFeedback {
		summary: req.summary.trim().to_string(),
		description: req.description,
		feedback_type: req.feedback_type.unwrap_or_default(),
	};
	let feedback = state
		.feedback_repo
		.create_feedback(&project_id, Some(&current_user.user.id), &new_feedback)
		.await?;

	tracing::info!(feedback_id = %feedback.id, project_id = %project_id, "feedback submitted");
	Ok((StatusCode::CREATED, Json(FeedbackResponse::from(&feedback))))
}

#[utoipa::path(
    get,
    path = "/api/feedback/{id}",
    params(("id" = String, Path, description = "Feedback ID")),
    responses(
        (status = 200, description = "Feedback item", body = FeedbackResponse),
        (status = 404, description = "Feedback not found", body = ErrorResponse)
    ),
    tag = "feedback"
)]
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id, feedback_id = %id))]
pub async fn get_feedback(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
	let feedback = authorized_feedback(&state, &current_user, &id, Action::Read).await?;
	Ok(Json(FeedbackResponse::from(&feedback)))
}

#[utoipa::path(
    patch,
    path = "/api/feedback/{id}",
    params(("id" = String, Path, description = "Feedback ID")),
    request_body = UpdateFeedbackRequest,
    responses(
        (status = 200, description = "Status changed", body = FeedbackResponse),
        (status = 403, description = "Owner or admin required", body = ErrorResponse),
        (status = 404, description = "Feedback not found", body = ErrorResponse)
    ),
    tag = "feedback"
)]
/// Move feedback through its triage states.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id, feedback_id = %id))]
pub async fn update_feedback(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<UpdateFeedbackRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let mut feedback = authorized_feedback(&state, &current_user, &id, Action::Update).await?;
	let Json(req) = payload?;

	if !state
		.feedback_repo
		.update_feedback_status(&feedback.id, req.status)
		.await?
	{
		return Err(ApiError::not_found("Feedback not found"));
	}

	feedback.status = req.status;
	Ok(Json(FeedbackResponse::from(&feedback)))
}

#[utoipa::path(
    delete,
    path = "/api/feedback/{id}",
    params(("id" = String, Path, description = "Feedback ID")),
    responses(
        (status = 204, description = "Feedback deleted"),
        (status = 403, description = "Owner or admin required", body = ErrorResponse),
        (status = 404, description = "Feedback not found", body = ErrorResponse)
    ),
    tag = "feedback"
)]
/// Delete feedback and its annotations. Tasks that originated from it stay.
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id, feedback_id = %id))]
pub async fn delete_feedback(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
	let feedback = authorized_feedback(&state, &current_user, &id, Action::Delete).await?;

	let Some(files) = state.feedback_repo.delete_feedback(&feedback.id).await? else {
		return Err(ApiError::not_found("Feedback not found"));
	};
	annotations::remove_blobs(&state, &files).await;

	tracing::info!(feedback_id = %feedback.id, "feedback deleted");
	Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/feedback/{id}/add-comment",
    params(("id" = String, Path, description = "Feedback ID")),
    request_body = AddCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentResponse),
        (status = 404, description = "Feedback not found", body = ErrorResponse)
    ),
    tag = "feedback"
)]
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id, feedback_id = %id))]
pub async fn add_comment(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<AddCommentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let feedback = authorized_feedback(&state, &current_user, &id, Action::Annotate).await?;
	let Json(req) = payload?;
	let comment =
		annotations::create_comment(&state, &current_user, EntityRef::from(feedback.id), req).await?;
	Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    post,
    path = "/api/feedback/{id}/add-attachment",
    params(("id" = String, Path, description = "Feedback ID")),
    request_body(content_type = "multipart/form-data", description = "`file` part and optional `description`"),
    responses(
        (status = 201, description = "Attachment stored", body = AttachmentResponse),
        (status = 400, description = "Missing or oversized file", body = ErrorResponse),
        (status = 404, description = "Feedback not found", body = ErrorResponse)
    ),
    tag = "feedback"
)]
#[tracing::instrument(skip(state, current_user, multipart), fields(user_id = %current_user.user.id, feedback_id = %id))]
pub async fn add_attachment(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
	let feedback = authorized_feedback(&state, &current_user, &id, Action::Annotate).await?;
	let attachment = annotations::create_attachment(
		&state,
		&current_user,
		EntityRef::from(feedback.id),
		multipart,
	)
	.await?;
	Ok((StatusCode::CREATED, Json(attachment)))
}

#[utoipa::path(
    get,
    path = "/api/feedback/{id}/comments",
    params(("id" = String, Path, description = "Feedback ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = Vec<CommentResponse>),
        (status = 404, description = "Feedback not found", body = ErrorResponse)
    ),
    tag = "feedback"
)]
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id, feedback_id = %id))]
pub async fn list_comments(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
	let feedback = authorized_feedback(&state, &current_user, &id, Action::Read).await?;
	Ok(Json(
		annotations::comments_for(&state, EntityRef::from(feedback.id)).await?,
	))
}

#[utoipa::path(
    get,
    path = "/api/feedback/{id}/attachments",
    params(("id" = String, Path, description = "Feedback ID")),
    responses(
        (status = 200, description = "Attachments in upload order", body = Vec<AttachmentResponse>),
        (status = 404, description = "Feedback not found", body = ErrorResponse)
    ),
    tag = "feedback"
)]
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id, feedback_id = %id))]
pub async fn list_attachments(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
	let feedback = authorized_feedback(&state, &current_user, &id, Action::Read).await?;
	Ok(Json(
		annotations::attachments_for(&state, EntityRef::from(feedback.id)).await?,
	))
}
