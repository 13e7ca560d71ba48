// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tag HTTP handlers. Tags are global and shared by every project.

use atelier_common_core::{DEFAULT_TAG_COLOR, MAX_TAG_NAME_LEN};
use atelier_server_api::ErrorResponse;
use axum::{
	extract::{rejection::JsonRejection, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};

pub use atelier_server_api::tags::*;

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::ApiError,
	validation::{validate_length, validate_tag_color},
};

#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "All tags by name", body = Vec<TagResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "tags"
)]
#[tracing::instrument(skip(state, _current_user))]
pub async fn list_tags(
	RequireAuth(_current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
	let tags = state.tag_repo.list_tags().await?;
	let body: Vec<TagResponse> = tags.iter().map(TagResponse::from).collect();
	Ok(Json(body))
}

#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 400, description = "Invalid name or color", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    ),
    tag = "tags"
)]
/// Create a tag. The color defaults to grey.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id))]
pub async fn create_tag(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	payload: Result<Json<CreateTagRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let Json(req) = payload?;

	validate_length("name", &req.name, 1, MAX_TAG_NAME_LEN)?;
	let color = req.color.unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string());
	validate_tag_color(&color)?;

	let tag = state.tag_repo.create_tag(req.name.trim(), &color).await?;

	tracing::info!(tag_id = %tag.id, name = %tag.name, "tag created");
	Ok((StatusCode::CREATED, Json(TagResponse::from(&tag))))
}
