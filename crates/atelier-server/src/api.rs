// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use atelier_common_core::User;
use atelier_server_auth::{Action, AuthConfig, ResourceType};
use atelier_server_config::ServerConfig;
use atelier_server_db::{
	AnnotationRepository, AnnotationStore, FeedbackRepository, ProjectRepository, TagRepository,
	TaskRepository, UserRepository,
};
use axum::{
	extract::DefaultBodyLimit,
	middleware::from_fn_with_state,
	routing::{get, post},
	Json, Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::abac_middleware::RequireCapability;
use crate::api_docs::ApiDoc;
use crate::auth_middleware::auth_layer;
use crate::blob::{BlobStore, LocalBlobStore};
use crate::routes;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub user_repo: Arc<UserRepository>,
	pub project_repo: Arc<ProjectRepository>,
	pub task_repo: Arc<TaskRepository>,
	pub feedback_repo: Arc<FeedbackRepository>,
	pub tag_repo: Arc<TagRepository>,
	pub annotations: Arc<dyn AnnotationStore>,
	pub blob_store: Arc<dyn BlobStore>,
	pub auth_config: AuthConfig,
	pub dev_user: Option<User>,
	pub base_url: String,
	pub max_upload_bytes: usize,
}

/// Build the state from a migrated pool.
///
/// In dev mode the configured dev user is looked up by email. A missing dev
/// user is logged and leaves dev-mode authentication inactive.
pub async fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> AppState {
	let user_repo = Arc::new(UserRepository::new(pool.clone()));

	let dev_user = match (config.auth.dev_mode, config.auth.dev_user_email.as_deref()) {
		(true, Some(email)) => match user_repo.get_user_by_email(email).await {
			Ok(Some(user)) => {
				tracing::warn!(email = %email, "dev mode enabled; unauthenticated requests act as this user");
				Some(user)
			}
			Ok(None) => {
				tracing::warn!(email = %email, "dev user not found; dev mode authentication disabled");
				None
			}
			Err(e) => {
				tracing::error!(error = %e, "failed to load dev user");
				None
			}
		},
		_ => None,
	};

	let auth_config = AuthConfig::new()
		.with_dev_mode(config.auth.dev_mode)
		.with_session_cookie_name(config.auth.session_cookie_name.clone())
		.with_token_ttl_days(config.auth.token_ttl_days);

	AppState {
		user_repo,
		project_repo: Arc::new(ProjectRepository::new(pool.clone())),
		task_repo: Arc::new(TaskRepository::new(pool.clone())),
		feedback_repo: Arc::new(FeedbackRepository::new(pool.clone())),
		tag_repo: Arc::new(TagRepository::new(pool.clone())),
		annotations: Arc::new(AnnotationRepository::new(pool.clone())),
		blob_store: Arc::new(LocalBlobStore::new(config.paths.media_dir.clone())),
		auth_config,
		dev_user,
		base_url: config.http.base_url.clone(),
		max_upload_bytes: config.uploads.max_upload_bytes,
		pool,
	}
}

/// Create the router with every route.
pub fn create_router(state: AppState) -> Router {
	let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes + MULTIPART_OVERHEAD_BYTES);

	let api = Router::new()
		.route(
			"/projects",
			get(routes::projects::list_projects).merge(
				post(routes::projects::create_project)
					.route_layer(RequireCapability::new(Action::Create, ResourceType::Project)),
			),
		)
		.route(
			"/projects/{id}",
			get(routes::projects::get_project)
				.put(routes::projects::replace_project)
				.patch(routes::projects::update_project)
				.delete(routes::projects::delete_project),
		)
		.route(
			"/projects/{id}/members",
			get(routes::members::list_members).post(routes::members::add_member),
		)
		.route(
			"/projects/{id}/members/{user_id}",
			axum::routing::patch(routes::members::update_member_role)
				.delete(routes::members::remove_member),
		)
		.route(
			"/projects/{id}/tasks",
			get(routes::tasks::list_project_tasks).post(routes::tasks::create_project_task),
		)
		.route(
			"/projects/{id}/feedback",
			get(routes::feedback::list_feedback).post(routes::feedback::create_feedback),
		)
		.route(
			"/tasks",
			get(routes::tasks::list_tasks).post(routes::tasks::create_task),
		)
		.route(
			"/tasks/{id}",
			get(routes::tasks::get_task)
				.put(routes::tasks::replace_task)
				.patch(routes::tasks::update_task)
				.delete(routes::tasks::delete_task),
		)
		.route("/tasks/{id}/manage-tags", post(routes::tasks::manage_tags))
		.route("/tasks/{id}/add-comment", post(routes::tasks::add_comment))
		.route(
			"/tasks/{id}/add-attachment",
			post(routes::tasks::add_attachment).layer(upload_limit.clone()),
		)
		.route("/tasks/{id}/comments", get(routes::tasks::list_comments))
		.route("/tasks/{id}/attachments", get(routes::tasks::list_attachments))
		.route(
			"/feedback/{id}",
			get(routes::feedback::get_feedback)
				.patch(routes::feedback::update_feedback)
				.delete(routes::feedback::delete_feedback),
		)
		.route("/feedback/{id}/add-comment", post(routes::feedback::add_comment))
		.route(
			"/feedback/{id}/add-attachment",
			post(routes::feedback::add_attachment).layer(upload_limit),
		)
		.route("/feedback/{id}/comments", get(routes::feedback::list_comments))
		.route(
			"/feedback/{id}/attachments",
			get(routes::feedback::list_attachments),
		)
		.route(
			"/tags",
			get(routes::tags::list_tags).merge(
				post(routes::tags::create_tag)
					.route_layer(RequireCapability::new(Action::Create, ResourceType::Tag)),
			),
		)
		.layer(from_fn_with_state(state.clone(), auth_layer))
		.route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

	Router::new()
		.route("/health", get(routes::health::health_check))
		.nest("/api", api)
		.with_state(state)
}
