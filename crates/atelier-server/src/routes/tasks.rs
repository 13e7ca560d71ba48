// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Task HTTP handlers.
//!
//! Tasks are reachable two ways:
//!
//! - **Nested**: `/api/projects/{id}/tasks` lists only top-level tasks of that
//!   project. Subtasks appear inside their parent's `subtasks`.
//! - **Flat**: `/api/tasks` and `/api/tasks/{id}` reach any task in a project
//!   the caller can see.
//!
//! Every response renders the task with its full subtree through
//! [`TaskForest`]. Building one costs a fixed three queries (tasks, tags,
//! assignees) however many projects and nodes it covers.

use atelier_common_core::{
	EntityRef, NewTask, Project, ProjectId, TagId, Task, TaskChanges, TaskId, UserId,
};
use atelier_server_api::{AddCommentRequest, AttachmentResponse, CommentResponse, ErrorResponse};
use atelier_server_auth::{
	Action, CurrentUser, ResourceAttrs, ResourceType, RouteContext, TaskScope,
};
use axum::{
	extract::{rejection::JsonRejection, Multipart, Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};

pub use atelier_server_api::tasks::*;

use crate::{
	abac_middleware::authorize,
	api::AppState,
	auth_middleware::RequireAuth,
	error::ApiError,
	routes::{annotations, projects::find_project},
	tree::TaskForest,
	validation::{
		parse_id, parse_ids, parse_opt_id, validate_decimal_field, validate_length,
		ESTIMATED_HOURS_DIGITS, MAX_TASK_TITLE_LEN,
	},
};

// =============================================================================
// Loading and rendering
// =============================================================================

/// Load a task through the caller's lookup scope.
async fn find_task(
	state: &AppState,
	current_user: &CurrentUser,
	task_id: &TaskId,
) -> Result<Task, ApiError> {
	state
		.task_repo
		.get_task_in_scope(task_id, &TaskScope::for_lookup(&current_user.user))
		.await?
		.ok_or_else(|| ApiError::not_found("Task not found"))
}

/// Every task of `project_ids` with tags and assignees, ready to render.
async fn load_forest(state: &AppState, project_ids: &[ProjectId]) -> Result<TaskForest, ApiError> {
	let tasks = state.task_repo.list_tasks_in_projects(project_ids).await?;

	let task_ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
	let tags = state.task_repo.list_task_tags(&task_ids).await?;

	let mut assignee_ids: Vec<UserId> = tasks.iter().filter_map(|t| t.assignee_id).collect();
	assignee_ids.sort();
	assignee_ids.dedup();
	let users = state.user_repo.get_users_by_ids(&assignee_ids).await?;

	Ok(TaskForest::new(tasks, tags, users))
}

async fn render_tasks(state: &AppState, tasks: &[Task]) -> Result<Vec<TaskResponse>, ApiError> {
	let mut project_ids: Vec<ProjectId> = tasks.iter().map(|t| t.project_id).collect();
	project_ids.sort();
	project_ids.dedup();

	let forest = load_forest(state, &project_ids).await?;
	let rendered = tasks
		.iter()
		.map(|t| forest.render(&t.id))
		.collect::<Result<Vec<_>, _>>()?;
	Ok(rendered)
}

async fn render_task(state: &AppState, task: &Task) -> Result<TaskResponse, ApiError> {
	let forest = load_forest(state, std::slice::from_ref(&task.project_id)).await?;
	Ok(forest.render(&task.id)?)
}

// =============================================================================
// Request conversion
// =============================================================================

fn new_task_from(req: CreateTaskRequest) -> Result<NewTask, ApiError> {
	validate_length("title", &req.title, 1, MAX_TASK_TITLE_LEN)?;
	validate_decimal_field(
		"estimated_hours",
		req.estimated_hours.as_deref(),
		ESTIMATED_HOURS_DIGITS,
	)?;

	Ok(NewTask {
		title: req.title.trim().to_string(),
		description: req.description,
		status: req.status.unwrap_or_default(),
		priority: req.priority.unwrap_or_default(),
		parent_task_id: parse_opt_id(req.parent_task_id.as_deref(), "parent_task_id")?,
		assignee_id: parse_opt_id(req.assignee_id.as_deref(), "assignee_id")?,
		originating_feedback_id: parse_opt_id(
			req.originating_feedback_id.as_deref(),
			"originating_feedback_id",
		)?,
		start_date: req.start_date,
		due_date: req.due_date,
		estimated_hours: req.estimated_hours,
		tag_ids: parse_ids(&req.tag_ids, "tag_ids")?,
	})
}

fn task_changes_from(req: UpdateTaskRequest) -> Result<TaskChanges, ApiError> {
	if let Some(title) = &req.title {
		validate_length("title", title, 1, MAX_TASK_TITLE_LEN)?;
	}
	validate_decimal_field(
		"estimated_hours",
		req.estimated_hours.as_ref().and_then(Option::as_deref),
		ESTIMATED_HOURS_DIGITS,
	)?;

	Ok(TaskChanges {
		title: req.title.map(|t| t.trim().to_string()),
		description: req.description,
		status: req.status,
		priority: req.priority,
		parent_task_id: req
			.parent_task_id
			.map(|p| parse_opt_id(p.as_deref(), "parent_task_id"))
			.transpose()?,
		assignee_id: req
			.assignee_id
			.map(|a| parse_opt_id(a.as_deref(), "assignee_id"))
			.transpose()?,
		originating_feedback_id: req
			.originating_feedback_id
			.map(|f| parse_opt_id(f.as_deref(), "originating_feedback_id"))
			.transpose()?,
		start_date: req.start_date,
		due_date: req.due_date,
		estimated_hours: req.estimated_hours,
		tag_ids: req
			.tag_ids
			.as_deref()
			.map(|ids| parse_ids(ids, "tag_ids"))
			.transpose()?,
	})
}

async fn create_in_project(
	state: &AppState,
	current_user: &CurrentUser,
	project: &Project,
	req: CreateTaskRequest,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
	authorize(
		current_user,
		Action::Create,
		ResourceAttrs::owned_by(ResourceType::Task, project),
		&state.project_repo,
	)
	.await?;

	let new_task = new_task_from(req)?;
	let task = state.task_repo.create_task(&project.id, &new_task).await?;

	tracing::info!(task_id = %task.id, project_id = %project.id, "task created");
	Ok((StatusCode::CREATED, Json(render_task(state, &task).await?)))
}

// =============================================================================
// Collection handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/projects/{id}/tasks",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Top-level tasks with nested subtasks", body = Vec<TaskResponse>),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
/// Top-level tasks of one project, each with its subtree.
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id, project_id = %id))]
pub async fn list_project_tasks(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
	let project_id: ProjectId = parse_id(&id, "project_id")?;
	let project = find_project(&state, &current_user, &project_id).await?;

	authorize(
		&current_user,
		Action::List,
		ResourceAttrs::owned_by(ResourceType::Task, &project),
		&state.project_repo,
	)
	.await?;

	let scope = TaskScope::for_listing(&current_user.user, RouteContext::Nested(project_id));
	let roots = state.task_repo.list_tasks(&scope).await?;
	Ok(Json(render_tasks(&state, &roots).await?))
}

#[utoipa::path(
    post,
    path = "/api/projects/{id}/tasks",
    params(("id" = String, Path, description = "Project ID")),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Project or tag not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id, project_id = %id))]
pub async fn create_project_task(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let project_id: ProjectId = parse_id(&id, "project_id")?;
	let project = find_project(&state, &current_user, &project_id).await?;
	let Json(req) = payload?;

	create_in_project(&state, &current_user, &project, req).await
}

#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "Every task in visible projects", body = Vec<TaskResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "tasks"
)]
/// Flat listing: every task, subtasks included, across the caller's projects.
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id))]
pub async fn list_tasks(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
	let scope = TaskScope::for_listing(&current_user.user, RouteContext::Flat);
	let tasks = state.task_repo.list_tasks(&scope).await?;
	Ok(Json(render_tasks(&state, &tasks).await?))
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Project or tag not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
/// Create a task in the project named by `project_id` in the body.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id))]
pub async fn create_task(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let Json(req) = payload?;
	let raw_project_id = req
		.project_id
		.as_deref()
		.ok_or_else(|| ApiError::invalid_field("project_id", "is required"))?;
	let project_id: ProjectId = parse_id(raw_project_id, "project_id")?;
	let project = find_project(&state, &current_user, &project_id).await?;

	create_in_project(&state, &current_user, &project, req).await
}

// =============================================================================
// Item handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task with its subtasks", body = TaskResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id, task_id = %id))]
pub async fn get_task(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
	let task_id: TaskId = parse_id(&id, "task_id")?;
	let task = find_task(&state, &current_user, &task_id).await?;

	authorize(
		&current_user,
		Action::Read,
		ResourceAttrs::owned_by(ResourceType::Task, &task),
		&state.project_repo,
	)
	.await?;

	Ok(Json(render_task(&state, &task).await?))
}

#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task replaced", body = TaskResponse),
        (status = 400, description = "Invalid request or parent", body = ErrorResponse),
        (status = 403, description = "Owner or admin required", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
/// Full update. `title` is required.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id, task_id = %id))]
pub async fn replace_task(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let Json(req) = payload?;
	if req.title.is_none() {
		return Err(ApiError::invalid_field("title", "is required"));
	}
	apply_task_update(&state, &current_user, &id, req).await
}

#[utoipa::path(
    patch,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Invalid request or parent", body = ErrorResponse),
        (status = 403, description = "Owner or admin required", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id, task_id = %id))]
pub async fn update_task(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let Json(req) = payload?;
	apply_task_update(&state, &current_user, &id, req).await
}

async fn apply_task_update(
	state: &AppState,
	current_user: &CurrentUser,
	id: &str,
	req: UpdateTaskRequest,
) -> Result<Json<TaskResponse>, ApiError> {
	let task_id: TaskId = parse_id(id, "task_id")?;
	let task = find_task(state, current_user, &task_id).await?;

	authorize(
		current_user,
		Action::Update,
		ResourceAttrs::owned_by(ResourceType::Task, &task),
		&state.project_repo,
	)
	.await?;

	let changes = task_changes_from(req)?;
	let updated = state.task_repo.update_task(&task_id, &changes).await?;
	Ok(Json(render_task(state, &updated).await?))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task and subtasks deleted"),
        (status = 403, description = "Owner or admin required", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id, task_id = %id))]
pub async fn delete_task(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
	let task_id: TaskId = parse_id(&id, "task_id")?;
	let task = find_task(&state, &current_user, &task_id).await?;

	authorize(
		&current_user,
		Action::Delete,
		ResourceAttrs::owned_by(ResourceType::Task, &task),
		&state.project_repo,
	)
	.await?;

	let Some(files) = state.task_repo.delete_task(&task_id).await? else {
		return Err(ApiError::not_found("Task not found"));
	};
	annotations::remove_blobs(&state, &files).await;

	tracing::info!(task_id = %task_id, "task deleted");
	Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/tasks/{id}/manage-tags",
    params(("id" = String, Path, description = "Task ID")),
    request_body = ManageTagsRequest,
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 400, description = "Unknown action", body = ErrorResponse),
        (status = 403, description = "Owner or admin required", body = ErrorResponse),
        (status = 404, description = "Task or tag not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
/// Add or remove one tag. Removing a tag the task lacks changes nothing.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id, task_id = %id))]
pub async fn manage_tags(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<ManageTagsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let task_id: TaskId = parse_id(&id, "task_id")?;
	let task = find_task(&state, &current_user, &task_id).await?;

	authorize(
		&current_user,
		Action::ManageTags,
		ResourceAttrs::owned_by(ResourceType::Task, &task),
		&state.project_repo,
	)
	.await?;

	let Json(req) = payload?;
	let action: TagAction = req.action.parse().map_err(|e: UnknownTagAction| ApiError::Validation {
		code: "invalid_action",
		message: e.to_string(),
	})?;
	let tag_id: TagId = parse_id(&req.tag_id, "tag_id")?;

	match action {
		TagAction::Add => state.task_repo.add_task_tag(&task_id, &tag_id).await?,
		TagAction::Remove => state.task_repo.remove_task_tag(&task_id, &tag_id).await?,
	}

	Ok(Json(render_task(&state, &task).await?))
}

// =============================================================================
// Annotations
// =============================================================================

async fn annotatable_task(
	state: &AppState,
	current_user: &CurrentUser,
	id: &str,
	action: Action,
) -> Result<EntityRef, ApiError> {
	let task_id: TaskId = parse_id(id, "task_id")?;
	let task = find_task(state, current_user, &task_id).await?;

	authorize(
		current_user,
		action,
		ResourceAttrs::owned_by(ResourceType::Task, &task),
		&state.project_repo,
	)
	.await?;

	Ok(EntityRef::from(task_id))
}

#[utoipa::path(
    post,
    path = "/api/tasks/{id}/add-comment",
    params(("id" = String, Path, description = "Task ID")),
    request_body = AddCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentResponse),
        (status = 400, description = "Empty comment", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.user.id, task_id = %id))]
pub async fn add_comment(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<AddCommentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
	let target = annotatable_task(&state, &current_user, &id, Action::Annotate).await?;
	let Json(req) = payload?;
	let comment = annotations::create_comment(&state, &current_user, target, req).await?;
	Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    post,
    path = "/api/tasks/{id}/add-attachment",
    params(("id" = String, Path, description = "Task ID")),
    request_body(content_type = "multipart/form-data", description = "`file` part and optional `description`"),
    responses(
        (status = 201, description = "Attachment stored", body = AttachmentResponse),
        (status = 400, description = "Missing or oversized file", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
#[tracing::instrument(skip(state, current_user, multipart), fields(user_id = %current_user.user.id, task_id = %id))]
pub async fn add_attachment(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
	let target = annotatable_task(&state, &current_user, &id, Action::Annotate).await?;
	let attachment = annotations::create_attachment(&state, &current_user, target, multipart).await?;
	Ok((StatusCode::CREATED, Json(attachment)))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}/comments",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = Vec<CommentResponse>),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id, task_id = %id))]
pub async fn list_comments(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
	let target = annotatable_task(&state, &current_user, &id, Action::Read).await?;
	Ok(Json(annotations::comments_for(&state, target).await?))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}/attachments",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Attachments in upload order", body = Vec<AttachmentResponse>),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.user.id, task_id = %id))]
pub async fn list_attachments(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
	let target = annotatable_task(&state, &current_user, &id, Action::Read).await?;
	Ok(Json(annotations::attachments_for(&state, target).await?))
}
