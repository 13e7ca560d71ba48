// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI documentation for atelier-server.
//!
//! The raw JSON document is served at `/api/openapi.json`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atelier Server API",
        version = "1.0.0",
        description = "Project management API: projects, memberships, nested tasks, feedback, tags, comments and attachments.",
        license(name = "Proprietary"),
        contact(
            name = "Geoffrey Huntley",
            email = "ghuntley@ghuntley.com",
            url = "https://ghuntley.com"
        )
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "health", description = "Liveness checks"),
        (name = "projects", description = "Projects visible to the caller"),
        (name = "members", description = "Project membership and roles"),
        (name = "tasks", description = "Nested tasks, tag management and task annotations"),
        (name = "feedback", description = "Project feedback and its annotations"),
        (name = "tags", description = "Global tags")
    ),
    paths(
        crate::routes::health::health_check,
        // Projects
        crate::routes::projects::list_projects,
        crate::routes::projects::create_project,
        crate::routes::projects::get_project,
        crate::routes::projects::replace_project,
        crate::routes::projects::update_project,
        crate::routes::projects::delete_project,
        // Members
        crate::routes::members::list_members,
        crate::routes::members::add_member,
        crate::routes::members::update_member_role,
        crate::routes::members::remove_member,
        // Tasks
        crate::routes::tasks::list_project_tasks,
        crate::routes::tasks::create_project_task,
        crate::routes::tasks::list_tasks,
        crate::routes::tasks::create_task,
        crate::routes::tasks::get_task,
        crate::routes::tasks::replace_task,
        crate::routes::tasks::update_task,
        crate::routes::tasks::delete_task,
        crate::routes::tasks::manage_tags,
        crate::routes::tasks::add_comment,
        crate::routes::tasks::add_attachment,
        crate::routes::tasks::list_comments,
        crate::routes::tasks::list_attachments,
        // Feedback
        crate::routes::feedback::list_feedback,
        crate::routes::feedback::create_feedback,
        crate::routes::feedback::get_feedback,
        crate::routes::feedback::update_feedback,
        crate::routes::feedback::delete_feedback,
        crate::routes::feedback::add_comment,
        crate::routes::feedback::add_attachment,
        crate::routes::feedback::list_comments,
        crate::routes::feedback::list_attachments,
        // Tags
        crate::routes::tags::list_tags,
        crate::routes::tags::create_tag,
    ),
    components(
        schemas(
            atelier_server_api::ErrorResponse,
            atelier_server_api::HealthResponse,
            atelier_server_api::ProjectSummaryResponse,
            atelier_server_api::ProjectDetailResponse,
            atelier_server_api::CreateProjectRequest,
            atelier_server_api::UpdateProjectRequest,
            atelier_server_api::AddMemberRequest,
            atelier_server_api::UpdateMemberRoleRequest,
            atelier_server_api::MemberDetailResponse,
            atelier_server_api::TaskResponse,
            atelier_server_api::CreateTaskRequest,
            atelier_server_api::UpdateTaskRequest,
            atelier_server_api::ManageTagsRequest,
            atelier_server_api::CreateFeedbackRequest,
            atelier_server_api::UpdateFeedbackRequest,
            atelier_server_api::FeedbackResponse,
            atelier_server_api::AddCommentRequest,
            atelier_server_api::CommentResponse,
            atelier_server_api::AttachmentResponse,
            atelier_server_api::CreateTagRequest,
            atelier_server_api::TagResponse,
            atelier_common_core::ProjectStatus,
            atelier_common_core::ProjectRole,
            atelier_common_core::TaskStatus,
            atelier_common_core::TaskPriority,
            atelier_common_core::FeedbackType,
            atelier_common_core::FeedbackStatus,
        )
    )
)]
pub struct ApiDoc;
