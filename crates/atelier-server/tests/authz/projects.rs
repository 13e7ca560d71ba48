// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{json_body, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn test_project_authorization() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let a = f.project_a.id.to_string();
	let b = f.project_b.id.to_string();

	let cases = vec![
		AuthzCase {
			name: "anonymous_cannot_list_projects",
			method: Method::GET,
			path: "/api/projects".to_string(),
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "anonymous_cannot_create_project",
			method: Method::POST,
			path: "/api/projects".to_string(),
			user: None,
			body: Some(json!({"name": "Nope"})),
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "viewer_can_get_project",
			method: Method::GET,
			path: format!("/api/projects/{a}"),
			user: Some(f.viewer.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "outsider_cannot_see_project",
			method: Method::GET,
			path: format!("/api/projects/{a}"),
			user: Some(f.outsider.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "superuser_sees_every_project",
			method: Method::GET,
			path: format!("/api/projects/{b}"),
			user: Some(f.superuser.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "developer_cannot_update_project",
			method: Method::PATCH,
			path: format!("/api/projects/{a}"),
			user: Some(f.developer.clone()),
			body: Some(json!({"description": "hijacked"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "viewer_cannot_update_project",
			method: Method::PATCH,
			path: format!("/api/projects/{a}"),
			user: Some(f.viewer.clone()),
			body: Some(json!({"description": "hijacked"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "admin_can_update_project",
			method: Method::PATCH,
			path: format!("/api/projects/{a}"),
			user: Some(f.admin.clone()),
			body: Some(json!({"description": "Updated by admin"})),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "put_requires_name",
			method: Method::PUT,
			path: format!("/api/projects/{a}"),
			user: Some(f.owner.clone()),
			body: Some(json!({"description": "no name"})),
			expected_status: StatusCode::BAD_REQUEST,
		},
		AuthzCase {
			name: "owner_can_replace_project",
			method: Method::PUT,
			path: format!("/api/projects/{a}"),
			user: Some(f.owner.clone()),
			body: Some(json!({"name": "Project A, renamed"})),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "invalid_project_id_is_bad_request",
			method: Method::GET,
			path: "/api/projects/not-a-uuid".to_string(),
			user: Some(f.owner.clone()),
			body: None,
			expected_status: StatusCode::BAD_REQUEST,
		},
		AuthzCase {
			name: "outsider_cannot_delete_project",
			method: Method::DELETE,
			path: format!("/api/projects/{a}"),
			user: Some(f.outsider.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "viewer_cannot_delete_project",
			method: Method::DELETE,
			path: format!("/api/projects/{a}"),
			user: Some(f.viewer.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn test_member_authorization() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let a = f.project_a.id.to_string();
	let outsider_id = f.outsider.user.id.to_string();
	let viewer_id = f.viewer.user.id.to_string();
	let owner_id = f.owner.user.id.to_string();

	let cases = vec![
		AuthzCase {
			name: "viewer_can_list_members",
			method: Method::GET,
			path: format!("/api/projects/{a}/members"),
			user: Some(f.viewer.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "developer_cannot_add_member",
			method: Method::POST,
			path: format!("/api/projects/{a}/members"),
			user: Some(f.developer.clone()),
			body: Some(json!({"user_id": outsider_id})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "admin_can_add_member",
			method: Method::POST,
			path: format!("/api/projects/{a}/members"),
			user: Some(f.admin.clone()),
			body: Some(json!({"user_id": outsider_id, "role": "TESTER"})),
			expected_status: StatusCode::CREATED,
		},
		AuthzCase {
			name: "duplicate_member_conflicts",
			method: Method::POST,
			path: format!("/api/projects/{a}/members"),
			user: Some(f.owner.clone()),
			body: Some(json!({"user_id": viewer_id})),
			expected_status: StatusCode::CONFLICT,
		},
		AuthzCase {
			name: "unknown_user_is_not_found",
			method: Method::POST,
			path: format!("/api/projects/{a}/members"),
			user: Some(f.owner.clone()),
			body: Some(json!({"user_id": "00000000-0000-4000-8000-000000000000"})),
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "owner_can_change_role",
			method: Method::PATCH,
			path: format!("/api/projects/{a}/members/{viewer_id}"),
			user: Some(f.owner.clone()),
			body: Some(json!({"role": "DEVELOPER"})),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "owner_membership_cannot_be_removed",
			method: Method::DELETE,
			path: format!("/api/projects/{a}/members/{owner_id}"),
			user: Some(f.admin.clone()),
			body: None,
			expected_status: StatusCode::BAD_REQUEST,
		},
		AuthzCase {
			name: "admin_can_remove_member",
			method: Method::DELETE,
			path: format!("/api/projects/{a}/members/{viewer_id}"),
			user: Some(f.admin.clone()),
			body: None,
			expected_status: StatusCode::NO_CONTENT,
		},
		AuthzCase {
			name: "removed_member_loses_visibility",
			method: Method::GET,
			path: format!("/api/projects/{a}"),
			user: Some(f.viewer.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn test_create_project_makes_caller_admin_owner() {
	let app = TestApp::new().await;
	let dev = app.fixtures.developer.clone();

	let response = app
		.post(
			"/api/projects",
			Some(&dev),
			json!({"name": "Side project", "budget": "1500.50"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);

	let body = json_body(response).await;
	assert_eq!(body["owner"], dev.user.email.as_str());
	assert_eq!(body["budget"], "1500.50");
	assert_eq!(body["progress_percentage"], 0);
	let members = body["members"].as_array().unwrap();
	assert_eq!(members.len(), 1);
	assert_eq!(members[0]["user_id"], dev.user.id.to_string());
	assert_eq!(members[0]["role"], "ADMIN");
}

#[tokio::test]
async fn test_project_validation_errors() {
	let app = TestApp::new().await;
	let owner = app.fixtures.owner.clone();

	let response = app
		.post("/api/projects", Some(&owner), json!({"name": "x", "budget": "1.234"}))
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json_body(response).await["error"], "invalid_field");

	let response = app
		.post(
			"/api/projects",
			Some(&owner),
			json!({"name": "x", "repository_url": "ftp://example.com"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let response = app
		.post("/api/projects", Some(&owner), json!({"description": "missing name"}))
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json_body(response).await["error"], "invalid_body");
}

#[tokio::test]
async fn test_project_list_is_scoped() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let body = json_body(app.get("/api/projects", Some(&f.viewer)).await).await;
	let names: Vec<&str> = body
		.as_array()
		.unwrap()
		.iter()
		.map(|p| p["name"].as_str().unwrap())
		.collect();
	assert_eq!(names, vec!["Project A"]);
	assert_eq!(body[0]["owner_name"], "Olive Owner");
	assert_eq!(body[0]["members"].as_array().unwrap().len(), 4);

	let body = json_body(app.get("/api/projects", Some(&f.superuser)).await).await;
	assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_detail_reports_task_progress() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let path = format!("/api/tasks/{}", f.child_task.id);

	let response = app.patch(&path, Some(&f.owner), json!({"status": "DONE"})).await;
	assert_eq!(response.status(), StatusCode::OK);

	let body = json_body(
		app.get(&format!("/api/projects/{}", f.project_a.id), Some(&f.owner))
			.await,
	)
	.await;
	assert_eq!(body["tasks_summary"]["completed"], 1);
	assert_eq!(body["tasks_summary"]["total"], 2);
	assert_eq!(body["progress_percentage"], 50);
	assert!(body["days_remaining"].is_null());
}

#[tokio::test]
async fn test_health_is_public() {
	let app = TestApp::new().await;
	let response = app.get("/health", None).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json_body(response).await["status"], "ok");

	let response = app.get("/api/openapi.json", None).await;
	assert_eq!(response.status(), StatusCode::OK);
}
