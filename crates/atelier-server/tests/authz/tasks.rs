// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{json_body, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn test_task_authorization() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let a = f.project_a.id.to_string();
	let b = f.project_b.id.to_string();
	let child = f.child_task.id.to_string();
	let foreign = f.foreign_task.id.to_string();

	let cases = vec![
		AuthzCase {
			name: "anonymous_cannot_list_tasks",
			method: Method::GET,
			path: "/api/tasks".to_string(),
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "outsider_gets_not_found_for_task",
			method: Method::GET,
			path: format!("/api/tasks/{child}"),
			user: Some(f.outsider.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "viewer_can_read_task",
			method: Method::GET,
			path: format!("/api/tasks/{child}"),
			user: Some(f.viewer.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "viewer_cannot_update_task",
			method: Method::PATCH,
			path: format!("/api/tasks/{child}"),
			user: Some(f.viewer.clone()),
			body: Some(json!({"title": "renamed"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "developer_cannot_update_task",
			method: Method::PATCH,
			path: format!("/api/tasks/{child}"),
			user: Some(f.developer.clone()),
			body: Some(json!({"title": "renamed"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "admin_can_update_task",
			method: Method::PATCH,
			path: format!("/api/tasks/{child}"),
			user: Some(f.admin.clone()),
			body: Some(json!({"priority": "HIGH"})),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "owner_can_replace_task",
			method: Method::PUT,
			path: format!("/api/tasks/{child}"),
			user: Some(f.owner.clone()),
			body: Some(json!({"title": "Child, replaced"})),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "put_requires_title",
			method: Method::PUT,
			path: format!("/api/tasks/{child}"),
			user: Some(f.owner.clone()),
			body: Some(json!({"description": "no title"})),
			expected_status: StatusCode::BAD_REQUEST,
		},
		AuthzCase {
			name: "outsider_cannot_update_task",
			method: Method::PATCH,
			path: format!("/api/tasks/{child}"),
			user: Some(f.outsider.clone()),
			body: Some(json!({"title": "renamed"})),
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "viewer_can_create_task_in_project",
			method: Method::POST,
			path: format!("/api/projects/{a}/tasks"),
			user: Some(f.viewer.clone()),
			body: Some(json!({"title": "Viewer task"})),
			expected_status: StatusCode::CREATED,
		},
		AuthzCase {
			name: "developer_can_create_flat_task",
			method: Method::POST,
			path: "/api/tasks".to_string(),
			user: Some(f.developer.clone()),
			body: Some(json!({"project_id": a, "title": "Flat task"})),
			expected_status: StatusCode::CREATED,
		},
		AuthzCase {
			name: "flat_create_requires_project_id",
			method: Method::POST,
			path: "/api/tasks".to_string(),
			user: Some(f.developer.clone()),
			body: Some(json!({"title": "Nowhere"})),
			expected_status: StatusCode::BAD_REQUEST,
		},
		AuthzCase {
			name: "developer_cannot_create_in_foreign_project",
			method: Method::POST,
			path: "/api/tasks".to_string(),
			user: Some(f.developer.clone()),
			body: Some(json!({"project_id": b, "title": "Sneaky"})),
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "outsider_cannot_list_project_tasks",
			method: Method::GET,
			path: format!("/api/projects/{a}/tasks"),
			user: Some(f.outsider.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "superuser_can_read_any_task",
			method: Method::GET,
			path: format!("/api/tasks/{foreign}"),
			user: Some(f.superuser.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "developer_cannot_delete_task",
			method: Method::DELETE,
			path: format!("/api/tasks/{child}"),
			user: Some(f.developer.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn test_nested_listing_embeds_subtasks() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.get(&format!("/api/projects/{}/tasks", f.project_a.id), Some(&f.developer))
		.await;
	assert_eq!(response.status(), StatusCode::OK);

	let body = json_body(response).await;
	let roots = body.as_array().unwrap();
	assert_eq!(roots.len(), 1);
	assert_eq!(roots[0]["id"], f.parent_task.id.to_string());

	let subtasks = roots[0]["subtasks"].as_array().unwrap();
	assert_eq!(subtasks.len(), 1);
	assert_eq!(subtasks[0]["id"], f.child_task.id.to_string());
	assert_eq!(subtasks[0]["subtasks"], json!([]));
}

#[tokio::test]
async fn test_flat_listing_spans_visible_projects() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let body = json_body(app.get("/api/tasks", Some(&f.viewer)).await).await;
	let mut ids: Vec<String> = body
		.as_array()
		.unwrap()
		.iter()
		.map(|t| t["id"].as_str().unwrap().to_string())
		.collect();
	ids.sort();
	let mut expected = vec![f.parent_task.id.to_string(), f.child_task.id.to_string()];
	expected.sort();
	assert_eq!(ids, expected);

	let body = json_body(app.get("/api/tasks", Some(&f.outsider)).await).await;
	let tasks = body.as_array().unwrap();
	assert_eq!(tasks.len(), 1);
	assert_eq!(tasks[0]["id"], f.foreign_task.id.to_string());
}

#[tokio::test]
async fn test_detail_embeds_subtasks() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let body = json_body(
		app.get(&format!("/api/tasks/{}", f.parent_task.id), Some(&f.viewer))
			.await,
	)
	.await;
	assert_eq!(body["title"], "Parent");
	assert_eq!(body["subtasks"][0]["title"], "Child");
}

#[tokio::test]
async fn test_manage_tags() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let path = format!("/api/tasks/{}/manage-tags", f.parent_task.id);
	let tag_id = f.tag.id.to_string();

	let response = app
		.post(&path, Some(&f.owner), json!({"tag_id": tag_id, "action": "toggle"}))
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json_body(response).await["error"], "invalid_action");

	let response = app
		.post(
			&path,
			Some(&f.owner),
			json!({"tag_id": "00000000-0000-4000-8000-000000000000", "action": "add"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);

	let response = app
		.post(&path, Some(&f.viewer), json!({"tag_id": tag_id, "action": "add"}))
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	let response = app
		.post(&path, Some(&f.admin), json!({"tag_id": tag_id, "action": "add"}))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let body = json_body(response).await;
	assert_eq!(body["tags"][0]["name"], "backend");
	assert_eq!(body["subtasks"][0]["id"], f.child_task.id.to_string());

	for _ in 0..2 {
		let response = app
			.post(&path, Some(&f.owner), json!({"tag_id": tag_id, "action": "remove"}))
			.await;
		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(json_body(response).await["tags"], json!([]));
	}
}

#[tokio::test]
async fn test_parent_cycles_are_rejected() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.patch(
			&format!("/api/tasks/{}", f.parent_task.id),
			Some(&f.owner),
			json!({"parent_task_id": f.child_task.id.to_string()}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json_body(response).await["error"], "invalid_parent");

	let response = app
		.patch(
			&format!("/api/tasks/{}", f.child_task.id),
			Some(&f.owner),
			json!({"parent_task_id": f.foreign_task.id.to_string()}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json_body(response).await["error"], "invalid_parent");

	let response = app
		.patch(
			&format!("/api/tasks/{}", f.child_task.id),
			Some(&f.owner),
			json!({"parent_task_id": null}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert!(json_body(response).await["parent_task_id"].is_null());
}

#[tokio::test]
async fn test_delete_removes_subtree() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.delete(&format!("/api/tasks/{}", f.parent_task.id), Some(&f.admin))
		.await;
	assert_eq!(response.status(), StatusCode::NO_CONTENT);

	let response = app
		.get(&format!("/api/tasks/{}", f.child_task.id), Some(&f.owner))
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
