// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{json_body, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn test_annotation_authorization() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let child = f.child_task.id.to_string();
	let feedback = f.feedback.id.to_string();

	let cases = vec![
		AuthzCase {
			name: "anonymous_cannot_comment",
			method: Method::POST,
			path: format!("/api/tasks/{child}/add-comment"),
			user: None,
			body: Some(json!({"text": "hello"})),
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "outsider_cannot_comment_on_task",
			method: Method::POST,
			path: format!("/api/tasks/{child}/add-comment"),
			user: Some(f.outsider.clone()),
			body: Some(json!({"text": "hello"})),
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "viewer_can_comment_on_task",
			method: Method::POST,
			path: format!("/api/tasks/{child}/add-comment"),
			user: Some(f.viewer.clone()),
			body: Some(json!({"text": "Looks good"})),
			expected_status: StatusCode::CREATED,
		},
		AuthzCase {
			name: "empty_comment_rejected",
			method: Method::POST,
			path: format!("/api/tasks/{child}/add-comment"),
			user: Some(f.developer.clone()),
			body: Some(json!({"text": ""})),
			expected_status: StatusCode::BAD_REQUEST,
		},
		AuthzCase {
			name: "outsider_cannot_list_task_comments",
			method: Method::GET,
			path: format!("/api/tasks/{child}/comments"),
			user: Some(f.outsider.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "developer_can_list_task_attachments",
			method: Method::GET,
			path: format!("/api/tasks/{child}/attachments"),
			user: Some(f.developer.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "outsider_cannot_read_feedback",
			method: Method::GET,
			path: format!("/api/feedback/{feedback}"),
			user: Some(f.outsider.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "viewer_can_read_feedback",
			method: Method::GET,
			path: format!("/api/feedback/{feedback}"),
			user: Some(f.viewer.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "viewer_cannot_triage_feedback",
			method: Method::PATCH,
			path: format!("/api/feedback/{feedback}"),
			user: Some(f.viewer.clone()),
			body: Some(json!({"status": "PLANNED"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "owner_can_triage_feedback",
			method: Method::PATCH,
			path: format!("/api/feedback/{feedback}"),
			user: Some(f.owner.clone()),
			body: Some(json!({"status": "IN_ANALYSIS"})),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "developer_cannot_delete_feedback",
			method: Method::DELETE,
			path: format!("/api/feedback/{feedback}"),
			user: Some(f.developer.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "viewer_can_comment_on_feedback",
			method: Method::POST,
			path: format!("/api/feedback/{feedback}/add-comment"),
			user: Some(f.viewer.clone()),
			body: Some(json!({"text": "Still slow on large projects"})),
			expected_status: StatusCode::CREATED,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn test_comments_are_listed_oldest_first() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let path = format!("/api/tasks/{}/add-comment", f.child_task.id);

	let response = app.post(&path, Some(&f.viewer), json!({"text": "first"})).await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let body = json_body(response).await;
	assert_eq!(body["author"], "viewer@a.test");
	assert_eq!(body["author_id"], f.viewer.user.id.to_string());
	assert_eq!(body["text"], "first");

	let response = app.post(&path, Some(&f.owner), json!({"text": "second"})).await;
	assert_eq!(response.status(), StatusCode::CREATED);

	let body = json_body(
		app.get(&format!("/api/tasks/{}/comments", f.child_task.id), Some(&f.developer))
			.await,
	)
	.await;
	let comments = body.as_array().unwrap();
	assert_eq!(comments.len(), 2);
	assert_eq!(comments[0]["text"], "first");
	assert_eq!(comments[0]["author"], "viewer@a.test");
	assert_eq!(comments[1]["text"], "second");
	assert_eq!(comments[1]["author"], "owner@a.test");
}

#[tokio::test]
async fn test_comments_stay_with_their_target() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.post(
			&format!("/api/feedback/{}/add-comment", f.feedback.id),
			Some(&f.owner),
			json!({"text": "on feedback"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);

	let response = app
		.post(
			&format!("/api/tasks/{}/add-comment", f.parent_task.id),
			Some(&f.owner),
			json!({"text": "on parent"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);

	let body = json_body(
		app.get(&format!("/api/tasks/{}/comments", f.child_task.id), Some(&f.owner))
			.await,
	)
	.await;
	assert_eq!(body, json!([]));

	let body = json_body(
		app.get(&format!("/api/tasks/{}/comments", f.parent_task.id), Some(&f.owner))
			.await,
	)
	.await;
	assert_eq!(body.as_array().unwrap().len(), 1);
	assert_eq!(body[0]["text"], "on parent");

	let body = json_body(
		app.get(&format!("/api/feedback/{}/comments", f.feedback.id), Some(&f.owner))
			.await,
	)
	.await;
	assert_eq!(body.as_array().unwrap().len(), 1);
	assert_eq!(body[0]["text"], "on feedback");
}

#[tokio::test]
async fn test_attachment_upload_and_listing() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.upload(
			&format!("/api/tasks/{}/add-attachment", f.child_task.id),
			Some(&f.developer),
			"report.pdf",
			b"%PDF-1.4 test",
			"Crash report",
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let body = json_body(response).await;
	let file = body["file"].as_str().unwrap();
	assert!(file.starts_with("attachments/"), "unexpected reference {file}");
	assert!(file.ends_with(".pdf"), "unexpected reference {file}");
	assert_eq!(body["description"], "Crash report");
	assert_eq!(body["uploaded_by"], "dev@a.test");

	let body = json_body(
		app.get(&format!("/api/tasks/{}/attachments", f.child_task.id), Some(&f.viewer))
			.await,
	)
	.await;
	let attachments = body.as_array().unwrap();
	assert_eq!(attachments.len(), 1);
	assert_eq!(attachments[0]["file"], file);
}

#[tokio::test]
async fn test_task_delete_removes_stored_attachment_bytes() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.upload(
			&format!("/api/tasks/{}/add-attachment", f.child_task.id),
			Some(&f.developer),
			"trace.log",
			b"stack trace",
			"",
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let body = json_body(response).await;
	let stored = app.media_dir.join(body["file"].as_str().unwrap());
	assert!(stored.exists());

	let response = app
		.delete(&format!("/api/tasks/{}", f.parent_task.id), Some(&f.owner))
		.await;
	assert_eq!(response.status(), StatusCode::NO_CONTENT);
	assert!(!stored.exists(), "blob of a purged attachment survived");
}

#[tokio::test]
async fn test_project_delete_removes_feedback_attachment_bytes() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.upload(
			&format!("/api/feedback/{}/add-attachment", f.feedback.id),
			Some(&f.owner),
			"screen.png",
			b"\x89PNG",
			"",
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let body = json_body(response).await;
	let stored = app.media_dir.join(body["file"].as_str().unwrap());
	assert!(stored.exists());

	let response = app
		.delete(&format!("/api/projects/{}", f.project_a.id), Some(&f.owner))
		.await;
	assert_eq!(response.status(), StatusCode::NO_CONTENT);
	assert!(!stored.exists(), "blob of a purged attachment survived");
}

#[tokio::test]
async fn test_attachment_requires_file_part() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.post(
			&format!("/api/feedback/{}/add-attachment", f.feedback.id),
			Some(&f.owner),
			json!({"description": "no file"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_outsider_cannot_upload() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.upload(
			&format!("/api/feedback/{}/add-attachment", f.feedback.id),
			Some(&f.outsider),
			"notes.txt",
			b"hi",
			"",
		)
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feedback_triage_updates_status() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.patch(
			&format!("/api/feedback/{}", f.feedback.id),
			Some(&f.admin),
			json!({"status": "PLANNED"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json_body(response).await["status"], "PLANNED");

	let body = json_body(
		app.get(&format!("/api/projects/{}/feedback", f.project_a.id), Some(&f.viewer))
			.await,
	)
	.await;
	assert_eq!(body[0]["summary"], "Export is slow");
	assert_eq!(body[0]["status"], "PLANNED");
}
