// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use atelier_common_core::{
	Feedback, NewProject, NewTask, Project, ProjectRole, Tag, Task, User,
};
use atelier_server_auth::AccessToken;
use atelier_server_db::{NewFeedback, NewUser};
use axum::{
	body::Body,
	http::{header::HeaderName, header::HeaderValue, Method, Request, StatusCode},
	response::Response,
	Router,
};
use serde::Serialize;
use tempfile::TempDir;
use std::path::PathBuf;
use tower::ServiceExt;

use atelier_server::{
	api::{create_app_state, create_router, AppState},
	ServerConfig,
};

#[derive(Clone)]
pub struct TestUser {
	pub user: User,
	pub token: String,
}

impl TestUser {
	pub fn auth_header(&self) -> (HeaderName, HeaderValue) {
		(
			HeaderName::from_static("authorization"),
			HeaderValue::from_str(&format!("Bearer {}", self.token)).unwrap(),
		)
	}
}

/// Project A with one user per access level, and an unrelated project B.
///
/// Project A holds `parent_task` with `child_task` beneath it, and one
/// feedback item. Project B holds `foreign_task`.
#[derive(Clone)]
pub struct Fixtures {
	pub owner: TestUser,
	pub admin: TestUser,
	pub developer: TestUser,
	pub viewer: TestUser,
	pub outsider: TestUser,
	pub superuser: TestUser,
	pub project_a: Project,
	pub project_b: Project,
	pub parent_task: Task,
	pub child_task: Task,
	pub foreign_task: Task,
	pub feedback: Feedback,
	pub tag: Tag,
}

pub struct TestApp {
	pub router: Router,
	pub fixtures: Fixtures,
	pub state: AppState,
	pub media_dir: PathBuf,
	_temp_dir: TempDir,
}

impl TestApp {
	pub async fn new() -> Self {
		let temp_dir = tempfile::tempdir().unwrap();
		let db_path = temp_dir.path().join("test_authz.db");
		let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
		let pool = atelier_server_db::create_pool(&db_url).await.unwrap();
		atelier_server_db::run_migrations(&pool).await.unwrap();

		let media_dir = temp_dir.path().join("media");
		let mut config = ServerConfig::default();
		config.paths.media_dir = media_dir.clone();
		let mut state = create_app_state(pool, &config).await;
		state.auth_config.dev_mode = false;

		let fixtures = create_fixtures(&state).await;
		let router = create_router(state.clone());

		Self {
			router,
			fixtures,
			state,
			media_dir,
			_temp_dir: temp_dir,
		}
	}

	pub async fn get(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::GET, path, user, Option::<()>::None)
			.await
	}

	pub async fn post(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::POST, path, user, Some(body)).await
	}

	pub async fn put(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::PUT, path, user, Some(body)).await
	}

	pub async fn patch(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::PATCH, path, user, Some(body)).await
	}

	pub async fn delete(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::DELETE, path, user, Option::<()>::None)
			.await
	}

	/// POST a multipart body with a single `file` part and a `description`.
	pub async fn upload(
		&self,
		path: &str,
		user: Option<&TestUser>,
		file_name: &str,
		contents: &[u8],
		description: &str,
	) -> Response<Body> {
		let boundary = "atelier-test-boundary";
		let mut body = Vec::new();
		body.extend_from_slice(
			format!(
				"--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
				Content-Type: application/octet-stream\r\n\r\n"
			)
			.as_bytes(),
		);
		body.extend_from_slice(contents);
		body.extend_from_slice(
			format!(
				"\r\n--{boundary}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\n\
				{description}\r\n--{boundary}--\r\n"
			)
			.as_bytes(),
		);

		let mut builder = Request::builder()
			.method(Method::POST)
			.uri(path)
			.header(
				"content-type",
				format!("multipart/form-data; boundary={boundary}"),
			);
		if let Some(test_user) = user {
			let (name, value) = test_user.auth_header();
			builder = builder.header(name, value);
		}

		let request = builder.body(Body::from(body)).unwrap();
		self.router.clone().oneshot(request).await.unwrap()
	}

	async fn request<T: Serialize>(
		&self,
		method: Method,
		path: &str,
		user: Option<&TestUser>,
		body: Option<T>,
	) -> Response<Body> {
		let mut builder = Request::builder().method(method).uri(path);

		if let Some(test_user) = user {
			let (name, value) = test_user.auth_header();
			builder = builder.header(name, value);
		}

		let request_body = match body {
			Some(b) => {
				builder = builder.header("content-type", "application/json");
				Body::from(serde_json::to_string(&b).unwrap())
			}
			None => Body::empty(),
		};

		let request = builder.body(request_body).unwrap();

		self.router.clone().oneshot(request).await.unwrap()
	}
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
	let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&body_bytes).unwrap()
}

pub struct AuthzCase {
	pub name: &'static str,
	pub method: Method,
	pub path: String,
	pub user: Option<TestUser>,
	pub body: Option<serde_json::Value>,
	pub expected_status: StatusCode,
}

pub async fn run_authz_cases(app: &TestApp, cases: &[AuthzCase]) {
	for case in cases {
		let response = match (&case.method, &case.body) {
			(m, Some(body)) if *m == Method::POST => {
				app.post(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, Some(body)) if *m == Method::PUT => {
				app.put(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, Some(body)) if *m == Method::PATCH => {
				app
					.patch(&case.path, case.user.as_ref(), body.clone())
					.await
			}
			(m, _) if *m == Method::DELETE => app.delete(&case.path, case.user.as_ref()).await,
			_ => app.get(&case.path, case.user.as_ref()).await,
		};

		if response.status() != case.expected_status {
			let (parts, body) = response.into_parts();
			let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
			let body_str = String::from_utf8_lossy(&body_bytes);
			panic!(
				"Case '{}': {} {} - expected {}, got {}\nResponse body: {}",
				case.name, case.method, case.path, case.expected_status, parts.status, body_str
			);
		}
	}
}

async fn create_fixtures(state: &AppState) -> Fixtures {
	let owner = create_test_user(state, "owner@a.test", "Olive", "Owner", false).await;
	let admin = create_test_user(state, "admin@a.test", "Ada", "Admin", false).await;
	let developer = create_test_user(state, "dev@a.test", "Dev", "Eloper", false).await;
	let viewer = create_test_user(state, "viewer@a.test", "Vic", "Viewer", false).await;
	let outsider = create_test_user(state, "owner@b.test", "Otto", "Outsider", false).await;
	let superuser = create_test_user(state, "root@test.com", "Sue", "Peruser", true).await;

	let project_a = create_project(state, &owner, "Project A").await;
	let project_b = create_project(state, &outsider, "Project B").await;

	for (member, role) in [
		(&admin, ProjectRole::Admin),
		(&developer, ProjectRole::Developer),
		(&viewer, ProjectRole::Viewer),
	] {
		state
			.project_repo
			.add_member(&project_a.id, &member.user.id, role)
			.await
			.unwrap();
	}

	let parent_task = create_task(state, &project_a, "Parent", None).await;
	let child_task = create_task(state, &project_a, "Child", Some(&parent_task)).await;
	let foreign_task = create_task(state, &project_b, "Foreign", None).await;

	let feedback = state
		.feedback_repo
		.create_feedback(
			&project_a.id,
			Some(&viewer.user.id),
			&NewFeedback {
				summary: "Export is slow".to_string(),
				..Default::default()
			},
		)
		.await
		.unwrap();

	let tag = state.tag_repo.create_tag("backend", "#112233").await.unwrap();

	Fixtures {
		owner,
		admin,
		developer,
		viewer,
		outsider,
		superuser,
		project_a,
		project_b,
		parent_task,
		child_task,
		foreign_task,
		feedback,
		tag,
	}
}

async fn create_project(state: &AppState, owner: &TestUser, name: &str) -> Project {
	state
		.project_repo
		.create_project(
			&owner.user.id,
			&NewProject {
				name: name.to_string(),
				..Default::default()
			},
		)
		.await
		.unwrap()
}

async fn create_task(state: &AppState, project: &Project, title: &str, parent: Option<&Task>) -> Task {
	state
		.task_repo
		.create_task(
			&project.id,
			&NewTask {
				title: title.to_string(),
				parent_task_id: parent.map(|p| p.id),
				..Default::default()
			},
		)
		.await
		.unwrap()
}

pub async fn create_test_user(
	state: &AppState,
	email: &str,
	first_name: &str,
	last_name: &str,
	is_superuser: bool,
) -> TestUser {
	let user = state
		.user_repo
		.create_user(&NewUser {
			email: email.to_string(),
			first_name: first_name.to_string(),
			last_name: last_name.to_string(),
			is_superuser,
			..Default::default()
		})
		.await
		.unwrap();

	let (access_token, token) = AccessToken::new(user.id, "test", 30);
	state
		.user_repo
		.create_access_token(&access_token)
		.await
		.unwrap();

	TestUser { user, token }
}
