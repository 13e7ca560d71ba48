// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission checks at the HTTP boundary.
//!
//! Authorization uses two tiers:
//!
//! 1. **Route-level**: [`RequireCapability`] checks actions that do not
//!    depend on a particular project, such as creating a project or a tag.
//! 2. **Handler-level**: handlers first load the target through its scope
//!    (absent means 404), then call [`build_subject_attrs`] and
//!    [`check_authorization`] against the owning project (denied means 403).
//!
//! Denials are logged at `info` with the user id and action. Tokens are
//! never logged.

use atelier_common_core::ProjectId;
use atelier_server_auth::{
	is_allowed, resolve_role, Action, AuthContext, CurrentUser, ResourceAttrs, ResourceType,
	SubjectAttrs,
};
use atelier_server_db::ProjectRepository;
use axum::{
	body::Body,
	http::Request,
	response::{IntoResponse, Response},
};
use pin_project_lite::pin_project;
use std::{
	future::Future,
	pin::Pin,
	task::{Context, Poll},
};
use tower::{Layer, Service};
use tracing::instrument;

use crate::error::ApiError;

// =============================================================================
// Route-Level Authorization Layer
// =============================================================================

/// Route layer that checks a project-independent capability.
///
/// Rejects unauthenticated requests with 401 and denied ones with 403.
///
/// ```ignore
/// Router::new()
///     .route("/tags", post(create_tag))
///     .route_layer(RequireCapability::new(Action::Create, ResourceType::Tag))
/// ```
#[derive(Clone)]
pub struct RequireCapability {
	action: Action,
	resource_type: ResourceType,
}

impl RequireCapability {
	pub fn new(action: Action, resource_type: ResourceType) -> Self {
		Self {
			action,
			resource_type,
		}
	}
}

impl<S> Layer<S> for RequireCapability {
	type Service = RequireCapabilityService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequireCapabilityService {
			inner,
			action: self.action,
			resource_type: self.resource_type,
		}
	}
}

#[derive(Clone)]
pub struct RequireCapabilityService<S> {
	inner: S,
	action: Action,
	resource_type: ResourceType,
}

impl<S> Service<Request<Body>> for RequireCapabilityService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
{
	type Response = Response;
	type Error = S::Error;
	type Future = RequireCapabilityFuture<S::Future>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let auth_ctx = req
			.extensions()
			.get::<AuthContext>()
			.cloned()
			.unwrap_or_else(AuthContext::unauthenticated);

		let Some(current_user) = auth_ctx.current_user else {
			tracing::debug!(
				action = ?self.action,
				resource_type = ?self.resource_type,
				"ABAC denied: not authenticated"
			);
			return RequireCapabilityFuture::Rejected {
				resp: Some(ApiError::Unauthorized.into_response()),
			};
		};

		let subject =
			SubjectAttrs::new(current_user.user.id).with_superuser(current_user.user.is_superuser);
		let resource = ResourceAttrs::global(self.resource_type);

		if !is_allowed(&subject, self.action, &resource) {
			tracing::info!(
				user_id = %current_user.user.id,
				action = ?self.action,
				resource_type = ?self.resource_type,
				"ABAC denied: capability check failed"
			);
			return RequireCapabilityFuture::Rejected {
				resp: Some(ApiError::Forbidden.into_response()),
			};
		}

		RequireCapabilityFuture::Inner {
			fut: self.inner.call(req),
		}
	}
}

pin_project! {
	/// Future for [`RequireCapabilityService`].
	#[project = RequireCapabilityFutureProj]
	pub enum RequireCapabilityFuture<F> {
		Inner { #[pin] fut: F },
		Rejected { resp: Option<Response> },
	}
}

impl<F, E> Future for RequireCapabilityFuture<F>
where
	F: Future<Output = Result<Response, E>>,
{
	type Output = Result<Response, E>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match self.project() {
			RequireCapabilityFutureProj::Inner { fut } => fut.poll(cx),
			RequireCapabilityFutureProj::Rejected { resp } => {
				Poll::Ready(Ok(resp.take().expect("polled after completion")))
			}
		}
	}
}

// =============================================================================
// Handler-level authorization helpers
// =============================================================================

/// Build [`SubjectAttrs`] for `user` with their effective role on `project_id`.
///
/// A missing project simply yields no role.
#[instrument(skip(user, projects), fields(user_id = %user.user.id, project_id = %project_id))]
pub async fn build_subject_attrs(
	user: &CurrentUser,
	project_id: ProjectId,
	projects: &ProjectRepository,
) -> Result<SubjectAttrs, ApiError> {
	let subject = SubjectAttrs::new(user.user.id).with_superuser(user.user.is_superuser);

	let Some(project) = projects.get_project_by_id(&project_id).await? else {
		return Ok(subject);
	};
	let membership = projects.get_membership(&project_id, &user.user.id).await?;
	let role = resolve_role(user.user.id, project.owner_id, membership.map(|m| m.role));

	Ok(subject.with_project_role(project_id, role))
}

/// Returns [`ApiError::Forbidden`] unless `subject` may perform `action`.
pub fn check_authorization(
	subject: &SubjectAttrs,
	action: Action,
	resource: &ResourceAttrs,
) -> Result<(), ApiError> {
	if is_allowed(subject, action, resource) {
		return Ok(());
	}

	tracing::info!(
		user_id = %subject.user_id,
		action = ?action,
		resource_type = ?resource.resource_type,
		project_id = ?resource.project_id,
		"ABAC denied"
	);
	Err(ApiError::Forbidden)
}

/// Resolve the caller's role on the resource's project and check `action`.
pub async fn authorize(
	user: &CurrentUser,
	action: Action,
	resource: ResourceAttrs,
	projects: &ProjectRepository,
) -> Result<(), ApiError> {
	let subject = match resource.project_id {
		Some(project_id) => build_subject_attrs(user, project_id, projects).await?,
		None => SubjectAttrs::new(user.user.id).with_superuser(user.user.is_superuser),
	};
	check_authorization(&subject, action, &resource)
}
