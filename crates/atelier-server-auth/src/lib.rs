// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and authorization for Atelier.
//!
//! This crate provides:
//! - The role resolver ([`resolve_role`]) combining ownership and membership
//! - Resource scopes ([`ProjectScope`], [`TaskScope`], [`FeedbackScope`])
//! - The ABAC permission gate ([`is_allowed`])
//! - Access token generation and hashing
//! - Request authentication context
//!
//! # Access model
//!
//! Every project-scoped resource is judged by the caller's role on its
//! owning project. Visibility (scope) and permission (gate) are separate
//! questions: a resource outside a user's scope does not exist for them,
//! while a visible resource may still refuse a mutation.

pub mod abac;
pub mod access_token;
pub mod middleware;
pub mod resolver;
pub mod scope;

pub use abac::{is_allowed, Action, ProjectRoleAttr, ResourceAttrs, ResourceType, SubjectAttrs};
pub use access_token::{
	generate_access_token, hash_token, is_valid_access_token_format, AccessToken,
	ACCESS_TOKEN_BYTES, ACCESS_TOKEN_EXPIRY_DAYS, ACCESS_TOKEN_PREFIX,
};
pub use atelier_common_core::{
	AccessTokenId, OwningProject, ProjectId, ProjectRole, User, UserId,
};
pub use middleware::{
	extract_bearer_token, extract_session_cookie_with_name, AuthConfig, AuthContext,
	AuthRequired, CurrentUser, SESSION_COOKIE_NAME,
};
pub use resolver::{resolve_role, EffectiveRole};
pub use scope::{FeedbackScope, ProjectScope, RouteContext, TaskScope};
