// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! ABAC policy evaluation engine.
//!
//! [`is_allowed`] first applies the superuser bypass, then delegates to the
//! policy module for the resource type. Policies are pure functions over the
//! pre-loaded attributes.

use super::policies::{project, tag};
use super::types::{Action, ResourceAttrs, ResourceType, SubjectAttrs};
use tracing::instrument;

/// Evaluates whether a subject is allowed to perform an action on a resource.
///
/// # Arguments
///
/// * `subject` - Attributes of the user making the request
/// * `action` - The operation being attempted
/// * `resource` - Attributes of the resource being accessed
///
/// # Returns
///
/// `true` if the action is allowed, `false` otherwise.
#[instrument(
    level = "debug",
    skip(subject, resource),
    fields(
        user_id = %subject.user_id,
        action = ?action,
        resource_type = ?resource.resource_type,
    )
)]
pub fn is_allowed(subject: &SubjectAttrs, action: Action, resource: &ResourceAttrs) -> bool {
	if subject.is_superuser {
		return true;
	}

	match resource.resource_type {
		ResourceType::Project
		| ResourceType::Task
		| ResourceType::Feedback
		| ResourceType::Membership => project::evaluate(subject, action, resource),
		ResourceType::Tag => tag::evaluate(subject, action, resource),
	}
}
