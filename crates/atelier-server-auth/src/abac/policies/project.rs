// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policies for everything that lives inside a project.
//!
//! Projects, tasks, feedback and memberships are all decided against the
//! caller's role on the owning project. The resource type only matters for
//! the project collection itself, which has no owning project yet.

use crate::abac::{Action, ResourceAttrs, ResourceType, SubjectAttrs};

/// Evaluates a project-scoped resource.
pub fn evaluate(subject: &SubjectAttrs, action: Action, resource: &ResourceAttrs) -> bool {
	let Some(project_id) = resource.project_id else {
		return resource.resource_type == ResourceType::Project
			&& matches!(action, Action::List | Action::Create);
	};

	match action {
		Action::List | Action::Read | Action::Create | Action::Annotate => {
			subject.can_see_project(project_id)
		}
		Action::Update | Action::Delete | Action::ManageTags | Action::ManageMembers => {
			subject.is_project_admin(project_id)
		}
	}
}
