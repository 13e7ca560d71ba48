// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Type definitions for ABAC policy evaluation.
//!
//! - [`SubjectAttrs`]: the caller, with roles already resolved per project
//! - [`ResourceAttrs`]: the resource, reduced to its type and owning project
//! - [`Action`]: the operation being attempted
//!
//! Policy functions receive fully loaded attributes and never touch storage.

use atelier_common_core::{OwningProject, ProjectId, UserId};
use serde::{Deserialize, Serialize};

use crate::resolver::EffectiveRole;

/// Attributes describing the user requesting access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectAttrs {
	pub user_id: UserId,
	pub is_superuser: bool,
	pub project_roles: Vec<ProjectRoleAttr>,
}

impl SubjectAttrs {
	/// Creates a subject with no resolved project roles.
	pub fn new(user_id: UserId) -> Self {
		Self {
			user_id,
			is_superuser: false,
			project_roles: Vec::new(),
		}
	}

	pub fn with_superuser(mut self, is_superuser: bool) -> Self {
		self.is_superuser = is_superuser;
		self
	}

	/// Records the resolved role for a project. `None` records nothing.
	pub fn with_project_role(mut self, project_id: ProjectId, role: Option<EffectiveRole>) -> Self {
		if let Some(role) = role {
			self.project_roles.push(ProjectRoleAttr { project_id, role });
		}
		self
	}

	pub fn project_role(&self, project_id: ProjectId) -> Option<EffectiveRole> {
		self.project_roles
			.iter()
			.find(|r| r.project_id == project_id)
			.map(|r| r.role)
	}

	/// Owner or any membership role.
	pub fn can_see_project(&self, project_id: ProjectId) -> bool {
		self.project_role(project_id).is_some()
	}

	/// Owner or ADMIN member.
	pub fn is_project_admin(&self, project_id: ProjectId) -> bool {
		self.project_role(project_id)
			.map(|r| r.is_at_least_admin())
			.unwrap_or(false)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRoleAttr {
	pub project_id: ProjectId,
	pub role: EffectiveRole,
}

/// Attributes describing the resource being accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAttrs {
	pub resource_type: ResourceType,
	/// Project whose membership governs access. `None` for collections that
	/// are not inside a project (the project list itself, tags).
	pub project_id: Option<ProjectId>,
}

impl ResourceAttrs {
	/// A resource governed by the project it lives in.
	pub fn owned_by(resource_type: ResourceType, resource: &impl OwningProject) -> Self {
		Self {
			resource_type,
			project_id: Some(resource.owning_project_id()),
		}
	}

	/// A collection or action addressed by project id alone, such as
	/// "tasks of project P" before any task is loaded.
	pub fn in_project(resource_type: ResourceType, project_id: ProjectId) -> Self {
		Self {
			resource_type,
			project_id: Some(project_id),
		}
	}

	/// A resource type outside any project.
	pub fn global(resource_type: ResourceType) -> Self {
		Self {
			resource_type,
			project_id: None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
	Project,
	Task,
	Feedback,
	Membership,
	Tag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	List,
	Create,
	Read,
	Update,
	Delete,
	/// Add a comment or attachment.
	Annotate,
	ManageTags,
	ManageMembers,
}

impl Action {
	pub fn all() -> &'static [Action] {
		&[
			Action::List,
			Action::Create,
			Action::Read,
			Action::Update,
			Action::Delete,
			Action::Annotate,
			Action::ManageTags,
			Action::ManageMembers,
		]
	}
}
