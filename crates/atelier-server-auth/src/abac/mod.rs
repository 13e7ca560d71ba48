// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute-Based Access Control (ABAC) engine.
//!
//! # Architecture
//!
//! 1. **Types** ([`types`]): subjects, resources and actions
//! 2. **Policies** ([`policies`]): per-resource evaluators
//! 3. **Engine** ([`engine`]): entry point that routes to the right policy
//!
//! # Policy Evaluation Flow
//!
//! ```text
//! is_allowed(subject, action, resource)
//!     │
//!     ├── Superuser → always allowed
//!     │
//!     └── Route to resource-specific policy:
//!         ├── Project / Task / Feedback / Membership → project::evaluate()
//!         └── Tag → tag::evaluate()
//! ```
//!
//! # Example
//!
//! ```
//! use atelier_server_auth::abac::{is_allowed, Action, ResourceAttrs, ResourceType, SubjectAttrs};
//! use atelier_server_auth::{resolve_role, ProjectId, UserId};
//!
//! let user_id = UserId::generate();
//! let project_id = ProjectId::generate();
//!
//! // The user owns the project.
//! let role = resolve_role(user_id, user_id, None);
//! let subject = SubjectAttrs::new(user_id).with_project_role(project_id, role);
//!
//! let resource = ResourceAttrs::in_project(ResourceType::Task, project_id);
//! assert!(is_allowed(&subject, Action::Delete, &resource));
//! ```

pub mod engine;
pub mod policies;
pub mod types;

pub use engine::*;
pub use types::*;
