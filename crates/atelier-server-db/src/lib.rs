// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for the Atelier server.
//!
//! This crate provides:
//! - Connection pooling and schema migrations
//! - One repository per aggregate (users, projects, tasks, feedback, tags)
//! - The polymorphic [`AnnotationStore`] for comments and attachments
//! - SQL renderings of the visibility scopes from `atelier-server-auth`
//!
//! # Usage
//!
//! ```ignore
//! use atelier_server_db::{create_pool, run_migrations, ProjectRepository};
//! use atelier_server_auth::ProjectScope;
//!
//! let pool = create_pool("sqlite:./atelier.db").await?;
//! run_migrations(&pool).await?;
//! let projects = ProjectRepository::new(pool).list_projects(&ProjectScope::Unrestricted).await?;
//! ```

pub mod annotation;
mod convert;
pub mod error;
pub mod feedback;
pub mod migrations;
pub mod pool;
pub mod project;
mod scope;
pub mod tag;
pub mod task;
pub mod user;

#[cfg(test)]
mod testing;

pub use annotation::{Annotation, AnnotationPayload, AnnotationRepository, AnnotationStore};
pub use error::{DbError, Result};
pub use feedback::{FeedbackRepository, NewFeedback};
pub use migrations::run_migrations;
pub use pool::{create_pool, create_pool_with, PoolSettings};
pub use project::ProjectRepository;
pub use tag::TagRepository;
pub use task::TaskRepository;
pub use user::{NewUser, UserRepository};
