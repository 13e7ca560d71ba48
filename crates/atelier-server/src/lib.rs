// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Atelier project management server.
//!
//! Axum HTTP layer over `atelier-server-db`: authentication, scoped lookups,
//! role checks, nested task rendering and attachment storage.

pub mod abac_middleware;
pub mod api;
pub mod api_docs;
pub mod auth_middleware;
pub mod blob;
pub mod error;
pub mod routes;
pub mod tree;
pub mod validation;

pub use api::{create_app_state, create_router, AppState};
pub use api_docs::ApiDoc;
pub use atelier_server_config::ServerConfig;
pub use blob::{BlobStore, LocalBlobStore};
pub use error::ApiError;
