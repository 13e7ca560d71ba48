// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections. Each section has a resolved `XConfig` and a
//! partial `XConfigLayer` that sources produce and merge.

mod auth;
mod database;
mod http;
mod logging;
mod paths;
mod uploads;

pub use auth::{AuthConfig, AuthConfigLayer};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer, DEFAULT_LOG_LEVEL};
pub use paths::{PathsConfig, PathsConfigLayer};
pub use uploads::{UploadsConfig, UploadsConfigLayer, DEFAULT_MAX_UPLOAD_BYTES};
