// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite storage settings.
//!
//! Atelier only speaks SQLite, so a URL with any other scheme is rejected at
//! load time rather than when the pool first connects.

use serde::Deserialize;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./atelier.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
	pub url: String,
	pub max_connections: u32,
	/// How long a writer waits on a locked database before `SQLITE_BUSY`.
	pub busy_timeout: Duration,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		DatabaseConfigLayer::default().finalize()
	}
}

impl DatabaseConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !self.url.starts_with("sqlite:") {
			return Err(ConfigError::InvalidValue {
				key: "database.url".to_string(),
				message: format!("expected a sqlite: URL, got {:?}", self.url),
			});
		}
		if self.max_connections == 0 {
			return Err(ConfigError::InvalidValue {
				key: "database.max_connections".to_string(),
				message: "must be at least 1".to_string(),
			});
		}
		Ok(())
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub max_connections: Option<u32>,
	#[serde(default)]
	pub busy_timeout_ms: Option<u64>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		self.url = other.url.or(self.url.take());
		self.max_connections = other.max_connections.or(self.max_connections);
		self.busy_timeout_ms = other.busy_timeout_ms.or(self.busy_timeout_ms);
	}

	pub fn finalize(self) -> DatabaseConfig {
		DatabaseConfig {
			url: self.url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
			max_connections: self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
			busy_timeout: Duration::from_millis(self.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS)),
		}
	}
}
