// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Atelier server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`ATELIER_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use atelier_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub logging: LoggingConfig,
	pub paths: PathsConfig,
	pub uploads: UploadsConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`ATELIER_SERVER_*`)
/// 2. Config file (`/etc/atelier/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let auth = layer.auth.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let paths = layer.paths.unwrap_or_default().finalize();
	let uploads = layer.uploads.unwrap_or_default().finalize();

	database.validate()?;
	validate_config(&auth, &uploads)?;

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		dev_mode = auth.dev_mode,
		media_dir = %paths.media_dir.display(),
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		auth,
		logging,
		paths,
		uploads,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(auth: &AuthConfig, uploads: &UploadsConfig) -> Result<(), ConfigError> {
	if auth.dev_mode && auth.environment == "production" {
		return Err(ConfigError::Validation(
			"ATELIER_SERVER_AUTH_DEV_MODE=1 is set while ATELIER_SERVER_ENV=production. \
			 This is a security risk. Remove ATELIER_SERVER_AUTH_DEV_MODE or set ATELIER_SERVER_ENV \
			 to a non-production value."
				.to_string(),
		));
	}

	if auth.dev_mode && auth.dev_user_email.is_none() {
		return Err(ConfigError::Validation(
			"dev mode requires ATELIER_SERVER_DEV_USER_EMAIL".to_string(),
		));
	}

	if auth.token_ttl_days <= 0 {
		return Err(ConfigError::InvalidValue {
			key: "auth.token_ttl_days".to_string(),
			message: "must be positive".to_string(),
		});
	}

	if uploads.max_upload_bytes == 0 {
		return Err(ConfigError::InvalidValue {
			key: "uploads.max_upload_bytes".to_string(),
			message: "must be positive".to_string(),
		});
	}

	Ok(())
}
