// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files and environment variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AuthConfigLayer, DatabaseConfigLayer, HttpConfigLayer, LogFormat, LoggingConfigLayer,
	PathsConfigLayer, UploadsConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults. Every field is left unset so `finalize` fills it.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/atelier/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: ATELIER_SERVER_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			database: Some(load_database_from_env()?),
			auth: Some(load_auth_from_env()?),
			logging: Some(load_logging_from_env()),
			paths: Some(load_paths_from_env()),
			uploads: Some(load_uploads_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

/// Parses an optional numeric variable, naming the variable on failure.
fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!(
				"invalid {} value '{v}'",
				std::any::type_name::<T>()
			),
		}),
		None => Ok(None),
	}
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("ATELIER_SERVER_HOST"),
		port: env_parse("ATELIER_SERVER_PORT")?,
		base_url: env_var("ATELIER_SERVER_BASE_URL"),
	})
}

fn load_database_from_env() -> Result<DatabaseConfigLayer, ConfigError> {
	Ok(DatabaseConfigLayer {
		url: env_var("ATELIER_SERVER_DATABASE_URL"),
		max_connections: env_parse("ATELIER_SERVER_DATABASE_MAX_CONNECTIONS")?,
		busy_timeout_ms: env_parse("ATELIER_SERVER_DATABASE_BUSY_TIMEOUT_MS")?,
	})
}

fn load_auth_from_env() -> Result<AuthConfigLayer, ConfigError> {
	Ok(AuthConfigLayer {
		dev_mode: env_bool("ATELIER_SERVER_AUTH_DEV_MODE"),
		environment: env_var("ATELIER_SERVER_ENV"),
		token_ttl_days: env_parse("ATELIER_SERVER_TOKEN_TTL_DAYS")?,
		session_cookie_name: env_var("ATELIER_SERVER_SESSION_COOKIE_NAME"),
		dev_user_email: env_var("ATELIER_SERVER_DEV_USER_EMAIL"),
	})
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("ATELIER_SERVER_LOG_LEVEL"),
		format: env_var("ATELIER_SERVER_LOG_FORMAT").map(|v| LogFormat::parse_lossy(&v)),
	}
}

fn load_paths_from_env() -> PathsConfigLayer {
	PathsConfigLayer {
		data_dir: env_var("ATELIER_SERVER_DATA_DIR"),
		media_dir: env_var("ATELIER_SERVER_MEDIA_DIR"),
	}
}

fn load_uploads_from_env() -> Result<UploadsConfigLayer, ConfigError> {
	Ok(UploadsConfigLayer {
		max_upload_bytes: env_parse("ATELIER_SERVER_MAX_UPLOAD_BYTES")?,
	})
}
