// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Deserialize;

pub const DEFAULT_LOG_LEVEL: &str = "info,tower_http::trace=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
}

impl LogFormat {
	/// Parses a format name, falling back to `Pretty` for anything unknown.
	pub fn parse_lossy(value: &str) -> Self {
		match value.to_lowercase().as_str() {
			"json" => LogFormat::Json,
			_ => LogFormat::Pretty,
		}
	}
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
	/// `EnvFilter` directive used when `RUST_LOG` is unset.
	pub level: String,
	pub format: LogFormat,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		LoggingConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfigLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<LogFormat>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: LoggingConfigLayer) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
			format: self.format.unwrap_or_default(),
		}
	}
}
