// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("failed to parse {}: {source}", path.display())]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("failed to read {}: {source}", path.display())]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("configuration validation failed: {0}")]
	Validation(String),
}
