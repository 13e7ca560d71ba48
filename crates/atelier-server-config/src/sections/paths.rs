// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Filesystem locations.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PathsConfig {
	pub data_dir: PathBuf,
	/// Root of the attachment blob store.
	pub media_dir: PathBuf,
}

impl Default for PathsConfig {
	fn default() -> Self {
		PathsConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfigLayer {
	#[serde(default)]
	pub data_dir: Option<String>,
	#[serde(default)]
	pub media_dir: Option<String>,
}

impl PathsConfigLayer {
	pub fn merge(&mut self, other: PathsConfigLayer) {
		if other.data_dir.is_some() {
			self.data_dir = other.data_dir;
		}
		if other.media_dir.is_some() {
			self.media_dir = other.media_dir;
		}
	}

	/// `media_dir` defaults to `<data_dir>/media`.
	pub fn finalize(self) -> PathsConfig {
		let data_dir = PathBuf::from(self.data_dir.unwrap_or_else(|| "./data".to_string()));
		let media_dir = self
			.media_dir
			.map(PathBuf::from)
			.unwrap_or_else(|| data_dir.join("media"));
		PathsConfig {
			data_dir,
			media_dir,
		}
	}
}
