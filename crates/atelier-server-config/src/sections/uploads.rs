// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Deserialize;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct UploadsConfig {
	pub max_upload_bytes: usize,
}

impl Default for UploadsConfig {
	fn default() -> Self {
		Self {
			max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadsConfigLayer {
	#[serde(default)]
	pub max_upload_bytes: Option<usize>,
}

impl UploadsConfigLayer {
	pub fn merge(&mut self, other: UploadsConfigLayer) {
		if other.max_upload_bytes.is_some() {
			self.max_upload_bytes = other.max_upload_bytes;
		}
	}

	pub fn finalize(self) -> UploadsConfig {
		UploadsConfig {
			max_upload_bytes: self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
		}
	}
}
