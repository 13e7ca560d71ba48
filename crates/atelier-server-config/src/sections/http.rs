// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP listener configuration.

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
	/// Public URL of the server, used in generated links.
	pub base_url: String,
}

impl Default for HttpConfig {
	fn default() -> Self {
		HttpConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
	#[serde(default)]
	pub base_url: Option<String>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: HttpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
	}

	pub fn finalize(self) -> HttpConfig {
		let host = self.host.unwrap_or_else(|| "0.0.0.0".to_string());
		let port = self.port.unwrap_or(8080);
		let base_url = self
			.base_url
			.unwrap_or_else(|| format!("http://localhost:{port}"));
		HttpConfig {
			host,
			port,
			base_url,
		}
	}
}
