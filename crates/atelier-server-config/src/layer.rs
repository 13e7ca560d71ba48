// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Deserialize;

use crate::sections::{
	AuthConfigLayer, DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer, PathsConfigLayer,
	UploadsConfigLayer,
};

/// One source's view of the configuration. Absent sections and fields defer
/// to lower-precedence sources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub auth: Option<AuthConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub paths: Option<PathsConfigLayer>,
	#[serde(default)]
	pub uploads: Option<UploadsConfigLayer>,
}

macro_rules! merge_section {
	($self:ident, $other:ident, $field:ident) => {
		if let Some(section) = $other.$field {
			match &mut $self.$field {
				Some(existing) => existing.merge(section),
				None => $self.$field = Some(section),
			}
		}
	};
}

impl ServerConfigLayer {
	/// Overlay `other` on top of `self`.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section!(self, other, http);
		merge_section!(self, other, database);
		merge_section!(self, other, auth);
		merge_section!(self, other, logging);
		merge_section!(self, other, paths);
		merge_section!(self, other, uploads);
	}
}
