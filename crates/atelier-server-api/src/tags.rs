// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use atelier_common_core::Tag;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TagResponse {
	pub id: String,
	pub name: String,
	/// `#RRGGBB`.
	pub color: String,
}

impl From<&Tag> for TagResponse {
	fn from(tag: &Tag) -> Self {
		Self {
			id: tag.id.to_string(),
			name: tag.name.clone(),
			color: tag.color.clone(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateTagRequest {
	pub name: String,
	/// Defaults to `#808080`.
	#[serde(default)]
	pub color: Option<String>,
}
