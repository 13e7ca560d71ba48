// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Global tags shared by projects and tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::TagId;

pub const DEFAULT_TAG_COLOR: &str = "#808080";
pub const MAX_TAG_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Tag {
	pub id: TagId,
	pub name: String,
	pub color: String,
	pub created_at: DateTime<Utc>,
}

/// Accepts `#RRGGBB` hex colors.
pub fn validate_color(color: &str) -> Result<(), CoreError> {
	let valid = color.len() == 7
		&& color.starts_with('#')
		&& color[1..].bytes().all(|b| b.is_ascii_hexdigit());
	if valid {
		Ok(())
	} else {
		Err(CoreError::InvalidTagColor(color.to_string()))
	}
}
