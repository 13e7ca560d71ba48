// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorResponse {
	/// Stable machine-readable code, e.g. `not_found` or `invalid_field`.
	pub error: String,
	/// Human-readable detail. Names the offending field for validation
	/// errors.
	pub message: String,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: message.into(),
		}
	}
}
