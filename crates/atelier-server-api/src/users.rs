// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use atelier_common_core::User;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A user as embedded in other resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserSummaryResponse {
	pub id: String,
	pub full_name: String,
	pub email: String,
	pub profile_picture: Option<String>,
}

impl From<&User> for UserSummaryResponse {
	fn from(user: &User) -> Self {
		Self {
			id: user.id.to_string(),
			full_name: user.full_name(),
			email: user.email.clone(),
			profile_picture: user.profile_picture.clone(),
		}
	}
}
