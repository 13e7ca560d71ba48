// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Users as seen from the local directory table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// A user known to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
	pub id: UserId,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub job_title: Option<String>,
	pub profile_picture: Option<String>,
	/// Superusers see every project and pass every permission check.
	pub is_superuser: bool,
	pub created_at: DateTime<Utc>,
}

impl User {
	/// "first last" with surrounding whitespace removed.
	pub fn full_name(&self) -> String {
		format!("{} {}", self.first_name, self.last_name)
			.trim()
			.to_string()
	}
}
