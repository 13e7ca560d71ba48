// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Type-safe identifiers.
//!
//! Every persisted entity is keyed by a UUID. The newtypes below keep a
//! [`TaskId`] from being passed where a [`ProjectId`] is expected. All of them
//! serialize transparently as UUID strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
				Ok(Self(Uuid::parse_str(s)?))
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(ProjectId, "Unique identifier for a project.");
define_id_type!(MembershipId, "Unique identifier for a project membership row.");
define_id_type!(TaskId, "Unique identifier for a task.");
define_id_type!(TagId, "Unique identifier for a tag.");
define_id_type!(FeedbackId, "Unique identifier for a feedback item.");
define_id_type!(CommentId, "Unique identifier for a comment.");
define_id_type!(AttachmentId, "Unique identifier for an attachment.");
define_id_type!(AccessTokenId, "Unique identifier for an issued access token.");
