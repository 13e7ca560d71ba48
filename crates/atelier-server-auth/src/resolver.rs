// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Effective role resolution.
//!
//! A user reaches a project in one of two ways: they own it, or they hold a
//! membership row for it. Ownership wins and is at least as strong as the
//! ADMIN membership role for every check, whether or not the owner also has
//! a membership row.
//!
//! Resolution is a pure function over data the caller has already loaded.
//! "No access" is `None`, never an error.

use atelier_common_core::{ProjectRole, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a user is to a project after ownership and membership are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "role")]
pub enum EffectiveRole {
	Owner,
	Member(ProjectRole),
}

impl EffectiveRole {
	/// Owner or ADMIN member.
	pub fn is_at_least_admin(&self) -> bool {
		match self {
			EffectiveRole::Owner => true,
			EffectiveRole::Member(role) => role.is_admin(),
		}
	}

	pub fn membership_role(&self) -> Option<ProjectRole> {
		match self {
			EffectiveRole::Owner => None,
			EffectiveRole::Member(role) => Some(*role),
		}
	}
}

impl fmt::Display for EffectiveRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EffectiveRole::Owner => write!(f, "owner"),
			EffectiveRole::Member(role) => write!(f, "member:{role}"),
		}
	}
}

/// Resolves `user_id`'s role on a project owned by `owner_id`, given the
/// user's stored membership role for that project, if any.
pub fn resolve_role(
	user_id: UserId,
	owner_id: UserId,
	membership: Option<ProjectRole>,
) -> Option<EffectiveRole> {
	if user_id == owner_id {
		return Some(EffectiveRole::Owner);
	}
	membership.map(EffectiveRole::Member)
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn owner_without_membership_is_owner() {
		let owner = UserId::generate();
		assert_eq!(resolve_role(owner, owner, None), Some(EffectiveRole::Owner));
	}

	#[test]
	fn owner_with_viewer_row_is_still_owner() {
		let owner = UserId::generate();
		let role = resolve_role(owner, owner, Some(ProjectRole::Viewer)).unwrap();
		assert_eq!(role, EffectiveRole::Owner);
		assert!(role.is_at_least_admin());
	}

	#[test]
	fn member_gets_stored_role() {
		let role = resolve_role(
			UserId::generate(),
			UserId::generate(),
			Some(ProjectRole::Tester),
		);
		assert_eq!(role, Some(EffectiveRole::Member(ProjectRole::Tester)));
	}

	#[test]
	fn stranger_resolves_to_none() {
		assert_eq!(resolve_role(UserId::generate(), UserId::generate(), None), None);
	}

	#[test]
	fn only_admin_members_are_at_least_admin() {
		assert!(EffectiveRole::Member(ProjectRole::Admin).is_at_least_admin());
		assert!(!EffectiveRole::Member(ProjectRole::Developer).is_at_least_admin());
		assert!(!EffectiveRole::Member(ProjectRole::Viewer).is_at_least_admin());
	}

	fn arb_role() -> impl Strategy<Value = ProjectRole> {
		prop_oneof![
			Just(ProjectRole::Admin),
			Just(ProjectRole::Developer),
			Just(ProjectRole::Tester),
			Just(ProjectRole::Viewer),
		]
	}

	proptest! {
		#[test]
		fn at_least_admin_iff_owner_or_admin_row(
			is_owner in any::<bool>(),
			membership in proptest::option::of(arb_role()),
		) {
			let user = UserId::generate();
			let owner = if is_owner { user } else { UserId::generate() };
			let resolved = resolve_role(user, owner, membership);

			let expected_admin = is_owner || membership == Some(ProjectRole::Admin);
			prop_assert_eq!(
				resolved.map(|r| r.is_at_least_admin()).unwrap_or(false),
				expected_admin
			);

			if !is_owner {
				prop_assert_eq!(resolved.and_then(|r| r.membership_role()), membership);
			}
		}
	}
}
