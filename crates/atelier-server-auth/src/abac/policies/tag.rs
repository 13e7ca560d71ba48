// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tag catalogue policies. Tags are global labels.

use crate::abac::{Action, ResourceAttrs, SubjectAttrs};

/// Any authenticated user may browse and extend the catalogue.
pub fn evaluate(_subject: &SubjectAttrs, action: Action, _resource: &ResourceAttrs) -> bool {
	matches!(action, Action::List | Action::Read | Action::Create)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::abac::ResourceType;
	use atelier_common_core::UserId;

	#[test]
	fn tags_are_readable_and_creatable() {
		let subject = SubjectAttrs::new(UserId::generate());
		let tags = ResourceAttrs::global(ResourceType::Tag);
		assert!(evaluate(&subject, Action::List, &tags));
		assert!(evaluate(&subject, Action::Create, &tags));
		assert!(!evaluate(&subject, Action::Delete, &tags));
	}
}
