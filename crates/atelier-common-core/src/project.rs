// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Projects, memberships and the progress figures derived from their tasks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::id::{MembershipId, ProjectId, TagId, UserId};

// =============================================================================
// Project Status
// =============================================================================

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
	#[default]
	NotStarted,
	InProgress,
	OnHold,
	Completed,
	Canceled,
}

impl ProjectStatus {
	pub fn all() -> &'static [ProjectStatus] {
		&[
			ProjectStatus::NotStarted,
			ProjectStatus::InProgress,
			ProjectStatus::OnHold,
			ProjectStatus::Completed,
			ProjectStatus::Canceled,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			ProjectStatus::NotStarted => "NOT_STARTED",
			ProjectStatus::InProgress => "IN_PROGRESS",
			ProjectStatus::OnHold => "ON_HOLD",
			ProjectStatus::Completed => "COMPLETED",
			ProjectStatus::Canceled => "CANCELED",
		}
	}
}

impl fmt::Display for ProjectStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ProjectStatus {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"NOT_STARTED" => Ok(ProjectStatus::NotStarted),
			"IN_PROGRESS" => Ok(ProjectStatus::InProgress),
			"ON_HOLD" => Ok(ProjectStatus::OnHold),
			"COMPLETED" => Ok(ProjectStatus::Completed),
			"CANCELED" => Ok(ProjectStatus::Canceled),
			_ => Err(CoreError::InvalidProjectStatus(s.to_string())),
		}
	}
}

// =============================================================================
// Project Roles
// =============================================================================

/// Role held by a member within a single project.
///
/// Ownership is not a role: the owner of a project outranks every membership
/// role whether or not they also hold a membership row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectRole {
	/// May update, delete and administer the project.
	Admin,
	#[default]
	Developer,
	Tester,
	/// Read access only.
	Viewer,
}

impl ProjectRole {
	pub fn all() -> &'static [ProjectRole] {
		&[
			ProjectRole::Admin,
			ProjectRole::Developer,
			ProjectRole::Tester,
			ProjectRole::Viewer,
		]
	}

	pub fn is_admin(&self) -> bool {
		matches!(self, ProjectRole::Admin)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			ProjectRole::Admin => "ADMIN",
			ProjectRole::Developer => "DEVELOPER",
			ProjectRole::Tester => "TESTER",
			ProjectRole::Viewer => "VIEWER",
		}
	}
}

impl fmt::Display for ProjectRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ProjectRole {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"ADMIN" => Ok(ProjectRole::Admin),
			"DEVELOPER" => Ok(ProjectRole::Developer),
			"TESTER" => Ok(ProjectRole::Tester),
			"VIEWER" => Ok(ProjectRole::Viewer),
			_ => Err(CoreError::InvalidProjectRole(s.to_string())),
		}
	}
}

// =============================================================================
// Entities
// =============================================================================

/// A project. The owner is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Project {
	pub id: ProjectId,
	pub name: String,
	pub description: String,
	pub status: ProjectStatus,
	pub is_archived: bool,
	pub owner_id: UserId,
	pub start_date: Option<NaiveDate>,
	pub due_date: Option<NaiveDate>,
	/// Decimal with at most two fractional digits, kept as text.
	pub budget: Option<String>,
	pub repository_url: Option<String>,
	pub live_url: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A `(project, user) -> role` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProjectMembership {
	pub id: MembershipId,
	pub project_id: ProjectId,
	pub user_id: UserId,
	pub role: ProjectRole,
	pub joined_at: DateTime<Utc>,
}

/// Resources whose permissions are decided by the project they live in.
pub trait OwningProject {
	fn owning_project_id(&self) -> ProjectId;
}

impl OwningProject for Project {
	fn owning_project_id(&self) -> ProjectId {
		self.id
	}
}

/// Fields accepted when creating a project.
#[derive(Debug, Clone, Default)]
pub struct NewProject {
	pub name: String,
	pub description: String,
	pub status: ProjectStatus,
	pub is_archived: bool,
	pub start_date: Option<NaiveDate>,
	pub due_date: Option<NaiveDate>,
	pub budget: Option<String>,
	pub repository_url: Option<String>,
	pub live_url: Option<String>,
	pub tag_ids: Vec<TagId>,
}

/// A partial update. `None` leaves a field untouched; `Some(None)` clears a
/// nullable field.
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
	pub name: Option<String>,
	pub description: Option<String>,
	pub status: Option<ProjectStatus>,
	pub is_archived: Option<bool>,
	pub start_date: Option<Option<NaiveDate>>,
	pub due_date: Option<Option<NaiveDate>>,
	pub budget: Option<Option<String>>,
	pub repository_url: Option<Option<String>>,
	pub live_url: Option<Option<String>>,
	pub tag_ids: Option<Vec<TagId>>,
}

// =============================================================================
// Progress
// =============================================================================

/// Task counts for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TaskSummary {
	pub completed: u64,
	pub total: u64,
}

impl TaskSummary {
	/// Percentage of DONE tasks, rounded half to even. Zero when there are no
	/// tasks.
	pub fn progress_percentage(&self) -> u32 {
		if self.total == 0 {
			return 0;
		}
		let ratio = self.completed as f64 / self.total as f64 * 100.0;
		ratio.round_ties_even() as u32
	}
}

/// Signed number of days from `today` until `due_date`.
pub fn days_remaining(due_date: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
	due_date.map(|due| (due - today).num_days())
}

/// Checks a decimal string with at most `max_digits` total digits and
/// `decimal_places` fractional digits.
pub fn validate_decimal(
	value: &str,
	max_digits: usize,
	decimal_places: usize,
) -> Result<(), CoreError> {
	let invalid = || CoreError::InvalidDecimal(value.to_string());
	let unsigned = value.strip_prefix('-').unwrap_or(value);
	let (whole, frac) = match unsigned.split_once('.') {
		Some((w, f)) => (w, f),
		None => (unsigned, ""),
	};
	if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
		return Err(invalid());
	}
	if !frac.bytes().all(|b| b.is_ascii_digit()) || frac.len() > decimal_places {
		return Err(invalid());
	}
	if unsigned.contains('.') && frac.is_empty() {
		return Err(invalid());
	}
	if whole.len() > max_digits - decimal_places {
		return Err(invalid());
	}
	Ok(())
}
