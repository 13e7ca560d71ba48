// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Feedback submitted against a project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::id::{FeedbackId, ProjectId, UserId};
use crate::project::OwningProject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackType {
	Bug,
	#[default]
	Feature,
	Improvement,
}

impl FeedbackType {
	pub fn as_str(&self) -> &'static str {
		match self {
			FeedbackType::Bug => "BUG",
			FeedbackType::Feature => "FEATURE",
			FeedbackType::Improvement => "IMPROVEMENT",
		}
	}
}

impl fmt::Display for FeedbackType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for FeedbackType {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"BUG" => Ok(FeedbackType::Bug),
			"FEATURE" => Ok(FeedbackType::Feature),
			"IMPROVEMENT" => Ok(FeedbackType::Improvement),
			_ => Err(CoreError::InvalidFeedbackType(s.to_string())),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackStatus {
	#[default]
	Received,
	InAnalysis,
	Planned,
	Implemented,
	Rejected,
}

impl FeedbackStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			FeedbackStatus::Received => "RECEIVED",
			FeedbackStatus::InAnalysis => "IN_ANALYSIS",
			FeedbackStatus::Planned => "PLANNED",
			FeedbackStatus::Implemented => "IMPLEMENTED",
			FeedbackStatus::Rejected => "REJECTED",
		}
	}
}

impl fmt::Display for FeedbackStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for FeedbackStatus {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"RECEIVED" => Ok(FeedbackStatus::Received),
			"IN_ANALYSIS" => Ok(FeedbackStatus::InAnalysis),
			"PLANNED" => Ok(FeedbackStatus::Planned),
			"IMPLEMENTED" => Ok(FeedbackStatus::Implemented),
			"REJECTED" => Ok(FeedbackStatus::Rejected),
			_ => Err(CoreError::InvalidFeedbackStatus(s.to_string())),
		}
	}
}

/// A feedback item. Tasks may point back at the feedback that prompted them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Feedback {
	pub id: FeedbackId,
	pub project_id: ProjectId,
	pub summary: String,
	pub description: String,
	pub feedback_type: FeedbackType,
	pub status: FeedbackStatus,
	pub submitted_by: Option<UserId>,
	pub created_at: DateTime<Utc>,
}

impl OwningProject for Feedback {
	fn owning_project_id(&self) -> ProjectId {
		self.project_id
	}
}
