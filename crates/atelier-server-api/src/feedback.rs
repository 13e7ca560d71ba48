// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use atelier_common_core::{Feedback, FeedbackStatus, FeedbackType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateFeedbackRequest {
	pub summary: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub feedback_type: Option<FeedbackType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateFeedbackRequest {
	pub status: FeedbackStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FeedbackResponse {
	pub id: String,
	pub project_id: String,
	pub summary: String,
	pub description: String,
	pub feedback_type: FeedbackType,
	pub status: FeedbackStatus,
	pub submitted_by: Option<String>,
	pub created_at: DateTime<Utc>,
}

impl From<&Feedback> for FeedbackResponse {
	fn from(feedback: &Feedback) -> Self {
		Self {
			id: feedback.id.to_string(),
			project_id: feedback.project_id.to_string(),
			summary: feedback.summary.clone(),
			description: feedback.description.clone(),
			feedback_type: feedback.feedback_type,
			status: feedback.status,
			submitted_by: feedback.submitted_by.map(|u| u.to_string()),
			created_at: feedback.created_at,
		}
	}
}
