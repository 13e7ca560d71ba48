// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Comment and attachment types shared by tasks and feedback.

use atelier_common_core::{Attachment, Comment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AddCommentRequest {
	pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CommentResponse {
	pub id: String,
	pub text: String,
	/// The author's email.
	pub author: String,
	pub author_id: String,
	pub created_at: DateTime<Utc>,
}

impl CommentResponse {
	pub fn new(comment: &Comment, author_email: &str) -> Self {
		Self {
			id: comment.id.to_string(),
			text: comment.text.clone(),
			author: author_email.to_string(),
			author_id: comment.author_id.to_string(),
			created_at: comment.created_at,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AttachmentResponse {
	pub id: String,
	/// Blob store reference, `attachments/YYYY/MM/DD/<uuid>.<ext>`.
	pub file: String,
	pub description: String,
	/// The uploader's email.
	pub uploaded_by: String,
	pub uploaded_at: DateTime<Utc>,
}

impl AttachmentResponse {
	pub fn new(attachment: &Attachment, uploader_email: &str) -> Self {
		Self {
			id: attachment.id.to_string(),
			file: attachment.file.clone(),
			description: attachment.description.clone(),
			uploaded_by: uploader_email.to_string(),
			uploaded_at: attachment.uploaded_at,
		}
	}
}
