// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Comment and attachment flow shared by tasks and feedback.
//!
//! The handlers in [`super::tasks`] and [`super::feedback`] resolve and
//! authorize their target, then hand an [`EntityRef`] to the functions here.

use atelier_common_core::{EntityRef, UserId, MAX_ATTACHMENT_DESCRIPTION_LEN};
use atelier_server_api::{AddCommentRequest, AttachmentResponse, CommentResponse};
use atelier_server_auth::CurrentUser;
use axum::extract::multipart::{Multipart, MultipartError};
use std::collections::HashMap;

use crate::{api::AppState, error::ApiError, validation::validate_length};

pub const MAX_COMMENT_LEN: usize = 10_000;

fn invalid_multipart(message: impl Into<String>) -> ApiError {
	ApiError::Validation {
		code: "invalid_multipart",
		message: message.into(),
	}
}

impl From<MultipartError> for ApiError {
	fn from(e: MultipartError) -> Self {
		invalid_multipart(e.body_text())
	}
}

/// Drops the stored bytes of attachments whose rows a delete cascade already
/// removed. Failures only leave an orphaned file behind, so they are logged.
pub async fn remove_blobs(state: &AppState, references: &[String]) {
	for reference in references {
		if let Err(e) = state.blob_store.delete(reference).await {
			tracing::warn!(error = %e, reference = %reference, "failed to remove blob of purged attachment");
		}
	}
}

async fn emails_for(
	state: &AppState,
	user_ids: impl Iterator<Item = UserId>,
) -> Result<HashMap<UserId, String>, ApiError> {
	let mut ids: Vec<UserId> = user_ids.collect();
	ids.sort();
	ids.dedup();
	let users = state.user_repo.get_users_by_ids(&ids).await?;
	Ok(users.into_iter().map(|(id, user)| (id, user.email)).collect())
}

pub(crate) async fn create_comment(
	state: &AppState,
	current_user: &CurrentUser,
	target: EntityRef,
	req: AddCommentRequest,
) -> Result<CommentResponse, ApiError> {
	validate_length("text", &req.text, 1, MAX_COMMENT_LEN)?;

	let comment = state
		.annotations
		.attach_comment(target, &current_user.user.id, &req.text)
		.await?;

	tracing::info!(comment_id = %comment.id, target = %target, "comment added");
	Ok(CommentResponse::new(&comment, &current_user.user.email))
}

/// Reads the `file` and optional `description` parts, stores the bytes and
/// records the attachment. The stored blob is removed again if recording
/// fails.
pub(crate) async fn create_attachment(
	state: &AppState,
	current_user: &CurrentUser,
	target: EntityRef,
	mut multipart: Multipart,
) -> Result<AttachmentResponse, ApiError> {
	let mut file: Option<(Option<String>, Vec<u8>)> = None;
	let mut description = String::new();

	while let Some(field) = multipart.next_field().await? {
		match field.name() {
			Some("file") => {
				let original_name = field.file_name().map(str::to_string);
				let bytes = field.bytes().await?;
				if bytes.len() > state.max_upload_bytes {
					return Err(invalid_multipart(format!(
						"file exceeds the {} byte upload limit",
						state.max_upload_bytes
					)));
				}
				file = Some((original_name, bytes.to_vec()));
			}
			Some("description") => {
				description = field.text().await?;
			}
			_ => {}
		}
	}

	let Some((original_name, bytes)) = file else {
		return Err(invalid_multipart("file is required"));
	};
	if description.chars().count() > MAX_ATTACHMENT_DESCRIPTION_LEN {
		return Err(ApiError::invalid_field(
			"description",
			format!("must be at most {MAX_ATTACHMENT_DESCRIPTION_LEN} characters"),
		));
	}

	let reference = state.blob_store.put(original_name.as_deref(), &bytes).await?;

	let attachment = match state
		.annotations
		.attach_attachment(target, &current_user.user.id, &reference, &description)
		.await
	{
		Ok(attachment) => attachment,
		Err(e) => {
			if let Err(cleanup) = state.blob_store.delete(&reference).await {
				tracing::warn!(error = %cleanup, reference = %reference, "failed to remove orphaned blob");
			}
			return Err(e.into());
		}
	};

	tracing::info!(attachment_id = %attachment.id, target = %target, "attachment added");
	Ok(AttachmentResponse::new(&attachment, &current_user.user.email))
}

pub(crate) async fn comments_for(
	state: &AppState,
	target: EntityRef,
) -> Result<Vec<CommentResponse>, ApiError> {
	let comments = state.annotations.list_comments(target).await?;
	let emails = emails_for(state, comments.iter().map(|c| c.author_id)).await?;

	Ok(comments
		.iter()
		.map(|c| {
			let email = emails.get(&c.author_id).map(String::as_str).unwrap_or_default();
			CommentResponse::new(c, email)
		})
		.collect())
}

pub(crate) async fn attachments_for(
	state: &AppState,
	target: EntityRef,
) -> Result<Vec<AttachmentResponse>, ApiError> {
	let attachments = state.annotations.list_attachments(target).await?;
	let emails = emails_for(state, attachments.iter().map(|a| a.uploaded_by)).await?;

	Ok(attachments
		.iter()
		.map(|a| {
			let email = emails.get(&a.uploaded_by).map(String::as_str).unwrap_or_default();
			AttachmentResponse::new(a, email)
		})
		.collect())
}
