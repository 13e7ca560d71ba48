// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Storage for attachment bytes.
//!
//! The database keeps only the reference returned by [`BlobStore::put`].
//! References have the shape `attachments/YYYY/MM/DD/<uuid>.<ext>`; the
//! original filename contributes nothing but a sanitized extension.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("invalid blob reference: {0}")]
	InvalidReference(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
	/// Store `bytes` and return a stable reference.
	async fn put(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String, BlobError>;

	async fn delete(&self, reference: &str) -> Result<(), BlobError>;
}

/// Builds the reference for an upload on `date` with identifier `id`.
pub fn attachment_reference(original_name: Option<&str>, date: NaiveDate, id: Uuid) -> String {
	let file_name = match original_name.and_then(sanitized_extension) {
		Some(ext) => format!("{id}.{ext}"),
		None => id.to_string(),
	};
	format!("attachments/{}/{file_name}", date.format("%Y/%m/%d"))
}

fn sanitized_extension(name: &str) -> Option<String> {
	let ext = Path::new(name).extension()?.to_str()?;
	let ext: String = ext
		.chars()
		.filter(|c| c.is_ascii_alphanumeric())
		.take(MAX_EXTENSION_LEN)
		.collect::<String>()
		.to_ascii_lowercase();
	(!ext.is_empty()).then_some(ext)
}

/// Blob store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
	root: PathBuf,
}

impl LocalBlobStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	fn resolve(&self, reference: &str) -> Result<PathBuf, BlobError> {
		let relative = Path::new(reference);
		let safe = relative
			.components()
			.all(|c| matches!(c, Component::Normal(_)));
		if !safe {
			return Err(BlobError::InvalidReference(reference.to_string()));
		}
		Ok(self.root.join(relative))
	}
}

#[async_trait]
impl BlobStore for LocalBlobStore {
	#[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
	async fn put(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String, BlobError> {
		let reference = attachment_reference(original_name, Utc::now().date_naive(), Uuid::new_v4());
		let path = self.resolve(&reference)?;
		if let Some(parent) = path.parent() {
			tokio::fs::create_dir_all(parent).await?;
		}
		tokio::fs::write(&path, bytes).await?;

		tracing::debug!(reference = %reference, "blob stored");
		Ok(reference)
	}

	#[tracing::instrument(skip(self))]
	async fn delete(&self, reference: &str) -> Result<(), BlobError> {
		let path = self.resolve(reference)?;
		tokio::fs::remove_file(&path).await?;
		tracing::debug!(reference = %reference, "blob deleted");
		Ok(())
	}
}
