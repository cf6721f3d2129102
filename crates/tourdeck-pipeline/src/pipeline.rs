use crate::keys;
use crate::thumbnail;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tourdeck_core::constants::DEFAULT_PRESIGN_EXPIRY_SECS;
use tourdeck_core::models::UploadOutcome;
use tourdeck_storage::{Storage, StorageError};
use uuid::Uuid;

/// Pipeline operation errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("upload failed: {0}")]
    Upload(#[from] StorageError),

    /// The declared type promised an image but the bytes did not decode.
    /// The original object has already been stored when this is returned;
    /// callers must expect it to exist even though the call failed.
    #[error("declared content type {content_type} but the bytes could not be decoded as an image: {source}")]
    ImageDecode {
        content_type: String,
        #[source]
        source: image::ImageError,
    },
}

/// A raw file handed to the pipeline: the filename contributes only its
/// extension, the declared content type decides whether a thumbnail is made.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Asset derivative pipeline over an object storage backend.
///
/// Uploads of distinct files share no state beyond the backend and may run
/// fully in parallel.
#[derive(Clone)]
pub struct AttachmentPipeline {
    storage: Arc<dyn Storage>,
}

impl AttachmentPipeline {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        AttachmentPipeline { storage }
    }

    /// Store `file` under `prefix` and, for image-typed content, derive and
    /// store a bounded JPEG thumbnail alongside it.
    ///
    /// Keys are built from fresh random tokens, so repeated uploads of the
    /// same filename never collide. The original is written first; a
    /// thumbnail failure after that point leaves the original stored.
    pub async fn upload(
        &self,
        file: UploadFile,
        prefix: &str,
    ) -> Result<UploadOutcome, PipelineError> {
        let ext = keys::file_extension(&file.filename);
        let original_key = keys::original_key(prefix, Uuid::new_v4(), &ext);

        self.storage
            .put_object(&original_key, &file.content_type, file.data.to_vec())
            .await?;

        if !file.content_type.starts_with("image/") {
            tracing::debug!(
                key = %original_key,
                content_type = %file.content_type,
                "non-image upload, no thumbnail derived"
            );
            return Ok(UploadOutcome {
                original_key,
                thumb_key: None,
            });
        }

        let thumb =
            thumbnail::render_thumbnail(&file.data).map_err(|source| PipelineError::ImageDecode {
                content_type: file.content_type.clone(),
                source,
            })?;

        let thumb_key = keys::thumbnail_key(prefix, Uuid::new_v4());
        self.storage
            .put_object(&thumb_key, "image/jpeg", thumb)
            .await?;

        tracing::info!(
            original_key = %original_key,
            thumb_key = %thumb_key,
            "upload complete with thumbnail"
        );

        Ok(UploadOutcome {
            original_key,
            thumb_key: Some(thumb_key),
        })
    }

    /// Issue a time-limited retrieval URL for `key`. The key's existence is
    /// not verified; a dangling link fails only when dereferenced. Expiry
    /// defaults to 3600 seconds.
    pub async fn presigned_link(
        &self,
        key: &str,
        expires_in: Option<Duration>,
    ) -> Result<String, PipelineError> {
        let expires_in =
            expires_in.unwrap_or_else(|| Duration::from_secs(DEFAULT_PRESIGN_EXPIRY_SECS));
        Ok(self.storage.presigned_get_url(key, expires_in).await?)
    }
}
