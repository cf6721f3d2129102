use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted record describing one uploaded file and its optional thumbnail.
///
/// The record store itself is external to this core; callers persist an
/// `Attachment` built from an [`UploadOutcome`]. `uploaded_at` is set once at
/// creation and never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub filename: String,
    pub storage_key: String,
    /// Present iff the declared content type of the upload began `image/`.
    pub thumb_key: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl Attachment {
    pub fn new(deal_id: Uuid, filename: impl Into<String>, outcome: UploadOutcome) -> Self {
        Attachment {
            id: Uuid::new_v4(),
            deal_id,
            filename: filename.into(),
            storage_key: outcome.original_key,
            thumb_key: outcome.thumb_key,
            uploaded_at: Utc::now(),
        }
    }
}

/// Transient result of a single upload call. Not persisted as-is; callers
/// turn it into an [`Attachment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub original_key: String,
    pub thumb_key: Option<String>,
}
