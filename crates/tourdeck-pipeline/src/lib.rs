//! Asset derivative pipeline
//!
//! Uploads raw attachment bytes into object storage under a caller-supplied
//! prefix, derives a bounded JPEG thumbnail for image-typed content, and
//! issues time-limited retrieval links for stored objects.

mod keys;
mod pipeline;
mod thumbnail;

pub use pipeline::{AttachmentPipeline, PipelineError, UploadFile};
pub use thumbnail::render_thumbnail;
pub use tourdeck_core::models::UploadOutcome;
