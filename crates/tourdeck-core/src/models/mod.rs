mod attachment;
mod tour;

pub use attachment::{Attachment, UploadOutcome};
pub use tour::{Stop, Tour};
