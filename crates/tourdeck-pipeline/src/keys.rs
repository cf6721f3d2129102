//! Storage key construction.
//!
//! Keys are namespaced under a caller-supplied prefix and made unique by a
//! fresh random token per object, never by the original filename:
//! `{prefix}/{uuid}{ext}` for originals, `{prefix}/{uuid}_thumb.jpg` for
//! thumbnails.

use std::path::Path;
use uuid::Uuid;

/// Lowercased extension of `filename`, including the leading dot.
/// Empty when the filename has no extension.
pub(crate) fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

pub(crate) fn original_key(prefix: &str, token: Uuid, ext: &str) -> String {
    format!("{}/{}{}", prefix.trim_end_matches('/'), token, ext)
}

pub(crate) fn thumbnail_key(prefix: &str, token: Uuid) -> String {
    format!("{}/{}_thumb.jpg", prefix.trim_end_matches('/'), token)
}
