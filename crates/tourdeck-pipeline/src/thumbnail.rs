//! Thumbnail derivation.

use image::codecs::jpeg::JpegEncoder;
use image::GenericImageView;
use std::io::Cursor;
use tourdeck_core::constants::{THUMB_JPEG_QUALITY, THUMB_MAX_DIM};

/// Decode `data` as an image, bound it to `THUMB_MAX_DIM` on the longer
/// edge preserving aspect ratio (never upscaling), and re-encode as JPEG at
/// fixed quality. Returns the encoded bytes.
pub fn render_thumbnail(data: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let img = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()?;

    let (width, height) = img.dimensions();
    let bounded = if width <= THUMB_MAX_DIM && height <= THUMB_MAX_DIM {
        img
    } else {
        img.thumbnail(THUMB_MAX_DIM, THUMB_MAX_DIM)
    };

    // JPEG has no alpha channel; flatten to RGB before encoding.
    let rgb = bounded.to_rgb8();
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, THUMB_JPEG_QUALITY);
    rgb.write_with_encoder(encoder)?;

    Ok(buffer)
}
