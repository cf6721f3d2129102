//! Scannable code generation for a single coordinate pair.

use crate::OverlayError;
use bytes::Bytes;
use image::Luma;
use qrcode::QrCode;
use std::io::Cursor;

/// Pixel edge of one code module.
const MODULE_PX: u32 = 3;

/// The payload URL encoded into a stop's code image. Coordinates are
/// rendered with shortest round-trip formatting, so the input values are
/// reproduced losslessly.
pub fn maps_search_url(lat: f64, lon: f64) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        lat, lon
    )
}

/// Render a black-on-white PNG code image linking to a map search for
/// `(lat, lon)`. Pure and deterministic; no network access.
pub fn code_image(lat: f64, lon: f64) -> Result<Bytes, OverlayError> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(OverlayError::InvalidCoordinate { lat, lon });
    }

    let code = QrCode::new(maps_search_url(lat, lon).as_bytes())?;
    let img = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_PX, MODULE_PX)
        .build();

    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)?;
    Ok(Bytes::from(buffer))
}
