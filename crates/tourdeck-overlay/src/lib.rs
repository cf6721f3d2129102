//! Overlay builder
//!
//! Generated visuals for tour documents: a scannable code image per
//! coordinate pair, and a composite raster map covering an ordered set of
//! coordinates, fetched from a static map provider.

mod qr;
mod staticmap;

use thiserror::Error;

pub use qr::{code_image, maps_search_url};
pub use staticmap::{GeoPoint, MapboxStaticMaps, StaticMapProvider};

/// Overlay generation errors
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("latitude/longitude must be finite, got ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("QR encoding failed: {0}")]
    QrEncode(#[from] qrcode::types::QrError),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("map provider request failed: {0}")]
    MapRequest(#[from] reqwest::Error),

    #[error("map provider returned status {status}: {body}")]
    MapStatus { status: u16, body: String },

    #[error("composite map requires at least one stop")]
    EmptyStops,

    #[error("map provider configuration error: {0}")]
    Config(String),
}
