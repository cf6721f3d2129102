//! Process-wide constants shared across the pipeline and composer crates.

/// Maximum thumbnail edge in pixels. Thumbnails are bounded to
/// `THUMB_MAX_DIM x THUMB_MAX_DIM` preserving aspect ratio.
pub const THUMB_MAX_DIM: u32 = 300;

/// JPEG quality used when re-encoding thumbnails.
pub const THUMB_JPEG_QUALITY: u8 = 85;

/// Default expiry for presigned retrieval links, in seconds.
pub const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 3600;

/// Default composite map dimensions in CSS pixels (the request adds a
/// retina scale suffix, so the returned raster is twice this size).
pub const DEFAULT_MAP_WIDTH: u32 = 600;
pub const DEFAULT_MAP_HEIGHT: u32 = 500;

/// Marker color for composite map pins (hex, no leading `#`).
pub const MAP_MARKER_COLOR: &str = "555555";

/// Retina scale suffix appended to the static map geometry segment.
pub const MAP_SCALE_SUFFIX: &str = "@2x";

/// Default Mapbox style path used for composite maps.
pub const DEFAULT_MAP_STYLE: &str = "mapbox/streets-v11";

/// Default static map API base URL.
pub const DEFAULT_MAP_API_BASE: &str = "https://api.mapbox.com";

/// Default outbound HTTP timeout, in seconds. The upstream behavior has no
/// timeout at all; the rewrite imposes one at the client boundary.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
