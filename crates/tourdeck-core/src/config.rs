//! Configuration module
//!
//! Environment-driven configuration for the storage, overlay, and composer
//! services. Constructed once at process start and passed by reference into
//! each component; components never reach into ambient global state
//! themselves. Credentials (the map access token, AWS settings) are injected
//! here rather than compiled into any crate.

use std::env;
use std::path::PathBuf;

use crate::constants;
use crate::storage_types::StorageBackend;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    Invalid { var: String, message: String },
}

/// Object storage configuration.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, Spaces, ...).
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

/// Static map provider configuration.
#[derive(Clone, Debug)]
pub struct MapConfig {
    pub access_token: Option<String>,
    pub style: String,
    pub api_base: String,
    pub timeout_secs: u64,
    pub width: u32,
    pub height: u32,
}

/// Composer assets configuration.
#[derive(Clone, Debug)]
pub struct ComposeConfig {
    pub template_dir: PathBuf,
    pub template_name: String,
    pub font_dir: PathBuf,
    pub font_family: String,
    pub logo_path: Option<PathBuf>,
}

/// Top-level configuration, read from the environment once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub storage: StorageConfig,
    pub map: MapConfig,
    pub compose: ComposeConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage = StorageConfig {
            backend: parse_opt("STORAGE_BACKEND")?,
            s3_bucket: var("S3_BUCKET"),
            s3_region: var("S3_REGION"),
            s3_endpoint: var("S3_ENDPOINT"),
            aws_region: var("AWS_REGION"),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL"),
        };

        let map = MapConfig {
            access_token: var("MAPBOX_ACCESS_TOKEN"),
            style: var("MAPBOX_STYLE").unwrap_or_else(|| constants::DEFAULT_MAP_STYLE.to_string()),
            api_base: var("MAP_API_BASE")
                .unwrap_or_else(|| constants::DEFAULT_MAP_API_BASE.to_string()),
            timeout_secs: parse_opt("HTTP_TIMEOUT_SECS")?
                .unwrap_or(constants::DEFAULT_HTTP_TIMEOUT_SECS),
            width: parse_opt("MAP_WIDTH")?.unwrap_or(constants::DEFAULT_MAP_WIDTH),
            height: parse_opt("MAP_HEIGHT")?.unwrap_or(constants::DEFAULT_MAP_HEIGHT),
        };

        let compose = ComposeConfig {
            template_dir: var("TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("templates")),
            template_name: var("TOUR_TEMPLATE").unwrap_or_else(|| "tour_schedule".to_string()),
            font_dir: var("FONT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/usr/share/fonts/truetype/dejavu")),
            font_family: var("FONT_FAMILY").unwrap_or_else(|| "DejaVuSans".to_string()),
            logo_path: var("LOGO_PATH").map(PathBuf::from),
        };

        Ok(Config {
            storage,
            map,
            compose,
        })
    }
}

/// Read a variable, treating unset and empty the same way.
fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_opt<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match var(name) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| ConfigError::Invalid {
            var: name.to_string(),
            message: e.to_string(),
        }),
    }
}
