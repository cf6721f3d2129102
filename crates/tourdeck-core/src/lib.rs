//! Tourdeck core library
//!
//! Shared models, configuration, and constants for the tour coordination
//! services. No I/O happens in this crate; the storage, pipeline, overlay,
//! and composer crates build on top of it.

pub mod config;
pub mod constants;
pub mod models;
pub mod storage_types;

pub use config::{Config, ConfigError};
pub use storage_types::StorageBackend;
