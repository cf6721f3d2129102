//! Tour document composer
//!
//! Turns a tour definition into a printable PDF: decorates each stop with a
//! scannable code image, fetches one composite map over all stops, renders a
//! named document template, and converts the result into a paginated
//! document written atomically to the target path.

mod compose;
mod pdf;
mod template;

use thiserror::Error;
use tourdeck_overlay::OverlayError;

pub use compose::{enrich_stops, ComposerAssets, StopOverlay, TourComposer};
pub use template::{DocumentTemplate, RenderContext, TemplateStore};

/// Composition errors. None are recovered locally; any failure aborts the
/// whole composition and leaves no output file.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("overlay generation failed: {0}")]
    Overlay(#[from] OverlayError),

    #[error("template {name} could not be loaded: {source}")]
    TemplateLoad {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("template syntax error: {0}")]
    TemplateSyntax(String),

    #[error("template field missing: {0}")]
    MissingField(String),

    #[error("PDF conversion failed: {0}")]
    PdfConversion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("composition cancelled")]
    Cancelled,
}
