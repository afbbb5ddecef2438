//! Structured error types for the Folio report engine.
//!
//! Errors flow one way: the rasterizer and the layout engine never swallow a
//! failure, they return it. Only the report orchestrator turns an error into
//! user-facing state.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning a chart specification into a raster image.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RasterError {
    /// The chart `type` is not one the renderer knows how to draw.
    #[error("Unsupported chart type \"{0}\" (expected bar, line, pie or doughnut)")]
    UnsupportedChartType(String),

    /// The chart data cannot be drawn (non-finite values, mismatched lengths, ...).
    #[error("Invalid chart data: {0}")]
    InvalidData(String),

    /// The requested surface size is unusable.
    #[error("Invalid raster size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// Chart text could not be laid out.
    #[error("Failed to draw chart text: {0}")]
    Text(String),

    /// The finished surface could not be encoded.
    #[error("Failed to encode chart image: {0}")]
    Encode(String),

    /// The off-screen render task ended without signalling completion.
    #[error("Chart render aborted: {0}")]
    Aborted(String),
}

/// Failures raised by the layout engine while composing pages.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Chart rasterization failed: {0}")]
    Raster(#[from] RasterError),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Table layout failed: {0}")]
    Table(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Page {page} is out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },
}

/// Failures while loading the report catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Invalid TOML in {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },
}

/// Failures surfaced by the report orchestrator.
#[derive(Debug, Error)]
pub enum ReportError {
    /// No generator is registered for the requested report id.
    #[error("Report generator for ID \"{0}\" not found.")]
    GeneratorNotFound(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// The data handed to a generator does not have the shape it needs.
    #[error("Invalid data for report \"{report}\": {reason}")]
    InvalidData { report: String, reason: String },

    /// The raw attachment pass-through could not produce a document.
    #[error("Attachment error: {0}")]
    Attachment(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<RasterError> for ReportError {
    fn from(e: RasterError) -> Self {
        ReportError::Layout(LayoutError::Raster(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_id() {
        let err = ReportError::GeneratorNotFound("nonexistent-report".to_string());
        assert!(err.to_string().contains("nonexistent-report"));
    }

    #[test]
    fn raster_error_survives_propagation() {
        let err: ReportError = RasterError::UnsupportedChartType("radar".to_string()).into();
        let text = err.to_string();
        assert!(text.contains("radar"), "underlying cause lost: {}", text);
    }
}
