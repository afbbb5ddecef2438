//! # Folio
//!
//! A page-native report engine.
//!
//! A report is composed top to bottom by a generator that issues block
//! operations (section titles, wrapped summaries, charts, tables) against a
//! cursor. Every block predicts its height and breaks the page *before* it
//! draws, so nothing is clipped or sliced after the fact. Charts are drawn
//! off-screen and embedded as images. Footers carrying "Page i of N" are
//! stamped in a second pass once the page count is known.
//!
//! ## Architecture
//!
//! ```text
//! generate(report id, params, data)
//!       ↓
//!   [report]  catalog lookup, lazy generator registry, handle store
//!       ↓
//!   [layout]  cursor engine, page header, footer stamping
//!       ↓          ├─ [chart]  ChartSpec → tiny-skia pixmap → PNG
//!       ↓          └─ [table]  wrapped cells, repeated head row
//!   [pdf]     serialize pages to PDF bytes
//! ```

pub mod chart;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod pdf;
pub mod report;
pub mod style;
pub mod table;
pub mod text;

pub use error::{ConfigError, LayoutError, RasterError, ReportError};
pub use layout::{LayoutEngine, Output, OutputKind};
pub use report::{DocumentHandle, ReportOrchestrator};

use report::{DataSources, ReportParams};

/// Generate one of the bundled reports and return its PDF bytes.
///
/// This is the one-shot entry point. Callers that keep documents around
/// should hold a [`ReportOrchestrator`] and work with handles instead.
pub async fn generate_report(id: &str, params: &ReportParams, data: &DataSources) -> Result<Vec<u8>, ReportError> {
    let mut orchestrator = ReportOrchestrator::default();
    let handle = orchestrator.generate(id, params, data).await?;
    let bytes = orchestrator
        .store()
        .get(&handle)
        .map(|bytes| bytes.as_ref().clone())
        .unwrap_or_default();
    orchestrator.store().revoke(&handle);
    Ok(bytes)
}

/// Generate a report described as JSON: `{"params": {...}, "data": {...}}`.
pub async fn generate_report_json(id: &str, json: &str) -> Result<Vec<u8>, ReportError> {
    let request: serde_json::Value = serde_json::from_str(json).map_err(|e| ReportError::InvalidData {
        report: id.to_string(),
        reason: e.to_string(),
    })?;
    let params = request.get("params").cloned().unwrap_or_else(|| serde_json::json!({}));
    let data = request.get("data").cloned().unwrap_or_else(|| serde_json::json!({}));
    generate_report(id, &params, &data).await
}
