//! # Report Dispatch
//!
//! A report is identified by a string id. The [`ReportOrchestrator`] looks
//! the id up in the [`GeneratorRegistry`], builds a [`LayoutEngine`] from the
//! report's [`ReportDescriptor`], lets the generator fill it, finishes the
//! document and hands out a revocable [`DocumentHandle`].
//!
//! ```text
//! generate(id, params, data)
//!   ├─ attachment id? ──► AttachmentSource ──────────────────────┐
//!   ├─ registry.resolve(id)  (GeneratorNotFound if missing)      │
//!   ├─ LayoutEngine::new(catalog[id] options)                     │
//!   ├─ generator.generate(&mut engine, data, params).await        │
//!   └─ engine.finish() ──► HandleStore::insert ◄──────────────────┘
//! ```
//!
//! Generators are plain consumers of the layout engine: they shape the data
//! they are given and call engine operations in order. They never call
//! `finish` themselves.

pub mod attachment;
pub mod catalog;
pub mod generators;
pub mod handle;
pub mod orchestrator;
pub mod registry;

pub use attachment::{AttachmentSource, FileAttachmentSource, ATTACHMENT_REPORT_ID};
pub use catalog::{ReportCatalog, ReportDescriptor, ReportParameter};
pub use handle::{DocumentHandle, HandleStore};
pub use orchestrator::{GenerationStatus, ReportOrchestrator};
pub use registry::{GeneratorFactory, GeneratorRegistry};

use async_trait::async_trait;

use crate::error::ReportError;
use crate::layout::LayoutEngine;

/// Data a generator reads from (employees, schedules, ...), as JSON.
pub type DataSources = serde_json::Value;
/// User-chosen report parameters (dates, selectors), as JSON.
pub type ReportParams = serde_json::Value;

/// Fills a layout engine with one kind of report.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(
        &self,
        engine: &mut LayoutEngine,
        data: &DataSources,
        params: &ReportParams,
    ) -> Result<(), ReportError>;
}
