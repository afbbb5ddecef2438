//! The generation lifecycle: resolve, lay out, finish, hand out a handle.
//!
//! The orchestrator is the only place errors become state. Engine and
//! rasterizer failures propagate up through the generator with `?`; here
//! they are logged, mirrored into [`GenerationStatus::error`] and returned.
//! The loading flag is cleared by a drop guard, so it is reset on every
//! exit path including a panic inside a generator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info};

use super::attachment::{AttachmentSource, FileAttachmentSource, ATTACHMENT_REPORT_ID};
use super::catalog::ReportCatalog;
use super::handle::{DocumentHandle, HandleStore};
use super::registry::GeneratorRegistry;
use super::{DataSources, ReportParams};
use crate::error::ReportError;
use crate::image_loader::{load_image, LoadedImage};
use crate::layout::{LayoutEngine, OutputKind};
use crate::style::Theme;

/// What a caller rendering progress needs to know.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationStatus {
    pub loading: bool,
    /// User-facing message of the last failed generation.
    pub error: Option<String>,
    /// Handle of the last successful generation.
    pub document: Option<DocumentHandle>,
}

/// Clears the loading flag when dropped.
struct LoadingGuard(Arc<AtomicBool>);

impl LoadingGuard {
    fn start(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ReportOrchestrator {
    catalog: ReportCatalog,
    registry: GeneratorRegistry,
    store: HandleStore,
    attachments: Arc<dyn AttachmentSource>,
    theme: Theme,
    logo: Option<Arc<LoadedImage>>,
    generated_on: Option<String>,
    loading: Arc<AtomicBool>,
    error: Option<String>,
    document: Option<DocumentHandle>,
}

impl Default for ReportOrchestrator {
    fn default() -> Self {
        Self::new(ReportCatalog::builtin(), GeneratorRegistry::builtin())
    }
}

impl ReportOrchestrator {
    pub fn new(catalog: ReportCatalog, registry: GeneratorRegistry) -> Self {
        Self {
            catalog,
            registry,
            store: HandleStore::new(),
            attachments: Arc::new(FileAttachmentSource::new()),
            theme: Theme::Light,
            logo: None,
            generated_on: None,
            loading: Arc::new(AtomicBool::new(false)),
            error: None,
            document: None,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_attachment_source(mut self, source: Arc<dyn AttachmentSource>) -> Self {
        self.attachments = source;
        self
    }

    /// Share an existing handle store (e.g. with a download server).
    pub fn with_store(mut self, store: HandleStore) -> Self {
        self.store = store;
        self
    }

    /// Replace the built-in header logo.
    pub fn with_logo(mut self, logo: Arc<LoadedImage>) -> Self {
        self.logo = Some(logo);
        self
    }

    /// Replace the built-in header logo with an image file or data URI.
    pub fn with_logo_from(self, src: &str) -> Result<Self, ReportError> {
        let logo = load_image(src)?;
        info!("Header logo loaded ({}x{} px)", logo.width_px, logo.height_px);
        Ok(self.with_logo(Arc::new(logo)))
    }

    /// Pin the header date instead of using today's.
    pub fn with_generated_on(mut self, date: impl Into<String>) -> Self {
        self.generated_on = Some(date.into());
        self
    }

    pub fn catalog(&self) -> &ReportCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    pub fn store(&self) -> &HandleStore {
        &self.store
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// A shared view of the loading flag for observers on other tasks.
    pub fn loading_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.loading)
    }

    pub fn status(&self) -> GenerationStatus {
        GenerationStatus {
            loading: self.is_loading(),
            error: self.error.clone(),
            document: self.document.clone(),
        }
    }

    /// Generate report `id` and return a handle to the finished document.
    ///
    /// The previous status is cleared first. The previous document is not
    /// revoked: handles stay valid until their owner revokes them.
    pub async fn generate(
        &mut self,
        id: &str,
        params: &ReportParams,
        data: &DataSources,
    ) -> Result<DocumentHandle, ReportError> {
        let _guard = LoadingGuard::start(&self.loading);
        self.error = None;
        self.document = None;

        match self.run(id, params, data).await {
            Ok(handle) => {
                self.document = Some(handle.clone());
                Ok(handle)
            }
            Err(e) => {
                error!("Report \"{}\" failed: {}", id, e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn run(&self, id: &str, params: &ReportParams, data: &DataSources) -> Result<DocumentHandle, ReportError> {
        if id == ATTACHMENT_REPORT_ID {
            let bytes = self.attachments.fetch(params).await?;
            info!("Attachment passed through ({} bytes)", bytes.len());
            return Ok(self.store.insert(self.catalog.title_for(id), bytes));
        }

        let generator = self
            .registry
            .resolve(id)
            .ok_or_else(|| ReportError::GeneratorNotFound(id.to_string()))?;

        let title = self.catalog.title_for(id).to_string();
        let descriptor = self.catalog.get(id);
        let orientation = descriptor.map(|d| d.orientation).unwrap_or_default();
        let mut options = descriptor.map(|d| d.engine_options()).unwrap_or_default();
        options.logo = self.logo.clone();
        options.generated_on = self.generated_on.clone();

        info!("Generating \"{}\" ({})", title, id);
        let mut engine = LayoutEngine::new(orientation, title.clone(), self.theme, options);
        generator.generate(&mut engine, data, params).await?;
        let bytes = engine.finish(OutputKind::Blob)?.into_bytes()?;

        Ok(self.store.insert(title, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::RasterError;
    use crate::report::ReportGenerator;

    struct Failing;

    #[async_trait]
    impl ReportGenerator for Failing {
        async fn generate(
            &self,
            _engine: &mut LayoutEngine,
            _data: &DataSources,
            _params: &ReportParams,
        ) -> Result<(), ReportError> {
            Err(RasterError::UnsupportedChartType("radar".to_string()).into())
        }
    }

    struct Spy;

    #[async_trait]
    impl ReportGenerator for Spy {
        async fn generate(
            &self,
            engine: &mut LayoutEngine,
            _data: &DataSources,
            _params: &ReportParams,
        ) -> Result<(), ReportError> {
            assert!(engine.header_suppressed());
            assert!(engine.footer_suppressed());
            Ok(())
        }
    }

    #[tokio::test]
    async fn unknown_id_sets_error_and_clears_loading() {
        let mut orchestrator = ReportOrchestrator::default();
        let err = orchestrator
            .generate("nonexistent-report", &json!({}), &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::GeneratorNotFound(_)));

        let status = orchestrator.status();
        assert!(!status.loading);
        assert!(status.error.unwrap().contains("nonexistent-report"));
        assert!(status.document.is_none());
        assert!(orchestrator.store().is_empty());
    }

    #[tokio::test]
    async fn generator_failure_is_reported() {
        let mut registry = GeneratorRegistry::new();
        registry.register("broken", || Arc::new(Failing));
        let mut orchestrator = ReportOrchestrator::new(ReportCatalog::builtin(), registry);

        let err = orchestrator.generate("broken", &json!({}), &json!({})).await.unwrap_err();
        assert!(err.to_string().contains("radar"));
        assert!(!orchestrator.is_loading());
        assert!(orchestrator.status().error.is_some());
    }

    #[tokio::test]
    async fn catalog_flags_reach_the_engine() {
        let mut registry = GeneratorRegistry::new();
        registry.register("payslip", || Arc::new(Spy));
        let mut orchestrator = ReportOrchestrator::new(ReportCatalog::builtin(), registry);

        let handle = orchestrator.generate("payslip", &json!({}), &json!({})).await.unwrap();
        assert_eq!(handle.title(), "Payslip");
        assert_eq!(orchestrator.status().document, Some(handle));
    }

    #[tokio::test]
    async fn success_clears_previous_error() {
        let mut orchestrator = ReportOrchestrator::default().with_generated_on("1/15/2026");
        orchestrator.generate("missing", &json!({}), &json!({})).await.unwrap_err();
        assert!(orchestrator.status().error.is_some());

        let handle = orchestrator
            .generate("positions_report", &json!({}), &json!({ "positions": [] }))
            .await
            .unwrap();
        let status = orchestrator.status();
        assert!(status.error.is_none());
        assert_eq!(status.document.as_ref(), Some(&handle));
        assert!(orchestrator.store().get(&handle).unwrap().starts_with(b"%PDF-"));
    }

    #[test]
    fn unreadable_logo_is_a_layout_error() {
        let err = ReportOrchestrator::default()
            .with_logo_from("/nonexistent/brand.jpg")
            .err()
            .unwrap();
        assert!(matches!(err, ReportError::Layout(_)));
        assert!(err.to_string().contains("brand.jpg"));
    }
}
