//! Raw attachment pass-through.
//!
//! Viewing an uploaded attachment does not produce a paginated report: the
//! stored file is handed back as-is, with no layout, header or footer. The
//! orchestrator routes the reserved id [`ATTACHMENT_REPORT_ID`] here before
//! any generator lookup.

use std::path::PathBuf;

use async_trait::async_trait;
use base64::Engine as _;

use super::ReportParams;
use crate::error::ReportError;

pub const ATTACHMENT_REPORT_ID: &str = "attachment_viewer";

/// Produces the bytes of an existing document.
#[async_trait]
pub trait AttachmentSource: Send + Sync {
    async fn fetch(&self, params: &ReportParams) -> Result<Vec<u8>, ReportError>;
}

/// Reads `params.path` from disk, or decodes `params.data_uri`.
///
/// Relative paths resolve against `root` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileAttachmentSource {
    root: Option<PathBuf>,
}

impl FileAttachmentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn decode_data_uri(uri: &str) -> Result<Vec<u8>, ReportError> {
        let (header, payload) = uri
            .split_once(',')
            .ok_or_else(|| ReportError::Attachment("data URI has no payload".to_string()))?;
        if !header.starts_with("data:") || !header.ends_with(";base64") {
            return Err(ReportError::Attachment(format!(
                "unsupported data URI header \"{}\"",
                header
            )));
        }
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ReportError::Attachment(format!("data URI decode: {}", e)))
    }
}

#[async_trait]
impl AttachmentSource for FileAttachmentSource {
    async fn fetch(&self, params: &ReportParams) -> Result<Vec<u8>, ReportError> {
        if let Some(uri) = params.get("data_uri").and_then(|v| v.as_str()) {
            return Self::decode_data_uri(uri);
        }

        let path = params
            .get("path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ReportError::Attachment("missing \"path\" or \"data_uri\" parameter".to_string()))?;
        let path = match &self.root {
            Some(root) if PathBuf::from(path).is_relative() => root.join(path),
            _ => PathBuf::from(path),
        };

        tokio::fs::read(&path)
            .await
            .map_err(|e| ReportError::Attachment(format!("failed to read {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn reads_file_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("contract.pdf"), b"%PDF-1.4 stub").unwrap();
        let source = FileAttachmentSource::with_root(dir.path());
        let bytes = source.fetch(&json!({ "path": "contract.pdf" })).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.4 stub");
    }

    #[tokio::test]
    async fn decodes_data_uri() {
        let source = FileAttachmentSource::new();
        let bytes = source
            .fetch(&json!({ "data_uri": "data:application/pdf;base64,JVBERi0=" }))
            .await
            .unwrap();
        assert_eq!(bytes, b"%PDF-");
    }

    #[tokio::test]
    async fn missing_parameters_is_an_error() {
        let err = FileAttachmentSource::new().fetch(&json!({})).await.unwrap_err();
        assert!(matches!(err, ReportError::Attachment(_)));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let err = FileAttachmentSource::new()
            .fetch(&json!({ "path": "/nonexistent/folio/attachment.pdf" }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("attachment.pdf"));
    }
}
