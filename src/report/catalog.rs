//! Per-report configuration.
//!
//! Which reports exist, what they are called, and which ones draw their own
//! full-page layout (no shared header or footer) is data, not code. The
//! built-in catalog can be replaced by a TOML file:
//!
//! ```toml
//! [[report]]
//! id = "payslip"
//! title = "Payslip"
//! category = "Payroll & Compensation"
//! skip_header = true
//! skip_footer = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layout::{EngineOptions, Orientation};

/// Title used when a report id has no catalog entry.
pub const FALLBACK_TITLE: &str = "Report";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportDescriptor {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub skip_header: bool,
    #[serde(default)]
    pub skip_footer: bool,
    /// Inputs the report asks the user for.
    #[serde(default)]
    pub parameters: Vec<ReportParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportParameter {
    pub id: String,
    /// Input kind, e.g. `date`, `date-range`, `payroll-run-selector`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl ReportDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: None,
            description: None,
            orientation: Orientation::Portrait,
            skip_header: false,
            skip_footer: false,
            parameters: Vec::new(),
        }
    }

    fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    fn parameter(mut self, id: &str, kind: &str, label: &str) -> Self {
        self.parameters.push(ReportParameter {
            id: id.to_string(),
            kind: kind.to_string(),
            label: Some(label.to_string()),
        });
        self
    }

    fn full_page(mut self) -> Self {
        self.skip_header = true;
        self.skip_footer = true;
        self
    }

    /// Engine switches for this report.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            skip_header: self.skip_header,
            skip_footer: self.skip_footer,
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default, rename = "report")]
    reports: Vec<ReportDescriptor>,
}

/// Report descriptors in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportCatalog {
    reports: Vec<ReportDescriptor>,
}

impl ReportCatalog {
    pub fn new(reports: Vec<ReportDescriptor>) -> Self {
        let mut catalog = Self::default();
        for report in reports {
            catalog.insert(report);
        }
        catalog
    }

    /// The catalog for the bundled generators.
    pub fn builtin() -> Self {
        Self::new(vec![
            ReportDescriptor::new("positions_report", "Company Positions Report").category("Positions"),
            ReportDescriptor::new("attendance_summary", "Daily Attendance Report")
                .category("Attendance & Schedules")
                .parameter("start_date", "date", "Select Date"),
            ReportDescriptor::new("predictive_analytics_summary", "Predictive Analytics Summary")
                .category("Analytics & Insights")
                .parameter("as_of_date", "date", "As of Date"),
            ReportDescriptor::new("archived_report", "Archived Report").category("Payroll & Compensation"),
            ReportDescriptor::new("payslip", "Payslip")
                .category("Payroll & Compensation")
                .full_page(),
            ReportDescriptor::new("attachment_viewer", "Attachment")
                .parameter("path", "file", "Document"),
        ])
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents, PathBuf::from("<inline>"))
    }

    /// Read and parse a catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: PathBuf) -> Result<Self, ConfigError> {
        let file: CatalogFile = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            path,
            reason: e.to_string(),
        })?;
        Ok(Self::new(file.reports))
    }

    /// Add a descriptor, replacing any existing one with the same id.
    pub fn insert(&mut self, report: ReportDescriptor) {
        match self.reports.iter_mut().find(|r| r.id == report.id) {
            Some(existing) => *existing = report,
            None => self.reports.push(report),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ReportDescriptor> {
        self.reports.iter().find(|r| r.id == id)
    }

    /// Display title for `id`, or `"Report"` when the id is unknown.
    pub fn title_for(&self, id: &str) -> &str {
        self.get(id).map(|r| r.title.as_str()).unwrap_or(FALLBACK_TITLE)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReportDescriptor> {
        self.reports.iter()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_flags_payslip_as_full_page() {
        let catalog = ReportCatalog::builtin();
        let payslip = catalog.get("payslip").unwrap();
        assert!(payslip.skip_header && payslip.skip_footer);
        let positions = catalog.get("positions_report").unwrap();
        assert!(!positions.skip_header && !positions.skip_footer);
    }

    #[test]
    fn unknown_id_falls_back_to_generic_title() {
        let catalog = ReportCatalog::builtin();
        assert_eq!(catalog.title_for("nonexistent-report"), "Report");
        assert_eq!(catalog.title_for("attendance_summary"), "Daily Attendance Report");
    }

    #[test]
    fn parses_toml_catalog() {
        let catalog = ReportCatalog::from_toml_str(
            r#"
            [[report]]
            id = "payslip"
            title = "Official Payslip"
            skip_header = true
            skip_footer = true

            [[report]]
            id = "attendance_summary"
            title = "Attendance"
            orientation = "landscape"
            parameters = [{ id = "start_date", type = "date", label = "Select Date" }]
            "#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.title_for("payslip"), "Official Payslip");
        let attendance = catalog.get("attendance_summary").unwrap();
        assert_eq!(attendance.orientation, Orientation::Landscape);
        assert_eq!(attendance.parameters[0].kind, "date");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = ReportCatalog::from_toml_str(
            r#"
            [[report]]
            id = "x"
            title = "X"
            skip_headr = true
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ReportCatalog::from_path("/nonexistent/folio/catalog.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn later_entry_replaces_earlier() {
        let mut catalog = ReportCatalog::builtin();
        let before = catalog.len();
        catalog.insert(ReportDescriptor::new("payslip", "Payslip v2"));
        assert_eq!(catalog.len(), before);
        assert!(!catalog.get("payslip").unwrap().skip_header);
    }
}
