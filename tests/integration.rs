//! Integration tests for the Folio report pipeline.
//!
//! These tests drive the public API from a report id to PDF bytes.
//! They verify:
//! - The orchestrator's loading/error/document lifecycle
//! - Handles are independent and revocable
//! - PDF output is structurally valid with the expected page count
//! - Catalog flags suppress the shared header and footer
//! - Page breaks happen before blocks that do not fit

use std::sync::Arc;

use folio::chart::{ChartSpec, Dataset};
use folio::layout::{ChartOptions, EngineOptions, LayoutEngine, Orientation, OutputKind};
use folio::report::generators::Payslip;
use folio::report::{
    FileAttachmentSource, GeneratorRegistry, ReportCatalog, ReportGenerator, ReportOrchestrator,
};
use folio::style::Theme;
use folio::table::TableOptions;
use folio::ReportError;
use serde_json::{json, Value};

// ─── Helpers ────────────────────────────────────────────────────

fn orchestrator() -> ReportOrchestrator {
    ReportOrchestrator::default().with_generated_on("10/19/2026")
}

fn positions(count: usize, salary: f64) -> Value {
    let positions: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "title": format!("Position {}", i),
                "employeeCount": i + 1,
                "monthly_salary": salary + i as f64 * 1000.0,
                "description": "Sample role"
            })
        })
        .collect();
    json!({ "positions": positions })
}

fn engine(skip_header: bool, skip_footer: bool) -> LayoutEngine {
    LayoutEngine::new(
        Orientation::Portrait,
        "Integration",
        Theme::Light,
        EngineOptions {
            skip_header,
            skip_footer,
            generated_on: Some("10/19/2026".to_string()),
            ..Default::default()
        },
    )
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(bytes.windows(5).any(|w| w == b"%%EOF"), "Missing %%EOF marker");
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(bytes.windows(7).any(|w| w == b"trailer"), "Missing trailer");
}

fn page_count(bytes: &[u8]) -> usize {
    let text = String::from_utf8_lossy(bytes);
    let start = text.find("/Count ").expect("no /Count entry") + "/Count ".len();
    text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap()
}

// ─── Orchestrator Lifecycle ─────────────────────────────────────

#[tokio::test]
async fn test_unknown_report_sets_error_state() {
    let mut orchestrator = orchestrator();
    let result = orchestrator.generate("nonexistent-report", &json!({}), &json!({})).await;

    assert!(matches!(result, Err(ReportError::GeneratorNotFound(_))));
    let status = orchestrator.status();
    assert!(!status.loading);
    assert!(status.error.as_deref().unwrap().contains("nonexistent-report"));
    assert!(status.document.is_none());
}

#[tokio::test]
async fn test_sequential_generations_yield_independent_handles() {
    let mut orchestrator = orchestrator();
    let first = orchestrator
        .generate("positions_report", &json!({}), &positions(3, 18000.0))
        .await
        .unwrap();
    let second = orchestrator
        .generate("positions_report", &json!({}), &positions(5, 25000.0))
        .await
        .unwrap();

    assert_ne!(first, second);
    assert!(orchestrator.store().revoke(&first));
    assert!(orchestrator.store().get(&first).is_none());

    let bytes = orchestrator.store().get(&second).unwrap();
    assert_valid_pdf(&bytes);
    assert!(!orchestrator.is_loading());
}

#[tokio::test]
async fn test_download_name_follows_title() {
    let mut orchestrator = orchestrator();
    let handle = orchestrator
        .generate("positions_report", &json!({}), &positions(2, 20000.0))
        .await
        .unwrap();
    assert_eq!(handle.file_name(), "Company_Positions_Report.pdf");
}

#[tokio::test]
async fn test_every_bundled_report_produces_a_pdf() {
    let data = json!({
        "positions": [{ "title": "Picker", "employeeCount": 4, "monthly_salary": 18000 }],
        "schedules": [{ "empId": "E1", "date": "2026-10-19", "start_time": "08:00" }],
        "attendanceLogs": [{ "empId": "E1", "date": "2026-10-19", "signIn": "08:05" }],
        "employees": [{ "id": "E1", "name": "Ana Reyes" }],
        "employeeData": [{ "id": "E1", "name": "Ana Reyes", "riskScore": 20.0, "isHighPotential": true }],
        "columns": [{ "key": "name", "label": "Name" }],
        "rows": [{ "name": "Ana Reyes" }],
        "payslipData": { "earnings": [{ "description": "Basic Pay", "amount": 15000 }] },
        "employeeDetails": { "name": "Ana Reyes" }
    });
    let params = json!({ "startDate": "2026-10-19", "asOfDate": "2026-10-19" });

    let mut orchestrator = orchestrator();
    let ids: Vec<String> = orchestrator.registry().ids().iter().map(|s| s.to_string()).collect();
    for id in ids {
        let handle = orchestrator
            .generate(&id, &params, &data)
            .await
            .unwrap_or_else(|e| panic!("{} failed: {}", id, e));
        let bytes = orchestrator.store().get(&handle).unwrap();
        assert_valid_pdf(&bytes);
        assert!(page_count(&bytes) >= 1);
    }
}

// ─── Catalog ────────────────────────────────────────────────────

#[tokio::test]
async fn test_toml_catalog_drives_titles() {
    let catalog = ReportCatalog::from_toml_str(
        r#"
        [[report]]
        id = "positions_report"
        title = "Headcount  by Role"
        orientation = "landscape"
        "#,
    )
    .unwrap();
    let mut orchestrator = ReportOrchestrator::new(catalog, GeneratorRegistry::builtin());
    let handle = orchestrator
        .generate("positions_report", &json!({}), &positions(2, 20000.0))
        .await
        .unwrap();
    assert_eq!(handle.title(), "Headcount  by Role");
    assert_eq!(handle.file_name(), "Headcount_by_Role.pdf");
}

#[tokio::test]
async fn test_registered_id_without_catalog_entry_uses_fallback_title() {
    let mut orchestrator = ReportOrchestrator::new(ReportCatalog::default(), GeneratorRegistry::builtin());
    let handle = orchestrator
        .generate("positions_report", &json!({}), &positions(1, 20000.0))
        .await
        .unwrap();
    assert_eq!(handle.title(), "Report");
}

#[tokio::test]
async fn test_payslip_has_no_shared_header_or_footer() {
    let catalog = ReportCatalog::builtin();
    let descriptor = catalog.get("payslip").unwrap();
    let mut engine = LayoutEngine::new(
        descriptor.orientation,
        descriptor.title.clone(),
        Theme::Light,
        descriptor.engine_options(),
    );
    let data = json!({
        "payslipData": { "earnings": [{ "description": "Basic Pay", "amount": 15000 }] },
        "employeeDetails": { "name": "Ana Reyes" }
    });
    Payslip.generate(&mut engine, &data, &json!({})).await.unwrap();
    engine.finish(OutputKind::Blob).unwrap();

    for page in engine.pages() {
        let text = page.text_content();
        assert!(!text.contains("Generated on:"));
        assert!(!text.contains("Page 1 of"));
    }
    assert!(engine.pages()[0].text_content().contains("OFFICIAL PAYSLIP"));
}

#[tokio::test]
async fn test_jpeg_logo_is_embedded_as_dct() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("brand.jpg");
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut jpeg)
        .encode(&[200u8; 8 * 4 * 3], 8, 4, image::ColorType::Rgb8)
        .unwrap();
    std::fs::write(&path, &jpeg).unwrap();

    let mut orchestrator = orchestrator().with_logo_from(path.to_str().unwrap()).unwrap();
    let handle = orchestrator
        .generate("positions_report", &json!({}), &positions(2, 20000.0))
        .await
        .unwrap();
    let bytes = orchestrator.store().get(&handle).unwrap();

    assert_valid_pdf(&bytes);
    assert!(bytes.windows(10).any(|w| w == b"/DCTDecode"), "logo not embedded as JPEG");
    assert!(bytes.windows(jpeg.len()).any(|w| w == jpeg.as_slice()), "JPEG stream re-encoded");
}

// ─── Attachment Pass-through ────────────────────────────────────

#[tokio::test]
async fn test_attachment_bytes_pass_through_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let original = b"%PDF-1.4\n% uploaded contract\n%%EOF\n".to_vec();
    std::fs::write(dir.path().join("contract.pdf"), &original).unwrap();

    let mut orchestrator =
        orchestrator().with_attachment_source(Arc::new(FileAttachmentSource::with_root(dir.path())));
    let handle = orchestrator
        .generate("attachment_viewer", &json!({ "path": "contract.pdf" }), &json!({}))
        .await
        .unwrap();

    assert_eq!(orchestrator.store().get(&handle).unwrap().as_slice(), original.as_slice());
}

#[tokio::test]
async fn test_missing_attachment_is_an_error_not_a_panic() {
    let mut orchestrator = orchestrator();
    let err = orchestrator
        .generate("attachment_viewer", &json!({}), &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::Attachment(_)));
    assert!(!orchestrator.is_loading());
}

// ─── Pagination ─────────────────────────────────────────────────

#[test]
fn test_table_of_200_rows_has_three_footed_pages() {
    let mut engine = engine(false, false);
    let head: Vec<String> = vec!["ID".into(), "Name".into(), "Status".into()];
    let body: Vec<Vec<String>> = (0..200)
        .map(|i| vec![i.to_string(), format!("Employee {}", i), "Active".into()])
        .collect();
    engine
        .add_table(
            &head,
            &body,
            TableOptions {
                font_size: 6.0,
                cell_padding: 1.0,
                ..Default::default()
            },
        )
        .unwrap();
    let bytes = engine.finish(OutputKind::Blob).unwrap().into_bytes().unwrap();

    assert_valid_pdf(&bytes);
    assert_eq!(page_count(&bytes), 3);
    assert_eq!(engine.current_page(), 3);
    for (i, page) in engine.pages().iter().enumerate() {
        let text = page.text_content();
        assert!(text.contains("Generated on: 10/19/2026"));
        assert!(text.contains(&format!("Page {} of 3", i + 1)));
        assert!(text.contains("ID"), "head row missing on page {}", i + 1);
    }
}

#[tokio::test]
async fn test_chart_moves_to_next_page_when_it_does_not_fit() {
    let mut engine = engine(false, false);
    let bottom = engine.bottom_limit();
    engine.set_cursor_y(bottom - 100.0);

    let spec = ChartSpec::new(
        "bar",
        vec!["A".into(), "B".into()],
        vec![Dataset::new("Count", vec![3.0, 5.0])],
    );
    engine.add_chart(&spec, ChartOptions::with_height(150.0)).await.unwrap();

    assert_eq!(engine.page_count(), 2);
    let chart = engine.pages()[1]
        .images()
        .find(|img| (img.height - 150.0).abs() < 1e-9)
        .expect("chart not on page 2");
    assert_eq!(chart.x, 40.0);
    assert_eq!(chart.y, 85.0);
    assert!(engine.pages()[0].images().all(|img| (img.height - 150.0).abs() > 1e-9));
}

#[tokio::test]
async fn test_data_uri_output_decodes_to_pdf() {
    let mut engine = engine(true, true);
    engine.add_summary_text("Hello", Default::default());
    let output = engine.finish(OutputKind::DataUri).unwrap();
    let bytes = output.into_bytes().unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(page_count(&bytes), 1);
}
