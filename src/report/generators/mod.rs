//! Bundled report generators.
//!
//! Each generator reads its slice of the data sources through small serde
//! records, shapes chart and table content from them, and calls engine
//! operations in order.

mod archived;
mod attendance;
mod payslip;
mod positions;
mod predictive;

pub use archived::ArchivedReport;
pub use attendance::AttendanceSummary;
pub use payslip::Payslip;
pub use positions::PositionsReport;
pub use predictive::PredictiveAnalytics;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ReportError;
use crate::layout::{LayoutEngine, TextOptions};

/// Deserialize a generator's view of `value`.
pub(crate) fn parse<T: DeserializeOwned>(report: &str, value: &serde_json::Value) -> Result<T, ReportError> {
    T::deserialize(value).map_err(|e| ReportError::InvalidData {
        report: report.to_string(),
        reason: e.to_string(),
    })
}

/// A one-paragraph notice used when there is nothing to report.
pub(crate) fn notice(engine: &mut LayoutEngine, text: &str) {
    engine.add_summary_text(text, TextOptions::default());
}

/// `1234567.5` → `"1,234,567.50"`.
pub(crate) fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, cents)
}

/// Record ids arrive as strings or bare numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub(crate) enum RecordId {
    Text(String),
    Number(i64),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Text(s) => f.write_str(s),
            RecordId::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Display form of a loosely typed JSON cell.
pub(crate) fn cell_text(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::layout::{EngineOptions, LayoutEngine, Orientation};
    use crate::style::Theme;

    pub fn engine(title: &str) -> LayoutEngine {
        LayoutEngine::new(
            Orientation::Portrait,
            title,
            Theme::Light,
            EngineOptions {
                generated_on: Some("1/15/2026".to_string()),
                ..Default::default()
            },
        )
    }

    pub fn full_page_engine(title: &str) -> LayoutEngine {
        LayoutEngine::new(
            Orientation::Portrait,
            title,
            Theme::Light,
            EngineOptions {
                skip_header: true,
                skip_footer: true,
                ..Default::default()
            },
        )
    }

    /// All text in the document with wrapped lines rejoined by spaces.
    pub fn document_text(engine: &LayoutEngine) -> String {
        engine
            .pages()
            .iter()
            .flat_map(|p| p.text_lines())
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amounts_are_grouped() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.999), "1,000.00");
        assert_eq!(format_amount(1234567.5), "1,234,567.50");
        assert_eq!(format_amount(-45000.0), "-45,000.00");
    }

    #[test]
    fn record_ids_accept_numbers() {
        let ids: Vec<RecordId> = serde_json::from_value(json!(["EMP-1", 42])).unwrap();
        assert_eq!(ids[0].to_string(), "EMP-1");
        assert_eq!(ids[1].to_string(), "42");
    }

    #[test]
    fn cells_render_scalars() {
        assert_eq!(cell_text(Some(&json!("x"))), "x");
        assert_eq!(cell_text(Some(&json!(2.5))), "2.5");
        assert_eq!(cell_text(Some(&json!(null))), "");
        assert_eq!(cell_text(None), "");
    }

    #[test]
    fn shape_errors_name_the_report() {
        let err = parse::<Vec<String>>("positions_report", &json!({"a": 1})).unwrap_err();
        assert!(err.to_string().contains("positions_report"));
    }
}
