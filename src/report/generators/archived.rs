//! Re-rendering of an archived report: stored header fields plus its table.

use async_trait::async_trait;
use serde::Deserialize;

use super::{cell_text, notice, parse};
use crate::error::ReportError;
use crate::layout::{LayoutEngine, TitleOptions};
use crate::report::{DataSources, ReportGenerator, ReportParams};
use crate::table::TableOptions;

const REPORT_ID: &str = "archived_report";
/// Header field promoted to a heading instead of a key/value row.
const EMPLOYER_FIELD: &str = "Employer Name";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Archive {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    header_data: HeaderData,
    #[serde(default)]
    columns: Vec<Column>,
    #[serde(default)]
    rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Header fields as an object, or as `[key, value]` pairs to keep an order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HeaderData {
    Pairs(Vec<(String, String)>),
    Map(serde_json::Map<String, serde_json::Value>),
}

impl Default for HeaderData {
    fn default() -> Self {
        HeaderData::Pairs(Vec::new())
    }
}

impl HeaderData {
    fn entries(self) -> Vec<(String, String)> {
        match self {
            HeaderData::Pairs(pairs) => pairs,
            HeaderData::Map(map) => map.into_iter().map(|(k, v)| (k, cell_text(Some(&v)))).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Column {
    key: String,
    label: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArchivedReport;

#[async_trait]
impl ReportGenerator for ArchivedReport {
    async fn generate(
        &self,
        engine: &mut LayoutEngine,
        data: &DataSources,
        _params: &ReportParams,
    ) -> Result<(), ReportError> {
        let archive: Archive = parse(REPORT_ID, data)?;
        let (employer, fields): (Vec<_>, Vec<_>) = archive
            .header_data
            .entries()
            .into_iter()
            .partition(|(k, _)| k == EMPLOYER_FIELD);

        let heading = employer.into_iter().map(|(_, v)| v).next().or(archive.kind);
        if let Some(heading) = heading {
            engine.add_section_title(
                &heading,
                TitleOptions {
                    font_size: 14.0,
                    space_before: 0.0,
                    ..Default::default()
                },
            );
        }
        if !fields.is_empty() {
            engine.add_key_value_rows(&fields);
        }

        if archive.columns.is_empty() {
            notice(engine, "This archived report has no tabular data.");
            return Ok(());
        }
        let head: Vec<String> = archive.columns.iter().map(|c| c.label.clone()).collect();
        let body: Vec<Vec<String>> = archive
            .rows
            .iter()
            .map(|row| archive.columns.iter().map(|c| cell_text(row.get(&c.key))).collect())
            .collect();
        engine.add_table(&head, &body, TableOptions::default())?;
        Ok(())
    }
}
