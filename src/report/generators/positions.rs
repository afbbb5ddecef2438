//! Company positions: headcount and salary charts plus a detail table.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{format_amount, notice, parse};
use crate::chart::{ChartSpec, Dataset};
use crate::error::ReportError;
use crate::layout::{ChartOptions, LayoutEngine};
use crate::report::{DataSources, ReportGenerator, ReportParams};
use crate::table::{TableOptions, TableTheme};

const REPORT_ID: &str = "positions_report";
/// Start the table on a fresh page when less than this remains.
const TABLE_LEAD_ROOM: f64 = 200.0;

#[derive(Debug, Deserialize)]
struct Sources {
    #[serde(default)]
    positions: Vec<Position>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Position {
    title: String,
    #[serde(default)]
    employee_count: u32,
    #[serde(default, alias = "monthly_salary")]
    monthly_salary: f64,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PositionsReport;

#[async_trait]
impl ReportGenerator for PositionsReport {
    async fn generate(
        &self,
        engine: &mut LayoutEngine,
        data: &DataSources,
        _params: &ReportParams,
    ) -> Result<(), ReportError> {
        let Sources { positions } = parse(REPORT_ID, data)?;
        if positions.is_empty() {
            notice(engine, "No position data found to generate a report.");
            return Ok(());
        }

        let counts = ChartSpec::new(
            "bar",
            positions.iter().map(|p| p.title.clone()).collect(),
            vec![Dataset::new(
                "Number of Employees",
                positions.iter().map(|p| f64::from(p.employee_count)).collect(),
            )
            .with_color("rgba(25, 135, 84, 0.6)")],
        );
        engine
            .add_chart_with_title("Employee Count by Position", &counts, ChartOptions::default())
            .await?;

        let mut by_salary: Vec<&Position> = positions.iter().collect();
        by_salary.sort_by(|a, b| a.monthly_salary.total_cmp(&b.monthly_salary));
        let salaries = ChartSpec::new(
            "bar",
            by_salary.iter().map(|p| p.title.clone()).collect(),
            vec![Dataset::new(
                "Monthly Salary (PHP)",
                by_salary.iter().map(|p| p.monthly_salary).collect(),
            )
            .with_color("rgba(13, 202, 240, 0.6)")],
        )
        .with_options(json!({ "indexAxis": "y" }));
        engine
            .add_chart_with_title("Monthly Salary Comparison", &salaries, ChartOptions::default())
            .await?;

        if engine.cursor_y() > engine.page_height() - TABLE_LEAD_ROOM {
            engine.new_page();
        }

        let head: Vec<String> = ["Position Title", "Employee Count", "Monthly Salary (PHP)", "Description"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let body: Vec<Vec<String>> = positions
            .iter()
            .map(|p| {
                vec![
                    p.title.clone(),
                    p.employee_count.to_string(),
                    format_amount(p.monthly_salary),
                    p.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        engine.add_table(
            &head,
            &body,
            TableOptions {
                theme: TableTheme::Grid,
                ..Default::default()
            },
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::generators::test_support::{document_text, engine};

    fn sources() -> serde_json::Value {
        json!({
            "positions": [
                { "title": "Picker", "employeeCount": 12, "monthly_salary": 18000, "description": "Warehouse picking" },
                { "title": "Supervisor", "employeeCount": 2, "monthlySalary": 32000.5 },
                { "title": "Packer", "employeeCount": 9, "monthly_salary": 17500 }
            ]
        })
    }

    #[tokio::test]
    async fn draws_two_charts_and_table() {
        let mut e = engine("Company Positions Report");
        PositionsReport.generate(&mut e, &sources(), &json!({})).await.unwrap();

        let images: usize = e.pages().iter().map(|p| p.images().count()).sum();
        // Header logo on every page plus the two charts.
        assert_eq!(images, e.page_count() + 2);

        let text = document_text(&e);
        assert!(text.contains("Employee Count by Position"));
        assert!(text.contains("Monthly Salary Comparison"));
        assert!(text.contains("Monthly Salary (PHP)"));
        assert!(text.contains("32,000.50"));
        assert!(text.contains("Warehouse picking"));
    }

    #[tokio::test]
    async fn empty_positions_draw_a_notice() {
        let mut e = engine("Company Positions Report");
        PositionsReport
            .generate(&mut e, &json!({ "positions": [] }), &json!({}))
            .await
            .unwrap();
        assert!(document_text(&e).contains("No position data found"));
        assert_eq!(e.page_count(), 1);
    }

    #[tokio::test]
    async fn malformed_positions_are_rejected() {
        let mut e = engine("Company Positions Report");
        let err = PositionsReport
            .generate(&mut e, &json!({ "positions": [{ "employeeCount": 3 }] }), &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidData { .. }));
    }
}
