//! Predictive analytics: classification mix and the per-employee risk matrix.

use async_trait::async_trait;
use serde::Deserialize;

use super::{notice, parse, RecordId};
use crate::chart::{ChartSpec, Dataset};
use crate::error::ReportError;
use crate::layout::{header, ChartOptions, LayoutEngine, TextOptions, TitleOptions};
use crate::report::{DataSources, ReportGenerator, ReportParams};
use crate::table::TableOptions;

const REPORT_ID: &str = "predictive_analytics_summary";
const CHART_HEIGHT: f64 = 180.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Sources {
    #[serde(default)]
    employee_data: Vec<EmployeeInsight>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeInsight {
    id: RecordId,
    name: String,
    #[serde(default)]
    position_title: Option<String>,
    #[serde(default)]
    latest_score: Option<f64>,
    #[serde(default)]
    trend: Option<String>,
    #[serde(default)]
    risk_score: f64,
    #[serde(default)]
    is_high_potential: bool,
    #[serde(default)]
    is_turnover_risk: bool,
}

#[derive(Debug, Deserialize)]
struct Params {
    #[serde(default, alias = "asOfDate")]
    as_of_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    HighPotential,
    TurnoverRisk,
    MeetsExpectations,
}

impl Classification {
    /// High potential wins over turnover risk when both flags are set.
    fn of(employee: &EmployeeInsight) -> Self {
        if employee.is_high_potential {
            Classification::HighPotential
        } else if employee.is_turnover_risk {
            Classification::TurnoverRisk
        } else {
            Classification::MeetsExpectations
        }
    }
}

fn risk_band(score: f64) -> &'static str {
    if score >= 60.0 {
        "High"
    } else if score >= 30.0 {
        "Medium"
    } else {
        "Low"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PredictiveAnalytics;

#[async_trait]
impl ReportGenerator for PredictiveAnalytics {
    async fn generate(
        &self,
        engine: &mut LayoutEngine,
        data: &DataSources,
        params: &ReportParams,
    ) -> Result<(), ReportError> {
        let Sources { employee_data } = parse(REPORT_ID, data)?;
        let Params { as_of_date } = parse(REPORT_ID, params)?;
        if employee_data.is_empty() {
            notice(engine, "No predictive analytics data available for the selected filters.");
            return Ok(());
        }

        let as_of = as_of_date.unwrap_or_else(header::today);
        engine.add_key_value_rows(&[("Analysis As-Of", as_of.as_str())]);

        let classes: Vec<Classification> = employee_data.iter().map(Classification::of).collect();
        let count = |c: Classification| classes.iter().filter(|x| **x == c).count();
        let (high, risk, meets) = (
            count(Classification::HighPotential),
            count(Classification::TurnoverRisk),
            count(Classification::MeetsExpectations),
        );

        let chart = ChartSpec::new(
            "doughnut",
            vec![
                "High Potential".to_string(),
                "Turnover Risk".to_string(),
                "Meets Expectations".to_string(),
            ],
            vec![Dataset::new("Classification", vec![high as f64, risk as f64, meets as f64]).with_colors(vec![
                "#198754".to_string(),
                "#dc3545".to_string(),
                "#6c757d".to_string(),
            ])],
        );
        engine
            .add_chart_with_title(
                "Employee Classification Distribution",
                &chart,
                ChartOptions::with_height(CHART_HEIGHT),
            )
            .await?;

        let average_risk = employee_data.iter().map(|e| e.risk_score).sum::<f64>() / employee_data.len() as f64;
        engine.add_summary_text(
            &format!(
                "Of {} employee(s) analyzed, {} are classified as high potential and {} as turnover risks; {} meet expectations. The average risk score is {:.1} / 100.",
                employee_data.len(),
                high,
                risk,
                meets,
                average_risk
            ),
            TextOptions::default(),
        );

        engine.add_section_title("Detailed Employee Matrix", TitleOptions::default());
        let head: Vec<String> = ["Employee", "Position", "Performance", "Trend", "Risk Score"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let body: Vec<Vec<String>> = employee_data
            .iter()
            .map(|e| {
                vec![
                    format!("{} ({})", e.name, e.id),
                    e.position_title.clone().unwrap_or_else(|| "N/A".to_string()),
                    e.latest_score
                        .map_or_else(|| "N/A".to_string(), |s| format!("{:.1}%", s)),
                    e.trend.clone().unwrap_or_else(|| "N/A".to_string()),
                    format!("{:.1} / 100 ({})", e.risk_score, risk_band(e.risk_score)),
                ]
            })
            .collect();
        engine.add_table(&head, &body, TableOptions::default())?;
        Ok(())
    }
}
