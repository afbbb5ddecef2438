//! Daily attendance: present/late/absent breakdown and the day's log.

use async_trait::async_trait;
use serde::Deserialize;

use super::{notice, parse, RecordId};
use crate::chart::{ChartSpec, Dataset};
use crate::error::ReportError;
use crate::layout::{ChartOptions, LayoutEngine, TextOptions, TitleOptions};
use crate::report::{DataSources, ReportGenerator, ReportParams};
use crate::table::TableOptions;

const REPORT_ID: &str = "attendance_summary";
const CHART_HEIGHT: f64 = 180.0;
const MISSING: &str = "---";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Sources {
    #[serde(default)]
    schedules: Vec<Schedule>,
    #[serde(default)]
    attendance_logs: Vec<AttendanceLog>,
    #[serde(default)]
    employees: Vec<Employee>,
}

#[derive(Debug, Deserialize)]
struct Schedule {
    #[serde(rename = "empId")]
    emp_id: RecordId,
    date: String,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttendanceLog {
    emp_id: RecordId,
    date: String,
    #[serde(default)]
    sign_in: Option<String>,
    #[serde(default)]
    break_out: Option<String>,
    #[serde(default)]
    break_in: Option<String>,
    #[serde(default)]
    sign_out: Option<String>,
    #[serde(default, alias = "overtime_hours")]
    overtime_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Employee {
    id: RecordId,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Params {
    #[serde(default, alias = "startDate")]
    start_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Present,
    Late,
    Absent,
}

impl Status {
    /// Times compare as zero-padded `HH:MM` strings.
    fn of(schedule: &Schedule, log: Option<&AttendanceLog>) -> Self {
        match log.and_then(|l| l.sign_in.as_deref()) {
            None => Status::Absent,
            Some(sign_in) => match schedule.start_time.as_deref() {
                Some(start) if sign_in > start => Status::Late,
                _ => Status::Present,
            },
        }
    }

    fn label(self) -> &'static str {
        match self {
            Status::Present => "Present",
            Status::Late => "Late",
            Status::Absent => "Absent",
        }
    }
}

fn or_missing(punch: Option<&str>) -> String {
    punch.unwrap_or(MISSING).to_string()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceSummary;

#[async_trait]
impl ReportGenerator for AttendanceSummary {
    async fn generate(
        &self,
        engine: &mut LayoutEngine,
        data: &DataSources,
        params: &ReportParams,
    ) -> Result<(), ReportError> {
        let Params { start_date } = parse(REPORT_ID, params)?;
        let Some(date) = start_date.filter(|d| !d.is_empty()) else {
            notice(engine, "Error: No date was selected for this report.");
            return Ok(());
        };
        let sources: Sources = parse(REPORT_ID, data)?;

        let scheduled: Vec<&Schedule> = sources.schedules.iter().filter(|s| s.date == date).collect();
        if scheduled.is_empty() {
            notice(engine, &format!("No employees were scheduled for {}.", date));
            return Ok(());
        }

        let log_for = |schedule: &Schedule| {
            sources
                .attendance_logs
                .iter()
                .find(|l| l.date == date && l.emp_id == schedule.emp_id)
        };
        let statuses: Vec<Status> = scheduled.iter().map(|&s| Status::of(s, log_for(s))).collect();
        let late = statuses.iter().filter(|s| **s == Status::Late).count();
        let absent = statuses.iter().filter(|s| **s == Status::Absent).count();
        let on_time = statuses.len() - late - absent;

        let chart = ChartSpec::new(
            "doughnut",
            vec![
                format!("Present ({})", on_time),
                format!("Late ({})", late),
                format!("Absent ({})", absent),
            ],
            vec![Dataset::new("Attendance", vec![on_time as f64, late as f64, absent as f64]).with_colors(vec![
                "#198754".to_string(),
                "#ffc107".to_string(),
                "#dc3545".to_string(),
            ])],
        );
        engine
            .add_chart_with_title(
                &format!("Attendance Overview for {}", date),
                &chart,
                ChartOptions::with_height(CHART_HEIGHT),
            )
            .await?;

        engine.add_summary_text(
            &format!(
                "On {}, a total of {} employee(s) were scheduled. Of these, {} were present ({} of whom were late), and {} were absent.",
                date,
                scheduled.len(),
                on_time + late,
                late,
                absent
            ),
            TextOptions::default(),
        );
        engine.add_section_title("Daily Attendance Log", TitleOptions::default());

        let head: Vec<String> = [
            "ID", "Name", "Start Time", "End Time", "Sign In", "Break Out", "Break In", "Sign Out", "OT (hrs)", "Status",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let body: Vec<Vec<String>> = scheduled
            .iter()
            .zip(&statuses)
            .map(|(&schedule, status)| {
                let log = log_for(schedule);
                let name = sources
                    .employees
                    .iter()
                    .find(|e| e.id == schedule.emp_id)
                    .map_or("N/A", |e| e.name.as_str());
                vec![
                    schedule.emp_id.to_string(),
                    name.to_string(),
                    schedule.start_time.clone().unwrap_or_else(|| "N/A".to_string()),
                    schedule.end_time.clone().unwrap_or_else(|| "N/A".to_string()),
                    or_missing(log.and_then(|l| l.sign_in.as_deref())),
                    or_missing(log.and_then(|l| l.break_out.as_deref())),
                    or_missing(log.and_then(|l| l.break_in.as_deref())),
                    or_missing(log.and_then(|l| l.sign_out.as_deref())),
                    log.and_then(|l| l.overtime_hours).unwrap_or(0.0).to_string(),
                    status.label().to_string(),
                ]
            })
            .collect();
        engine.add_table(
            &head,
            &body,
            TableOptions {
                font_size: 8.0,
                cell_padding: 4.0,
                ..Default::default()
            },
        )?;
        Ok(())
    }
}
