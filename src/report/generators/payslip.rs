//! Payslip: a custom full-page layout.
//!
//! The payslip draws its own branded header band and signature block, so
//! the catalog runs it with the shared header and footer suppressed. Its
//! breakdown tables still flow through the engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::{format_amount, parse};
use crate::error::ReportError;
use crate::font::StandardFont;
use crate::layout::{header, LayoutEngine};
use crate::report::{DataSources, ReportGenerator, ReportParams};
use crate::style::{Color, TextAlign};
use crate::table::{TableOptions, TableTheme};

const REPORT_ID: &str = "payslip";

const BAND_HEIGHT: f64 = 90.0;
const LOGO_WIDTH: f64 = 80.0;
const LOGO_HEIGHT: f64 = 26.0;
const SECTION_BAR: f64 = 24.0;
const SECTION_ADVANCE: f64 = 30.0;
const DETAIL_BOX: f64 = 140.0;
const SUMMARY_BOX: f64 = 120.0;
const COLUMN_GAP: f64 = 20.0;
const SIGNATURE_RESERVE: f64 = 70.0;

fn brand() -> Color {
    Color::rgb8(25, 135, 84)
}
fn band() -> Color {
    Color::rgb8(248, 249, 250)
}
fn rule() -> Color {
    Color::rgb8(233, 236, 239)
}
fn ink() -> Color {
    Color::rgb8(33, 37, 41)
}
fn muted() -> Color {
    Color::rgb8(108, 117, 125)
}
fn deduction() -> Color {
    Color::rgb8(220, 53, 69)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Sources {
    payslip_data: PayslipData,
    employee_details: EmployeeDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayslipData {
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    cut_off_start: Option<String>,
    #[serde(default)]
    cut_off_end: Option<String>,
    #[serde(default)]
    pay_date: Option<String>,
    #[serde(default)]
    earnings: Vec<Earning>,
    #[serde(default)]
    deductions: Deductions,
    #[serde(default)]
    other_deductions: Vec<OtherDeduction>,
    #[serde(default)]
    absences: Vec<Absence>,
    #[serde(default)]
    leave_balances: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct Earning {
    description: String,
    #[serde(default)]
    hours: Option<serde_json::Value>,
    #[serde(default)]
    amount: f64,
}

#[derive(Debug, Default, Deserialize)]
struct Deductions {
    #[serde(default)]
    sss: f64,
    #[serde(default)]
    philhealth: f64,
    #[serde(default)]
    hdmf: f64,
    #[serde(default)]
    tax: f64,
}

impl Deductions {
    fn total(&self) -> f64 {
        self.sss + self.philhealth + self.hdmf + self.tax
    }
}

#[derive(Debug, Deserialize)]
struct OtherDeduction {
    description: String,
    #[serde(default)]
    amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Absence {
    description: String,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    total_days: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeDetails {
    name: String,
    #[serde(default)]
    id: Option<super::RecordId>,
    #[serde(default)]
    position_title: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    tin_no: Option<String>,
    #[serde(default)]
    sss_no: Option<String>,
    #[serde(default)]
    philhealth_no: Option<String>,
    #[serde(default)]
    pag_ibig_no: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
}

fn currency(value: f64) -> String {
    format!("PHP {}", format_amount(value))
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

/// `vacation` → `Vacation Leave`, `emergencyLeave` → `Emergency Leave`.
fn leave_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 6);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            label.extend(c.to_uppercase());
        } else {
            if c.is_uppercase() {
                label.push(' ');
            }
            label.push(c);
        }
    }
    if !key.to_lowercase().contains("leave") {
        label.push_str(" Leave");
    }
    label
}

fn strings<const N: usize>(cells: [&str; N]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Payslip;

impl Payslip {
    fn table_options(&self, widths: Vec<f64>) -> TableOptions {
        TableOptions {
            theme: TableTheme::Grid,
            font_size: 9.0,
            cell_padding: 6.0,
            column_widths: Some(widths),
            head_fill: band(),
            head_text: ink(),
            ..Default::default()
        }
    }

    fn draw_band(&self, engine: &mut LayoutEngine, employee: &EmployeeDetails) {
        let margin = engine.margin();
        let width = engine.page_width();
        let right = width - margin;
        let logo_y = (BAND_HEIGHT - LOGO_HEIGHT) / 2.0;
        let canvas = engine.canvas_mut();

        canvas.rect(0.0, 0.0, width, BAND_HEIGHT, Some(band()), None);
        canvas.line(0.0, BAND_HEIGHT, width, BAND_HEIGHT, rule(), 1.0);
        match header::builtin_logo() {
            Some(logo) => canvas.image(Arc::clone(&logo), margin, logo_y, LOGO_WIDTH, LOGO_HEIGHT),
            None => canvas.image_placeholder(margin, logo_y, LOGO_WIDTH, LOGO_HEIGHT),
        }
        canvas.text(
            "OFFICIAL PAYSLIP",
            right,
            logo_y + 10.0,
            StandardFont::HelveticaBold,
            22.0,
            brand(),
            TextAlign::Right,
        );
        canvas.text(
            &format!("Generated: {}", header::today()),
            right,
            logo_y + 25.0,
            StandardFont::Helvetica,
            9.0,
            muted(),
            TextAlign::Right,
        );
        if let Some(company) = &employee.company_name {
            canvas.text(
                company,
                margin,
                logo_y + LOGO_HEIGHT + 15.0,
                StandardFont::HelveticaBold,
                12.0,
                ink(),
                TextAlign::Left,
            );
        }
        engine.set_cursor_y(BAND_HEIGHT + 10.0);
    }

    /// A filled brand-colored bar with a white caption.
    fn section(&self, engine: &mut LayoutEngine, title: &str) {
        engine.ensure_space(SECTION_ADVANCE + 40.0);
        let (x, y, w) = (engine.margin(), engine.cursor_y(), engine.content_width());
        let canvas = engine.canvas_mut();
        canvas.rect(x, y, w, SECTION_BAR, Some(brand()), Some((brand(), 0.5)));
        canvas.text(
            title,
            x + 10.0,
            y + 16.0,
            StandardFont::HelveticaBold,
            11.0,
            Color::WHITE,
            TextAlign::Left,
        );
        engine.set_cursor_y(y + SECTION_ADVANCE);
    }

    fn draw_details(&self, engine: &mut LayoutEngine, employee: &EmployeeDetails, slip: &PayslipData) {
        engine.ensure_space(DETAIL_BOX + 15.0);
        let (margin, top) = (engine.margin(), engine.cursor_y());
        let half = engine.content_width() / 2.0;
        let box_width = half - COLUMN_GAP / 2.0;
        let right_box = margin + half + COLUMN_GAP / 2.0;
        let canvas = engine.canvas_mut();

        let mut label = |text: &str, x: f64, dy: f64| {
            canvas.text(text, x, top + dy, StandardFont::Helvetica, 9.0, muted(), TextAlign::Left);
        };
        label("Employee ID:", margin + 15.0, 70.0);
        label("Employment Status:", margin + 15.0, 85.0);
        label("TIN:", margin + 15.0, 100.0);
        label("SSS No:", margin + half / 2.0 - 10.0, 70.0);
        label("PhilHealth No:", margin + half / 2.0 - 10.0, 85.0);
        label("HDMF No:", margin + half / 2.0 - 10.0, 100.0);
        label("Period:", right_box + 15.0, 50.0);
        label("Start Date:", right_box + 15.0, 70.0);
        label("End Date:", right_box + 15.0, 90.0);
        label("Pay Date:", right_box + 15.0, 110.0);

        let employee_id = employee
            .id
            .as_ref()
            .map_or_else(|| "N/A".to_string(), ToString::to_string);
        let pay_date = slip.pay_date.clone().unwrap_or_else(header::today);
        let mut value = |text: &str, x: f64, dy: f64| {
            canvas.text(text, x, top + dy, StandardFont::HelveticaBold, 9.0, ink(), TextAlign::Left);
        };
        value(&employee_id, margin + 85.0, 70.0);
        value(or_na(&employee.status), margin + 85.0, 85.0);
        value(or_na(&employee.tin_no), margin + 85.0, 100.0);
        value(or_na(&employee.sss_no), margin + half / 2.0 + 60.0, 70.0);
        value(or_na(&employee.philhealth_no), margin + half / 2.0 + 60.0, 85.0);
        value(or_na(&employee.pag_ibig_no), margin + half / 2.0 + 60.0, 100.0);
        value(or_na(&slip.period), right_box + 75.0, 50.0);
        value(or_na(&slip.cut_off_start), right_box + 75.0, 70.0);
        value(or_na(&slip.cut_off_end), right_box + 75.0, 90.0);
        value(&pay_date, right_box + 75.0, 110.0);

        for x in [margin, right_box] {
            canvas.rect(x, top, box_width, DETAIL_BOX, None, Some((rule(), 1.0)));
        }
        canvas.text(
            &employee.name,
            margin + 15.0,
            top + 25.0,
            StandardFont::HelveticaBold,
            14.0,
            ink(),
            TextAlign::Left,
        );
        canvas.text(
            or_na(&employee.position_title),
            margin + 15.0,
            top + 45.0,
            StandardFont::Helvetica,
            11.0,
            ink(),
            TextAlign::Left,
        );
        canvas.text(
            "PAYROLL PERIOD",
            right_box + 15.0,
            top + 25.0,
            StandardFont::HelveticaBold,
            12.0,
            ink(),
            TextAlign::Left,
        );
        engine.set_cursor_y(top + DETAIL_BOX + 15.0);
    }

    fn draw_summary(&self, engine: &mut LayoutEngine, gross: f64, deductions: f64) {
        engine.ensure_space(SUMMARY_BOX + SIGNATURE_RESERVE);
        let (margin, top) = (engine.margin(), engine.cursor_y());
        let (width, height) = (engine.page_width(), engine.page_height());
        let label_x = margin + 20.0;
        let value_x = width - margin - 150.0;
        let canvas = engine.canvas_mut();

        canvas.rect(margin, top, width - margin * 2.0, SUMMARY_BOX, Some(band()), Some((rule(), 1.0)));
        let mut y = top + 30.0;
        canvas.text("Total Gross Pay", label_x, y, StandardFont::Helvetica, 10.0, ink(), TextAlign::Left);
        canvas.text(&currency(gross), value_x, y, StandardFont::HelveticaBold, 10.0, ink(), TextAlign::Left);
        y += 25.0;
        canvas.text("Less: Total Deductions", label_x, y, StandardFont::Helvetica, 10.0, ink(), TextAlign::Left);
        canvas.text(
            &format!("({})", currency(deductions)),
            value_x,
            y,
            StandardFont::HelveticaBold,
            10.0,
            deduction(),
            TextAlign::Left,
        );
        y += 15.0;
        canvas.line(value_x - 20.0, y, width - margin - 20.0, y, rule(), 0.5);
        y += 25.0;
        canvas.text("NET PAY", label_x, y, StandardFont::HelveticaBold, 14.0, brand(), TextAlign::Left);
        canvas.text(
            &currency(gross - deductions),
            value_x,
            y,
            StandardFont::HelveticaBold,
            14.0,
            brand(),
            TextAlign::Left,
        );

        let signature_y = (y + 40.0).max(height - SIGNATURE_RESERVE);
        canvas.line(margin, signature_y, margin + 200.0, signature_y, muted(), 0.5);
        canvas.text(
            "Employee Signature",
            margin,
            signature_y + 15.0,
            StandardFont::Helvetica,
            9.0,
            muted(),
            TextAlign::Left,
        );
        canvas.text(
            "This is an official document. Any unauthorized alterations will be considered void.",
            width - margin,
            signature_y + 15.0,
            StandardFont::Helvetica,
            8.0,
            muted(),
            TextAlign::Right,
        );
        engine.set_cursor_y(signature_y + 15.0);
    }
}

#[async_trait]
impl ReportGenerator for Payslip {
    async fn generate(
        &self,
        engine: &mut LayoutEngine,
        data: &DataSources,
        _params: &ReportParams,
    ) -> Result<(), ReportError> {
        let Sources {
            payslip_data: slip,
            employee_details: employee,
        } = parse(REPORT_ID, data)?;
        let width = engine.content_width();
        let amount_column = |fixed: &[f64]| {
            let mut widths = vec![width - fixed.iter().sum::<f64>()];
            widths.extend_from_slice(fixed);
            widths
        };

        self.draw_band(engine, &employee);
        self.section(engine, "EMPLOYEE & PAYROLL INFORMATION");
        self.draw_details(engine, &employee, &slip);

        self.section(engine, "EARNINGS");
        let gross: f64 = slip.earnings.iter().map(|e| e.amount).sum();
        let mut earnings: Vec<Vec<String>> = slip
            .earnings
            .iter()
            .map(|e| {
                let hours = match &e.hours {
                    None | Some(serde_json::Value::Null) => "--".to_string(),
                    Some(h) => super::cell_text(Some(h)),
                };
                vec![e.description.clone(), hours, currency(e.amount)]
            })
            .collect();
        if earnings.is_empty() {
            earnings.push(strings(["No earnings data available", "--", &currency(0.0)]));
        }
        earnings.push(strings(["Total Earnings", "", &currency(gross)]));
        engine.add_table(
            &strings(["Description", "Hours", "Amount"]),
            &earnings,
            self.table_options(amount_column(&[80.0, 100.0])),
        )?;

        self.section(engine, "DEDUCTIONS");
        let statutory = slip.deductions.total();
        let d = &slip.deductions;
        engine.add_table(
            &strings(["Statutory Deductions", ""]),
            &[
                strings(["SSS Contribution", &currency(d.sss)]),
                strings(["PhilHealth Contribution", &currency(d.philhealth)]),
                strings(["Pag-IBIG Contribution", &currency(d.hdmf)]),
                strings(["Withholding Tax", &currency(d.tax)]),
                strings(["Subtotal - Statutory Deductions", &currency(statutory)]),
            ],
            self.table_options(amount_column(&[100.0])),
        )?;

        let other: f64 = slip.other_deductions.iter().map(|d| d.amount).sum();
        let mut other_rows: Vec<Vec<String>> = slip
            .other_deductions
            .iter()
            .map(|d| vec![d.description.clone(), currency(d.amount)])
            .collect();
        if other_rows.is_empty() {
            other_rows.push(strings(["No other deductions", &currency(0.0)]));
        }
        other_rows.push(strings(["Subtotal - Other Deductions", &currency(other)]));
        engine.add_table(
            &strings(["Other Deductions", ""]),
            &other_rows,
            self.table_options(amount_column(&[100.0])),
        )?;

        if !slip.absences.is_empty() || !slip.leave_balances.is_empty() {
            self.section(engine, "ADDITIONAL INFORMATION");
        }
        if !slip.absences.is_empty() {
            let rows: Vec<Vec<String>> = slip
                .absences
                .iter()
                .map(|a| {
                    vec![
                        a.description.clone(),
                        format!(
                            "{} to {}",
                            a.start_date.as_deref().unwrap_or("N/A"),
                            a.end_date.as_deref().unwrap_or("N/A")
                        ),
                        a.total_days.to_string(),
                    ]
                })
                .collect();
            let half = (width - 80.0) / 2.0;
            engine.add_table(
                &strings(["Absences / Unpaid Leave", "Date Range", "Days"]),
                &rows,
                self.table_options(vec![half, half, 80.0]),
            )?;
        }
        if !slip.leave_balances.is_empty() {
            let rows: Vec<Vec<String>> = slip
                .leave_balances
                .iter()
                .map(|(kind, days)| vec![leave_label(kind), days.to_string()])
                .collect();
            engine.add_table(
                &strings(["Leave Balances", "Days Remaining"]),
                &rows,
                self.table_options(amount_column(&[100.0])),
            )?;
        }

        self.section(engine, "PAYMENT SUMMARY");
        self.draw_summary(engine, gross, statutory + other);
        Ok(())
    }
}
