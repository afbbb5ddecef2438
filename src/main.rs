//! # Folio CLI
//!
//! Usage:
//!   folio list
//!   folio generate positions_report --data data.json -o positions.pdf
//!   folio generate attendance_summary --data data.json --params '{"startDate":"2026-01-15"}'
//!   folio generate payslip --data payslip.json --logo brand.jpg
//!   folio chart spec.json -o chart.png --width 800 --height 400
//!   folio example > data.json

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use folio::chart::{ChartRasterizer, ChartSpec, RasterOptions};
use folio::report::{ReportCatalog, ReportOrchestrator};
use folio::style::Theme;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Generate paginated PDF reports with charts and tables")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the reports in the catalog
    List {
        /// TOML catalog replacing the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Generate a report to a PDF file
    Generate {
        /// Report id, e.g. positions_report
        id: String,
        /// JSON file with the report's data sources
        #[arg(long)]
        data: Option<PathBuf>,
        /// Report parameters as inline JSON
        #[arg(long, default_value = "{}")]
        params: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// TOML catalog replacing the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
        #[arg(long, default_value = "light")]
        theme: Theme,
        /// Header logo: a PNG/JPEG file or a data URI
        #[arg(long)]
        logo: Option<String>,
    },
    /// Rasterize a chart spec to PNG
    Chart {
        /// JSON chart spec ({"type": "bar", "data": {...}})
        spec: PathBuf,
        #[arg(short, long, default_value = "chart.png")]
        output: PathBuf,
        #[arg(long, default_value_t = 600)]
        width: u32,
        #[arg(long, default_value_t = 400)]
        height: u32,
        #[arg(long, default_value = "light")]
        theme: Theme,
    },
    /// Print sample data for positions_report
    Example,
}

fn load_catalog(path: Option<PathBuf>) -> Result<ReportCatalog, folio::ConfigError> {
    match path {
        Some(path) => ReportCatalog::from_path(path),
        None => Ok(ReportCatalog::builtin()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        Command::List { catalog } => {
            for report in load_catalog(catalog)?.iter() {
                let flags = if report.skip_header { " (full page)" } else { "" };
                println!(
                    "{:<32} {:<32} {}{}",
                    report.id,
                    report.title,
                    report.category.as_deref().unwrap_or("-"),
                    flags
                );
            }
        }
        Command::Generate {
            id,
            data,
            params,
            output,
            catalog,
            theme,
            logo,
        } => {
            let data: serde_json::Value = match data {
                Some(path) => serde_json::from_str(&fs::read_to_string(&path)?)?,
                None => serde_json::json!({}),
            };
            let params: serde_json::Value = serde_json::from_str(&params)?;

            let registry = folio::report::GeneratorRegistry::builtin();
            let mut orchestrator = ReportOrchestrator::new(load_catalog(catalog)?, registry).with_theme(theme);
            if let Some(src) = logo {
                orchestrator = orchestrator.with_logo_from(&src)?;
            }
            let handle = orchestrator.generate(&id, &params, &data).await?;

            let output = output.unwrap_or_else(|| PathBuf::from(handle.file_name()));
            if let Some(bytes) = orchestrator.store().get(&handle) {
                fs::write(&output, bytes.as_slice())?;
                eprintln!("Written {} bytes to {}", bytes.len(), output.display());
            }
            orchestrator.store().revoke(&handle);
        }
        Command::Chart {
            spec,
            output,
            width,
            height,
            theme,
        } => {
            let spec: ChartSpec = serde_json::from_str(&fs::read_to_string(&spec)?)?;
            let image = ChartRasterizer::new()
                .rasterize(&spec, RasterOptions::new(width, height, theme))
                .await?;
            fs::write(&output, &image.data)?;
            eprintln!("Written {}x{} chart to {}", image.width, image.height, output.display());
        }
        Command::Example => print!("{}", example_positions_json()),
    }
    Ok(())
}

fn example_positions_json() -> &'static str {
    r##"{
  "positions": [
    { "title": "Warehouse Picker", "employeeCount": 14, "monthly_salary": 18500, "description": "Picks and stages orders for dispatch" },
    { "title": "Packer", "employeeCount": 9, "monthly_salary": 17800, "description": "Packs and labels outbound parcels" },
    { "title": "Forklift Operator", "employeeCount": 4, "monthly_salary": 22000, "description": "Moves pallets between racks and docks" },
    { "title": "Shift Supervisor", "employeeCount": 3, "monthly_salary": 32000, "description": "Leads a warehouse shift" },
    { "title": "HR Officer", "employeeCount": 1, "monthly_salary": 35000, "description": "Handles hiring, payroll and records" }
  ]
}
"##
}
