// src/main.rs
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkup_core::config::parse_weekday;
use checkup_core::loader::load_records;
use checkup_core::report::{write_report_csv, write_report_json};
use checkup_core::{EngineConfig, ReportingWindow, ScheduleEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

/// Daily examination workload report for a set of campaigns.
#[derive(Parser, Debug)]
#[command(name = "checkup-core", version, about)]
struct Cli {
    /// Scheduling records, as a .json array or a .csv table
    #[arg(long)]
    records: PathBuf,

    /// Whole month to report on (YYYY-MM)
    #[arg(long, conflicts_with_all = ["start", "end"])]
    month: Option<String>,

    /// First day of an explicit window (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// Last day of an explicit window (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Overrides CHECKUP_REST_DAY (e.g. "sun", "Monday")
    #[arg(long)]
    rest_day: Option<String>,
}

fn reporting_window(cli: &Cli) -> Result<ReportingWindow> {
    match (cli.start, cli.end, cli.month.as_deref()) {
        (Some(start), Some(end), _) => Ok(ReportingWindow::Range { start, end }),
        (_, _, Some(month)) => ReportingWindow::parse_month(month).context("Invalid --month"),
        _ => bail!("Either --month or both --start and --end must be given"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = EngineConfig::from_env().context("Failed to load engine configuration")?;
    if let Some(rest_day) = cli.rest_day.as_deref() {
        config = config.with_rest_day(parse_weekday(rest_day)?);
    }
    let engine = ScheduleEngine::new(config)?;
    info!("Rest day: {}", engine.rest_day());

    let window = reporting_window(&cli)?;
    let records = load_records(&cli.records)
        .with_context(|| format!("Failed to load records from {}", cli.records.display()))?;

    let report = engine.daily_report(&records, &window);

    let stdout = io::stdout();
    let handle = stdout.lock();
    match cli.format {
        OutputFormat::Json => write_report_json(&report, handle)?,
        OutputFormat::Csv => write_report_csv(&report.rows, handle)?,
    }
    Ok(())
}
