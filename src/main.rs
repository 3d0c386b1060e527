//! CLI entry point for the sales report generator.
//!
//! Reads every CSV file in the input directory, cleans and enriches the
//! rows, and prints revenue and quantity breakdowns. The report can also be
//! exported as JSON, and the derived rows as CSV.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sales_report::config::EventCalendar;
use sales_report::output::{render_summary, write_json, write_records};
use sales_report::pipeline::{prepare, run};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "sales_report")]
#[command(about = "Descriptive sales report over a directory of CSV files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Default)]
struct InputArgs {
    /// Directory containing the sales CSV files [default: data/ next to the executable]
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// JSON file mapping ISO dates to special-event names [default: 2019 US holidays]
    #[arg(short, long, value_name = "FILE")]
    events: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sales report (the default when no subcommand is given)
    Report {
        #[command(flatten)]
        input: InputArgs,

        /// Also write the full report as JSON to this file
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },
    /// Write the cleaned and enriched rows to a CSV file
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// CSV file to write
        #[arg(short, long, default_value = "ventas_enriquecidas.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/sales_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("sales_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Report {
        input: InputArgs::default(),
        json: None,
    }) {
        Commands::Report { input, json } => {
            let (data_dir, calendar) = resolve_input(input)?;

            let Some(pipeline_report) = run(&data_dir, &calendar)? else {
                println!("No CSV files found in {}", data_dir.display());
                return Ok(());
            };

            print!("{}", render_summary(&pipeline_report));

            if let Some(path) = json {
                write_json(&path, &pipeline_report)?;
            }
        }
        Commands::Export { input, output } => {
            let (data_dir, calendar) = resolve_input(input)?;

            let Some(prepared) = prepare(&data_dir, &calendar)? else {
                println!("No CSV files found in {}", data_dir.display());
                return Ok(());
            };

            write_records(&output, &prepared.records)?;
            println!(
                "Wrote {} rows to {}",
                prepared.records.len(),
                output.display()
            );
        }
    }

    Ok(())
}

/// Resolves the input directory and event calendar from CLI arguments.
fn resolve_input(input: InputArgs) -> Result<(PathBuf, EventCalendar)> {
    let data_dir = input.data_dir.unwrap_or_else(default_data_dir);

    let calendar = match input.events {
        Some(path) => EventCalendar::load(&path)?,
        None => EventCalendar::default(),
    };
    if calendar.is_empty() {
        warn!("Event calendar is empty; every day counts as a normal day");
    }

    info!(
        data_dir = %data_dir.display(),
        events = calendar.len(),
        "Input resolved"
    );
    Ok((data_dir, calendar))
}

/// `data/` beside the running executable, falling back to `./data`.
fn default_data_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("data")))
        .unwrap_or_else(|| PathBuf::from("data"))
}
