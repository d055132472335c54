//! CLI entry point for the department score analyzer.
//!
//! Provides subcommands for summarizing a student CSV and exporting the
//! per-department averages as CSV or JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dept_scores::{
    ingest::{IngestOptions, MissingScorePolicy},
    output::{build_report, export_csv, export_json, print_json, summary_text},
    session::AnalysisSession,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "dept_scores")]
#[command(about = "Average final scores per department from a student CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a student CSV and print the department averages
    Summary {
        /// Student CSV with `Department` and `Final_Score` columns
        #[arg(value_name = "CSV")]
        source: String,

        /// Substitute for missing or unparsable scores
        #[arg(short, long, value_enum, default_value_t = MissingScore::Zero)]
        missing_score: MissingScore,

        /// Also log the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Load a student CSV and write the department averages to a file
    Export {
        /// Student CSV with `Department` and `Final_Score` columns
        #[arg(value_name = "CSV")]
        source: String,

        /// File to write
        #[arg(short, long)]
        output: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        /// Substitute for missing or unparsable scores
        #[arg(short, long, value_enum, default_value_t = MissingScore::Zero)]
        missing_score: MissingScore,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MissingScore {
    /// Use 0.0
    Zero,
    /// Use the mean of all valid scores in the file
    GlobalMean,
}

impl From<MissingScore> for MissingScorePolicy {
    fn from(value: MissingScore) -> Self {
        match value {
            MissingScore::Zero => MissingScorePolicy::Zero,
            MissingScore::GlobalMean => MissingScorePolicy::GlobalMean,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/dept_scores.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("dept_scores.log"));

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

    let result = match cli.command {
        Commands::Summary {
            source,
            missing_score,
            json,
        } => summary(&source, missing_score.into(), json),
        Commands::Export {
            source,
            output,
            format,
            missing_score,
        } => export(&source, &output, format, missing_score.into()),
    };

    if let Err(e) = &result {
        error!(error = %e, "Command failed");
    }
    result
}

/// Loads `source` into a fresh session, failing with a descriptive message.
fn load_session(source: &str, policy: MissingScorePolicy) -> Result<AnalysisSession> {
    let mut session = AnalysisSession::new(IngestOptions {
        missing_score: policy,
    });
    let count = session
        .load(source)
        .with_context(|| format!("Error loading CSV file {source}"))?;

    info!(source, records = count, "Loaded {} students", count);
    Ok(session)
}

#[tracing::instrument(skip(policy, json))]
fn summary(source: &str, policy: MissingScorePolicy, json: bool) -> Result<()> {
    let session = load_session(source, policy)?;

    print!("{}", summary_text(&session.averages()));

    if json {
        if let Some(dataset) = session.dataset() {
            print_json(&build_report(dataset))?;
        }
    }

    Ok(())
}

#[tracing::instrument(skip(format, policy))]
fn export(source: &str, output: &str, format: Format, policy: MissingScorePolicy) -> Result<()> {
    let session = load_session(source, policy)?;
    let averages = session.averages();

    if averages.is_empty() {
        anyhow::bail!("No data to export");
    }

    match format {
        Format::Csv => export_csv(output, &averages)
            .with_context(|| format!("Failed to export data to {output}"))?,
        Format::Json => {
            let dataset = session
                .dataset()
                .context("No data to export")?;
            export_json(output, &build_report(dataset))
                .with_context(|| format!("Failed to export report to {output}"))?
        }
    }

    info!(output, departments = averages.len(), "Data exported successfully");
    Ok(())
}
