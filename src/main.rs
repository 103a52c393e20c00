//! CLI entry point for the descriptive statistics calculator.
//!
//! Provides subcommands for free-form value/weight entry and for CSV rows,
//! printing the statistics, frequency table and derivation as text, JSON or CSV.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use descriptive_stats::{
    config::Settings,
    output::{print_pretty, render_text, to_json, write_frequency_csv},
    parser::{PairedSample, parse_numbers, parse_pairs, read_rows},
    stats::{Computation, Notation},
};
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing::{debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "descriptive_stats")]
#[command(about = "Descriptive statistics with a step-by-step derivation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute statistics from values (and optional weights) separated by commas or spaces
    Compute {
        /// Values, e.g. "10 20 20 30"
        #[arg(short, long)]
        values: String,

        /// Weights paired with the values, e.g. "1 2 1 3"; enables weighting
        #[arg(short, long)]
        weights: Option<String>,

        #[command(flatten)]
        report: ReportArgs,
    },
    /// Compute statistics from CSV rows of `value[,weight]`
    Rows {
        /// CSV file to read, or "-" for stdin
        #[arg(value_name = "FILE")]
        source: String,

        /// Use the second column as weights (blank or invalid weights count as 1)
        #[arg(short, long, default_value_t = false)]
        use_weights: bool,

        #[command(flatten)]
        report: ReportArgs,
    },
}

#[derive(Args)]
struct ReportArgs {
    /// Decimal places for reported figures (overrides settings)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=15))]
    digits: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Notation for the derivation steps: plain or latex (overrides settings)
    #[arg(short, long)]
    notation: Option<Notation>,

    /// JSON settings file
    #[arg(long)]
    config: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Csv,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let cli = Cli::parse();
    let settings = resolve_settings(cli.command.report())?;
    let _file_guard = init_logging(&settings.log_file_path)?;

    match cli.command {
        Commands::Compute {
            values,
            weights,
            report,
        } => {
            let use_weights = weights.is_some();
            let sample = match weights {
                Some(weights) => parse_pairs(&values, &weights)?,
                None => {
                    let parsed = parse_numbers(&values);
                    PairedSample {
                        values: parsed.values,
                        weights: Vec::new(),
                        discarded: parsed.discarded,
                    }
                }
            };
            run(&sample, use_weights, &settings, report.format)?;
        }
        Commands::Rows {
            source,
            use_weights,
            report,
        } => {
            let sample = if source == "-" {
                read_rows(std::io::stdin().lock(), use_weights)?
            } else {
                let file = std::fs::File::open(&source)
                    .with_context(|| format!("Failed to open '{source}'"))?;
                read_rows(file, use_weights)?
            };
            run(&sample, use_weights, &settings, report.format)?;
        }
    }

    Ok(())
}

impl Commands {
    fn report(&self) -> &ReportArgs {
        match self {
            Commands::Compute { report, .. } | Commands::Rows { report, .. } => report,
        }
    }
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard flushes the file writer on drop.
fn init_logging(log_file_path: &str) -> Result<WorkerGuard> {
    let log_dir = Path::new(log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("descriptive_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "info")?);

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug")?);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

fn env_filter(var: &str, default: &str) -> Result<EnvFilter> {
    Ok(EnvFilter::from_env(var).add_directive(default.parse()?))
}

/// Resolves settings: CLI flag > environment > settings file > defaults.
fn resolve_settings(report: &ReportArgs) -> Result<Settings> {
    let mut settings = match &report.config {
        Some(path) => Settings::load(path)?.with_env_overrides(|key| std::env::var(key).ok())?,
        None => Settings::from_env()?,
    };

    if let Some(digits) = report.digits {
        settings.rounding_digits = digits;
    }
    if let Some(notation) = report.notation {
        settings.notation = notation;
    }

    Ok(settings)
}

/// Runs the engine on a parsed sample and prints the report to stdout.
#[tracing::instrument(skip(sample, settings), fields(n = sample.values.len()))]
fn run(sample: &PairedSample, use_weights: bool, settings: &Settings, format: Format) -> Result<()> {
    debug!(?settings, "Settings resolved");
    if sample.discarded > 0 {
        warn!(discarded = sample.discarded, "Ignored non-numeric input");
    }

    let computation: Computation = settings
        .engine()
        .compute(&sample.values, &sample.weights, use_weights)?;
    print_pretty(&computation);

    let mut stdout = std::io::stdout().lock();
    match format {
        Format::Text => {
            write!(stdout, "{}", render_text(&computation, settings.rounding_digits))?;
        }
        Format::Json => writeln!(stdout, "{}", to_json(&computation)?)?,
        Format::Csv => write_frequency_csv(&mut stdout, &computation.frequency)?,
    }
    stdout.flush()?;

    info!(
        distinct = computation.frequency.len(),
        no_mode = computation.result.no_mode,
        "Statistics computed"
    );
    Ok(())
}
