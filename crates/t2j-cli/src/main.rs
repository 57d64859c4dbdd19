//! turtl2joplin: convert a Turtl JSON export into a Joplin raw directory.
//!
//! Import the result in Joplin with File → Import → RAW.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use t2j_core::logging::ERROR_MSG;
use t2j_core::{
    Clock, ConversionReport, Converter, ConverterConfig, DirectorySink, FixedClock, MemorySink,
    OutputSink, SystemClock,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "turtl2joplin")]
#[command(author, version, about = "Convert a Turtl JSON export into a Joplin raw directory")]
struct Cli {
    /// Path to the Turtl export (JSON)
    input: PathBuf,

    /// Directory to write records into (created if absent)
    #[arg(short, long, env = "T2J_OUTPUT_DIR", default_value = t2j_core::defaults::OUTPUT_DIR)]
    output: PathBuf,

    /// Stamp every record with this RFC 3339 time instead of the current time
    #[arg(long, env = "T2J_TIMESTAMP")]
    timestamp: Option<String>,

    /// Convert without writing anything; only print the report
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_logging();

    match run(cli) {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!({ ERROR_MSG } = %e, "Conversion failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ConversionReport> {
    let config = ConverterConfig::default().with_output_dir(&cli.output);

    match cli.timestamp.as_deref() {
        Some(ts) => {
            let clock = FixedClock::parse(ts)
                .with_context(|| format!("invalid --timestamp value: {}", ts))?;
            convert(config, clock, &cli.input, cli.dry_run)
        }
        None => convert(config, SystemClock, &cli.input, cli.dry_run),
    }
}

fn convert<C: Clock>(
    config: ConverterConfig,
    clock: C,
    input: &Path,
    dry_run: bool,
) -> anyhow::Result<ConversionReport> {
    let mut converter = Converter::with_clock(config, clock)?;

    // Parse and resolve before touching the output directory so a bad
    // export leaves no trace.
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", input.display()))?;
    let prepared = converter.prepare(&doc)?;

    let mut sink: Box<dyn OutputSink> = if dry_run {
        info!("Dry run: nothing will be written");
        Box::new(MemorySink::new())
    } else {
        let config = converter.config();
        let sink = DirectorySink::create(&config.output_dir, &config.resources_dir)
            .with_context(|| format!("failed to create {}", config.output_dir.display()))?;
        info!(output = %sink.root().display(), "Writing Joplin raw records");
        Box::new(sink)
    };

    let report = converter.write(prepared, &mut *sink)?;
    Ok(report)
}

/// Configure tracing from the environment.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
///   RUST_LOG    - standard env filter (default: "turtl2joplin=info,t2j_core=info")
///
/// Console logs go to stderr; stdout carries only the JSON report.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "turtl2joplin=info,t2j_core=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = log_file {
        let file_dir = Path::new(path).parent().unwrap_or(Path::new("."));
        let file_name = Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("turtl2joplin.log");
        let file_appender = tracing_appender::rolling::never(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    }
}
