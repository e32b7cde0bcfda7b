//! probe-backend entry point.
//!
//! Initializes tracing, loads configuration from defaults, an optional TOML
//! file and the environment, then hands over to the startup sequence.
//! Warnings and errors (such as a failed queue connection) go to stderr;
//! everything else, including the listening line, goes to stdout.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use probe_backend::config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER};
use probe_backend::startup;

/// probe-backend: an HTTP backend for exercising orchestration probes
#[derive(Parser, Debug)]
#[command(name = "probe-backend", version, about)]
struct Args {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level filter (e.g., "probe_backend=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log output format (overrides logging.format)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Loaded before tracing so the configured log format applies from the first line
    let config = AppConfig::load(args.config.as_deref())?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .or_else(std::io::stdout);

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    match args.log_format.unwrap_or(config.logging.format) {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(std::io::stdout().is_terminal()),
            )
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init(),
    }

    tracing::info!(
        http_port = config.http.port,
        database = %config.database.redacted(),
        queue = %config.queue.uri(),
        load_elements = config.load.elements,
        "Loaded configuration"
    );

    startup::run(config).await?;

    Ok(())
}
