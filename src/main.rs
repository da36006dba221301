//! focus-replay - deterministic trace replay for the focus engine
//!
//! Entry point for the replay binary: feeds a recorded interaction trace
//! through a real engine and prints the emitted focus events as JSON
//! lines on stdout. Logs go to stderr so the event stream stays clean.

use std::fs::File;
use std::io::{self, BufReader};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use lamco_focus::config::Config;
use lamco_focus::replay;
use lamco_focus::utils::format_user_error;

/// Command-line arguments for focus-replay
#[derive(Parser, Debug)]
#[command(name = "focus-replay")]
#[command(version, about = "Replay an interaction trace through the focus engine", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "FOCUS_CONFIG")]
    pub config: Option<String>,

    /// Trace file path, or "-" for stdin
    #[arg(short, long, default_value = "-")]
    pub trace: String,

    /// Print the engine metrics as JSON after the replay
    #[arg(long)]
    pub metrics: bool,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "pretty")]
    pub log_format: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    info!(
        "focus-replay v{} ({} {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_DATE"),
    );

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::load(path).or_else(|e| {
            eprintln!("{}", format_user_error(&e));
            Err(e)
        })?,
        None => Config::default_config(),
    };
    config.validate()?;
    debug!(?config, "configuration loaded");

    let result = if args.trace == "-" {
        info!("replaying trace from stdin");
        replay::run(config.engine, io::stdin().lock(), io::stdout())
    } else {
        info!(trace = %args.trace, "replaying trace file");
        let file = File::open(&args.trace)
            .with_context(|| format!("failed to open trace file: {}", args.trace))?;
        replay::run(config.engine, BufReader::new(file), io::stdout())
    };

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("{}", format_user_error(&e));
            return Err(e);
        }
    };

    info!(
        signals = summary.signals,
        commands = summary.commands,
        topology_updates = summary.topology_updates,
        focus_changes = summary.metrics.focus_changes,
        "replay finished"
    );

    if args.metrics {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lamco_focus={log_level},focus_replay={log_level}")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match args.log_format.as_str() {
        "json" => builder.json().init(),
        "compact" => builder.compact().init(),
        _ => builder.init(),
    }

    Ok(())
}
