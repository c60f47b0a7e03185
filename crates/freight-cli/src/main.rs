//! # freight CLI entry point
//!
//! Parses command-line arguments, installs logging, resolves configuration,
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use freight_cli::config::{CliConfig, OutputFormat};
use freight_cli::shipment::{run_shipment, ShipmentArgs};
use freight_cli::workflow::{run_workflow, WorkflowArgs};
use freight_workflow::FallbackPolicy;

/// Freight forwarding workflow tool.
///
/// Queries the 7-phase import/export workflow and manages shipments stored
/// as JSON files in a local state directory.
#[derive(Parser, Debug)]
#[command(name = "freight", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to configuration file (default: ./freight.yaml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding shipment state files.
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Map unknown statuses to phase 1 instead of failing.
    #[arg(long, global = true)]
    legacy_fallback: bool,

    /// Output format.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Query phases, transitions, document requirements, and upload policy.
    Workflow(WorkflowArgs),

    /// Create shipments, attach documents, and advance their status.
    Shipment(ShipmentArgs),
}

impl Cli {
    /// Load the configuration file and apply flag overrides.
    fn resolve_config(&self) -> anyhow::Result<CliConfig> {
        let mut config = CliConfig::load(self.config.as_deref())?;
        if let Some(dir) = &self.state_dir {
            config.state_dir = dir.clone();
        }
        if self.legacy_fallback {
            config.fallback = FallbackPolicy::Legacy;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        Ok(config)
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!("freight CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = cli.resolve_config().and_then(|config| {
        tracing::debug!(state_dir = %config.state_dir.display(), "resolved configuration");
        match &cli.command {
            Commands::Workflow(args) => run_workflow(args, &config),
            Commands::Shipment(args) => run_shipment(args, &config),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
