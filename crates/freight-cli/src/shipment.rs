//! # Shipment Subcommand
//!
//! Lifecycle of individual shipments persisted in the state directory.
//!
//! ```text
//! freight shipment create --client MAPUTO-0098
//! freight shipment attach --id <uuid> --document bl_original --file bl.pdf
//! freight shipment advance --id <uuid> --reason "fatura recebida"
//! freight shipment status --id <uuid>
//! ```
//!
//! A rejected `advance` (illegal target or missing documents) exits with
//! code 1 and leaves the state file untouched. Commands that modify a
//! shipment hold its lock for the whole read-modify-write, see
//! [`ShipmentStore::update`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use freight_core::{FreightError, ShipmentId};
use freight_workflow::{Shipment, WorkflowEngine, WorkflowError};

use crate::config::{CliConfig, OutputFormat};
use crate::store::ShipmentStore;
use crate::workflow::describe_status;

/// Arguments for the `freight shipment` subcommand.
#[derive(Args, Debug)]
pub struct ShipmentArgs {
    #[command(subcommand)]
    pub command: ShipmentCommand,
}

/// Shipment subcommands.
#[derive(Subcommand, Debug)]
pub enum ShipmentCommand {
    /// Create a shipment at the first status of phase 1.
    Create {
        /// Client or bill-of-lading reference.
        #[arg(long)]
        client: String,
    },

    /// Attach a document type to a shipment.
    Attach {
        /// Shipment id.
        #[arg(long)]
        id: ShipmentId,
        /// Document type identifier.
        #[arg(long)]
        document: String,
        /// File to validate against the document's upload policy.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Detach a document type from a shipment.
    Detach {
        /// Shipment id.
        #[arg(long)]
        id: ShipmentId,
        /// Document type identifier.
        #[arg(long)]
        document: String,
    },

    /// Advance a shipment to its next status.
    Advance {
        /// Shipment id.
        #[arg(long)]
        id: ShipmentId,
        /// Reason recorded in the transition log.
        #[arg(long, default_value = "advanced via CLI")]
        reason: String,
        /// Expected target status; rejected unless it is the legal successor.
        #[arg(long)]
        to: Option<String>,
    },

    /// Show a shipment's status, phase, and missing documents.
    Status {
        /// Shipment id.
        #[arg(long)]
        id: ShipmentId,
    },

    /// List all shipments in the state directory.
    List,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    id: String,
    client_reference: &'a str,
    status: &'static str,
    label: &'static str,
    phase: u8,
    phase_name: &'static str,
    completed: bool,
    documents: Vec<&'static str>,
    missing_documents: Vec<&'static str>,
    transitions: usize,
}

impl<'a> StatusReport<'a> {
    fn of(shipment: &'a Shipment) -> Self {
        let phase = shipment.phase();
        Self {
            id: shipment.id.key(),
            client_reference: &shipment.client_reference,
            status: shipment.status.as_str(),
            label: shipment.status.label(),
            phase: phase.number(),
            phase_name: phase.name(),
            completed: shipment.is_completed(),
            documents: shipment.documents.iter().map(|d| d.as_str()).collect(),
            missing_documents: shipment
                .missing_documents()
                .iter()
                .map(|d| d.as_str())
                .collect(),
            transitions: shipment.transitions.len(),
        }
    }
}

/// Execute the shipment subcommand.
pub fn run_shipment(args: &ShipmentArgs, config: &CliConfig) -> Result<u8> {
    let store = ShipmentStore::new(&config.state_dir);
    let engine = config.engine();

    match &args.command {
        ShipmentCommand::Create { client } => cmd_create(&store, client),
        ShipmentCommand::Attach { id, document, file } => {
            cmd_attach(&store, &engine, id, document, file.as_deref())
        }
        ShipmentCommand::Detach { id, document } => cmd_detach(&store, &engine, id, document),
        ShipmentCommand::Advance { id, reason, to } => {
            cmd_advance(&store, &engine, id, reason, to.as_deref())
        }
        ShipmentCommand::Status { id } => cmd_status(&store, id, config.format),
        ShipmentCommand::List => cmd_list(&store, config.format),
    }
}

fn cmd_create(store: &ShipmentStore, client: &str) -> Result<u8> {
    let shipment = Shipment::new(client);
    store.insert(&shipment)?;
    tracing::info!(
        shipment = %shipment.id,
        client = client,
        status = %shipment.status,
        "shipment created"
    );
    println!("{}", shipment.id.key());
    Ok(0)
}

fn cmd_attach(
    store: &ShipmentStore,
    engine: &WorkflowEngine,
    id: &ShipmentId,
    document: &str,
    file: Option<&std::path::Path>,
) -> Result<u8> {
    let document = engine.document_type(document)?;

    if let Some(path) = file {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("failed to stat {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if let Err(e) = document.accepts_file(file_name, metadata.len()) {
            println!("REJECTED: {e}");
            return Ok(1);
        }
    }

    if store.update(id, |shipment| Ok(shipment.attach_document(document)))? {
        tracing::info!(shipment = %id, document = %document, "document attached");
        println!("attached {document}");
    } else {
        println!("{document} already attached");
    }
    Ok(0)
}

fn cmd_detach(
    store: &ShipmentStore,
    engine: &WorkflowEngine,
    id: &ShipmentId,
    document: &str,
) -> Result<u8> {
    let document = engine.document_type(document)?;

    if store.update(id, |shipment| Ok(shipment.detach_document(document)))? {
        tracing::info!(shipment = %id, document = %document, "document detached");
        println!("detached {document}");
    } else {
        println!("{document} was not attached");
    }
    Ok(0)
}

fn cmd_advance(
    store: &ShipmentStore,
    engine: &WorkflowEngine,
    id: &ShipmentId,
    reason: &str,
    to: Option<&str>,
) -> Result<u8> {
    let target = to.map(|t| engine.status(t)).transpose()?;

    // Rejections are returned as the inner value so nothing is written.
    let outcome = store.update(id, |shipment| {
        let from = shipment.status;
        let result = match target {
            Some(target) => shipment.transition_to(target, reason),
            None => shipment.advance(reason),
        };
        match result {
            Ok(to) => Ok(Ok((from, to))),
            Err(
                e @ (WorkflowError::IllegalTransition { .. }
                | WorkflowError::IncompleteDocumentSet { .. }
                | WorkflowError::Terminal { .. }),
            ) => Ok(Err(e)),
            Err(e) => Err(FreightError::from(e)),
        }
    })?;

    match outcome {
        Ok((from, status)) => {
            tracing::info!(
                shipment = %id,
                from = %from,
                to = %status,
                "shipment advanced"
            );
            println!("{}", describe_status(status));
            Ok(0)
        }
        Err(e) => {
            tracing::warn!(shipment = %id, error = %e, "advance rejected");
            println!("REJECTED: {e}");
            Ok(1)
        }
    }
}

fn cmd_status(store: &ShipmentStore, id: &ShipmentId, format: OutputFormat) -> Result<u8> {
    let shipment = store.load(id)?;
    let report = StatusReport::of(&shipment);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("Shipment {} ({})", report.id, report.client_reference);
            println!("  status:   {}", describe_status(shipment.status));
            println!("  created:  {}", shipment.created_at);
            if report.documents.is_empty() {
                println!("  attached: (none)");
            } else {
                println!("  attached: {}", report.documents.join(", "));
            }
            if report.missing_documents.is_empty() {
                println!("  missing:  (none)");
            } else {
                println!("  missing:  {}", report.missing_documents.join(", "));
            }
            for t in &shipment.transitions {
                println!(
                    "  {}  {} -> {}  {}",
                    t.timestamp, t.from_status, t.to_status, t.reason
                );
            }
        }
    }
    Ok(0)
}

fn cmd_list(store: &ShipmentStore, format: OutputFormat) -> Result<u8> {
    let shipments = store.list()?;

    match format {
        OutputFormat::Json => {
            let reports: Vec<StatusReport<'_>> = shipments.iter().map(StatusReport::of).collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        OutputFormat::Text => {
            if shipments.is_empty() {
                println!("No shipments in {}", store.dir().display());
            }
            for s in &shipments {
                println!(
                    "{}  {:<16} {} {}",
                    s.id.key(),
                    s.client_reference,
                    s.phase().number(),
                    s.status
                );
            }
        }
    }
    Ok(0)
}
