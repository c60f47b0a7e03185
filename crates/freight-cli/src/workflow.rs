//! # Workflow Subcommand
//!
//! Read-only queries over the workflow tables.
//!
//! - `phases`: every phase with its statuses and required documents.
//! - `phase-of`: phase of a status (honours the configured fallback policy).
//! - `next`: successor of a status.
//! - `check`: whether a transition is legal (exit 1 if not).
//! - `docs`: required and missing documents for a phase.
//! - `policy`: upload policy and classification of a document type.

use std::collections::BTreeSet;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use freight_workflow::{
    missing_documents, required_documents, DocumentType, Phase, ShipmentStatus, WorkflowEngine,
    WorkflowError,
};

use crate::config::{CliConfig, OutputFormat};

/// Arguments for the `freight workflow` subcommand.
#[derive(Args, Debug)]
pub struct WorkflowArgs {
    #[command(subcommand)]
    pub command: WorkflowCommand,
}

/// Workflow subcommands.
#[derive(Subcommand, Debug)]
pub enum WorkflowCommand {
    /// List phases, their statuses, and required documents.
    Phases,

    /// Show the phase of a status.
    PhaseOf {
        /// Status identifier (e.g. `alfandegas_aviso_emitido`).
        status: String,
    },

    /// Show the next status.
    Next {
        /// Current status identifier.
        status: String,
    },

    /// Check whether `from -> to` is a legal transition.
    Check {
        /// Current status identifier.
        from: String,
        /// Target status identifier.
        to: String,
    },

    /// Show required and missing documents for a phase.
    Docs {
        /// Phase number (1-7).
        phase: u8,
        /// Comma-separated document types already present.
        #[arg(long, value_delimiter = ',')]
        have: Vec<String>,
    },

    /// Show upload policy and classification of a document type.
    Policy {
        /// Document type identifier (e.g. `bl_original`).
        document_type: String,
    },
}

#[derive(Serialize)]
struct StatusView {
    status: &'static str,
    label: &'static str,
    phase_completed: bool,
}

#[derive(Serialize)]
struct PhaseView {
    number: u8,
    name: &'static str,
    color: &'static str,
    statuses: Vec<StatusView>,
    required_documents: Vec<&'static str>,
}

#[derive(Serialize)]
struct DocsView {
    phase: u8,
    name: &'static str,
    required: Vec<&'static str>,
    missing: Vec<&'static str>,
    complete: bool,
}

#[derive(Serialize)]
struct PolicyView {
    document_type: &'static str,
    label: &'static str,
    description: &'static str,
    category: &'static str,
    home_phase: u8,
    required_in: Option<u8>,
    allowed_extensions: &'static [&'static str],
    max_file_size_mb: u32,
    financial: bool,
    proof_of_payment: bool,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Execute the workflow subcommand.
pub fn run_workflow(args: &WorkflowArgs, config: &CliConfig) -> Result<u8> {
    let engine = config.engine();
    let format = config.format;

    match &args.command {
        WorkflowCommand::Phases => cmd_phases(format),
        WorkflowCommand::PhaseOf { status } => cmd_phase_of(&engine, status, format),
        WorkflowCommand::Next { status } => cmd_next(&engine, status, format),
        WorkflowCommand::Check { from, to } => cmd_check(&engine, from, to),
        WorkflowCommand::Docs { phase, have } => cmd_docs(&engine, *phase, have, format),
        WorkflowCommand::Policy { document_type } => cmd_policy(&engine, document_type, format),
    }
}

fn phase_view(phase: Phase) -> PhaseView {
    PhaseView {
        number: phase.number(),
        name: phase.name(),
        color: phase.color(),
        statuses: phase
            .statuses()
            .iter()
            .map(|s| StatusView {
                status: s.as_str(),
                label: s.label(),
                phase_completed: s.is_phase_completed(),
            })
            .collect(),
        required_documents: phase
            .required_document_list()
            .iter()
            .map(DocumentType::as_str)
            .collect(),
    }
}

fn cmd_phases(format: OutputFormat) -> Result<u8> {
    let views: Vec<PhaseView> = Phase::all().iter().copied().map(phase_view).collect();
    match format {
        OutputFormat::Json => print_json(&views)?,
        OutputFormat::Text => {
            for view in &views {
                println!("{} {} [{}]", view.number, view.name, view.color);
                for s in &view.statuses {
                    let marker = if s.phase_completed { " *" } else { "" };
                    println!("    {:<34} {}{marker}", s.status, s.label);
                }
                if view.required_documents.is_empty() {
                    println!("  required: (none)");
                } else {
                    println!("  required: {}", view.required_documents.join(", "));
                }
            }
        }
    }
    Ok(0)
}

fn cmd_phase_of(engine: &WorkflowEngine, status: &str, format: OutputFormat) -> Result<u8> {
    let phase = engine.phase_of(status)?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "status": status,
            "phase": phase.number(),
            "name": phase.name(),
        }))?,
        OutputFormat::Text => println!("{} {}", phase.number(), phase.name()),
    }
    Ok(0)
}

fn cmd_next(engine: &WorkflowEngine, status: &str, format: OutputFormat) -> Result<u8> {
    let next = engine.next_status(status)?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "status": status,
            "next": next.map(|s| s.as_str()),
        }))?,
        OutputFormat::Text => match next {
            Some(s) => println!("{s} ({})", s.label()),
            None => println!("terminal: {status} has no successor"),
        },
    }
    Ok(0)
}

fn cmd_check(engine: &WorkflowEngine, from: &str, to: &str) -> Result<u8> {
    match engine.require_transition(from, to) {
        Ok(_) => {
            println!("OK: {from} -> {to}");
            Ok(0)
        }
        Err(e @ (WorkflowError::IllegalTransition { .. } | WorkflowError::Terminal { .. })) => {
            println!("REJECTED: {e}");
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_docs(
    engine: &WorkflowEngine,
    phase: u8,
    have: &[String],
    format: OutputFormat,
) -> Result<u8> {
    let Some(p) = Phase::from_number(phase) else {
        bail!(WorkflowError::UnknownPhase(phase));
    };
    let present = have
        .iter()
        .map(|d| engine.document_type(d))
        .collect::<Result<BTreeSet<_>, _>>()?;

    let view = DocsView {
        phase,
        name: p.name(),
        required: required_documents(phase).iter().map(DocumentType::as_str).collect(),
        missing: missing_documents(phase, &present)
            .iter()
            .map(DocumentType::as_str)
            .collect(),
        complete: freight_workflow::is_document_set_complete(phase, &present),
    };

    match format {
        OutputFormat::Json => print_json(&view)?,
        OutputFormat::Text => {
            println!("Phase {} {}", view.phase, view.name);
            println!("  required: {}", list_or_none(&view.required));
            println!("  missing:  {}", list_or_none(&view.missing));
            println!("  complete: {}", view.complete);
        }
    }
    Ok(0)
}

fn cmd_policy(engine: &WorkflowEngine, document_type: &str, format: OutputFormat) -> Result<u8> {
    let doc = engine.document_type(document_type)?;
    let view = PolicyView {
        document_type: doc.as_str(),
        label: doc.label(),
        description: doc.description(),
        category: doc.category().label(),
        home_phase: doc.phase_number(),
        required_in: doc.required_in().map(|p| p.number()),
        allowed_extensions: doc.allowed_extensions(),
        max_file_size_mb: doc.max_file_size_mb(),
        financial: doc.is_financial(),
        proof_of_payment: doc.is_proof_of_payment(),
    };

    match format {
        OutputFormat::Json => print_json(&view)?,
        OutputFormat::Text => {
            println!("{} ({})", view.label, view.document_type);
            println!("  {}", view.description);
            println!("  category:   {}", view.category);
            match view.home_phase {
                0 => println!("  phase:      any"),
                n => println!("  phase:      {n}"),
            }
            match view.required_in {
                Some(n) => println!("  required:   completing phase {n}"),
                None => println!("  required:   no"),
            }
            println!("  extensions: {}", view.allowed_extensions.join(", "));
            println!("  max size:   {} MB", view.max_file_size_mb);
        }
    }
    Ok(0)
}

fn list_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

/// Render a status with its phase for status listings.
pub fn describe_status(status: ShipmentStatus) -> String {
    let phase = status.phase();
    format!(
        "{} ({}), phase {} {}",
        status,
        status.label(),
        phase.number(),
        phase.name()
    )
}
