//! Workflow errors.

use thiserror::Error;

use freight_core::FreightError;

use crate::document::DocumentType;
use crate::phase::Phase;
use crate::status::ShipmentStatus;

/// Errors raised by workflow lookups and shipment transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// A status or document-type string outside the closed set.
    #[error("unknown {kind}: {value:?}")]
    UnknownIdentifier {
        /// "status" or "document type".
        kind: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A phase number outside 1..=7.
    #[error("unknown phase number: {0}")]
    UnknownPhase(u8),

    /// The target is not the single legal successor of the current status.
    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition {
        /// Current status.
        from: ShipmentStatus,
        /// Attempted target status.
        to: ShipmentStatus,
    },

    /// A phase cannot be completed or left while required documents are missing.
    #[error(
        "phase {} ({}) is missing required documents: {}",
        .phase.number(),
        .phase.name(),
        join(.missing)
    )]
    IncompleteDocumentSet {
        /// The phase whose requirements are unmet.
        phase: Phase,
        /// Required document types not yet attached.
        missing: Vec<DocumentType>,
    },

    /// The shipment is at the terminal status.
    #[error("shipment is in terminal status {status}")]
    Terminal {
        /// The terminal status.
        status: ShipmentStatus,
    },
}

fn join(docs: &[DocumentType]) -> String {
    docs.iter()
        .map(|d| d.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<WorkflowError> for FreightError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::UnknownIdentifier { kind, value } => {
                FreightError::UnknownIdentifier { kind, value }
            }
            WorkflowError::UnknownPhase(n) => FreightError::unknown("phase", n.to_string()),
            other => FreightError::InvalidTransition(other.to_string()),
        }
    }
}
