//! # freight-workflow: Shipment Status Workflow
//!
//! The workflow model of the freight back-office: an ordered, phase-gated
//! state machine with per-phase required documents.
//!
//! ## Model
//!
//! - **Phase** (`phase.rs`): 7 ordered stages, Coleta de Dispersa through POD.
//! - **ShipmentStatus** (`status.rs`): 25 statuses, each in exactly one phase,
//!   traversed strictly forward one step at a time.
//! - **DocumentType** (`document.rs`): 27 kinds of uploadable paperwork with
//!   format/size policy, financial classification, and phase requirements.
//! - **WorkflowEngine** (`engine.rs`): string-level lookups for callers that
//!   hold persisted identifiers rather than typed values.
//! - **Shipment** (`shipment.rs`): aggregate that applies transitions,
//!   enforces document gates, and keeps a transition log.
//!
//! ## Design
//!
//! Every table is an exhaustive `match` over an enum, so an unknown status
//! or document type can only appear at the string boundary (`FromStr`,
//! [`WorkflowEngine`]), where it is rejected with
//! [`WorkflowError::UnknownIdentifier`]. Nothing here performs I/O; writing
//! the new status and locking the shipment row belong to the caller.

pub mod document;
pub mod engine;
pub mod error;
pub mod phase;
pub mod shipment;
pub mod status;

pub use document::{
    DocumentCategory, DocumentType, FileFormat, UploadPolicyError, DOCUMENT_TYPE_COUNT,
};
pub use engine::{
    is_document_set_complete, missing_documents, required_documents, statuses_in_phase,
    FallbackPolicy, WorkflowEngine,
};
pub use error::WorkflowError;
pub use phase::{Phase, PHASE_COUNT};
pub use shipment::{Shipment, ShipmentTransitionRecord};
pub use status::{ShipmentStatus, STATUS_COUNT};
