//! # Shipment Aggregate
//!
//! A shipment with its current status, the set of attached document types,
//! and an ordered transition log.
//!
//! ## Transitions
//!
//! A shipment only ever moves to [`ShipmentStatus::next`]. Two document
//! gates apply:
//!
//! - entering a phase-completed marker (`coleta_concluida`, …,
//!   `processo_concluido`) requires that phase's documents;
//! - leaving a phase requires the documents of the phase being left.
//!
//! Faturação has neither a marker nor required documents, so the move into
//! POD is never gated.
//!
//! Persisting the new status, and serializing concurrent advances of the
//! same shipment, is the caller's job.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use freight_core::{ShipmentId, Timestamp};

use crate::document::DocumentType;
use crate::engine::missing_documents;
use crate::error::WorkflowError;
use crate::phase::Phase;
use crate::status::ShipmentStatus;

/// Record of a shipment status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentTransitionRecord {
    /// Status before the transition.
    pub from_status: ShipmentStatus,
    /// Status after the transition.
    pub to_status: ShipmentStatus,
    /// When the transition occurred.
    pub timestamp: Timestamp,
    /// Reason given by the operator.
    pub reason: String,
}

/// A shipment moving through the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    /// Unique shipment identifier.
    pub id: ShipmentId,
    /// Client-facing reference (e.g. BL number or internal job code).
    pub client_reference: String,
    /// Current status.
    pub status: ShipmentStatus,
    /// Document types attached so far.
    pub documents: BTreeSet<DocumentType>,
    /// When the shipment was created.
    pub created_at: Timestamp,
    /// Ordered log of all status transitions.
    pub transitions: Vec<ShipmentTransitionRecord>,
}

impl Shipment {
    /// Create a shipment at `coleta_cotacao_solicitada`.
    pub fn new(client_reference: impl Into<String>) -> Self {
        Self {
            id: ShipmentId::new(),
            client_reference: client_reference.into(),
            status: ShipmentStatus::initial(),
            documents: BTreeSet::new(),
            created_at: Timestamp::now(),
            transitions: Vec::new(),
        }
    }

    /// Rebuild a shipment from persisted strings.
    ///
    /// Unknown statuses or document types are rejected, never coerced.
    pub fn restore<'a, I>(
        id: ShipmentId,
        client_reference: impl Into<String>,
        status: &str,
        documents: I,
        created_at: Timestamp,
    ) -> Result<Self, WorkflowError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let status: ShipmentStatus = status.parse()?;
        let documents = documents
            .into_iter()
            .map(str::parse::<DocumentType>)
            .collect::<Result<BTreeSet<DocumentType>, _>>()?;
        Ok(Self {
            id,
            client_reference: client_reference.into(),
            status,
            documents,
            created_at,
            transitions: Vec::new(),
        })
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.status.phase()
    }

    /// Whether the shipment reached `processo_concluido`.
    pub fn is_completed(&self) -> bool {
        self.status.is_fully_completed()
    }

    /// Attach a document type. Returns `false` if it was already attached.
    pub fn attach_document(&mut self, document: DocumentType) -> bool {
        self.documents.insert(document)
    }

    /// Detach a document type. Returns `false` if it was not attached.
    pub fn detach_document(&mut self, document: DocumentType) -> bool {
        self.documents.remove(&document)
    }

    /// Required documents of the current phase still missing.
    pub fn missing_documents(&self) -> Vec<DocumentType> {
        missing_documents(self.phase().number(), &self.documents)
    }

    /// The phase whose documents must be complete to move to `to`, if any.
    fn gating_phase(&self, to: ShipmentStatus) -> Option<Phase> {
        if to.is_phase_completed() {
            Some(to.phase())
        } else if to.phase() != self.status.phase() {
            Some(self.status.phase())
        } else {
            None
        }
    }

    /// Advance to the next status.
    ///
    /// Fails with [`WorkflowError::Terminal`] at `processo_concluido` and with
    /// [`WorkflowError::IncompleteDocumentSet`] when a document gate is unmet.
    pub fn advance(&mut self, reason: &str) -> Result<ShipmentStatus, WorkflowError> {
        let to = self
            .status
            .next()
            .ok_or(WorkflowError::Terminal { status: self.status })?;

        if let Some(phase) = self.gating_phase(to) {
            let missing = missing_documents(phase.number(), &self.documents);
            if !missing.is_empty() {
                return Err(WorkflowError::IncompleteDocumentSet { phase, missing });
            }
        }

        self.do_transition(to, reason);
        Ok(to)
    }

    /// Move to `target`, which must be the single legal successor.
    pub fn transition_to(
        &mut self,
        target: ShipmentStatus,
        reason: &str,
    ) -> Result<ShipmentStatus, WorkflowError> {
        if self.status.is_fully_completed() {
            return Err(WorkflowError::Terminal { status: self.status });
        }
        if !self.status.can_transition_to(target) {
            return Err(WorkflowError::IllegalTransition {
                from: self.status,
                to: target,
            });
        }
        self.advance(reason)
    }

    fn do_transition(&mut self, to: ShipmentStatus, reason: &str) {
        tracing::debug!(
            shipment = %self.id,
            from = %self.status,
            to = %to,
            "shipment status transition"
        );
        self.transitions.push(ShipmentTransitionRecord {
            from_status: self.status,
            to_status: to,
            timestamp: Timestamp::now(),
            reason: reason.to_string(),
        });
        self.status = to;
    }
}
