//! # Workflow Phases
//!
//! The 7 sequential stages of an import/export process. A phase is never
//! stored on its own; it is derived from the shipment's current status.
//!
//! ```text
//! 1 Coleta de Dispersa ─▶ 2 Legalização ─▶ 3 Alfândegas ─▶ 4 Cornelder
//!        ─▶ 5 Taxação ─▶ 6 Faturação ─▶ 7 POD
//! ```
//!
//! Persisted and serialized as its number (1..=7).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::document::DocumentType;
use crate::error::WorkflowError;
use crate::status::ShipmentStatus;

/// Total number of workflow phases.
pub const PHASE_COUNT: usize = 7;

/// One of the 7 ordered phases of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Phase {
    /// Phase 1: collection of the shipping-line paperwork and payment.
    Coleta = 1,
    /// Phase 2: legalization of the bill of lading.
    Legalizacao = 2,
    /// Phase 3: customs clearance.
    Alfandegas = 3,
    /// Phase 4: port terminal (Cornelder) charges and release.
    Cornelder = 4,
    /// Phase 5: duty assessment.
    Taxacao = 5,
    /// Phase 6: client invoicing.
    Faturacao = 6,
    /// Phase 7: proof of delivery.
    Pod = 7,
}

impl Phase {
    /// All phases in traversal order.
    pub fn all() -> &'static [Phase] {
        &[
            Self::Coleta,
            Self::Legalizacao,
            Self::Alfandegas,
            Self::Cornelder,
            Self::Taxacao,
            Self::Faturacao,
            Self::Pod,
        ]
    }

    /// The phase number (1-7).
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// Look up a phase by number. `None` outside 1..=7.
    pub fn from_number(n: u8) -> Option<Phase> {
        match n {
            1 => Some(Self::Coleta),
            2 => Some(Self::Legalizacao),
            3 => Some(Self::Alfandegas),
            4 => Some(Self::Cornelder),
            5 => Some(Self::Taxacao),
            6 => Some(Self::Faturacao),
            7 => Some(Self::Pod),
            _ => None,
        }
    }

    /// The following phase, if any.
    pub fn next(&self) -> Option<Phase> {
        Self::from_number(self.number() + 1)
    }

    /// Display name shown to operators.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Coleta => "Coleta de Dispersa",
            Self::Legalizacao => "Legalização",
            Self::Alfandegas => "Alfândegas",
            Self::Cornelder => "Cornelder",
            Self::Taxacao => "Taxação",
            Self::Faturacao => "Faturação",
            Self::Pod => "POD",
        }
    }

    /// Colour family used by the presentation layer for this phase's statuses.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Coleta => "blue",
            Self::Legalizacao => "indigo",
            Self::Alfandegas => "amber",
            Self::Cornelder => "purple",
            Self::Taxacao => "orange",
            Self::Faturacao => "teal",
            Self::Pod => "green",
        }
    }

    /// Statuses of this phase, in traversal order.
    pub fn statuses(&self) -> &'static [ShipmentStatus] {
        use ShipmentStatus::*;
        match self {
            Self::Coleta => &[
                ColetaCotacaoSolicitada,
                ColetaFaturaRecebida,
                ColetaPagamentoEfetuado,
                ColetaReciboRecebido,
                ColetaConcluida,
            ],
            Self::Legalizacao => &[
                LegalizacaoPendente,
                LegalizacaoBlSubmetido,
                LegalizacaoConcluida,
            ],
            Self::Alfandegas => &[
                AlfandegasDeclaracaoSubmetida,
                AlfandegasAvisoEmitido,
                AlfandegasPagamentoEfetuado,
                AlfandegasAutorizacaoEmitida,
                AlfandegasConcluida,
            ],
            Self::Cornelder => &[
                CornelderDraftRecebido,
                CornelderPagamentoEfetuado,
                CornelderReciboEmitido,
                CornelderConcluida,
            ],
            Self::Taxacao => &[
                TaxacaoDocumentosPreparados,
                TaxacaoSadEmitido,
                TaxacaoConcluida,
            ],
            Self::Faturacao => &[FaturacaoEmitida, FaturacaoEnviada, FaturacaoPaga],
            Self::Pod => &[PodAguardandoEntrega, ProcessoConcluido],
        }
    }

    /// First status entered when the shipment reaches this phase.
    pub fn first_status(&self) -> ShipmentStatus {
        match self {
            Self::Coleta => ShipmentStatus::ColetaCotacaoSolicitada,
            Self::Legalizacao => ShipmentStatus::LegalizacaoPendente,
            Self::Alfandegas => ShipmentStatus::AlfandegasDeclaracaoSubmetida,
            Self::Cornelder => ShipmentStatus::CornelderDraftRecebido,
            Self::Taxacao => ShipmentStatus::TaxacaoDocumentosPreparados,
            Self::Faturacao => ShipmentStatus::FaturacaoEmitida,
            Self::Pod => ShipmentStatus::PodAguardandoEntrega,
        }
    }

    /// Document types that must be attached before this phase is completed.
    ///
    /// Faturação has no requirement list: client invoices are produced by
    /// the back-office itself.
    pub fn required_document_list(&self) -> &'static [DocumentType] {
        use DocumentType::*;
        match self {
            Self::Coleta => &[BlOriginal, FaturaLinha, PopColeta, ReciboLinha, CartaEndosso],
            Self::Legalizacao => &[BlCarimbado, PackingList, FaturaComercial],
            Self::Alfandegas => &[
                DeclaracaoAduaneira,
                AvisoAlfandegas,
                PopAlfandegas,
                AutorizacaoSaida,
            ],
            Self::Cornelder => &[DraftCornelder, PopCornelder, ReciboCornelder],
            Self::Taxacao => &[Sad, PopTaxacao],
            Self::Faturacao => &[],
            Self::Pod => &[Pod],
        }
    }

    /// [`Phase::required_document_list`] as a set.
    pub fn required_documents(&self) -> BTreeSet<DocumentType> {
        self.required_document_list().iter().copied().collect()
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> u8 {
        phase.number()
    }
}

impl TryFrom<u8> for Phase {
    type Error = WorkflowError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Phase::from_number(n).ok_or(WorkflowError::UnknownPhase(n))
    }
}
