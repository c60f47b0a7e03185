//! # Shipment Status
//!
//! The 25 fine-grained workflow states. Each belongs to exactly one
//! [`Phase`]; statuses advance strictly one step at a time, and the last
//! status of phase *k* is followed by the first status of phase *k+1*.
//!
//! ```text
//! coleta_cotacao_solicitada ─▶ … ─▶ coleta_concluida
//!   ─▶ legalizacao_pendente ─▶ … ─▶ legalizacao_concluida
//!   ─▶ alfandegas_declaracao_submetida ─▶ … ─▶ alfandegas_concluida
//!   ─▶ cornelder_draft_recebido ─▶ … ─▶ cornelder_concluida
//!   ─▶ taxacao_documentos_preparados ─▶ … ─▶ taxacao_concluida
//!   ─▶ faturacao_emitida ─▶ faturacao_enviada ─▶ faturacao_paga
//!   ─▶ pod_aguardando_entrega ─▶ processo_concluido (terminal)
//! ```
//!
//! Phases 1–5 end in a "concluída" marker and phase 7 ends in the terminal
//! `processo_concluido`. Phase 6 ends in `faturacao_paga`, which is not a
//! phase-completed marker.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::phase::Phase;

/// Total number of shipment statuses.
pub const STATUS_COUNT: usize = 25;

/// Current workflow state of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    // Phase 1: Coleta de Dispersa
    /// Quotation requested from the shipping line. Initial status.
    ColetaCotacaoSolicitada,
    /// Shipping-line invoice received.
    ColetaFaturaRecebida,
    /// Shipping line paid.
    ColetaPagamentoEfetuado,
    /// Shipping-line receipt received.
    ColetaReciboRecebido,
    /// Phase 1 completed.
    ColetaConcluida,

    // Phase 2: Legalização
    LegalizacaoPendente,
    LegalizacaoBlSubmetido,
    /// Phase 2 completed.
    LegalizacaoConcluida,

    // Phase 3: Alfândegas
    AlfandegasDeclaracaoSubmetida,
    AlfandegasAvisoEmitido,
    AlfandegasPagamentoEfetuado,
    AlfandegasAutorizacaoEmitida,
    /// Phase 3 completed.
    AlfandegasConcluida,

    // Phase 4: Cornelder
    CornelderDraftRecebido,
    CornelderPagamentoEfetuado,
    CornelderReciboEmitido,
    /// Phase 4 completed.
    CornelderConcluida,

    // Phase 5: Taxação
    TaxacaoDocumentosPreparados,
    TaxacaoSadEmitido,
    /// Phase 5 completed.
    TaxacaoConcluida,

    // Phase 6: Faturação
    FaturacaoEmitida,
    FaturacaoEnviada,
    /// Client invoice paid. Last status of phase 6; not a completion marker.
    FaturacaoPaga,

    // Phase 7: POD
    PodAguardandoEntrega,
    /// Whole process completed (terminal).
    ProcessoConcluido,
}

impl ShipmentStatus {
    /// All statuses in traversal order.
    pub fn all() -> &'static [ShipmentStatus] {
        &[
            Self::ColetaCotacaoSolicitada,
            Self::ColetaFaturaRecebida,
            Self::ColetaPagamentoEfetuado,
            Self::ColetaReciboRecebido,
            Self::ColetaConcluida,
            Self::LegalizacaoPendente,
            Self::LegalizacaoBlSubmetido,
            Self::LegalizacaoConcluida,
            Self::AlfandegasDeclaracaoSubmetida,
            Self::AlfandegasAvisoEmitido,
            Self::AlfandegasPagamentoEfetuado,
            Self::AlfandegasAutorizacaoEmitida,
            Self::AlfandegasConcluida,
            Self::CornelderDraftRecebido,
            Self::CornelderPagamentoEfetuado,
            Self::CornelderReciboEmitido,
            Self::CornelderConcluida,
            Self::TaxacaoDocumentosPreparados,
            Self::TaxacaoSadEmitido,
            Self::TaxacaoConcluida,
            Self::FaturacaoEmitida,
            Self::FaturacaoEnviada,
            Self::FaturacaoPaga,
            Self::PodAguardandoEntrega,
            Self::ProcessoConcluido,
        ]
    }

    /// The status every new shipment starts in.
    pub fn initial() -> Self {
        Phase::Coleta.first_status()
    }

    /// The snake_case identifier persisted for this status.
    ///
    /// Matches the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ColetaCotacaoSolicitada => "coleta_cotacao_solicitada",
            Self::ColetaFaturaRecebida => "coleta_fatura_recebida",
            Self::ColetaPagamentoEfetuado => "coleta_pagamento_efetuado",
            Self::ColetaReciboRecebido => "coleta_recibo_recebido",
            Self::ColetaConcluida => "coleta_concluida",
            Self::LegalizacaoPendente => "legalizacao_pendente",
            Self::LegalizacaoBlSubmetido => "legalizacao_bl_submetido",
            Self::LegalizacaoConcluida => "legalizacao_concluida",
            Self::AlfandegasDeclaracaoSubmetida => "alfandegas_declaracao_submetida",
            Self::AlfandegasAvisoEmitido => "alfandegas_aviso_emitido",
            Self::AlfandegasPagamentoEfetuado => "alfandegas_pagamento_efetuado",
            Self::AlfandegasAutorizacaoEmitida => "alfandegas_autorizacao_emitida",
            Self::AlfandegasConcluida => "alfandegas_concluida",
            Self::CornelderDraftRecebido => "cornelder_draft_recebido",
            Self::CornelderPagamentoEfetuado => "cornelder_pagamento_efetuado",
            Self::CornelderReciboEmitido => "cornelder_recibo_emitido",
            Self::CornelderConcluida => "cornelder_concluida",
            Self::TaxacaoDocumentosPreparados => "taxacao_documentos_preparados",
            Self::TaxacaoSadEmitido => "taxacao_sad_emitido",
            Self::TaxacaoConcluida => "taxacao_concluida",
            Self::FaturacaoEmitida => "faturacao_emitida",
            Self::FaturacaoEnviada => "faturacao_enviada",
            Self::FaturacaoPaga => "faturacao_paga",
            Self::PodAguardandoEntrega => "pod_aguardando_entrega",
            Self::ProcessoConcluido => "processo_concluido",
        }
    }

    /// Display label shown to operators and clients.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ColetaCotacaoSolicitada => "Cotação Solicitada",
            Self::ColetaFaturaRecebida => "Fatura da Linha Recebida",
            Self::ColetaPagamentoEfetuado => "Pagamento à Linha Efetuado",
            Self::ColetaReciboRecebido => "Recibo da Linha Recebido",
            Self::ColetaConcluida => "Coleta Concluída",
            Self::LegalizacaoPendente => "Legalização Pendente",
            Self::LegalizacaoBlSubmetido => "BL Submetido para Carimbo",
            Self::LegalizacaoConcluida => "Legalização Concluída",
            Self::AlfandegasDeclaracaoSubmetida => "Declaração Aduaneira Submetida",
            Self::AlfandegasAvisoEmitido => "Aviso de Pagamento Emitido",
            Self::AlfandegasPagamentoEfetuado => "Direitos Aduaneiros Pagos",
            Self::AlfandegasAutorizacaoEmitida => "Autorização de Saída Emitida",
            Self::AlfandegasConcluida => "Alfândegas Concluída",
            Self::CornelderDraftRecebido => "Draft Cornelder Recebido",
            Self::CornelderPagamentoEfetuado => "Pagamento Cornelder Efetuado",
            Self::CornelderReciboEmitido => "Recibo Cornelder Emitido",
            Self::CornelderConcluida => "Cornelder Concluída",
            Self::TaxacaoDocumentosPreparados => "Documentos de Taxação Preparados",
            Self::TaxacaoSadEmitido => "SAD Emitido",
            Self::TaxacaoConcluida => "Taxação Concluída",
            Self::FaturacaoEmitida => "Factura Emitida",
            Self::FaturacaoEnviada => "Factura Enviada ao Cliente",
            Self::FaturacaoPaga => "Factura Paga",
            Self::PodAguardandoEntrega => "Aguardando Entrega",
            Self::ProcessoConcluido => "Processo Concluído",
        }
    }

    /// The phase this status belongs to.
    pub fn phase(&self) -> Phase {
        match self {
            Self::ColetaCotacaoSolicitada
            | Self::ColetaFaturaRecebida
            | Self::ColetaPagamentoEfetuado
            | Self::ColetaReciboRecebido
            | Self::ColetaConcluida => Phase::Coleta,
            Self::LegalizacaoPendente
            | Self::LegalizacaoBlSubmetido
            | Self::LegalizacaoConcluida => Phase::Legalizacao,
            Self::AlfandegasDeclaracaoSubmetida
            | Self::AlfandegasAvisoEmitido
            | Self::AlfandegasPagamentoEfetuado
            | Self::AlfandegasAutorizacaoEmitida
            | Self::AlfandegasConcluida => Phase::Alfandegas,
            Self::CornelderDraftRecebido
            | Self::CornelderPagamentoEfetuado
            | Self::CornelderReciboEmitido
            | Self::CornelderConcluida => Phase::Cornelder,
            Self::TaxacaoDocumentosPreparados
            | Self::TaxacaoSadEmitido
            | Self::TaxacaoConcluida => Phase::Taxacao,
            Self::FaturacaoEmitida | Self::FaturacaoEnviada | Self::FaturacaoPaga => {
                Phase::Faturacao
            }
            Self::PodAguardandoEntrega | Self::ProcessoConcluido => Phase::Pod,
        }
    }

    /// The single legal successor. `None` only for `processo_concluido`.
    pub fn next(&self) -> Option<ShipmentStatus> {
        match self {
            Self::ColetaCotacaoSolicitada => Some(Self::ColetaFaturaRecebida),
            Self::ColetaFaturaRecebida => Some(Self::ColetaPagamentoEfetuado),
            Self::ColetaPagamentoEfetuado => Some(Self::ColetaReciboRecebido),
            Self::ColetaReciboRecebido => Some(Self::ColetaConcluida),
            Self::ColetaConcluida => Some(Self::LegalizacaoPendente),
            Self::LegalizacaoPendente => Some(Self::LegalizacaoBlSubmetido),
            Self::LegalizacaoBlSubmetido => Some(Self::LegalizacaoConcluida),
            Self::LegalizacaoConcluida => Some(Self::AlfandegasDeclaracaoSubmetida),
            Self::AlfandegasDeclaracaoSubmetida => Some(Self::AlfandegasAvisoEmitido),
            Self::AlfandegasAvisoEmitido => Some(Self::AlfandegasPagamentoEfetuado),
            Self::AlfandegasPagamentoEfetuado => Some(Self::AlfandegasAutorizacaoEmitida),
            Self::AlfandegasAutorizacaoEmitida => Some(Self::AlfandegasConcluida),
            Self::AlfandegasConcluida => Some(Self::CornelderDraftRecebido),
            Self::CornelderDraftRecebido => Some(Self::CornelderPagamentoEfetuado),
            Self::CornelderPagamentoEfetuado => Some(Self::CornelderReciboEmitido),
            Self::CornelderReciboEmitido => Some(Self::CornelderConcluida),
            Self::CornelderConcluida => Some(Self::TaxacaoDocumentosPreparados),
            Self::TaxacaoDocumentosPreparados => Some(Self::TaxacaoSadEmitido),
            Self::TaxacaoSadEmitido => Some(Self::TaxacaoConcluida),
            Self::TaxacaoConcluida => Some(Self::FaturacaoEmitida),
            Self::FaturacaoEmitida => Some(Self::FaturacaoEnviada),
            Self::FaturacaoEnviada => Some(Self::FaturacaoPaga),
            Self::FaturacaoPaga => Some(Self::PodAguardandoEntrega),
            Self::PodAguardandoEntrega => Some(Self::ProcessoConcluido),
            Self::ProcessoConcluido => None,
        }
    }

    /// Whether `to` is the single legal successor of this status.
    ///
    /// No skipping, no going back, no staying in place.
    pub fn can_transition_to(&self, to: ShipmentStatus) -> bool {
        self.next() == Some(to)
    }

    /// Whether this status marks the completion of its phase.
    pub fn is_phase_completed(&self) -> bool {
        matches!(
            self,
            Self::ColetaConcluida
                | Self::LegalizacaoConcluida
                | Self::AlfandegasConcluida
                | Self::CornelderConcluida
                | Self::TaxacaoConcluida
                | Self::ProcessoConcluido
        )
    }

    /// Whether the whole process is complete (terminal status).
    pub fn is_fully_completed(&self) -> bool {
        matches!(self, Self::ProcessoConcluido)
    }

    /// Colour family for badges; one per phase.
    pub fn color(&self) -> &'static str {
        self.phase().color()
    }

    /// Zero-based position in the overall traversal (0..25).
    pub fn position(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = WorkflowError;

    /// Parse a persisted status identifier. Case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| WorkflowError::UnknownIdentifier {
                kind: "status",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_count() {
        assert_eq!(ShipmentStatus::all().len(), STATUS_COUNT);
    }

    #[test]
    fn test_all_matches_declaration_order() {
        for (i, status) in ShipmentStatus::all().iter().enumerate() {
            assert_eq!(status.position(), i, "{status} out of order");
        }
    }

    #[test]
    fn test_all_is_concatenation_of_phases() {
        let concatenated: Vec<ShipmentStatus> = Phase::all()
            .iter()
            .flat_map(|p| p.statuses().iter().copied())
            .collect();
        assert_eq!(concatenated, ShipmentStatus::all());
    }

    #[test]
    fn test_phase_membership_roundtrip() {
        for status in ShipmentStatus::all() {
            let phase = status.phase();
            assert!((1..=7).contains(&phase.number()));
            assert!(phase.statuses().contains(status), "{status} not listed in {phase}");
        }
    }

    #[test]
    fn test_next_follows_traversal_order() {
        let all = ShipmentStatus::all();
        for pair in all.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
        assert_eq!(ShipmentStatus::ProcessoConcluido.next(), None);
    }

    #[test]
    fn test_phase_boundary_transitions() {
        assert_eq!(
            ShipmentStatus::ColetaConcluida.next(),
            Some(ShipmentStatus::LegalizacaoPendente)
        );
        assert_eq!(
            ShipmentStatus::FaturacaoPaga.next(),
            Some(ShipmentStatus::PodAguardandoEntrega)
        );
    }

    #[test]
    fn test_can_transition_single_step_only() {
        use ShipmentStatus::*;
        assert!(ColetaCotacaoSolicitada.can_transition_to(ColetaFaturaRecebida));
        // skip
        assert!(!ColetaCotacaoSolicitada.can_transition_to(ColetaPagamentoEfetuado));
        // backward
        assert!(!ColetaFaturaRecebida.can_transition_to(ColetaCotacaoSolicitada));
        // stay
        assert!(!ColetaFaturaRecebida.can_transition_to(ColetaFaturaRecebida));
        // phase skip
        assert!(!ColetaConcluida.can_transition_to(AlfandegasDeclaracaoSubmetida));
        // from terminal
        assert!(!ProcessoConcluido.can_transition_to(ColetaCotacaoSolicitada));
    }

    #[test]
    fn test_exactly_six_phase_completed_markers() {
        let markers: Vec<_> = ShipmentStatus::all()
            .iter()
            .filter(|s| s.is_phase_completed())
            .copied()
            .collect();
        assert_eq!(
            markers,
            vec![
                ShipmentStatus::ColetaConcluida,
                ShipmentStatus::LegalizacaoConcluida,
                ShipmentStatus::AlfandegasConcluida,
                ShipmentStatus::CornelderConcluida,
                ShipmentStatus::TaxacaoConcluida,
                ShipmentStatus::ProcessoConcluido,
            ]
        );
    }

    #[test]
    fn test_faturacao_paga_is_not_a_completion_marker() {
        assert!(!ShipmentStatus::FaturacaoPaga.is_phase_completed());
        assert_eq!(ShipmentStatus::FaturacaoPaga.phase(), Phase::Faturacao);
    }

    #[test]
    fn test_only_terminal_is_fully_completed() {
        for status in ShipmentStatus::all() {
            assert_eq!(
                status.is_fully_completed(),
                *status == ShipmentStatus::ProcessoConcluido
            );
        }
    }

    #[test]
    fn test_initial_status() {
        assert_eq!(ShipmentStatus::initial().as_str(), "coleta_cotacao_solicitada");
        assert_eq!(ShipmentStatus::initial().phase(), Phase::Coleta);
    }

    #[test]
    fn test_labels_nonempty_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for status in ShipmentStatus::all() {
            assert!(!status.label().is_empty());
            assert!(seen.insert(status.label()), "duplicate label {}", status.label());
        }
    }

    #[test]
    fn test_color_follows_phase() {
        assert_eq!(ShipmentStatus::ColetaConcluida.color(), "blue");
        assert_eq!(ShipmentStatus::ProcessoConcluido.color(), "green");
    }

    #[test]
    fn test_from_str_roundtrip() {
        for status in ShipmentStatus::all() {
            let parsed: ShipmentStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, *status);
        }
    }

    #[test]
    fn test_from_str_unknown() {
        let err = "em_transito".parse::<ShipmentStatus>().unwrap_err();
        assert_eq!(
            err,
            WorkflowError::UnknownIdentifier {
                kind: "status",
                value: "em_transito".into()
            }
        );
        assert!("COLETA_CONCLUIDA".parse::<ShipmentStatus>().is_err());
        assert!("".parse::<ShipmentStatus>().is_err());
    }

    #[test]
    fn test_serde_format_matches_as_str() {
        for status in ShipmentStatus::all() {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
