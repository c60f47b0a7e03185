//! # Workflow Engine
//!
//! Lookups over phase numbers and persisted identifier strings.
//!
//! The typed API lives on [`ShipmentStatus`], [`Phase`] and [`DocumentType`].
//! This module serves callers that hold raw values read from storage: a
//! phase as an integer, a status or document type as a string.
//!
//! ## Unknown identifiers
//!
//! A [`WorkflowEngine`] built with [`FallbackPolicy::Strict`] rejects every
//! unknown string with [`WorkflowError::UnknownIdentifier`].
//! [`FallbackPolicy::Legacy`] keeps one compatibility default: `phase_of`
//! on an unknown status answers phase 1 and logs a warning. Every other
//! lookup stays strict under both policies.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::document::{DocumentCategory, DocumentType};
use crate::error::WorkflowError;
use crate::phase::Phase;
use crate::status::ShipmentStatus;

/// Statuses of phase `n` in traversal order; empty outside 1..=7.
pub fn statuses_in_phase(n: u8) -> &'static [ShipmentStatus] {
    Phase::from_number(n)
        .map(|p| p.statuses())
        .unwrap_or(&[])
}

/// Required document types for phase `n`; empty outside 1..=7.
pub fn required_documents(n: u8) -> BTreeSet<DocumentType> {
    Phase::from_number(n)
        .map(|p| p.required_documents())
        .unwrap_or_default()
}

/// Required documents of phase `n` absent from `present`, in table order.
pub fn missing_documents(n: u8, present: &BTreeSet<DocumentType>) -> Vec<DocumentType> {
    Phase::from_number(n)
        .map(|p| p.required_document_list())
        .unwrap_or(&[])
        .iter()
        .filter(|doc| !present.contains(*doc))
        .copied()
        .collect()
}

/// Whether `present` covers every required document of phase `n`.
pub fn is_document_set_complete(n: u8, present: &BTreeSet<DocumentType>) -> bool {
    missing_documents(n, present).is_empty()
}

/// How a [`WorkflowEngine`] treats an unknown status in `phase_of`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Reject with [`WorkflowError::UnknownIdentifier`].
    #[default]
    Strict,
    /// Answer phase 1 and log a warning.
    Legacy,
}

/// String-level workflow lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowEngine {
    policy: FallbackPolicy,
}

impl WorkflowEngine {
    /// Engine with the given fallback policy.
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    /// Engine that rejects every unknown identifier.
    pub fn strict() -> Self {
        Self::new(FallbackPolicy::Strict)
    }

    /// Engine that answers phase 1 for unknown statuses in `phase_of`.
    pub fn legacy() -> Self {
        Self::new(FallbackPolicy::Legacy)
    }

    /// The configured fallback policy.
    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Parse a persisted status.
    pub fn status(&self, status: &str) -> Result<ShipmentStatus, WorkflowError> {
        status.parse()
    }

    /// Parse a persisted document type.
    pub fn document_type(&self, document_type: &str) -> Result<DocumentType, WorkflowError> {
        document_type.parse()
    }

    /// Phase of a persisted status.
    pub fn phase_of(&self, status: &str) -> Result<Phase, WorkflowError> {
        match (status.parse::<ShipmentStatus>(), self.policy) {
            (Ok(s), _) => Ok(s.phase()),
            (Err(_), FallbackPolicy::Legacy) => {
                tracing::warn!(
                    status,
                    "unknown shipment status; defaulting to phase 1 (legacy fallback)"
                );
                Ok(Phase::Coleta)
            }
            (Err(e), FallbackPolicy::Strict) => Err(e),
        }
    }

    /// Statuses of phase `n`; empty outside 1..=7.
    pub fn statuses_in_phase(&self, n: u8) -> &'static [ShipmentStatus] {
        statuses_in_phase(n)
    }

    /// Successor of a persisted status.
    ///
    /// `Ok(None)` means the status is terminal; an unknown status is an error.
    pub fn next_status(&self, current: &str) -> Result<Option<ShipmentStatus>, WorkflowError> {
        Ok(self.status(current)?.next())
    }

    /// Whether `to` is the single legal successor of `from`.
    pub fn can_transition(&self, from: &str, to: &str) -> Result<bool, WorkflowError> {
        let from = self.status(from)?;
        let to = self.status(to)?;
        Ok(from.can_transition_to(to))
    }

    /// Check a transition, turning `false` into [`WorkflowError::IllegalTransition`].
    pub fn require_transition(
        &self,
        from: &str,
        to: &str,
    ) -> Result<ShipmentStatus, WorkflowError> {
        let from = self.status(from)?;
        let to = self.status(to)?;
        if from.is_fully_completed() {
            return Err(WorkflowError::Terminal { status: from });
        }
        if !from.can_transition_to(to) {
            return Err(WorkflowError::IllegalTransition { from, to });
        }
        Ok(to)
    }

    /// Label of a persisted status.
    pub fn status_label(&self, status: &str) -> Result<&'static str, WorkflowError> {
        Ok(self.status(status)?.label())
    }

    /// Label of a persisted document type.
    pub fn document_label(&self, document_type: &str) -> Result<&'static str, WorkflowError> {
        Ok(self.document_type(document_type)?.label())
    }

    /// Whether a persisted status is a phase-completed marker.
    pub fn is_phase_completed(&self, status: &str) -> Result<bool, WorkflowError> {
        Ok(self.status(status)?.is_phase_completed())
    }

    /// Whether a persisted status is the terminal status.
    pub fn is_fully_completed(&self, status: &str) -> Result<bool, WorkflowError> {
        Ok(self.status(status)?.is_fully_completed())
    }

    /// Required documents of phase `n`; empty outside 1..=7.
    pub fn required_documents(&self, n: u8) -> BTreeSet<DocumentType> {
        required_documents(n)
    }

    /// Whether the persisted document types cover phase `n`'s requirements.
    ///
    /// Fails on the first unknown document type.
    pub fn is_document_set_complete<'a, I>(&self, n: u8, present: I) -> Result<bool, WorkflowError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present = present
            .into_iter()
            .map(|d| self.document_type(d))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(is_document_set_complete(n, &present))
    }

    /// Allowed upload extensions of a persisted document type.
    pub fn allowed_extensions(
        &self,
        document_type: &str,
    ) -> Result<&'static [&'static str], WorkflowError> {
        Ok(self.document_type(document_type)?.allowed_extensions())
    }

    /// Upload size limit of a persisted document type, in MB.
    pub fn max_file_size_mb(&self, document_type: &str) -> Result<u32, WorkflowError> {
        Ok(self.document_type(document_type)?.max_file_size_mb())
    }

    /// Category of a persisted document type.
    pub fn category(&self, document_type: &str) -> Result<DocumentCategory, WorkflowError> {
        Ok(self.document_type(document_type)?.category())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coleta_set() -> BTreeSet<DocumentType> {
        required_documents(1)
    }

    #[test]
    fn test_statuses_in_phase_out_of_range() {
        assert!(statuses_in_phase(0).is_empty());
        assert!(statuses_in_phase(8).is_empty());
        assert_eq!(statuses_in_phase(7).len(), 2);
    }

    #[test]
    fn test_required_documents_phase_one() {
        let expected: BTreeSet<_> = [
            DocumentType::BlOriginal,
            DocumentType::FaturaLinha,
            DocumentType::PopColeta,
            DocumentType::ReciboLinha,
            DocumentType::CartaEndosso,
        ]
        .into_iter()
        .collect();
        assert_eq!(coleta_set(), expected);
    }

    #[test]
    fn test_required_documents_empty_phases() {
        assert!(required_documents(6).is_empty());
        assert!(required_documents(0).is_empty());
        assert!(required_documents(42).is_empty());
    }

    #[test]
    fn test_document_set_complete_and_each_removal() {
        let full = coleta_set();
        assert!(is_document_set_complete(1, &full));
        for doc in &full {
            let mut partial = full.clone();
            partial.remove(doc);
            assert!(!is_document_set_complete(1, &partial), "complete without {doc}");
            assert_eq!(missing_documents(1, &partial), vec![*doc]);
        }
    }

    #[test]
    fn test_superset_is_complete() {
        let mut docs = coleta_set();
        docs.insert(DocumentType::Outro);
        docs.insert(DocumentType::Pod);
        assert!(is_document_set_complete(1, &docs));
    }

    #[test]
    fn test_empty_requirement_is_trivially_complete() {
        assert!(is_document_set_complete(6, &BTreeSet::new()));
    }

    #[test]
    fn test_strict_phase_of_rejects_unknown() {
        let engine = WorkflowEngine::strict();
        assert_eq!(engine.phase_of("taxacao_sad_emitido").unwrap(), Phase::Taxacao);
        assert!(matches!(
            engine.phase_of("em_transito"),
            Err(WorkflowError::UnknownIdentifier { kind: "status", .. })
        ));
    }

    #[test]
    fn test_legacy_phase_of_defaults_to_phase_one() {
        let engine = WorkflowEngine::legacy();
        assert_eq!(engine.phase_of("em_transito").unwrap(), Phase::Coleta);
        assert_eq!(engine.phase_of("pod_aguardando_entrega").unwrap(), Phase::Pod);
    }

    /// Log sink shared between a test and its scoped subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
            let writer = self.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || writer.clone())
                .with_ansi(false)
                .with_max_level(tracing::Level::WARN)
                .finish();
            tracing::subscriber::with_default(subscriber, f)
        }

        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_legacy_fallback_logs_warning() {
        let logs = CapturedLogs::default();
        let phase = logs.capture(|| WorkflowEngine::legacy().phase_of("em_transito").unwrap());
        assert_eq!(phase, Phase::Coleta);

        let output = logs.contents();
        assert!(output.contains("WARN"), "no warning emitted: {output:?}");
        assert!(output.contains("legacy fallback"));
        assert!(output.contains("em_transito"));
    }

    #[test]
    fn test_known_status_and_strict_miss_log_nothing() {
        let logs = CapturedLogs::default();
        logs.capture(|| {
            assert_eq!(
                WorkflowEngine::legacy().phase_of("taxacao_concluida").unwrap(),
                Phase::Taxacao
            );
            assert!(WorkflowEngine::strict().phase_of("em_transito").is_err());
        });
        assert!(logs.contents().is_empty());
    }

    #[test]
    fn test_legacy_is_strict_elsewhere() {
        let engine = WorkflowEngine::legacy();
        assert!(engine.next_status("em_transito").is_err());
        assert!(engine.status_label("em_transito").is_err());
    }

    #[test]
    fn test_next_status_distinguishes_terminal_from_unknown() {
        let engine = WorkflowEngine::strict();
        assert_eq!(engine.next_status("processo_concluido").unwrap(), None);
        assert_eq!(
            engine.next_status("faturacao_paga").unwrap(),
            Some(ShipmentStatus::PodAguardandoEntrega)
        );
        assert!(engine.next_status("concluido").is_err());
    }

    #[test]
    fn test_can_transition() {
        let engine = WorkflowEngine::strict();
        assert!(engine
            .can_transition("coleta_concluida", "legalizacao_pendente")
            .unwrap());
        assert!(!engine
            .can_transition("coleta_concluida", "alfandegas_concluida")
            .unwrap());
        assert!(engine.can_transition("coleta_concluida", "nope").is_err());
    }

    #[test]
    fn test_require_transition() {
        let engine = WorkflowEngine::strict();
        assert_eq!(
            engine
                .require_transition("taxacao_concluida", "faturacao_emitida")
                .unwrap(),
            ShipmentStatus::FaturacaoEmitida
        );
        assert!(matches!(
            engine.require_transition("faturacao_emitida", "taxacao_concluida"),
            Err(WorkflowError::IllegalTransition { .. })
        ));
        assert!(matches!(
            engine.require_transition("processo_concluido", "coleta_cotacao_solicitada"),
            Err(WorkflowError::Terminal { .. })
        ));
    }

    #[test]
    fn test_string_document_set_complete() {
        let engine = WorkflowEngine::strict();
        let present = [
            "bl_original",
            "fatura_linha",
            "pop_coleta",
            "recibo_linha",
            "carta_endosso",
        ];
        assert!(engine.is_document_set_complete(1, present).unwrap());
        assert!(!engine.is_document_set_complete(1, present[..4].iter().copied()).unwrap());
        assert!(engine.is_document_set_complete(1, ["bl_original", "xx"]).is_err());
    }

    #[test]
    fn test_policy_lookups() {
        let engine = WorkflowEngine::strict();
        assert_eq!(engine.allowed_extensions("factura_cliente").unwrap(), &["pdf"]);
        assert_eq!(
            engine.allowed_extensions("pod").unwrap(),
            &["pdf", "jpg", "jpeg", "png"]
        );
        assert_eq!(engine.max_file_size_mb("bl_original").unwrap(), 20);
        assert_eq!(engine.max_file_size_mb("packing_list").unwrap(), 10);
        assert_eq!(engine.category("pop_coleta").unwrap(), DocumentCategory::Pagamento);
        assert_eq!(engine.document_label("sad").unwrap(), "SAD");
    }

    #[test]
    fn test_default_policy_is_strict() {
        assert_eq!(WorkflowEngine::default().policy(), FallbackPolicy::Strict);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A subset of the required documents is complete only when it is the whole set.
        #[test]
        fn subset_complete_iff_full(phase in 1u8..=7, mask in any::<u8>()) {
            let required: Vec<DocumentType> = required_documents(phase).into_iter().collect();
            let present: BTreeSet<DocumentType> = required
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, d)| *d)
                .collect();
            prop_assert_eq!(
                is_document_set_complete(phase, &present),
                present.len() == required.len()
            );
        }
    }
}
