//! # Document Types
//!
//! The 27 kinds of paperwork attached to a shipment, with the policy tables
//! the upload layer consults before accepting a file:
//!
//! - home phase (or any phase),
//! - the phase whose completion requires the document, if any,
//! - allowed file formats (PDF only, or PDF plus images),
//! - maximum size (10 or 20 MB),
//! - financial / proof-of-payment classification and the derived category.
//!
//! The core never touches file contents; [`DocumentType::accepts_file`]
//! evaluates a file name and size against the tables.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::WorkflowError;
use crate::phase::Phase;

/// Total number of document types.
pub const DOCUMENT_TYPE_COUNT: usize = 27;

const PDF_ONLY: &[&str] = &["pdf"];
const PDF_OR_IMAGE: &[&str] = &["pdf", "jpg", "jpeg", "png"];

/// A kind of uploadable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    // Coleta
    /// Original bill of lading.
    BlOriginal,
    FaturaLinha,
    PopColeta,
    ReciboLinha,
    CartaEndosso,
    // Legalização
    BlCarimbado,
    PackingList,
    FaturaComercial,
    // Alfândegas
    Manifesto,
    DeclaracaoAduaneira,
    AvisoAlfandegas,
    PopAlfandegas,
    AutorizacaoSaida,
    // Cornelder
    DraftCornelder,
    FaturaCornelder,
    PopCornelder,
    ReciboCornelder,
    // Taxação
    /// Single administrative document (Documento Único).
    Sad,
    TermoResponsabilidade,
    PopTaxacao,
    // Faturação
    FacturaCliente,
    ReciboCliente,
    PopCliente,
    // POD
    /// Proof of delivery.
    Pod,
    GuiaEntrega,
    // Any phase
    CertificadoOrigem,
    Outro,
}

/// Accepted upload formats. Two tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// `pdf`
    PdfOnly,
    /// `pdf`, `jpg`, `jpeg`, `png`
    PdfOrImage,
}

impl FileFormat {
    /// Lower-case extensions accepted for this tier.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::PdfOnly => PDF_ONLY,
            Self::PdfOrImage => PDF_OR_IMAGE,
        }
    }
}

/// Display category of a document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentCategory {
    Pagamento,
    Financeiro,
    Transporte,
    Legal,
    Comercial,
    Aduaneiro,
    Portuario,
    Entrega,
    Outro,
}

impl DocumentCategory {
    /// Label shown in document listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pagamento => "Pagamento",
            Self::Financeiro => "Financeiro",
            Self::Transporte => "Transporte",
            Self::Legal => "Legal",
            Self::Comercial => "Comercial",
            Self::Aduaneiro => "Aduaneiro",
            Self::Portuario => "Portuário",
            Self::Entrega => "Entrega",
            Self::Outro => "Outro",
        }
    }
}

impl std::fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A candidate upload rejected by the policy tables.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadPolicyError {
    /// The file name has no extension.
    #[error("file {file_name:?} has no extension")]
    MissingExtension {
        /// Offending file name.
        file_name: String,
    },

    /// The extension is not in the document type's allowed set.
    #[error(
        "extension {extension:?} not allowed for {document_type} (allowed: {})",
        .allowed.join(", ")
    )]
    ExtensionNotAllowed {
        /// Target document type.
        document_type: DocumentType,
        /// Extension as given, lower-cased.
        extension: String,
        /// Allowed extensions.
        allowed: &'static [&'static str],
    },

    /// The file exceeds the document type's size limit.
    #[error("{size_bytes} bytes exceeds the {max_mb} MB limit for {document_type}")]
    TooLarge {
        /// Target document type.
        document_type: DocumentType,
        /// Size of the candidate file.
        size_bytes: u64,
        /// Limit in megabytes.
        max_mb: u32,
    },
}

impl DocumentType {
    /// All document types in declaration order.
    pub fn all() -> &'static [DocumentType] {
        &[
            Self::BlOriginal,
            Self::FaturaLinha,
            Self::PopColeta,
            Self::ReciboLinha,
            Self::CartaEndosso,
            Self::BlCarimbado,
            Self::PackingList,
            Self::FaturaComercial,
            Self::Manifesto,
            Self::DeclaracaoAduaneira,
            Self::AvisoAlfandegas,
            Self::PopAlfandegas,
            Self::AutorizacaoSaida,
            Self::DraftCornelder,
            Self::FaturaCornelder,
            Self::PopCornelder,
            Self::ReciboCornelder,
            Self::Sad,
            Self::TermoResponsabilidade,
            Self::PopTaxacao,
            Self::FacturaCliente,
            Self::ReciboCliente,
            Self::PopCliente,
            Self::Pod,
            Self::GuiaEntrega,
            Self::CertificadoOrigem,
            Self::Outro,
        ]
    }

    /// The snake_case identifier persisted for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlOriginal => "bl_original",
            Self::FaturaLinha => "fatura_linha",
            Self::PopColeta => "pop_coleta",
            Self::ReciboLinha => "recibo_linha",
            Self::CartaEndosso => "carta_endosso",
            Self::BlCarimbado => "bl_carimbado",
            Self::PackingList => "packing_list",
            Self::FaturaComercial => "fatura_comercial",
            Self::Manifesto => "manifesto",
            Self::DeclaracaoAduaneira => "declaracao_aduaneira",
            Self::AvisoAlfandegas => "aviso_alfandegas",
            Self::PopAlfandegas => "pop_alfandegas",
            Self::AutorizacaoSaida => "autorizacao_saida",
            Self::DraftCornelder => "draft_cornelder",
            Self::FaturaCornelder => "fatura_cornelder",
            Self::PopCornelder => "pop_cornelder",
            Self::ReciboCornelder => "recibo_cornelder",
            Self::Sad => "sad",
            Self::TermoResponsabilidade => "termo_responsabilidade",
            Self::PopTaxacao => "pop_taxacao",
            Self::FacturaCliente => "factura_cliente",
            Self::ReciboCliente => "recibo_cliente",
            Self::PopCliente => "pop_cliente",
            Self::Pod => "pod",
            Self::GuiaEntrega => "guia_entrega",
            Self::CertificadoOrigem => "certificado_origem",
            Self::Outro => "outro",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BlOriginal => "BL Original",
            Self::FaturaLinha => "Fatura da Linha",
            Self::PopColeta => "Comprovativo de Pagamento (Coleta)",
            Self::ReciboLinha => "Recibo da Linha",
            Self::CartaEndosso => "Carta de Endosso",
            Self::BlCarimbado => "BL Carimbado",
            Self::PackingList => "Packing List",
            Self::FaturaComercial => "Fatura Comercial",
            Self::Manifesto => "Manifesto de Carga",
            Self::DeclaracaoAduaneira => "Declaração Aduaneira",
            Self::AvisoAlfandegas => "Aviso de Pagamento das Alfândegas",
            Self::PopAlfandegas => "Comprovativo de Pagamento (Alfândegas)",
            Self::AutorizacaoSaida => "Autorização de Saída",
            Self::DraftCornelder => "Draft Cornelder",
            Self::FaturaCornelder => "Fatura Cornelder",
            Self::PopCornelder => "Comprovativo de Pagamento (Cornelder)",
            Self::ReciboCornelder => "Recibo Cornelder",
            Self::Sad => "SAD",
            Self::TermoResponsabilidade => "Termo de Responsabilidade",
            Self::PopTaxacao => "Comprovativo de Pagamento (Taxação)",
            Self::FacturaCliente => "Factura ao Cliente",
            Self::ReciboCliente => "Recibo do Cliente",
            Self::PopCliente => "Comprovativo de Pagamento do Cliente",
            Self::Pod => "POD - Prova de Entrega",
            Self::GuiaEntrega => "Guia de Entrega",
            Self::CertificadoOrigem => "Certificado de Origem",
            Self::Outro => "Outro Documento",
        }
    }

    /// Free-text description shown next to the upload field.
    pub fn description(&self) -> &'static str {
        match self {
            Self::BlOriginal => "Bill of Lading original emitido pela linha de navegação",
            Self::FaturaLinha => "Fatura emitida pela linha de navegação",
            Self::PopColeta => "Comprovativo do pagamento efetuado à linha",
            Self::ReciboLinha => "Recibo emitido pela linha após o pagamento",
            Self::CartaEndosso => "Carta de endosso do BL a favor do despachante",
            Self::BlCarimbado => "BL carimbado após legalização",
            Self::PackingList => "Lista de volumes e conteúdo da carga",
            Self::FaturaComercial => "Fatura comercial do fornecedor",
            Self::Manifesto => "Manifesto de carga do navio",
            Self::DeclaracaoAduaneira => "Declaração submetida às Alfândegas",
            Self::AvisoAlfandegas => "Aviso de pagamento de direitos aduaneiros",
            Self::PopAlfandegas => "Comprovativo do pagamento às Alfândegas",
            Self::AutorizacaoSaida => "Autorização de saída da carga emitida pelas Alfândegas",
            Self::DraftCornelder => "Draft de cobrança do terminal Cornelder",
            Self::FaturaCornelder => "Fatura do terminal Cornelder",
            Self::PopCornelder => "Comprovativo do pagamento ao terminal Cornelder",
            Self::ReciboCornelder => "Recibo emitido pelo terminal Cornelder",
            Self::Sad => "Documento Único Administrativo",
            Self::TermoResponsabilidade => "Termo de responsabilidade assinado pelo cliente",
            Self::PopTaxacao => "Comprovativo do pagamento da taxação",
            Self::FacturaCliente => "Factura emitida ao cliente",
            Self::ReciboCliente => "Recibo emitido ao cliente",
            Self::PopCliente => "Comprovativo de pagamento enviado pelo cliente",
            Self::Pod => "Prova de entrega assinada pelo destinatário",
            Self::GuiaEntrega => "Guia de entrega da carga",
            Self::CertificadoOrigem => "Certificado de origem da mercadoria",
            Self::Outro => "Documento sem classificação específica",
        }
    }

    /// The phase this document belongs to. `None` means any phase.
    pub fn home_phase(&self) -> Option<Phase> {
        match self {
            Self::BlOriginal
            | Self::FaturaLinha
            | Self::PopColeta
            | Self::ReciboLinha
            | Self::CartaEndosso => Some(Phase::Coleta),
            Self::BlCarimbado | Self::PackingList | Self::FaturaComercial => {
                Some(Phase::Legalizacao)
            }
            Self::Manifesto
            | Self::DeclaracaoAduaneira
            | Self::AvisoAlfandegas
            | Self::PopAlfandegas
            | Self::AutorizacaoSaida => Some(Phase::Alfandegas),
            Self::DraftCornelder
            | Self::FaturaCornelder
            | Self::PopCornelder
            | Self::ReciboCornelder => Some(Phase::Cornelder),
            Self::Sad | Self::TermoResponsabilidade | Self::PopTaxacao => Some(Phase::Taxacao),
            Self::FacturaCliente | Self::ReciboCliente | Self::PopCliente => {
                Some(Phase::Faturacao)
            }
            Self::Pod | Self::GuiaEntrega => Some(Phase::Pod),
            Self::CertificadoOrigem | Self::Outro => None,
        }
    }

    /// Home phase as persisted: 0 for "any phase", else 1..=7.
    pub fn phase_number(&self) -> u8 {
        self.home_phase().map_or(0, |p| p.number())
    }

    /// The phase whose completion requires this document, if any.
    pub fn required_in(&self) -> Option<Phase> {
        Phase::all()
            .iter()
            .find(|p| p.required_document_list().contains(self))
            .copied()
    }

    /// Whether the document must be present before `phase` is completed.
    pub fn is_required_for(&self, phase: Phase) -> bool {
        self.required_in() == Some(phase)
    }

    /// Upload format tier.
    pub fn file_format(&self) -> FileFormat {
        match self {
            Self::PopColeta
            | Self::ReciboLinha
            | Self::PopAlfandegas
            | Self::PopCornelder
            | Self::ReciboCornelder
            | Self::PopTaxacao
            | Self::ReciboCliente
            | Self::PopCliente
            | Self::Pod
            | Self::GuiaEntrega
            | Self::Outro => FileFormat::PdfOrImage,
            _ => FileFormat::PdfOnly,
        }
    }

    /// Lower-case file extensions accepted for upload.
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        self.file_format().extensions()
    }

    /// Maximum upload size in megabytes.
    pub fn max_file_size_mb(&self) -> u32 {
        match self {
            Self::BlOriginal
            | Self::BlCarimbado
            | Self::Manifesto
            | Self::DeclaracaoAduaneira
            | Self::Sad
            | Self::Pod => 20,
            _ => 10,
        }
    }

    /// Maximum upload size in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        u64::from(self.max_file_size_mb()) * 1024 * 1024
    }

    /// Invoices, receipts and payment notices.
    pub fn is_financial(&self) -> bool {
        matches!(
            self,
            Self::FaturaLinha
                | Self::PopColeta
                | Self::ReciboLinha
                | Self::FaturaComercial
                | Self::AvisoAlfandegas
                | Self::PopAlfandegas
                | Self::FaturaCornelder
                | Self::PopCornelder
                | Self::ReciboCornelder
                | Self::PopTaxacao
                | Self::FacturaCliente
                | Self::ReciboCliente
                | Self::PopCliente
        )
    }

    /// Proof-of-payment documents.
    pub fn is_proof_of_payment(&self) -> bool {
        matches!(
            self,
            Self::PopColeta
                | Self::PopAlfandegas
                | Self::PopCornelder
                | Self::PopTaxacao
                | Self::PopCliente
        )
    }

    /// Category assigned per type, consulted after the payment/financial checks.
    pub fn explicit_category(&self) -> Option<DocumentCategory> {
        match self {
            Self::BlOriginal | Self::BlCarimbado | Self::PopColeta => {
                Some(DocumentCategory::Transporte)
            }
            Self::CartaEndosso | Self::TermoResponsabilidade => Some(DocumentCategory::Legal),
            Self::PackingList | Self::CertificadoOrigem => Some(DocumentCategory::Comercial),
            Self::Manifesto
            | Self::DeclaracaoAduaneira
            | Self::PopAlfandegas
            | Self::AutorizacaoSaida
            | Self::Sad => Some(DocumentCategory::Aduaneiro),
            Self::DraftCornelder => Some(DocumentCategory::Portuario),
            Self::Pod | Self::GuiaEntrega => Some(DocumentCategory::Entrega),
            _ => None,
        }
    }

    /// Derived category: Pagamento > Financeiro > explicit > Outro.
    pub fn category(&self) -> DocumentCategory {
        if self.is_proof_of_payment() {
            DocumentCategory::Pagamento
        } else if self.is_financial() {
            DocumentCategory::Financeiro
        } else {
            self.explicit_category().unwrap_or(DocumentCategory::Outro)
        }
    }

    /// Check a candidate upload against the format and size tables.
    ///
    /// The extension comparison is case-insensitive.
    pub fn accepts_file(&self, file_name: &str, size_bytes: u64) -> Result<(), UploadPolicyError> {
        let extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| UploadPolicyError::MissingExtension {
                file_name: file_name.to_string(),
            })?;

        let allowed = self.allowed_extensions();
        if !allowed.contains(&extension.as_str()) {
            return Err(UploadPolicyError::ExtensionNotAllowed {
                document_type: *self,
                extension,
                allowed,
            });
        }

        if size_bytes > self.max_file_size_bytes() {
            return Err(UploadPolicyError::TooLarge {
                document_type: *self,
                size_bytes,
                max_mb: self.max_file_size_mb(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|doc| doc.as_str() == s)
            .copied()
            .ok_or_else(|| WorkflowError::UnknownIdentifier {
                kind: "document type",
                value: s.to_string(),
            })
    }
}
