//! Dialogue states
//!
//! Each state is persisted as a fixed string tag in `bot_data.state`. The tags
//! are part of the backend contract and must not change.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::document::DocumentField;
use crate::error::CoreError;

/// Steps of the scripted sales dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DialogueState {
    /// Initial step for a new or reset chat
    #[default]
    LeadReceived,
    AwaitingInterest,
    AwaitingCarChoice,
    AwaitingVehicleConfirmation,
    AwaitingPaymentOption,

    // Cash purchase
    CashAskName,

    // Financing
    FinancingAskDownPayment,
    FinancingAskDownPaymentValue,
    FinancingConfirmDocuments,
    FinancingAskInstallments,
    FinancingAskName,
    FinancingAskJob,
    FinancingAskCpf,
    FinancingAskRg,
    FinancingAskIncomeProof,
    FinancingAskRgPhoto,

    // Trade-in
    TradeInAskModel,
    TradeInAskPhotos,
    TradeInConfirmMorePhotos,
    TradeInAskValue,
    TradeInEvaluateDifference,
    TradeInAskDifferencePayment,
    TradeInAskFinalName,

    Visit,
    Finalized,
    FinalizedTradeIn,
}

impl DialogueState {
    pub const ALL: [DialogueState; 26] = [
        Self::LeadReceived,
        Self::AwaitingInterest,
        Self::AwaitingCarChoice,
        Self::AwaitingVehicleConfirmation,
        Self::AwaitingPaymentOption,
        Self::CashAskName,
        Self::FinancingAskDownPayment,
        Self::FinancingAskDownPaymentValue,
        Self::FinancingConfirmDocuments,
        Self::FinancingAskInstallments,
        Self::FinancingAskName,
        Self::FinancingAskJob,
        Self::FinancingAskCpf,
        Self::FinancingAskRg,
        Self::FinancingAskIncomeProof,
        Self::FinancingAskRgPhoto,
        Self::TradeInAskModel,
        Self::TradeInAskPhotos,
        Self::TradeInConfirmMorePhotos,
        Self::TradeInAskValue,
        Self::TradeInEvaluateDifference,
        Self::TradeInAskDifferencePayment,
        Self::TradeInAskFinalName,
        Self::Visit,
        Self::Finalized,
        Self::FinalizedTradeIn,
    ];

    /// Wire tag stored in `bot_data.state`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeadReceived => "leed_recebido",
            Self::AwaitingInterest => "aguardando_interesse",
            Self::AwaitingCarChoice => "aguardando_escolha_carro",
            Self::AwaitingVehicleConfirmation => "aguardando_confirmacao_veiculo",
            Self::AwaitingPaymentOption => "aguardando_opcao_pagamento",
            Self::CashAskName => "a_vista_pede_nome",
            Self::FinancingAskDownPayment => "financiamento_pede_entrada",
            Self::FinancingAskDownPaymentValue => "financiamento_pede_valor_entrada",
            Self::FinancingConfirmDocuments => "financiamento_confirma_documentos",
            Self::FinancingAskInstallments => "financiamento_pede_parcelas",
            Self::FinancingAskName => "financiamento_pede_nome",
            Self::FinancingAskJob => "financiamento_pede_job",
            Self::FinancingAskCpf => "financiamento_pede_cpf",
            Self::FinancingAskRg => "financiamento_pede_rg",
            Self::FinancingAskIncomeProof => "financiamento_pede_comprovante_renda",
            Self::FinancingAskRgPhoto => "financiamento_pede_foto_rg",
            Self::TradeInAskModel => "troca_pede_modelo_carro",
            Self::TradeInAskPhotos => "troca_pede_fotos",
            Self::TradeInConfirmMorePhotos => "troca_pede_fotos_confirmacao",
            Self::TradeInAskValue => "troca_pede_valor",
            Self::TradeInEvaluateDifference => "troca_avalia_diferenca",
            Self::TradeInAskDifferencePayment => "troca_pede_forma_pagamento_diferenca",
            Self::TradeInAskFinalName => "troca_pede_nome_final",
            Self::Visit => "visita",
            Self::Finalized => "finalizado",
            Self::FinalizedTradeIn => "finalizado_troca",
        }
    }

    /// Human-readable name for logs
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LeadReceived => "Lead Received",
            Self::AwaitingInterest => "Awaiting Interest",
            Self::AwaitingCarChoice => "Awaiting Car Choice",
            Self::AwaitingVehicleConfirmation => "Awaiting Vehicle Confirmation",
            Self::AwaitingPaymentOption => "Awaiting Payment Option",
            Self::CashAskName => "Cash: Name",
            Self::FinancingAskDownPayment => "Financing: Down Payment",
            Self::FinancingAskDownPaymentValue => "Financing: Down Payment Value",
            Self::FinancingConfirmDocuments => "Financing: Confirm Documents",
            Self::FinancingAskInstallments => "Financing: Installments",
            Self::FinancingAskName => "Financing: Name",
            Self::FinancingAskJob => "Financing: Job",
            Self::FinancingAskCpf => "Financing: CPF",
            Self::FinancingAskRg => "Financing: RG",
            Self::FinancingAskIncomeProof => "Financing: Income Proof",
            Self::FinancingAskRgPhoto => "Financing: RG Photo",
            Self::TradeInAskModel => "Trade-in: Model",
            Self::TradeInAskPhotos => "Trade-in: Photos",
            Self::TradeInConfirmMorePhotos => "Trade-in: More Photos",
            Self::TradeInAskValue => "Trade-in: Value",
            Self::TradeInEvaluateDifference => "Trade-in: Evaluate Difference",
            Self::TradeInAskDifferencePayment => "Trade-in: Difference Payment",
            Self::TradeInAskFinalName => "Trade-in: Final Name",
            Self::Visit => "Visit",
            Self::Finalized => "Finalized",
            Self::FinalizedTradeIn => "Finalized (Trade-in)",
        }
    }

    /// Terminal states hand the lead to the sales team and reset the record
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Visit | Self::Finalized | Self::FinalizedTradeIn)
    }

    /// Document collected while in this state, if any
    pub fn document_field(&self) -> Option<DocumentField> {
        match self {
            Self::TradeInAskPhotos => Some(DocumentField::TradeInPhoto),
            Self::FinancingAskIncomeProof => Some(DocumentField::IncomeProof),
            Self::FinancingAskRgPhoto => Some(DocumentField::RgPhoto),
            _ => None,
        }
    }

    /// Parse a persisted tag, falling back to the initial step when unknown
    pub fn from_tag_lenient(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|_| {
            tracing::warn!(state = %tag, "Unknown dialogue state, falling back to leed_recebido");
            Self::LeadReceived
        })
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialogueState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|state| state.as_str() == s)
            .copied()
            .ok_or_else(|| CoreError::UnknownState(s.to_string()))
    }
}

impl Serialize for DialogueState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DialogueState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

/// Deserialize `bot_data.state`: missing, null or unknown tags map to the initial step
pub(crate) fn lenient_state<'de, D>(deserializer: D) -> Result<DialogueState, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = Option::<String>::deserialize(deserializer)?;
    Ok(match tag.as_deref() {
        None | Some("") => DialogueState::LeadReceived,
        Some(tag) => DialogueState::from_tag_lenient(tag),
    })
}

/// Deserialize `bot_data.previousState`: unknown tags are dropped
pub(crate) fn lenient_previous_state<'de, D>(
    deserializer: D,
) -> Result<Option<DialogueState>, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = Option::<String>::deserialize(deserializer)?;
    Ok(tag.and_then(|tag| match tag.parse() {
        Ok(state) => Some(state),
        Err(_) => {
            tracing::warn!(state = %tag, "Discarding unknown previousState");
            None
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for state in DialogueState::ALL {
            assert_eq!(state.as_str().parse::<DialogueState>().unwrap(), state);
        }
    }

    #[test]
    fn test_tags_are_unique() {
        let mut tags: Vec<_> = DialogueState::ALL.iter().map(|s| s.as_str()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), DialogueState::ALL.len());
    }

    #[test]
    fn test_unknown_tag_is_rejected_by_from_str() {
        assert_eq!(
            "estado_inexistente".parse::<DialogueState>(),
            Err(CoreError::UnknownState("estado_inexistente".to_string()))
        );
    }

    #[test]
    fn test_lenient_fallback() {
        assert_eq!(DialogueState::from_tag_lenient("qualquer"), DialogueState::LeadReceived);
        assert_eq!(
            DialogueState::from_tag_lenient("troca_pede_valor"),
            DialogueState::TradeInAskValue
        );
    }

    #[test]
    fn test_serde_uses_wire_tags() {
        let json = serde_json::to_string(&DialogueState::FinancingAskInstallments).unwrap();
        assert_eq!(json, "\"financiamento_pede_parcelas\"");
    }

    #[test]
    fn test_document_states() {
        assert_eq!(
            DialogueState::TradeInAskPhotos.document_field(),
            Some(DocumentField::TradeInPhoto)
        );
        assert_eq!(
            DialogueState::FinancingAskRgPhoto.document_field(),
            Some(DocumentField::RgPhoto)
        );
        assert!(DialogueState::FinancingAskCpf.document_field().is_none());
    }

    #[test]
    fn test_terminal_states() {
        assert!(DialogueState::Finalized.is_terminal());
        assert!(DialogueState::FinalizedTradeIn.is_terminal());
        assert!(DialogueState::Visit.is_terminal());
        assert!(!DialogueState::CashAskName.is_terminal());
    }
}
