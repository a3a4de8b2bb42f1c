//! Keyword intent detection
//!
//! Every classifier normalizes the input first and then tests it against a
//! fixed keyword list. Greetings need an exact match; the other classifiers
//! use substring containment, so a keyword anywhere in a longer message
//! counts (e.g. "1" inside "1 real" selects the first payment option).
//!
//! # Example
//!
//! ```
//! use zailo_bot_text_processing::intent::{detect_payment, PaymentChoice};
//!
//! assert_eq!(detect_payment("quero financiar"), Some(PaymentChoice::Financing));
//! assert_eq!(detect_payment("hmm"), None);
//! ```

use serde::{Deserialize, Serialize};

use crate::normalize::{contains_any, normalize_text};

pub const GREETING_KEYWORDS: &[&str] = &[
    "oi", "ola", "opa", "bom dia", "boa tarde", "boa noite", "e ai", "tudo bem", "tudo bom",
];

pub const VIEW_LIST_KEYWORDS: &[&str] = &[
    "lista",
    "estoque",
    "todos",
    "quais carros",
    "ver todos",
    "modelos",
    "opcoes",
    "sim",
    "pode mandar",
    "manda",
    "manda ai",
    "pode ser",
    "claro",
    "quero ver",
    "mostra",
    "quais sao",
    "pode enviar",
    "envia",
    "aceito",
];

pub const DENY_KEYWORDS: &[&str] = &[
    "nao",
    "negativo",
    "outro",
    "ver outro",
    "lista",
    "diferente",
    "nao gostei",
    "nao quero",
    "novo valor",
];

pub const CONFIRM_KEYWORDS: &[&str] = &[
    "sim",
    "quero",
    "prosseguir",
    "esse",
    "confirmar",
    "manda",
    "bora",
    "pode ser",
    "gostei",
    "afirmativo",
    "isso",
    "segue o baile",
    "continuar",
    "pode continuar",
    "blz",
    "beleza",
    "ok",
    "certo",
    "exato",
];

pub const CASH_KEYWORDS: &[&str] = &["1", "vista", "a vista", "dinheiro"];
pub const FINANCING_KEYWORDS: &[&str] =
    &["2", "financiar", "financiamento", "parcelado", "parcelar", "financia"];
pub const TRADE_IN_KEYWORDS: &[&str] = &["3", "troca", "trocar", "brique", "meu carro", "negocio"];
pub const VISIT_KEYWORDS: &[&str] = &["4", "visita", "visitar", "ver o carro", "ir na loja", "agendar"];

/// What the customer wants after the greeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interest {
    /// Send the whole stock list
    #[serde(rename = "ver_lista")]
    ViewList,
    /// Treat the text as a vehicle name
    #[serde(rename = "nome_especifico")]
    SpecificModel,
}

/// Yes/no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confirmation {
    #[serde(rename = "negar")]
    Deny,
    #[serde(rename = "confirmar")]
    Confirm,
}

/// Entry of the four-way payment menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentChoice {
    #[serde(rename = "a_vista")]
    Cash,
    #[serde(rename = "financiamento")]
    Financing,
    #[serde(rename = "troca")]
    TradeIn,
    #[serde(rename = "visita")]
    Visit,
}

impl PaymentChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "a_vista",
            Self::Financing => "financiamento",
            Self::TradeIn => "troca",
            Self::Visit => "visita",
        }
    }
}

/// Exact greeting phrase after normalization
pub fn detect_greeting(text: &str) -> bool {
    let normalized = normalize_text(text);
    GREETING_KEYWORDS.contains(&normalized.as_str())
}

/// List request vs. vehicle name
pub fn detect_interest(text: &str) -> Interest {
    if contains_any(&normalize_text(text), VIEW_LIST_KEYWORDS) {
        Interest::ViewList
    } else {
        Interest::SpecificModel
    }
}

/// Yes/no; negation keywords take precedence over affirmative ones
pub fn detect_confirmation(text: &str) -> Option<Confirmation> {
    let normalized = normalize_text(text);
    if contains_any(&normalized, DENY_KEYWORDS) {
        Some(Confirmation::Deny)
    } else if contains_any(&normalized, CONFIRM_KEYWORDS) {
        Some(Confirmation::Confirm)
    } else {
        None
    }
}

/// Payment menu choice; lists are checked in menu order and the first hit wins
pub fn detect_payment(text: &str) -> Option<PaymentChoice> {
    let normalized = normalize_text(text);
    [
        (CASH_KEYWORDS, PaymentChoice::Cash),
        (FINANCING_KEYWORDS, PaymentChoice::Financing),
        (TRADE_IN_KEYWORDS, PaymentChoice::TradeIn),
        (VISIT_KEYWORDS, PaymentChoice::Visit),
    ]
    .into_iter()
    .find(|(keywords, _)| contains_any(&normalized, keywords))
    .map(|(_, choice)| choice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_is_exact() {
        assert!(detect_greeting("Oi"));
        assert!(detect_greeting("Olá!"));
        assert!(detect_greeting("Bom dia"));
        assert!(detect_greeting("E aí"));
        assert!(!detect_greeting("oi, quero ver o onix"));
        assert!(!detect_greeting("boa"));
    }

    #[test]
    fn test_interest() {
        assert_eq!(detect_interest("Pode mandar a lista"), Interest::ViewList);
        assert_eq!(detect_interest("quais são as opções?"), Interest::ViewList);
        assert_eq!(detect_interest("Onix"), Interest::SpecificModel);
        assert_eq!(detect_interest(""), Interest::SpecificModel);
    }

    #[test]
    fn test_confirmation_negation_precedence() {
        assert_eq!(detect_confirmation("não, mas confirmo"), Some(Confirmation::Deny));
        assert_eq!(detect_confirmation("sim, mas quero ver outro"), Some(Confirmation::Deny));
        assert_eq!(detect_confirmation("manda a lista"), Some(Confirmation::Deny));
    }

    #[test]
    fn test_confirmation_affirmative() {
        assert_eq!(detect_confirmation("Sim!"), Some(Confirmation::Confirm));
        assert_eq!(detect_confirmation("beleza"), Some(Confirmation::Confirm));
        assert_eq!(detect_confirmation("ok"), Some(Confirmation::Confirm));
    }

    #[test]
    fn test_confirmation_unknown() {
        assert_eq!(detect_confirmation("talvez amanhã"), None);
        assert_eq!(detect_confirmation(""), None);
    }

    #[test]
    fn test_payment_digits() {
        assert_eq!(detect_payment("1"), Some(PaymentChoice::Cash));
        assert_eq!(detect_payment("2"), Some(PaymentChoice::Financing));
        assert_eq!(detect_payment("3"), Some(PaymentChoice::TradeIn));
        assert_eq!(detect_payment("4"), Some(PaymentChoice::Visit));
    }

    #[test]
    fn test_payment_words() {
        assert_eq!(detect_payment("À vista"), Some(PaymentChoice::Cash));
        assert_eq!(detect_payment("parcelado"), Some(PaymentChoice::Financing));
        assert_eq!(detect_payment("tenho um brique"), Some(PaymentChoice::TradeIn));
        assert_eq!(detect_payment("quero agendar"), Some(PaymentChoice::Visit));
        assert_eq!(detect_payment("não sei"), None);
    }

    #[test]
    fn test_payment_substring_false_positive_is_kept() {
        // "1" inside a longer reply still selects the first option
        assert_eq!(detect_payment("quero financiar 1 real"), Some(PaymentChoice::Cash));
        // Menu order decides ties
        assert_eq!(detect_payment("trocar ou financiar"), Some(PaymentChoice::Financing));
    }
}
