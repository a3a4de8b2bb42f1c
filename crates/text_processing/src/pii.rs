//! CPF handling

use once_cell::sync::Lazy;
use regex::Regex;

static CPF_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{11}$").unwrap());

/// Exactly 11 digits, no dots or dashes
pub fn is_cpf_format(text: &str) -> bool {
    CPF_PATTERN.is_match(text.trim())
}

/// Replacement shown wherever a CPF leaves the bot
pub fn mask_cpf(_cpf: &str) -> &'static str {
    "***"
}
