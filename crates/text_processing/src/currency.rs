//! Brazilian real parsing and formatting

use once_cell::sync::Lazy;
use regex::Regex;

static CURRENCY_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"R\$\s?").unwrap());

/// Leading decimal literal, the way a lenient float parser reads it
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+))").unwrap());

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Parse a typed amount such as `"R$ 50.000,00"` or `"40000"`.
///
/// `.` is a thousands separator and `,` the decimal mark. Trailing words are
/// ignored (`"35000 reais"` is 35000). Anything without a leading number is 0.
pub fn parse_currency(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let cleaned = CURRENCY_SYMBOL.replace(text, "");
    let cleaned = cleaned.replace('.', "").replacen(',', ".", 1);

    LEADING_NUMBER
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Format as `R$ 10.000,00`; `None` renders as `N/A`
pub fn format_currency(value: Option<f64>) -> String {
    let Some(value) = value else {
        return "N/A".to_string();
    };

    let fixed = format!("{:.2}", value.abs());
    let (integer, decimals) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("R$ {}{},{}", sign, grouped, decimals)
}

/// First run of digits in the text
pub fn extract_number(text: &str) -> Option<u64> {
    DIGIT_RUN
        .find(text)
        .and_then(|m| m.as_str().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("R$ 50.000,00"), 50000.0);
        assert_eq!(parse_currency("R$50.000,50"), 50000.5);
        assert_eq!(parse_currency("40000"), 40000.0);
        assert_eq!(parse_currency("35000 reais"), 35000.0);
        assert_eq!(parse_currency("  1.500"), 1500.0);
    }

    #[test]
    fn test_parse_currency_non_numeric() {
        assert_eq!(parse_currency(""), 0.0);
        assert_eq!(parse_currency("sem valor"), 0.0);
        assert_eq!(parse_currency("R$"), 0.0);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Some(10000.0)), "R$ 10.000,00");
        assert_eq!(format_currency(Some(0.0)), "R$ 0,00");
        assert_eq!(format_currency(Some(999.999)), "R$ 1.000,00");
        assert_eq!(format_currency(Some(1234567.8)), "R$ 1.234.567,80");
        assert_eq!(format_currency(Some(-2500.0)), "R$ -2.500,00");
        assert_eq!(format_currency(None), "N/A");
    }

    #[test]
    fn test_currency_round_trip() {
        for value in [0.0, 0.5, 12.34, 999.99, 10000.0, 47350.1, 1234567.89] {
            let parsed = parse_currency(&format_currency(Some(value)));
            assert!(
                (parsed - value).abs() < 0.005,
                "round trip of {} gave {}",
                value,
                parsed
            );
        }
    }

    #[test]
    fn test_extract_number() {
        assert_eq!(extract_number("quero em 24 vezes"), Some(24));
        assert_eq!(extract_number("60x"), Some(60));
        assert_eq!(extract_number("12 ou 24"), Some(12));
        assert_eq!(extract_number("nenhum"), None);
    }
}
