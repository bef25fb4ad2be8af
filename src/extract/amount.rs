//! Brazilian Real amount extraction
//!
//! Separator policy (pt-BR):
//! - both `,` and `.` present: `.` groups thousands, `,` is the decimal mark
//! - only `,`: decimal mark
//! - only `.`: already canonical
//!
//! "1.234" is therefore read as 1.23 after rounding. That is the policy for
//! this locale, not an accident.

use super::AMOUNT_PATTERN;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use tracing::debug;

/// Normalize one candidate substring into a decimal amount.
///
/// Returns `None` when the candidate does not parse after normalization.
pub fn parse_brl_amount(candidate: &str) -> Option<Decimal> {
    let lowered = candidate.trim().to_lowercase();
    let stripped: String = lowered
        .replace("r$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let normalized = if stripped.contains(',') && stripped.contains('.') {
        stripped.replace('.', "").replace(',', ".")
    } else if stripped.contains(',') {
        stripped.replace(',', ".")
    } else {
        stripped
    };

    Decimal::from_str(&normalized)
        .ok()
        .map(|value| value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Find the amount in free text, preferring the last candidate that parses.
///
/// Absence of an amount is an expected outcome, so this returns `None`
/// instead of an error.
pub fn extract_amount(text: &str) -> Option<Decimal> {
    let candidates: Vec<&str> = AMOUNT_PATTERN
        .find_iter(text)
        .map(|m| m.as_str())
        .collect();

    for candidate in candidates.iter().rev() {
        match parse_brl_amount(candidate) {
            Some(value) => return Some(value),
            None => debug!(candidate = %candidate, "Skipping malformed amount candidate"),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_invariance() {
        for text in [
            "Paguei aluguel do apê R$ 1.450,00",
            "aluguel 1450,00",
            "aluguel 1450.00",
            "aluguel r$1450",
        ] {
            assert_eq!(extract_amount(text), Some(dec("1450.00")), "{}", text);
        }
    }

    #[test]
    fn test_plain_and_comma_amounts() {
        assert_eq!(extract_amount("gastei 35,90 no Uber"), Some(dec("35.90")));
        assert_eq!(extract_amount("fui na cafeteria 50"), Some(dec("50")));
        assert_eq!(extract_amount("Fui de Uber para o trabalho R$ 32,90"), Some(dec("32.90")));
    }

    #[test]
    fn test_grouping_without_fraction() {
        assert_eq!(extract_amount("carro 12.500,00"), Some(dec("12500")));
        // only a period present: canonical decimal form
        assert_eq!(extract_amount("custou 1.234"), Some(dec("1.23")));
    }

    #[test]
    fn test_last_candidate_wins() {
        assert_eq!(extract_amount("dividi 3 pizzas, total 120,00"), Some(dec("120.00")));
        assert_eq!(extract_amount("de 10 para 25"), Some(dec("25")));
    }

    #[test]
    fn test_malformed_last_candidate_is_skipped() {
        // "1.450.000" has only periods and does not parse as a decimal
        assert_eq!(extract_amount("paguei 20 e depois 1.450.000"), Some(dec("20")));
    }

    #[test]
    fn test_no_amount() {
        assert_eq!(extract_amount("almoço com a equipe"), None);
        assert_eq!(extract_amount(""), None);
    }

    #[test]
    fn test_parse_candidate_directly() {
        assert_eq!(parse_brl_amount("R$ 1.450,00"), Some(dec("1450.00")));
        assert_eq!(parse_brl_amount("r$ 9,99"), Some(dec("9.99")));
        assert_eq!(parse_brl_amount("1.450.000"), None);
    }
}
