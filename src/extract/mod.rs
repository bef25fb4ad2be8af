//! Text extraction
//!
//! Leaf stages of the pipeline: amount parsing, description cleaning and
//! direction detection. All of them share one monetary grammar.

pub mod amount;
pub mod description;
pub mod direction;

pub use amount::{extract_amount, parse_brl_amount};
pub use description::clean_description;
pub use direction::detect_direction;

use crate::rules::MarkerSet;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Optional `R$` marker, an integer part (plain digits or groups of three
    /// separated by `.`), then an optional 2-digit fraction after `,` or `.`.
    pub(crate) static ref AMOUNT_PATTERN: Regex =
        Regex::new(r"(?i)(?:r\$\s*)?(?:\d{1,3}(?:\.\d{3})+|\d+)(?:[,.]\d{2})?")
            .expect("amount pattern is valid");
}

/// Cheap pre-check for whether a message is about money at all.
pub fn is_finance_related(text: &str, markers: &MarkerSet) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    markers.finance_hints.matches(text) || AMOUNT_PATTERN.is_match(text)
}
