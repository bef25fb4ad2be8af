//! Description cleaning for the category classifier

use super::AMOUNT_PATTERN;

/// Articles, prepositions, conjunctions and filler verbs that carry no
/// category signal.
const STOP_WORDS: &[&str] = &[
    "o", "a", "os", "as", "um", "uma", "uns", "umas",
    "de", "do", "da", "dos", "das",
    "em", "no", "na", "nos", "nas",
    "com", "por", "para", "pra", "pelo", "pela",
    "e", "ou", "que", "foi",
    "gastei", "paguei", "compra", "comprei", "pagamento", "transferencia", "transferência",
    "valor", "custo", "reais", "real", "r$",
];

/// Strip amounts and stop words; lower-case; collapse whitespace.
///
/// May return an empty string when nothing meaningful is left.
pub fn clean_description(text: &str) -> String {
    let without_amounts = AMOUNT_PATTERN.replace_all(text, " ");
    let lowered = without_amounts.to_lowercase();

    lowered
        .split_whitespace()
        .filter(|token| !STOP_WORDS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}
