//! Keyword rule tables
//!
//! Ordered `(pattern, outcome)` lists evaluated by case-insensitive
//! containment. The first matching rule wins. Marker sets used by the
//! pipeline live here so they can be swapped or extended without touching
//! control flow.

use crate::models::{Category, Direction};

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRule<T> {
    pub pattern: String,
    pub outcome: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable<T> {
    rules: Vec<KeywordRule<T>>,
}

impl<T> RuleTable<T> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Build a table where every pattern maps to the same outcome.
    pub fn uniform(patterns: &[&str], outcome: T) -> Self
    where
        T: Clone,
    {
        let mut table = Self::new();
        for pattern in patterns {
            table.push(pattern, outcome.clone());
        }
        table
    }

    pub fn push(&mut self, pattern: &str, outcome: T) {
        self.rules.push(KeywordRule {
            pattern: pattern.to_lowercase(),
            outcome,
        });
    }

    pub fn first_match(&self, text: &str) -> Option<&KeywordRule<T>> {
        let haystack = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| haystack.contains(rule.pattern.as_str()))
    }

    pub fn matches(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<T> Default for RuleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

const INCOME_MARKERS: &[&str] = &[
    "recebi", "salário", "salario", "pix recebido", "reembolso",
    "deposito", "depósito", "renda", "entrada",
];

const CANCEL_MARKERS: &[&str] = &[
    "cancelar", "cancela", "esquece", "não salva", "nao salva",
];

const AFFIRMATION_MARKERS: &[&str] = &[
    "sim", "confirmo", "confirma", "ok", "pode", "isso",
];

const FINANCE_HINTS: &[&str] = &[
    "r$", "pix", "uber", "ifood", "mercado", "aluguel", "netflix", "spotify",
    "paguei", "gastei", "comprei", "assinatura", "boleto", "cartão", "cartao",
    "recebi", "salário", "salario", "depósito", "deposito",
    "transferência", "transferencia",
];

/// Category names in declaration order, with unaccented spellings right
/// after their label.
fn category_names() -> RuleTable<Category> {
    let mut table = RuleTable::new();
    for category in Category::ALL {
        table.push(category.label(), category);
        match category {
            Category::Saude => table.push("saude", category),
            Category::Educacao => table.push("educacao", category),
            _ => {}
        }
    }
    table
}

/// Marker tables consulted by direction detection and confirmation.
#[derive(Debug, Clone)]
pub struct MarkerSet {
    pub direction: RuleTable<Direction>,
    pub cancel: RuleTable<()>,
    pub categories: RuleTable<Category>,
    pub affirm: RuleTable<()>,
    pub finance_hints: RuleTable<()>,
}

impl MarkerSet {
    /// Brazilian Portuguese defaults.
    pub fn pt_br() -> Self {
        Self {
            direction: RuleTable::uniform(INCOME_MARKERS, Direction::Income),
            cancel: RuleTable::uniform(CANCEL_MARKERS, ()),
            categories: category_names(),
            affirm: RuleTable::uniform(AFFIRMATION_MARKERS, ()),
            finance_hints: RuleTable::uniform(FINANCE_HINTS, ()),
        }
    }
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::pt_br()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let mut table = RuleTable::new();
        table.push("pix recebido", "income");
        table.push("pix", "transfer");

        let rule = table.first_match("PIX RECEBIDO da Ana").unwrap();
        assert_eq!(rule.outcome, "income");
        assert_eq!(table.first_match("mandei um pix").unwrap().outcome, "transfer");
        assert!(table.first_match("boleto").is_none());
    }

    #[test]
    fn test_default_markers() {
        let markers = MarkerSet::pt_br();
        assert!(markers.cancel.matches("Não salva isso"));
        assert!(markers.affirm.matches("confirmo"));
        assert!(!markers.affirm.matches("talvez"));
        assert_eq!(
            markers.direction.first_match("recebi meu SALÁRIO").map(|r| r.outcome),
            Some(Direction::Income)
        );
    }

    #[test]
    fn test_category_names() {
        let markers = MarkerSet::pt_br();
        let hit = |text: &str| markers.categories.first_match(text).map(|r| r.outcome);
        assert_eq!(hit("é SAÚDE"), Some(Category::Saude));
        assert_eq!(hit("coloca em saude"), Some(Category::Saude));
        assert_eq!(hit("na verdade foi mercado"), Some(Category::Mercado));
        assert_eq!(hit("sim"), None);
    }

    #[test]
    fn test_extendable_table() {
        let mut markers = MarkerSet::pt_br();
        assert!(!markers.cancel.matches("desfaz"));
        markers.cancel.push("desfaz", ());
        assert!(markers.cancel.matches("desfaz isso"));
    }
}
