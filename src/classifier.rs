//! Category Classifier
//!
//! The pipeline treats classification as a black box returning exactly one
//! label from the closed set plus a confidence. Low confidence is not an
//! error; the payload builder gates on it.
//!
//! `KeywordClassifier` is the built-in implementation: a smoothed keyword
//! vote over the cleaned description.

use crate::models::Category;
use serde::{Deserialize, Serialize};

/// Ceiling for machine confidence. 1.0 is reserved for human confirmation.
pub const MAX_MACHINE_CONFIDENCE: f64 = 0.9999;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub category: Category,
    pub confidence: f64,
}

impl Prediction {
    pub fn new(category: Category, confidence: f64) -> Self {
        Self { category, confidence }
    }

    /// Clamp into `[0, MAX_MACHINE_CONFIDENCE]`, mapping NaN to 0.
    pub fn sanitized(self) -> Self {
        let confidence = if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, MAX_MACHINE_CONFIDENCE)
        };
        Self { category: self.category, confidence }
    }
}

/// Trait for category classification
pub trait CategoryClassifier: Send + Sync {
    fn classify(&self, description: &str) -> Prediction;
}

impl<F> CategoryClassifier for F
where
    F: Fn(&str) -> Prediction + Send + Sync,
{
    fn classify(&self, description: &str) -> Prediction {
        self(description)
    }
}

/// Static keyword lists, zero allocation
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Renda, &[
        "salário", "salario", "recebi", "freela", "freelance", "reembolso",
        "rendimento", "dividendos", "bônus", "bonus",
    ]),
    (Category::Mercado, &[
        "mercado", "supermercado", "feira", "padaria", "açougue", "acougue",
        "hortifruti", "ifood", "restaurante", "lanche", "cafeteria", "café",
        "almoço", "almoco", "jantar", "pizza",
    ]),
    (Category::Moradia, &[
        "aluguel", "condomínio", "condominio", "luz", "energia", "água",
        "agua", "internet", "gás", "gas", "iptu", "apê", "ape",
    ]),
    (Category::Transporte, &[
        "uber", "táxi", "taxi", "ônibus", "onibus", "metrô", "metro",
        "gasolina", "combustível", "combustivel", "estacionamento", "pedágio",
        "pedagio",
    ]),
    (Category::Lazer, &[
        "cinema", "show", "bar", "festa", "passeio", "parque", "ingresso",
        "jogo", "balada",
    ]),
    (Category::Saude, &[
        "farmácia", "farmacia", "remédio", "remedio", "médico", "medico",
        "consulta", "dentista", "exame", "hospital", "academia",
    ]),
    (Category::Assinaturas, &[
        "netflix", "spotify", "assinatura", "disney", "prime", "youtube",
        "hbo", "icloud", "renovação", "renovacao",
    ]),
    (Category::Educacao, &[
        "curso", "faculdade", "escola", "livro", "livros", "mensalidade",
        "apostila",
    ]),
    (Category::Viagem, &[
        "passagem", "passagens", "hotel", "airbnb", "voo", "viagem",
        "hospedagem", "pousada",
    ]),
];

/// Laplace-style smoothing mass per category
const SMOOTHING: f64 = 0.05;

/// Keyword-vote classifier over the closed category set
pub struct KeywordClassifier {
    keywords: Vec<(Category, Vec<String>)>,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        let keywords: Vec<(Category, Vec<String>)> = CATEGORY_KEYWORDS
            .iter()
            .map(|(category, words)| (*category, words.iter().map(|w| w.to_string()).collect()))
            .collect();
        Self { keywords }
    }

    /// Add a keyword for a category on top of the defaults.
    ///
    /// Single words match whole tokens; a multi-word phrase matches when it
    /// appears in the description with the same word order.
    pub fn with_keyword(mut self, category: Category, keyword: &str) -> Self {
        let keyword = keyword
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match self.keywords.iter_mut().find(|(c, _)| *c == category) {
            Some((_, words)) => words.push(keyword),
            None => self.keywords.push((category, vec![keyword])),
        }
        self
    }

    fn scores(&self, description: &str) -> Vec<(Category, f64)> {
        let lowered = description.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        let joined = format!(" {} ", tokens.join(" "));

        Category::ALL
            .iter()
            .map(|category| {
                let hits = self
                    .keywords
                    .iter()
                    .filter(|(c, _)| c == category)
                    .flat_map(|(_, words)| words.iter())
                    .filter(|word| {
                        if word.contains(' ') {
                            joined.contains(&format!(" {} ", word))
                        } else {
                            tokens.contains(&word.as_str())
                        }
                    })
                    .count();
                (*category, hits as f64)
            })
            .collect()
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryClassifier for KeywordClassifier {
    fn classify(&self, description: &str) -> Prediction {
        let scores = self.scores(description);
        let total: f64 = scores.iter().map(|(_, s)| s).sum();
        let classes = scores.len() as f64;

        if total == 0.0 {
            return Prediction::new(Category::Outros, 1.0 / classes);
        }

        // ties resolve to the earliest category in declaration order
        let (best, best_score) = scores
            .iter()
            .copied()
            .fold((Category::Outros, f64::MIN), |acc, (category, score)| {
                if score > acc.1 { (category, score) } else { acc }
            });

        let confidence = (best_score + SMOOTHING) / (total + SMOOTHING * classes);
        Prediction::new(best, confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_keyword_is_confident() {
        let classifier = KeywordClassifier::new();
        let prediction = classifier.classify("mercado");
        assert_eq!(prediction.category, Category::Mercado);
        assert!(prediction.confidence >= 0.55);
        assert!(prediction.confidence < 1.0);
    }

    #[test]
    fn test_no_keyword_falls_back_to_catch_all() {
        let classifier = KeywordClassifier::new();
        let prediction = classifier.classify("coisa aleatória");
        assert_eq!(prediction.category, Category::Outros);
        assert!((prediction.confidence - 0.1).abs() < 1e-9);

        let empty = classifier.classify("");
        assert_eq!(empty.category, Category::Outros);
    }

    #[test]
    fn test_split_vote_is_not_confident() {
        let classifier = KeywordClassifier::new();
        // one Transporte hit, one Lazer hit
        let prediction = classifier.classify("uber cinema");
        assert_eq!(prediction.category, Category::Transporte);
        assert!(prediction.confidence < 0.55);
    }

    #[test]
    fn test_matches_whole_tokens_only() {
        let classifier = KeywordClassifier::new();
        // "barbearia" must not count as "bar"
        assert_eq!(classifier.classify("barbearia").category, Category::Outros);
    }

    #[test]
    fn test_custom_keyword() {
        let classifier = KeywordClassifier::new().with_keyword(Category::Lazer, "boliche");
        assert_eq!(classifier.classify("boliche").category, Category::Lazer);
    }

    #[test]
    fn test_custom_phrase_keyword() {
        let classifier = KeywordClassifier::new().with_keyword(Category::Saude, "Personal  Trainer");
        let prediction = classifier.classify("personal trainer");
        assert_eq!(prediction.category, Category::Saude);
        assert!(prediction.confidence >= 0.55);

        // words out of order or apart do not count as the phrase
        assert_eq!(classifier.classify("trainer personal").category, Category::Outros);
    }

    #[test]
    fn test_closure_classifier_and_sanitize() {
        let classifier = |_: &str| Prediction::new(Category::Viagem, 1.7);
        let prediction = classifier.classify("x").sanitized();
        assert_eq!(prediction.category, Category::Viagem);
        assert_eq!(prediction.confidence, MAX_MACHINE_CONFIDENCE);

        let nan = Prediction::new(Category::Outros, f64::NAN).sanitized();
        assert_eq!(nan.confidence, 0.0);
    }
}
