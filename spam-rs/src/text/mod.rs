//! Text normalization
//!
//! Turns a raw message into the canonical token string the model artifacts
//! were trained on: lowercase, tokenize, keep alphanumeric tokens, drop
//! stop-words, stem, join with single spaces. Normalization is total: any
//! input, including empty or punctuation-only text, yields a (possibly empty)
//! string.

pub mod stemmer;
pub mod stopwords;
pub mod tokenizer;

use serde::Serialize;
use std::sync::OnceLock;
use unicode_general_category::{get_general_category, GeneralCategory};

pub use stemmer::{PorterStemmer, SnowballStemmer, Stem, StemmerKind};
pub use stopwords::StopWords;
pub use tokenizer::word_tokenize;

use crate::config::NormalizerConfig;

/// Every intermediate stage of one normalization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizationTrace {
    pub tokens: Vec<String>,
    pub alphanumeric: Vec<String>,
    pub filtered: Vec<String>,
    pub stemmed: Vec<String>,
    pub normalized: String,
}

/// Message normalizer with an injected stop-word set and stemmer
pub struct Normalizer {
    stop_words: StopWords,
    stemmer: Box<dyn Stem>,
}

impl Normalizer {
    pub fn new(stop_words: StopWords, stemmer: Box<dyn Stem>) -> Self {
        Self {
            stop_words,
            stemmer,
        }
    }

    /// Build a normalizer from configuration
    pub fn from_config(config: &NormalizerConfig) -> Self {
        let mut stop_words = StopWords::english();
        stop_words.extend(&config.extra_stop_words);
        Self::new(stop_words, config.stemmer.build())
    }

    /// Normalize a raw message
    pub fn normalize(&self, raw: &str) -> String {
        let tokens = alphanumeric_tokens(tokenize(raw));
        let tokens = self.remove_stop_words(tokens);
        self.stem_tokens(tokens).join(" ")
    }

    /// Normalize and keep every intermediate stage
    pub fn explain(&self, raw: &str) -> NormalizationTrace {
        let tokens = tokenize(raw);
        let alphanumeric = alphanumeric_tokens(tokens.clone());
        let filtered = self.remove_stop_words(alphanumeric.clone());
        let stemmed = self.stem_tokens(filtered.clone());
        let normalized = stemmed.join(" ");

        NormalizationTrace {
            tokens,
            alphanumeric,
            filtered,
            stemmed,
            normalized,
        }
    }

    /// Drop stop-words and empty tokens, keeping order
    pub fn remove_stop_words(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .filter(|token| !token.is_empty() && !self.stop_words.contains(token))
            .collect()
    }

    pub fn stem_tokens(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .iter()
            .map(|token| self.stemmer.stem(token))
            .collect()
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(StopWords::english(), Box::new(PorterStemmer::new()))
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("stop_words", &self.stop_words.len())
            .finish_non_exhaustive()
    }
}

/// Normalize with the reference configuration (English stop-words, Porter)
pub fn normalize(raw: &str) -> String {
    static DEFAULT: OnceLock<Normalizer> = OnceLock::new();
    DEFAULT.get_or_init(Normalizer::default).normalize(raw)
}

/// Lowercase and split into word/punctuation tokens
pub fn tokenize(raw: &str) -> Vec<String> {
    word_tokenize(&raw.to_lowercase())
}

/// Keep only tokens made entirely of letters and digits
pub fn alphanumeric_tokens(tokens: Vec<String>) -> Vec<String> {
    tokens.into_iter().filter(|token| is_alphanumeric(token)).collect()
}

/// True when the token is non-empty and every char is a Unicode letter or
/// number
pub fn is_alphanumeric(token: &str) -> bool {
    !token.is_empty()
        && token.chars().all(|c| {
            matches!(
                get_general_category(c),
                GeneralCategory::UppercaseLetter
                    | GeneralCategory::LowercaseLetter
                    | GeneralCategory::TitlecaseLetter
                    | GeneralCategory::ModifierLetter
                    | GeneralCategory::OtherLetter
                    | GeneralCategory::DecimalNumber
                    | GeneralCategory::LetterNumber
                    | GeneralCategory::OtherNumber
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spam_message() {
        assert_eq!(
            normalize("WINNER!! Claim your FREE prize now, click here!!!"),
            "winner claim free prize click"
        );
    }

    #[test]
    fn test_ham_message() {
        assert_eq!(
            normalize("Hey, are we still meeting for lunch tomorrow?"),
            "hey still meet lunch tomorrow"
        );
    }

    #[test]
    fn test_deterministic() {
        let text = "URGENT! You have won a 1 week FREE membership in our £100,000 Prize Jackpot!";
        assert_eq!(normalize(text), normalize(text));
    }

    #[test]
    fn test_case_invariance() {
        assert_eq!(normalize("FREE MONEY"), normalize("free money"));
        assert_eq!(normalize("FREE MONEY"), "free money");
    }

    #[test]
    fn test_stop_words_only() {
        assert_eq!(normalize("the and of is"), "");
        assert_eq!(normalize("I am what I am"), "");
    }

    #[test]
    fn test_punctuation_stripping() {
        let tokens = alphanumeric_tokens(tokenize("win!!! $$$ now..."));
        assert_eq!(tokens, vec!["win", "now"]);
        // "now" is a stop-word
        assert_eq!(normalize("win!!! $$$ now..."), "win");
    }

    #[test]
    fn test_empty_and_non_alphanumeric() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n"), "");
        assert_eq!(normalize("!!! ??? ... $$$"), "");
        assert_eq!(normalize("😀 🎉"), "");
    }

    #[test]
    fn test_order_preserved() {
        assert_eq!(normalize("free entry win"), "free entri win");
        assert_eq!(normalize("win entry free"), "win entri free");
    }

    #[test]
    fn test_mixed_tokens_dropped_whole() {
        // hyphenated and dotted tokens are not partially trimmed
        assert_eq!(normalize("e-mail www.win.com call"), "call");
        assert_eq!(normalize("call 09061701461 now"), "call 09061701461");
    }

    #[test]
    fn test_contraction_parts() {
        // "n't" and "'m" are not alphanumeric, "ca" survives
        assert_eq!(
            alphanumeric_tokens(tokenize("I can't, I'm busy")),
            vec!["i", "ca", "i", "busy"]
        );
        assert_eq!(normalize("I can't, I'm busy"), "ca busi");
    }

    #[test]
    fn test_is_alphanumeric() {
        assert!(is_alphanumeric("abc123"));
        assert!(is_alphanumeric("café"));
        assert!(is_alphanumeric("²"));
        assert!(!is_alphanumeric(""));
        assert!(!is_alphanumeric("a_b"));
        assert!(!is_alphanumeric("n't"));
        assert!(!is_alphanumeric("£100"));
    }

    #[test]
    fn test_explain_stages() {
        let trace = Normalizer::default().explain("Running to the shops!");
        assert_eq!(trace.tokens, vec!["running", "to", "the", "shops", "!"]);
        assert_eq!(trace.alphanumeric, vec!["running", "to", "the", "shops"]);
        assert_eq!(trace.filtered, vec!["running", "shops"]);
        assert_eq!(trace.stemmed, vec!["run", "shop"]);
        assert_eq!(trace.normalized, "run shop");
    }

    #[test]
    fn test_custom_stop_words_and_stemmer() {
        let mut stop_words = StopWords::english();
        stop_words.extend(["txt"]);
        let normalizer = Normalizer::new(stop_words, Box::new(SnowballStemmer::new()));
        assert_eq!(normalizer.normalize("TXT fairly now"), "fair");
    }

    #[test]
    fn test_empty_tokens_removed() {
        let normalizer = Normalizer::default();
        let tokens = vec![String::new(), "prize".to_string(), String::new()];
        assert_eq!(normalizer.remove_stop_words(tokens), vec!["prize"]);
    }

    #[test]
    fn test_long_token_on_small_stack() {
        let normalized = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(|| normalize(&"y".repeat(200_000)))
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(normalized.len(), 200_000);
        assert!(normalized.ends_with('i'));
    }
}
