use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

lazy_static! {
    static ref TERM_RE: Regex =
        Regex::new(r"(?i)[a-z0-9]+(?:'[a-z0-9]+)?").expect("valid term regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a", "an", "and", "are", "as", "at", "be", "by", "for", "from",
            "has", "he", "in", "is", "it", "its", "of", "on", "that", "the",
            "to", "was", "were", "will", "with", "this", "but", "they",
            "have", "had", "what", "when", "where", "who", "which", "why", "how",
            "all", "each", "every", "both", "few", "more", "most", "other", "some",
            "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too",
            "very", "can", "just", "should", "now", "one", "two", "three",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(term: &str) -> bool {
    STOPWORDS.contains(term)
}

/// Split raw text into lowercased alphanumeric terms.
///
/// Punctuation is dropped; an inner apostrophe followed by alphanumerics is
/// kept (`don't`, `python's`).
pub fn tokenize(text: &str) -> Vec<String> {
    TERM_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Normalization pipeline shared by index build and query analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analyzer {
    pub remove_stopwords: bool,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            remove_stopwords: true,
        }
    }
}

impl Analyzer {
    pub fn keep_stopwords() -> Self {
        Self {
            remove_stopwords: false,
        }
    }

    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = tokenize(text);
        if !self.remove_stopwords {
            return tokens;
        }
        tokens.into_iter().filter(|t| !is_stopword(t)).collect()
    }
}
