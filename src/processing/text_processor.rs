//! Text normalization

use serde::{Deserialize, Serialize};

/// Raw extracted text alongside its normalized form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedText {
    pub raw: String,
    pub normalized: String,
    pub word_count: usize,
}

impl ProcessedText {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(&raw);
        let word_count = word_count(&normalized);

        Self {
            raw,
            normalized,
            word_count,
        }
    }
}

/// Collapse whitespace runs to one space, trim, then lowercase.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Number of whitespace-delimited tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
