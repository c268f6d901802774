//! Word-level text normalization.
//!
//! Every whitespace and word-budget rule used by the pipeline lives here: project
//! descriptions are bounded by [`normalize`], scraped documents by [`truncate_words`],
//! and extracted HTML text by [`collapse_whitespace`].

use crate::constants::MAX_PROJECT_WORDS;

/// Keeps the first [`MAX_PROJECT_WORDS`] whitespace-separated words, joined by single spaces.
pub fn normalize(text: &str) -> String {
    truncate_words(text, MAX_PROJECT_WORDS)
}

/// Keeps the first `max_words` whitespace-separated words, joined by single spaces.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapses every whitespace run to a single space and trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
