//! Plain-text extraction from HTML and document bytes.

use std::sync::LazyLock;

use regex::Regex;

use super::error::ScrapeError;
use crate::constants::MAX_SCRAPE_WORDS;
use crate::text::{collapse_whitespace, truncate_words};

const DOCUMENT_EXTENSIONS: [&str; 4] = ["pdf", "jpg", "png", "jpeg"];

static HIDDEN_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<noscript\b[^>]*>.*?</noscript\s*>|<!--.*?-->")
        .expect("static regex")
});

static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"));

/// How a fetched URL is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Paged document (`.pdf`, `.jpg`, `.png`, `.jpeg`).
    Document,
    Html,
}

/// Dispatches on the URL path's extension, ignoring query string, fragment and case.
pub fn content_kind(url: &str) -> ContentKind {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let is_document = path
        .rsplit_once('.')
        .map(|(_, ext)| {
            DOCUMENT_EXTENSIONS
                .iter()
                .any(|d| ext.eq_ignore_ascii_case(d))
        })
        .unwrap_or(false);

    if is_document {
        ContentKind::Document
    } else {
        ContentKind::Html
    }
}

/// Visible text of an HTML page: scripts, styles and comments removed, tags replaced
/// by spaces, entities decoded, whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    let without_hidden = HIDDEN_BLOCKS.replace_all(html, " ");
    let without_tags = TAGS.replace_all(&without_hidden, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    collapse_whitespace(&decoded)
}

/// Text of every page of a PDF, truncated to [`MAX_SCRAPE_WORDS`] words.
pub fn document_to_text(bytes: &[u8]) -> Result<String, ScrapeError> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| ScrapeError::Document {
        reason: e.to_string(),
    })?;
    Ok(truncate_words(&text, MAX_SCRAPE_WORDS))
}
