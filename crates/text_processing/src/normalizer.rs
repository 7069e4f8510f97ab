//! Story text normalizer
//!
//! Produces the canonical string that is both spoken and tokenized, so that
//! engine-reported offsets and token offsets index the same text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

static CURLY_DOUBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new("[\u{201C}\u{201D}\u{201E}\u{201F}]").unwrap());
static CURLY_SINGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new("[\u{2018}\u{2019}\u{201A}\u{201B}]").unwrap());
static NBSP: Lazy<Regex> = Lazy::new(|| Regex::new("[\u{00A0}\u{202F}]").unwrap());
// Emphasis may span line breaks in the raw text
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\*\*(.*?)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\*(.*?)\*").unwrap());
static TAB_FEED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\t\x0C]").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Canonical story text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters (the unit of every offset in this crate)
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for NormalizedText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize raw story text
///
/// Steps, in order: curly quotes to straight, non-breaking spaces to spaces,
/// markdown emphasis stripped, tabs and form feeds to spaces, whitespace runs
/// collapsed, ends trimmed. Idempotent.
pub fn normalize(raw: &str) -> NormalizedText {
    let text = CURLY_DOUBLE.replace_all(raw, "\"");
    let text = CURLY_SINGLE.replace_all(&text, "'");
    let text = NBSP.replace_all(&text, " ");
    let text = BOLD.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = TAB_FEED.replace_all(&text, " ");
    let text = WHITESPACE_RUN.replace_all(&text, " ");

    NormalizedText(text.trim().to_string())
}
