//! Helpers for the self-paced reading mode

use once_cell::sync::Lazy;
use readalong_config::constants::reader::{
    CONTENT_ID_PREFIX_CHARS, EMPTY_STORY_PLACEHOLDER, POSITION_KEY_PREFIX,
};
use readalong_config::ReaderConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

/// Word count and estimated reading time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingStats {
    pub words: usize,
    pub minutes: u32,
}

impl ReadingStats {
    /// Compute stats at the given reading speed; never reports zero
    pub fn compute(text: &str, words_per_minute: u32) -> Self {
        let words = text.split_whitespace().count().max(1);
        let wpm = words_per_minute.max(1) as f64;
        let minutes = ((words as f64 / wpm).round() as u32).max(1);
        Self { words, minutes }
    }

    /// Stats at the configured reading speed
    pub fn for_config(text: &str, config: &ReaderConfig) -> Self {
        Self::compute(text, config.words_per_minute)
    }
}

/// Split raw text into display paragraphs
pub fn paragraphs(raw: &str) -> Vec<String> {
    let text = raw.replace("\r\n", "\n");
    let text = text.trim();
    if text.is_empty() {
        return vec![EMPTY_STORY_PLACEHOLDER.to_string()];
    }
    PARAGRAPH_BREAK.split(text).map(str::to_string).collect()
}

/// 32-bit rolling hash (`h * 31 + unit`) over UTF-16 code units
///
/// Matches the key scheme already written by web clients, so positions saved
/// there stay readable.
pub fn hash_string(s: &str) -> String {
    hash_units(s.encode_utf16())
}

fn hash_units(units: impl Iterator<Item = u16>) -> String {
    let h = units.fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32)
    });
    (h as u32).to_string()
}

/// Stable identifier for a story: its id, else a hash of its opening text
pub fn content_id(story_id: Option<&str>, text: &str) -> String {
    match story_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => hash_units(text.encode_utf16().take(CONTENT_ID_PREFIX_CHARS)),
    }
}

/// Storage key for a content identifier
pub fn position_key(content_id: &str) -> String {
    format!("{}{}", POSITION_KEY_PREFIX, content_id)
}

/// Fraction of the scrollable range already read, in `0.0..=1.0`
pub fn scroll_progress(scroll_top: f64, scroll_height: f64, client_height: f64) -> f64 {
    let max = scroll_height - client_height;
    if max > 0.0 {
        (scroll_top / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_stats() {
        let stats = ReadingStats::compute("", 200);
        assert_eq!(stats, ReadingStats { words: 1, minutes: 1 });

        let text = "word ".repeat(500);
        let stats = ReadingStats::compute(&text, 200);
        assert_eq!(stats.words, 500);
        assert_eq!(stats.minutes, 3); // 2.5 rounds up

        // Default speed is 200 wpm; a slower reader takes longer
        assert_eq!(ReadingStats::for_config(&text, &ReaderConfig::default()).minutes, 3);
        let slow = ReaderConfig {
            words_per_minute: 100,
            ..ReaderConfig::default()
        };
        assert_eq!(ReadingStats::for_config(&text, &slow).minutes, 5);
    }

    #[test]
    fn test_paragraphs() {
        let paras = paragraphs("First line\r\nstill first\r\n\r\nSecond\n\n\n\nThird\n");
        assert_eq!(paras, vec!["First line\nstill first", "Second", "Third"]);
        assert_eq!(paragraphs("  \n "), vec![EMPTY_STORY_PLACEHOLDER.to_string()]);
    }

    #[test]
    fn test_hash_string() {
        assert_eq!(hash_string(""), "0");
        assert_eq!(hash_string("a"), "97");
        assert_eq!(hash_string("ab"), (97 * 31 + 98).to_string());
        // Wraps like 32-bit integer arithmetic and renders unsigned
        let long = hash_string(&"z".repeat(50));
        assert!(long.parse::<u32>().is_ok());
    }

    #[test]
    fn test_content_id() {
        assert_eq!(content_id(Some("story-1"), "anything"), "story-1");
        assert_eq!(content_id(None, "abc"), hash_string("abc"));
        assert_eq!(content_id(Some(""), "abc"), hash_string("abc"));

        // Only the opening text matters
        let base = "x".repeat(1000);
        let a = format!("{}tail one", base);
        let b = format!("{}tail two", base);
        assert_eq!(content_id(None, &a), content_id(None, &b));
        assert_eq!(position_key("42"), "readpos:42");
    }

    #[test]
    fn test_scroll_progress() {
        assert_eq!(scroll_progress(0.0, 1000.0, 400.0), 0.0);
        assert_eq!(scroll_progress(300.0, 1000.0, 400.0), 0.5);
        assert_eq!(scroll_progress(900.0, 1000.0, 400.0), 1.0);
        assert_eq!(scroll_progress(50.0, 300.0, 400.0), 0.0);
    }
}
