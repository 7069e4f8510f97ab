//! Token spans over normalized text

use serde::{Deserialize, Serialize};

/// A contiguous span of normalized text
///
/// `start` and `end` are character offsets (Unicode scalar values, not bytes)
/// forming the half-open range `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
    /// Span text
    pub text: String,
    /// Alphanumeric run (as opposed to punctuation or whitespace)
    pub is_word: bool,
}

impl Token {
    pub fn new(start: usize, text: impl Into<String>, is_word: bool) -> Self {
        let text = text.into();
        let end = start + text.chars().count();
        Self {
            start,
            end,
            text,
            is_word,
        }
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` falls inside `[start, end)`
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Character distance from `offset` to the nearest character of this span
    ///
    /// Zero when the span contains the offset.
    pub fn distance_to(&self, offset: usize) -> usize {
        if offset < self.start {
            self.start - offset
        } else if offset >= self.end {
            offset + 1 - self.end
        } else {
            0
        }
    }
}
