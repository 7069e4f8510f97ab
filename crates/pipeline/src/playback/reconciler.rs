//! Boundary reconciler
//!
//! Maps an engine-reported character offset onto the index of the word
//! token being spoken.

use readalong_core::Token;

/// Resolves boundary offsets to word token indices
#[derive(Debug, Clone, Copy)]
pub struct BoundaryReconciler {
    lead_chars: usize,
}

impl BoundaryReconciler {
    pub fn new(lead_chars: usize) -> Self {
        Self { lead_chars }
    }

    pub fn lead_chars(&self) -> usize {
        self.lead_chars
    }

    /// Resolve a reported offset to the active word token
    ///
    /// Returns `None` for idle (-1), negative or out-of-range offsets, and
    /// when the text has no word at all. An in-range offset pushed past the
    /// end by the lead correction snaps back to the final word.
    pub fn resolve(&self, char_index: i64, tokens: &[Token]) -> Option<usize> {
        if char_index < 0 {
            return None;
        }
        let text_len = tokens.last()?.end;
        let reported = usize::try_from(char_index).ok()?;
        if reported >= text_len {
            return None;
        }

        let adjusted = reported.saturating_add(self.lead_chars).min(text_len);

        // Tokens are contiguous, so the first token ending after the offset contains it
        let position = tokens.partition_point(|t| t.end <= adjusted);
        match tokens.get(position) {
            Some(token) if token.is_word => Some(position),
            _ => snap_to_word(tokens, position, adjusted),
        }
    }
}

/// Nearest word to `offset` on either side of `position`; ties go backward
fn snap_to_word(tokens: &[Token], position: usize, offset: usize) -> Option<usize> {
    let end = position.min(tokens.len());
    let backward = tokens[..end].iter().rposition(|t| t.is_word);
    let forward = tokens
        .iter()
        .enumerate()
        .skip(position + 1)
        .find(|(_, t)| t.is_word)
        .map(|(i, _)| i);

    match (backward, forward) {
        (Some(b), Some(f)) => {
            if tokens[b].distance_to(offset) <= tokens[f].distance_to(offset) {
                Some(b)
            } else {
                Some(f)
            }
        }
        (b, f) => b.or(f),
    }
}
