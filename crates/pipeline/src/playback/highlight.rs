//! Rendering boundary
//!
//! Per-token emphasis flags and scroll requests for whatever view renders
//! the story.

use readalong_core::Token;
use serde::{Deserialize, Serialize};

/// A token paired with its emphasis flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightedToken<'a> {
    pub index: usize,
    pub token: &'a Token,
    /// The word currently being spoken
    pub is_active: bool,
}

/// Annotate every token with whether it is the active word
pub fn highlight(
    tokens: &[Token],
    active: Option<usize>,
) -> impl Iterator<Item = HighlightedToken<'_>> {
    tokens.iter().enumerate().map(move |(index, token)| HighlightedToken {
        index,
        token,
        is_active: token.is_word && active == Some(index),
    })
}

/// Vertical alignment of a scrolled-to element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBlock {
    Start,
    Center,
    End,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

/// Request to bring a token into view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollRequest {
    pub token_index: usize,
    pub block: ScrollBlock,
    pub behavior: ScrollBehavior,
}

impl ScrollRequest {
    /// Centered, smooth scroll used while reading along
    pub fn centered(token_index: usize) -> Self {
        Self {
            token_index,
            block: ScrollBlock::Center,
            behavior: ScrollBehavior::Smooth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_active_word() {
        let tokens = vec![
            Token::new(0, "Hi", true),
            Token::new(2, " ", false),
            Token::new(3, "you", true),
        ];
        let flags: Vec<bool> = highlight(&tokens, Some(2)).map(|h| h.is_active).collect();
        assert_eq!(flags, vec![false, false, true]);

        assert!(highlight(&tokens, None).all(|h| !h.is_active));
        // A non-word index never renders as active
        assert!(highlight(&tokens, Some(1)).all(|h| !h.is_active));
    }

    #[test]
    fn test_centered_scroll() {
        let req = ScrollRequest::centered(7);
        assert_eq!(req.block, ScrollBlock::Center);
        assert_eq!(req.behavior, ScrollBehavior::Smooth);
    }
}
