//! Read-along tokenizer
//!
//! Splits normalized text into word, punctuation and whitespace spans with
//! character offsets. Concatenating the spans reproduces the input exactly.

use once_cell::sync::Lazy;
use readalong_core::Token;
use regex::Regex;

/// Word runs (letters, combining marks, digits) | other non-whitespace runs | whitespace runs
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Alphabetic}\p{M}\p{N}]+|[^\s\p{Alphabetic}\p{M}\p{N}]+|\s+").unwrap()
});

static WORD_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A[\p{Alphabetic}\p{M}\p{N}]").unwrap());

/// Lazy token sequence over a text
///
/// A clone continues from the same position; call [`tokenize`] again to
/// start over.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    byte_pos: usize,
    char_pos: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.byte_pos >= self.text.len() {
            return None;
        }

        // The three classes cover every character, so the next match starts
        // exactly where the previous one ended.
        let m = TOKEN_PATTERN.find_at(self.text, self.byte_pos)?;
        debug_assert_eq!(m.start(), self.byte_pos);

        let chunk = m.as_str();
        let is_word = WORD_START.is_match(chunk);
        let token = Token::new(self.char_pos, chunk, is_word);

        self.byte_pos = m.end();
        self.char_pos = token.end;
        Some(token)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.text.len() - self.byte_pos;
        ((remaining > 0) as usize, Some(remaining))
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

/// Tokenize text lazily
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens {
        text,
        byte_pos: 0,
        char_pos: 0,
    }
}

/// Tokenize text into a span table
pub fn tokenize_all(text: &str) -> Vec<Token> {
    let tokens: Vec<Token> = tokenize(text).collect();
    tracing::trace!(
        tokens = tokens.len(),
        words = tokens.iter().filter(|t| t.is_word).count(),
        "Tokenized text"
    );
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize;

    fn assert_lossless(text: &str) {
        let tokens = tokenize_all(text);
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(joined, text);

        let mut expected_start = 0;
        for token in &tokens {
            assert_eq!(token.start, expected_start, "gap before {:?}", token);
            assert!(token.end > token.start);
            expected_start = token.end;
        }
        assert_eq!(expected_start, text.chars().count());
    }

    #[test]
    fn test_quick_fox() {
        let tokens = tokenize_all("The quick fox");
        let spans: Vec<(usize, usize, bool)> =
            tokens.iter().map(|t| (t.start, t.end, t.is_word)).collect();
        assert_eq!(
            spans,
            vec![(0, 3, true), (3, 4, false), (4, 9, true), (9, 10, false), (10, 13, true)]
        );
    }

    #[test]
    fn test_punctuation_split() {
        let tokens = tokenize_all("Wait... don't!");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Wait", "...", " ", "don", "'", "t", "!"]);
        assert!(!tokens[1].is_word);
        assert!(tokens[3].is_word);
    }

    #[test]
    fn test_lossless_and_contiguous() {
        for text in [
            "The quick fox",
            "\"Hello,\" she said -- 42 times!",
            "naïve café, 日本語 ok",
            "   leading and trailing   ",
            "x",
            "!!!",
        ] {
            assert_lossless(text);
        }
        assert_lossless(&normalize("**Once** upon a\u{00A0}time\n\nthe end."));
    }

    #[test]
    fn test_empty() {
        assert_eq!(tokenize("").count(), 0);
    }

    #[test]
    fn test_unicode_offsets_are_chars() {
        let tokens = tokenize_all("café au");
        assert_eq!((tokens[0].start, tokens[0].end), (0, 4));
        assert_eq!((tokens[2].start, tokens[2].end), (5, 7));
    }

    #[test]
    fn test_combining_marks_stay_in_word() {
        let tokens = tokenize_all("cafe\u{301} noir");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "cafe\u{301}");
        assert_eq!((tokens[0].start, tokens[0].end), (0, 5));
        assert!(tokens[0].is_word);
        assert_eq!((tokens[2].start, tokens[2].end), (6, 10));

        // A stray mark after whitespace still reads as a word
        let tokens = tokenize_all("a \u{301}b");
        assert_eq!(tokens[2].text, "\u{301}b");
        assert!(tokens[2].is_word);
    }

    #[test]
    fn test_restartable() {
        let text = "one, two";
        let first: Vec<Token> = tokenize(text).collect();
        let second: Vec<Token> = tokenize(text).collect();
        assert_eq!(first, second);

        let mut iter = tokenize(text);
        iter.next();
        let rest: Vec<Token> = iter.clone().collect();
        assert_eq!(rest.len(), first.len() - 1);
        assert_eq!(iter.count(), rest.len());
    }
}
