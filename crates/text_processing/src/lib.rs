//! Text processing for read-along playback
//!
//! Features:
//! - Normalization of raw story text into the exact string handed to the
//!   speech engine
//! - Lossless tokenization into word / punctuation / whitespace spans
//! - Reading helpers for the self-paced mode (stats, paragraphs, content ids)

pub mod normalizer;
pub mod reading;
pub mod tokenizer;

pub use normalizer::{normalize, NormalizedText};
pub use reading::{
    content_id, hash_string, paragraphs, position_key, scroll_progress, ReadingStats,
};
pub use tokenizer::{tokenize, tokenize_all, Tokens};
