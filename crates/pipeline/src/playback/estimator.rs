//! Fallback position estimator
//!
//! Used when the engine never reports boundaries: walks the word tokens at a
//! cadence derived from the speech rate.

use std::time::Duration;

use readalong_config::PlaybackConfig;
use readalong_core::Token;

/// Tick interval for the estimator at the given speech rate
///
/// `words_per_second = base * rate`, `interval = max(min_tick, round(1000 / wps))`.
/// Non-positive or non-finite rates count as 1.0.
pub fn fallback_interval(rate: f32, config: &PlaybackConfig) -> Duration {
    let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
    let words_per_second = config.base_words_per_second * rate;
    let ms = (1000.0 / words_per_second).round() as u64;
    Duration::from_millis(ms.max(config.min_tick_ms))
}

/// Iterates word tokens after a starting position
#[derive(Debug, Clone)]
pub struct FallbackEstimator {
    word_indices: Vec<usize>,
    cursor: usize,
}

impl FallbackEstimator {
    /// Start after `from` (or at the first word when `None`)
    pub fn new(tokens: &[Token], from: Option<usize>) -> Self {
        let word_indices: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_word)
            .map(|(i, _)| i)
            .collect();
        let cursor = match from {
            Some(from) => word_indices.partition_point(|&i| i <= from),
            None => 0,
        };
        Self {
            word_indices,
            cursor,
        }
    }

    /// Next word index, `None` once the last word was reached
    pub fn advance(&mut self) -> Option<usize> {
        let index = self.word_indices.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(index)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.word_indices.len()
    }

    pub fn remaining(&self) -> usize {
        self.word_indices.len().saturating_sub(self.cursor)
    }
}
