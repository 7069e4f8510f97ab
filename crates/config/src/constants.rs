//! Centralized constants for the read-along player
//!
//! Single source of truth for default values used across the crates.

/// Read-along playback defaults
pub mod playback {
    /// Characters added to reported boundary offsets to compensate for
    /// engines that report slightly behind the spoken position
    pub const LEAD_CHARS: usize = 2;

    /// Time to wait for a first boundary event before estimating (ms)
    pub const GRACE_PERIOD_MS: u64 = 800;

    /// Estimated words per second at rate 1.0
    pub const BASE_WORDS_PER_SECOND: f32 = 3.0;

    /// Fastest fallback tick (ms)
    pub const MIN_TICK_MS: u64 = 120;

    pub const DEFAULT_RATE: f32 = 1.0;

    pub const DEFAULT_PITCH: f32 = 1.0;

    /// Voice picked when the requested one is missing
    pub const PREFERRED_VOICE: &str = "Google US English";

    /// Session event broadcast capacity
    pub const EVENT_CHANNEL_CAPACITY: usize = 256;
}

/// Self-paced reader defaults
pub mod reader {
    /// Reading speed used for time estimates
    pub const WORDS_PER_MINUTE: u32 = 200;

    /// One animation frame at 60 Hz (ms)
    pub const FRAME_INTERVAL_MS: u64 = 16;

    /// UTF-16 code units hashed when no explicit story id exists
    pub const CONTENT_ID_PREFIX_CHARS: usize = 1000;

    /// Storage key prefix for saved positions
    pub const POSITION_KEY_PREFIX: &str = "readpos:";

    pub const EMPTY_STORY_PLACEHOLDER: &str = "(No story text provided.)";
}

/// Story generation and storage defaults
pub mod story {
    /// Time-to-live of generated stories (minutes)
    pub const TTL_MINUTES: i64 = 180;

    pub const DEFAULT_TITLE: &str = "Your Story";

    pub const DEFAULT_MODEL: &str = "deepseek/deepseek-r1:free";

    /// OpenRouter chat completions endpoint
    pub const COMPLETIONS_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

    /// LLM request timeout (ms)
    pub const REQUEST_TIMEOUT_MS: u64 = 60_000;

    /// How often expired stories are swept from the store (seconds)
    pub const PURGE_INTERVAL_SECS: u64 = 300;
}
