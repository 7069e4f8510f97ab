//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{playback, reader, story};
use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Read-along playback configuration
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Story generation and storage
    #[serde(default)]
    pub story: StoryConfig,

    /// Self-paced reader
    #[serde(default)]
    pub reader: ReaderConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.playback.validate()?;

        if self.story.ttl_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "story.ttl_minutes".to_string(),
                message: "TTL must be positive".to_string(),
            });
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins (empty = any)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_timeout() -> u64 {
    90
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
        }
    }
}

/// Read-along playback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Lead correction added to reported boundary offsets (chars)
    #[serde(default = "default_lead_chars")]
    pub lead_chars: usize,

    /// Wait for a first boundary before falling back to estimation (ms)
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// Estimated words per second at rate 1.0
    #[serde(default = "default_base_wps")]
    pub base_words_per_second: f32,

    /// Floor for the fallback tick interval (ms)
    #[serde(default = "default_min_tick_ms")]
    pub min_tick_ms: u64,

    #[serde(default = "default_rate")]
    pub default_rate: f32,

    #[serde(default = "default_pitch")]
    pub default_pitch: f32,

    /// Name fragment of the voice used when the requested voice is missing
    #[serde(default = "default_preferred_voice")]
    pub preferred_voice: Option<String>,

    #[serde(default = "default_event_capacity")]
    pub event_channel_capacity: usize,
}

fn default_lead_chars() -> usize {
    playback::LEAD_CHARS
}
fn default_grace_period_ms() -> u64 {
    playback::GRACE_PERIOD_MS
}
fn default_base_wps() -> f32 {
    playback::BASE_WORDS_PER_SECOND
}
fn default_min_tick_ms() -> u64 {
    playback::MIN_TICK_MS
}
fn default_rate() -> f32 {
    playback::DEFAULT_RATE
}
fn default_pitch() -> f32 {
    playback::DEFAULT_PITCH
}
fn default_preferred_voice() -> Option<String> {
    Some(playback::PREFERRED_VOICE.to_string())
}
fn default_event_capacity() -> usize {
    playback::EVENT_CHANNEL_CAPACITY
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            lead_chars: default_lead_chars(),
            grace_period_ms: default_grace_period_ms(),
            base_words_per_second: default_base_wps(),
            min_tick_ms: default_min_tick_ms(),
            default_rate: default_rate(),
            default_pitch: default_pitch(),
            preferred_voice: default_preferred_voice(),
            event_channel_capacity: default_event_capacity(),
        }
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, message: &str| ConfigError::InvalidValue {
            field: format!("playback.{}", field),
            message: message.to_string(),
        };

        if self.lead_chars > 16 {
            return Err(invalid("lead_chars", "lead correction above 16 chars"));
        }
        if !(100..=10_000).contains(&self.grace_period_ms) {
            return Err(invalid("grace_period_ms", "must be within 100..=10000"));
        }
        if self.min_tick_ms < 16 {
            return Err(invalid("min_tick_ms", "must be at least one frame (16ms)"));
        }
        if !(self.base_words_per_second > 0.0) {
            return Err(invalid("base_words_per_second", "must be positive"));
        }
        if !(0.1..=10.0).contains(&self.default_rate) {
            return Err(invalid("default_rate", "must be within 0.1..=10"));
        }
        if self.event_channel_capacity == 0 {
            return Err(invalid("event_channel_capacity", "must be non-zero"));
        }

        Ok(())
    }
}

/// Story generation and storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryConfig {
    /// Chat completions endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key (set via READALONG__STORY__API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Time-to-live of stored stories (minutes)
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_endpoint() -> String {
    story::COMPLETIONS_ENDPOINT.to_string()
}
fn default_model() -> String {
    story::DEFAULT_MODEL.to_string()
}
fn default_ttl_minutes() -> i64 {
    story::TTL_MINUTES
}
fn default_request_timeout_ms() -> u64 {
    story::REQUEST_TIMEOUT_MS
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            ttl_minutes: default_ttl_minutes(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Self-paced reader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    #[serde(default = "default_wpm")]
    pub words_per_minute: u32,

    /// Minimum spacing between position writes (ms)
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Directory holding saved reading positions
    #[serde(default = "default_position_dir")]
    pub position_dir: String,
}

fn default_wpm() -> u32 {
    reader::WORDS_PER_MINUTE
}
fn default_frame_interval_ms() -> u64 {
    reader::FRAME_INTERVAL_MS
}
fn default_position_dir() -> String {
    "data/positions".to_string()
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            words_per_minute: default_wpm(),
            frame_interval_ms: default_frame_interval_ms(),
            position_dir: default_position_dir(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `./config` and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (READALONG__ prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from an explicit config directory and environment
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(
        File::with_name(&dir.join("default").to_string_lossy()).required(false),
    );

    if let Some(env_name) = env {
        builder = builder.add_source(
            File::with_name(&dir.join(env_name).to_string_lossy()).required(false),
        );
    }

    builder = builder.add_source(
        Environment::with_prefix("READALONG")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(dir = %dir.display(), env = ?env, "Settings loaded");
    Ok(settings)
}
