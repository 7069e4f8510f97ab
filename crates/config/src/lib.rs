//! Configuration management for the read-along player
//!
//! Settings are layered from YAML files and `READALONG__`-prefixed
//! environment variables. Every field has a default so an empty
//! configuration is valid.

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, ObservabilityConfig, PlaybackConfig, ReaderConfig,
    ServerConfig, Settings, StoryConfig,
};

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
