//! Error types for the read-along player

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the read-along player
#[derive(Error, Debug)]
pub enum Error {
    // Playback errors
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    // Story errors
    #[error("Story error: {0}")]
    Story(#[from] StoryError),

    // Persistence errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Read-along playback errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The host has no speech synthesis capability
    #[error("Speech synthesis is not supported in this environment")]
    Unsupported,

    #[error("Nothing to speak: text is empty")]
    EmptyText,
}

/// Story collaborator errors
#[derive(Error, Debug)]
pub enum StoryError {
    #[error("Story generation failed: {0}")]
    Generation(String),

    #[error("Could not parse story payload: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Local persistence errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Playback(PlaybackError::Unsupported);
        assert!(err.to_string().contains("not supported"));

        let err = Error::Story(StoryError::Storage("disk full".to_string()));
        assert_eq!(err.to_string(), "Story error: Storage error: disk full");
    }

    #[test]
    fn test_conversions() {
        let err: Error = PersistenceError::InvalidData("negative scroll".into()).into();
        assert!(matches!(err, Error::Persistence(PersistenceError::InvalidData(_))));

        let err: Error = serde_json::from_str::<u32>("x").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
