//! Local reading-position storage

use serde::{Deserialize, Serialize};

use crate::PersistenceError;

/// Saved scroll position for a piece of content
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPosition {
    #[serde(default)]
    pub scroll_top: f64,
}

/// Key-value store for reading positions, keyed by content identifier
pub trait PositionStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<ReadingPosition>, PersistenceError>;

    fn save(&self, key: &str, position: ReadingPosition) -> Result<(), PersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_wire_format() {
        let pos: ReadingPosition = serde_json::from_str(r#"{"scrollTop":120.5}"#).unwrap();
        assert_eq!(pos.scroll_top, 120.5);

        let pos: ReadingPosition = serde_json::from_str("{}").unwrap();
        assert_eq!(pos.scroll_top, 0.0);
    }
}
