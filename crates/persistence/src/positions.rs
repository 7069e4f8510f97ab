//! File-backed reading positions

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use std::fmt::Write as _;

use readalong_config::ReaderConfig;
use readalong_core::{PersistenceError, PositionStore, ReadingPosition};

/// Stores each reading position as `{dir}/{key}.json`
///
/// `[A-Za-z0-9_-]` is kept as is; every other byte of the key is written as
/// `%XX`, so distinct keys never share a file.
#[derive(Debug, Clone)]
pub struct JsonFilePositionStore {
    dir: PathBuf,
}

impl JsonFilePositionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the configured position directory
    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(&config.position_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        if key.is_empty() {
            return Err(PersistenceError::InvalidData("empty position key".into()));
        }
        Ok(self.dir.join(format!("{}.json", file_stem(key))))
    }
}

fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            let _ = write!(stem, "%{:02X}", byte);
        }
    }
    stem
}

impl PositionStore for JsonFilePositionStore {
    fn load(&self, key: &str) -> Result<Option<ReadingPosition>, PersistenceError> {
        let path = self.path_for(key)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let position: ReadingPosition = serde_json::from_str(&raw)?;
        if !position.scroll_top.is_finite() || position.scroll_top < 0.0 {
            return Err(PersistenceError::InvalidData(format!(
                "scroll position {} in {}",
                position.scroll_top,
                path.display()
            )));
        }
        Ok(Some(position))
    }

    fn save(&self, key: &str, position: ReadingPosition) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // Write-then-rename so a reader never sees a torn file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(&position)?)?;
        fs::rename(&tmp, &path)?;

        tracing::trace!(key, scroll_top = position.scroll_top, "Reading position saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_position() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePositionStore::new(dir.path());
        assert_eq!(store.load("readpos:42").unwrap(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePositionStore::new(dir.path().join("positions"));

        store.save("readpos:42", ReadingPosition { scroll_top: 310.5 }).unwrap();
        assert_eq!(
            store.load("readpos:42").unwrap(),
            Some(ReadingPosition { scroll_top: 310.5 })
        );

        store.save("readpos:42", ReadingPosition { scroll_top: 12.0 }).unwrap();
        assert_eq!(store.load("readpos:42").unwrap().unwrap().scroll_top, 12.0);

        let written = fs::read_to_string(dir.path().join("positions/readpos%3A42.json")).unwrap();
        assert_eq!(written, r#"{"scrollTop":12.0}"#);
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePositionStore::new(dir.path());
        fs::write(dir.path().join("readpos%3A7.json"), "not json").unwrap();
        assert!(matches!(
            store.load("readpos:7"),
            Err(PersistenceError::Serialization(_))
        ));

        fs::write(dir.path().join("readpos%3A8.json"), r#"{"scrollTop":-4}"#).unwrap();
        assert!(matches!(
            store.load("readpos:8"),
            Err(PersistenceError::InvalidData(_))
        ));
    }

    #[test]
    fn test_similar_keys_use_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePositionStore::new(dir.path());

        store.save("readpos:a.b", ReadingPosition { scroll_top: 1.0 }).unwrap();
        store.save("readpos:a_b", ReadingPosition { scroll_top: 2.0 }).unwrap();
        store.save("readpos:a%2Eb", ReadingPosition { scroll_top: 3.0 }).unwrap();

        assert_eq!(store.load("readpos:a.b").unwrap().unwrap().scroll_top, 1.0);
        assert_eq!(store.load("readpos:a_b").unwrap().unwrap().scroll_top, 2.0);
        assert_eq!(store.load("readpos:a%2Eb").unwrap().unwrap().scroll_top, 3.0);
        assert_eq!(file_stem("readpos:a.b"), "readpos%3Aa%2Eb");
        assert_eq!(file_stem("readpos:a%2Eb"), "readpos%3Aa%252Eb");
        assert_eq!(file_stem("readpos:é"), "readpos%3A%C3%A9");
    }

    #[test]
    fn test_from_config() {
        let config = ReaderConfig {
            position_dir: "data/saved".into(),
            ..ReaderConfig::default()
        };
        let store = JsonFilePositionStore::from_config(&config);
        assert_eq!(store.dir(), Path::new("data/saved"));
    }

    #[test]
    fn test_empty_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePositionStore::new(dir.path());
        assert!(store.save("", ReadingPosition::default()).is_err());
    }
}
