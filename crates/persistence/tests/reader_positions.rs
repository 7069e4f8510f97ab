//! Self-paced reader: content id, file store and throttled writes together

use std::sync::Arc;
use std::time::Duration;

use readalong_config::ReaderConfig;
use readalong_core::{PositionStore, ReadingPosition};
use readalong_persistence::{JsonFilePositionStore, ThrottledPositionWriter};
use readalong_text_processing::{content_id, position_key};

#[tokio::test(start_paused = true)]
async fn test_position_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = ReaderConfig {
        position_dir: dir.path().to_string_lossy().into_owned(),
        ..ReaderConfig::default()
    };
    let store: Arc<dyn PositionStore> = Arc::new(JsonFilePositionStore::from_config(&config));
    let key = position_key(&content_id(None, "Once upon a time there was a fox."));

    let writer = ThrottledPositionWriter::from_config(store.clone(), key.clone(), &config);
    assert_eq!(writer.restore(), None);

    for top in [100.0, 250.0, 480.0] {
        writer.record(ReadingPosition { scroll_top: top });
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(writer);

    let reopened = ThrottledPositionWriter::from_config(store, key, &config);
    assert_eq!(reopened.restore(), Some(ReadingPosition { scroll_top: 480.0 }));
}

#[tokio::test(start_paused = true)]
async fn test_explicit_story_id_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFilePositionStore::new(dir.path()));

    let frame = Duration::from_millis(16);
    let a_key = position_key(&content_id(Some("a1"), "x"));
    let b_key = position_key(&content_id(Some("b2"), "x"));
    let a = ThrottledPositionWriter::new(store.clone(), a_key, frame);
    let b = ThrottledPositionWriter::new(store.clone(), b_key, frame);
    a.record(ReadingPosition { scroll_top: 1.0 });
    b.record(ReadingPosition { scroll_top: 2.0 });
    a.flush();
    b.flush();

    let saved = |key: &str| store.load(key).unwrap().map(|p| p.scroll_top);
    assert_eq!(saved("readpos:a1"), Some(1.0));
    assert_eq!(saved("readpos:b2"), Some(2.0));
}

#[test]
fn test_corrupt_position_is_ignored_on_restore() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("readpos%3A9.json"), "{oops").unwrap();
    let store = Arc::new(JsonFilePositionStore::new(dir.path()));

    let writer = ThrottledPositionWriter::new(store, "readpos:9", Duration::from_millis(16));
    assert_eq!(writer.restore(), None);
}
