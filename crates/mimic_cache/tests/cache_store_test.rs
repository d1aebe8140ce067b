//! Tests for the filesystem cache store.

use chrono::{DateTime, Duration, TimeZone, Utc};
use mimic_cache::{CacheStore, FileSystemCacheStore, file_name};
use mimic_core::{Author, CacheKey, FixedClock, Message};
use std::sync::Arc;
use tempfile::TempDir;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn store(dir: &TempDir, clock: Arc<FixedClock>) -> FileSystemCacheStore {
    FileSystemCacheStore::new(dir.path(), Duration::hours(24), clock).unwrap()
}

fn message(id: &str, author: &str, minutes_ago: i64) -> Message {
    Message::new(
        id,
        format!("message {id}"),
        start() - Duration::minutes(minutes_ago),
        Author::new(author, format!("name-{author}")),
    )
}

#[tokio::test]
async fn test_put_then_get_returns_same_messages() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = store(&dir, clock.clone());

    let key = CacheKey::guild("1", "2", 3);
    let messages = vec![message("30", "a", 1), message("20", "b", 2), message("10", "a", 3)];

    let written = store.put(&key, messages.clone()).await.unwrap();
    assert_eq!(*written.fetched_at(), start());

    clock.advance(Duration::hours(23));
    let entry = store.get(&key).await.unwrap().unwrap();
    assert_eq!(entry.messages(), &messages);
    assert_eq!(entry.key(), &key);
}

#[tokio::test]
async fn test_expired_entry_reads_like_missing_entry() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = store(&dir, clock.clone());

    let key = CacheKey::guild("1", "2", 3);
    store.put(&key, vec![message("1", "a", 0)]).await.unwrap();

    clock.advance(Duration::hours(24));
    assert!(store.get(&key).await.unwrap().is_none());
    assert!(store.get(&CacheKey::guild("1", "2", 6)).await.unwrap().is_none());

    // Expired entries are not deleted eagerly.
    assert!(store.path_for(&key).exists());
    assert!(store.load(&key).await.unwrap().is_some());
}

#[tokio::test]
async fn test_put_overwrites_previous_entry() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = store(&dir, clock.clone());

    let key = CacheKey::guild("1", "2", 3);
    store.put(&key, vec![message("1", "a", 0)]).await.unwrap();
    clock.advance(Duration::hours(30));
    store.put(&key, vec![message("2", "b", 0)]).await.unwrap();

    let entry = store.get(&key).await.unwrap().unwrap();
    assert_eq!(entry.message_count(), 1);
    assert_eq!(entry.messages()[0].id(), "2");
    assert_eq!(*entry.fetched_at(), start() + Duration::hours(30));
}

#[tokio::test]
async fn test_file_layout_is_human_readable() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = store(&dir, clock);

    let key = CacheKey::user("7", "1", "2", 3);
    store.put(&key, vec![message("5", "7", 0)]).await.unwrap();

    let path = dir.path().join("user_7_guild_1_channel_2_3m.json");
    assert_eq!(path, store.path_for(&key));
    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();

    assert_eq!(json["fetchDate"], "2024-06-01T12:00:00Z");
    assert_eq!(json["guildId"], "1");
    assert_eq!(json["channelId"], "2");
    assert_eq!(json["timeSpanMonths"], 3);
    assert_eq!(json["userId"], "7");
    assert_eq!(json["messageCount"], 1);
    assert_eq!(json["messages"][0]["author"]["id"], "7");
    assert_eq!(json["messages"][0]["author"]["displayName"], "name-7");

    // No temp files are left behind.
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec![file_name(&key)]);
}

#[tokio::test]
async fn test_corrupted_entry_is_a_miss() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = store(&dir, clock);

    let key = CacheKey::guild("1", "2", 3);
    std::fs::write(store.path_for(&key), b"{ \"fetchDate\": ").unwrap();
    assert!(store.get(&key).await.unwrap().is_none());

    // A valid file stored under the wrong name is also rejected.
    let other = CacheKey::guild("9", "2", 3);
    store.put(&other, vec![message("1", "a", 0)]).await.unwrap();
    std::fs::copy(store.path_for(&other), store.path_for(&key)).unwrap();
    assert!(store.get(&key).await.unwrap().is_none());

    // Recovery is a plain overwrite.
    store.put(&key, vec![message("2", "b", 0)]).await.unwrap();
    assert!(store.get(&key).await.unwrap().is_some());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_failed_temp_write_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = store(&dir, clock);

    // The first temp file of this store points at a device that rejects writes.
    let key = CacheKey::guild("1", "2", 3);
    let temp = dir
        .path()
        .join(format!("{}.{}.0.tmp", file_name(&key), std::process::id()));
    std::os::unix::fs::symlink("/dev/full", &temp).unwrap();

    assert!(store.put(&key, vec![message("1", "a", 0)]).await.is_err());
    assert!(std::fs::symlink_metadata(&temp).is_err());
    assert!(!store.path_for(&key).exists());
}

#[tokio::test]
async fn test_user_entry_rejects_foreign_authors() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = store(&dir, clock);

    let key = CacheKey::user("7", "1", "2", 3);
    let result = store.put(&key, vec![message("1", "8", 0)]).await;
    assert!(result.is_err());
    assert!(!store.path_for(&key).exists());
}

#[tokio::test]
async fn test_legacy_entry_with_username_is_readable() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = store(&dir, clock);

    let key = CacheKey::guild("1", "2", 3);
    let legacy = r#"{
      "fetchDate": "2024-06-01T10:00:00.000Z",
      "guildId": "1",
      "channelId": "2",
      "timeSpanMonths": 3,
      "messageCount": 1,
      "messages": [
        {
          "id": "100",
          "content": "hello",
          "createdAt": "2024-05-30T08:00:00.000Z",
          "author": { "id": "42", "username": "ada" }
        }
      ]
    }"#;
    std::fs::write(store.path_for(&key), legacy).unwrap();

    let entry = store.get(&key).await.unwrap().unwrap();
    assert_eq!(entry.messages()[0].author().display_name(), "ada");
}

#[tokio::test]
async fn test_keys_lists_entries_and_skips_other_files() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = store(&dir, clock);

    let guild = CacheKey::guild("1", "2", 3);
    let user = CacheKey::user("7", "1", "2", 3);
    store.put(&guild, vec![]).await.unwrap();
    store.put(&user, vec![]).await.unwrap();
    std::fs::write(dir.path().join("README.txt"), b"notes").unwrap();

    let mut keys = store.keys().await.unwrap();
    keys.sort();
    let mut expected = vec![guild, user];
    expected.sort();
    assert_eq!(keys, expected);
}

#[tokio::test]
async fn test_remove_reports_whether_anything_was_deleted() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = store(&dir, clock);

    let key = CacheKey::guild("1", "2", 3);
    store.put(&key, vec![]).await.unwrap();
    assert!(store.remove(&key).await.unwrap());
    assert!(!store.remove(&key).await.unwrap());
}

#[tokio::test]
async fn test_concurrent_puts_leave_one_whole_entry() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let store = Arc::new(store(&dir, clock));
    let key = CacheKey::guild("1", "2", 3);

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        let key = key.clone();
        handles.push(tokio::spawn(async move {
            let messages = (0..50)
                .map(|j| message(&format!("{i}-{j}"), "a", j))
                .collect();
            store.put(&key, messages).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let entry = store.get(&key).await.unwrap().unwrap();
    assert_eq!(entry.message_count(), 50);
}
