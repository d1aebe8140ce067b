//! Tests for get-or-fetch-or-partition lookups.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use mimic::{
    Author, CacheKey, CacheStore, ChannelScope, ExclusionList, FetchConfig, FetchError,
    FetchErrorKind, FileSystemCacheStore, FixedClock, LookupOrigin, Message, MessageHistory,
    MessageSource, PaginatedFetcher,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn msg(id: &str, author: &str, days_ago: i64) -> Message {
    Message::new(
        id,
        format!("text {id}"),
        now() - Duration::days(days_ago),
        Author::new(author, author.to_uppercase()),
    )
}

type Reply = Result<Vec<Message>, FetchError>;

struct ScriptedSource {
    replies: Mutex<VecDeque<Reply>>,
    scope_check: Option<FetchErrorKind>,
    pages: Mutex<usize>,
}

impl ScriptedSource {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            scope_check: None,
            pages: Mutex::new(0),
        }
    }

    fn rejecting(kind: FetchErrorKind) -> Self {
        Self {
            scope_check: Some(kind),
            ..Self::new(Vec::new())
        }
    }

    fn pages(&self) -> usize {
        *self.pages.lock().unwrap()
    }
}

#[async_trait]
impl MessageSource for ScriptedSource {
    async fn fetch_page(
        &self,
        _channel_id: &str,
        _before: Option<&str>,
        _limit: u8,
    ) -> Result<Vec<Message>, FetchError> {
        *self.pages.lock().unwrap() += 1;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn verify_scope(&self, _scope: &ChannelScope) -> Result<(), FetchError> {
        match &self.scope_check {
            Some(kind) => Err(FetchError::new(kind.clone())),
            None => Ok(()),
        }
    }
}

struct Harness {
    _dir: TempDir,
    clock: Arc<FixedClock>,
    store: Arc<FileSystemCacheStore>,
    source: Arc<ScriptedSource>,
    history: MessageHistory,
}

fn harness(source: ScriptedSource, exclusions: ExclusionList) -> Harness {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(now()));
    let store = Arc::new(FileSystemCacheStore::new(dir.path(), Duration::hours(24), clock.clone()).unwrap());
    let source = Arc::new(source);
    let history = MessageHistory::new(
        store.clone(),
        source.clone(),
        PaginatedFetcher::new(FetchConfig::default(), clock.clone()),
        exclusions,
    );
    Harness {
        _dir: dir,
        clock,
        store,
        source,
        history,
    }
}

fn ids(messages: &[Message]) -> Vec<&str> {
    messages.iter().map(|m| m.id().as_str()).collect()
}

#[tokio::test]
async fn test_guild_hit_partitions_into_every_author() {
    let h = harness(ScriptedSource::new(Vec::new()), ExclusionList::default());
    let guild = CacheKey::guild("g", "c", 3);
    h.store
        .put(
            &guild,
            vec![msg("6", "a", 1), msg("5", "b", 2), msg("4", "a", 3), msg("3", "b", 4)],
        )
        .await
        .unwrap();

    let found = h.history.lookup("a", "g", "c", 3).await;

    assert_eq!(found.origin(), &LookupOrigin::GuildCache);
    assert_eq!(ids(found.messages()), vec!["6", "4"]);
    assert_eq!(h.source.pages(), 0);

    let b = h.store.get(&CacheKey::user("b", "g", "c", 3)).await.unwrap().unwrap();
    assert_eq!(ids(b.messages()), vec!["5", "3"]);
    assert!(h.store.get(&CacheKey::user("a", "g", "c", 3)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_user_hit_does_not_touch_source() {
    let h = harness(ScriptedSource::new(Vec::new()), ExclusionList::default());
    h.store
        .put(&CacheKey::user("a", "g", "c", 3), vec![msg("9", "a", 1)])
        .await
        .unwrap();

    let found = h.history.lookup("a", "g", "c", 3).await;

    assert_eq!(found.origin(), &LookupOrigin::UserCache);
    assert_eq!(ids(found.messages()), vec!["9"]);
    assert_eq!(h.source.pages(), 0);
}

#[tokio::test]
async fn test_miss_fetches_whole_channel_and_caches_it() {
    let source = ScriptedSource::new(vec![
        Ok(vec![msg("3", "a", 1), msg("2", "b", 2), msg("1", "a", 3)]),
        Ok(Vec::new()),
    ]);
    let h = harness(source, ExclusionList::default());

    let found = h.history.lookup("a", "g", "c", 3).await;

    assert_eq!(found.origin(), &LookupOrigin::Fetched);
    assert_eq!(ids(found.messages()), vec!["3", "1"]);
    assert_eq!(h.source.pages(), 2);

    let guild = h.store.get(&CacheKey::guild("g", "c", 3)).await.unwrap().unwrap();
    assert_eq!(guild.message_count(), 3);

    // Another author in the same channel is now served without fetching
    let other = h.history.lookup("b", "g", "c", 3).await;
    assert_eq!(other.origin(), &LookupOrigin::UserCache);
    assert_eq!(ids(other.messages()), vec!["2"]);
    assert_eq!(h.source.pages(), 2);
}

#[tokio::test]
async fn test_silent_user_gets_empty_success() {
    let source = ScriptedSource::new(vec![Ok(vec![msg("1", "b", 1)]), Ok(Vec::new())]);
    let h = harness(source, ExclusionList::default());

    let found = h.history.lookup("a", "g", "c", 3).await;

    assert_eq!(found.origin(), &LookupOrigin::Fetched);
    assert!(found.messages().is_empty());
    assert!(!found.is_unreachable());
}

#[tokio::test]
async fn test_expired_entries_trigger_one_fresh_fetch() {
    let source = ScriptedSource::new(vec![Ok(vec![msg("7", "a", 1)]), Ok(Vec::new())]);
    let h = harness(source, ExclusionList::default());
    h.store
        .put(&CacheKey::user("a", "g", "c", 3), vec![msg("old", "a", 2)])
        .await
        .unwrap();
    h.clock.advance(Duration::hours(24));

    let found = h.history.lookup("a", "g", "c", 3).await;

    assert_eq!(found.origin(), &LookupOrigin::Fetched);
    assert_eq!(ids(found.messages()), vec!["7"]);
    assert_eq!(h.source.pages(), 2);
}

#[tokio::test]
async fn test_excluded_user_short_circuits() {
    let source = ScriptedSource::new(vec![Ok(vec![msg("1", "a", 1)])]);
    let h = harness(source, ExclusionList::new(["a"]));

    let found = h.history.lookup("a", "g", "c", 3).await;

    assert_eq!(found.origin(), &LookupOrigin::Excluded);
    assert!(found.messages().is_empty());
    assert_eq!(h.source.pages(), 0);
}

#[tokio::test]
async fn test_excluded_authors_never_reach_the_cache() {
    let source = ScriptedSource::new(vec![
        Ok(vec![msg("3", "a", 1), msg("2", "bot", 2)]),
        Ok(Vec::new()),
    ]);
    let h = harness(source, ExclusionList::new(["bot"]));

    h.history.lookup("a", "g", "c", 3).await;

    let guild = h.store.get(&CacheKey::guild("g", "c", 3)).await.unwrap().unwrap();
    assert_eq!(ids(guild.messages()), vec!["3"]);
    assert!(h.store.get(&CacheKey::user("bot", "g", "c", 3)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unreachable_channel_is_distinguishable() {
    let h = harness(
        ScriptedSource::rejecting(FetchErrorKind::ScopeNotFound("channel c".into())),
        ExclusionList::default(),
    );

    let found = h.history.lookup("a", "g", "c", 3).await;

    assert!(found.is_unreachable());
    assert!(found.messages().is_empty());
    assert_eq!(h.source.pages(), 0);
    assert!(h.store.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreadable_first_page_is_unreachable() {
    let source = ScriptedSource::new(vec![Err(FetchError::new(FetchErrorKind::ScopeNotFound(
        "channel c".into(),
    )))]);
    let h = harness(source, ExclusionList::default());

    let found = h.history.lookup("a", "g", "c", 3).await;

    assert!(found.is_unreachable());
    assert!(h.store.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_interrupted_fetch_returns_partial_without_caching() {
    let source = ScriptedSource::new(vec![
        Ok(vec![msg("3", "a", 1), msg("2", "b", 2)]),
        Err(FetchError::new(FetchErrorKind::Transient("timeout".into()))),
    ]);
    let h = harness(source, ExclusionList::default());

    let found = h.history.lookup("a", "g", "c", 3).await;

    assert!(matches!(found.origin(), LookupOrigin::Partial(_)));
    assert_eq!(ids(found.messages()), vec!["3"]);
    assert!(h.store.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sample_contents_skips_blank_and_caps() {
    let h = harness(ScriptedSource::new(Vec::new()), ExclusionList::default());
    let blank = Message::new("4", "   ", now(), Author::new("a", "A"));
    h.store
        .put(
            &CacheKey::user("a", "g", "c", 3),
            vec![msg("5", "a", 1), blank, msg("3", "a", 2), msg("2", "a", 3)],
        )
        .await
        .unwrap();

    let found = h.history.lookup("a", "g", "c", 3).await;

    assert_eq!(found.sample_contents(2), vec!["text 5", "text 3"]);
    assert_eq!(found.sample_contents(100).len(), 3);
}
