//! In-memory result cache for the search → fetch workflow.
//!
//! A search hands out short ids instead of full payloads; the mapping from id to
//! result metadata lives here for a bounded window. Entries are:
//!
//! - Keyed by [`compute_result_id`], so identical results collapse to one entry
//! - Visible only while `now - inserted_at <= ttl`, checked on every lookup
//! - Reclaimed by opportunistic sweeps piggybacked on `put`

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::hash::compute_result_id;

/// A search result remembered between the search and fetch calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    pub snippet: Option<String>,
    /// Rank within the originating result set (0 if unknown).
    pub position: u32,
    /// Originating search query.
    pub query: String,
    pub inserted_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.inserted_at > ttl
    }
}

#[derive(Debug)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    last_sweep: DateTime<Utc>,
}

/// Thread-safe TTL cache from result id to [`CacheEntry`].
#[derive(Debug)]
pub struct ResultCache {
    inner: Mutex<Inner>,
    ttl: Duration,
    sweep_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    /// Create a cache using the wall clock.
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        Self::with_clock(ttl, sweep_interval, Arc::new(SystemClock))
    }

    /// Create a cache reading time from `clock`.
    pub fn with_clock(ttl: Duration, sweep_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        let last_sweep = clock.now();
        Self { inner: Mutex::new(Inner { entries: HashMap::new(), last_sweep }), ttl, sweep_interval, clock }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Remember a search result and return its id.
    ///
    /// Overwrites any entry with the same id, refreshing its timestamp. Runs a
    /// sweep first when `sweep_interval` has passed since the last one.
    pub fn put(&self, url: &str, position: u32, query: &str, title: Option<&str>, snippet: Option<&str>) -> String {
        let id = compute_result_id(url, position, query);
        let now = self.clock.now();
        let entry = CacheEntry {
            id: id.clone(),
            url: url.to_string(),
            title: title.map(str::to_string),
            snippet: snippet.map(str::to_string),
            position,
            query: query.to_string(),
            inserted_at: now,
        };

        let mut inner = self.lock();
        if now - inner.last_sweep >= self.sweep_interval {
            let removed = Self::sweep_locked(&mut inner, now, self.ttl);
            if removed > 0 {
                tracing::debug!(removed, remaining = inner.entries.len(), "swept expired result cache entries");
            }
        }
        inner.entries.insert(id.clone(), entry);

        id
    }

    /// Look up a live entry.
    ///
    /// Expired entries are reported as missing whether or not a sweep has run.
    pub fn get(&self, id: &str) -> Option<CacheEntry> {
        let now = self.clock.now();
        self.lock()
            .entries
            .get(id)
            .filter(|entry| !entry.is_expired(now, self.ttl))
            .cloned()
    }

    /// Remove every entry older than the TTL at `now`.
    ///
    /// Returns the number of removed entries.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut inner = self.lock();
        Self::sweep_locked(&mut inner, now, self.ttl)
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sweep_locked(inner: &mut Inner, now: DateTime<Utc>, ttl: Duration) -> usize {
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired(now, ttl));
        inner.last_sweep = now;
        before - inner.entries.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Critical sections never panic mid-update, so a poisoned map is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;

    fn test_cache(ttl_secs: i64, sweep_secs: i64) -> (ResultCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = ResultCache::with_clock(Duration::seconds(ttl_secs), Duration::seconds(sweep_secs), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_put_then_get() {
        let (cache, clock) = test_cache(60, 10);
        let id = cache.put(
            "https://example.com/tools",
            2,
            "site ranking tools",
            Some("Ranking Tools"),
            Some("Compare rank trackers"),
        );

        let entry = cache.get(&id).expect("entry should be present");
        assert_eq!(entry.id, id);
        assert_eq!(entry.url, "https://example.com/tools");
        assert_eq!(entry.position, 2);
        assert_eq!(entry.query, "site ranking tools");
        assert_eq!(entry.title.as_deref(), Some("Ranking Tools"));
        assert_eq!(entry.snippet.as_deref(), Some("Compare rank trackers"));
        assert_eq!(entry.inserted_at, clock.now());
    }

    #[test]
    fn test_put_is_idempotent() {
        let (cache, clock) = test_cache(60, 10);
        let first = cache.put("https://example.com", 1, "seo", Some("Old"), None);
        clock.advance(Duration::seconds(5));
        let second = cache.put("https://example.com", 1, "seo", Some("New"), None);

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        let entry = cache.get(&first).unwrap();
        assert_eq!(entry.title.as_deref(), Some("New"));
        assert_eq!(entry.inserted_at, clock.now());
    }

    #[test]
    fn test_get_unknown_id() {
        let (cache, _clock) = test_cache(60, 10);
        assert!(cache.get("fs_0000000000000000").is_none());
    }

    #[test]
    fn test_get_expires_without_sweep() {
        let (cache, clock) = test_cache(60, 3600);
        let id = cache.put("https://example.com", 1, "seo", None, None);

        clock.advance(Duration::seconds(60));
        assert!(cache.get(&id).is_some(), "entry at exactly ttl is still live");

        clock.advance(Duration::seconds(1));
        assert!(cache.get(&id).is_none());
        assert_eq!(cache.len(), 1, "lookup must not depend on a sweep");
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let (cache, clock) = test_cache(60, 3600);
        let start = clock.now();
        let old = cache.put("https://old.example.com", 1, "seo", None, None);
        clock.advance(Duration::seconds(30));
        let fresh = cache.put("https://fresh.example.com", 1, "seo", None, None);

        let removed = cache.sweep(start + Duration::seconds(61));
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);

        clock.set(start + Duration::seconds(61));
        assert!(cache.get(&old).is_none());
        assert!(cache.get(&fresh).is_some());
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let (cache, clock) = test_cache(60, 3600);
        cache.put("https://example.com", 1, "seo", None, None);
        let later = clock.now() + Duration::seconds(120);

        assert_eq!(cache.sweep(later), 1);
        assert_eq!(cache.sweep(later), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_triggers_sweep_after_interval() {
        let (cache, clock) = test_cache(60, 30);
        cache.put("https://expired.example.com", 1, "seo", None, None);

        clock.advance(Duration::seconds(61));
        let id = cache.put("https://fresh.example.com", 1, "seo", None, None);

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&id).is_some());
    }

    #[test]
    fn test_put_skips_sweep_within_interval() {
        let (cache, clock) = test_cache(10, 3600);
        cache.put("https://expired.example.com", 1, "seo", None, None);

        clock.advance(Duration::seconds(20));
        cache.put("https://fresh.example.com", 1, "seo", None, None);

        assert_eq!(cache.len(), 2, "expired entry lingers until the next sweep");
    }

    #[test]
    fn test_entry_serializes() {
        let (cache, _clock) = test_cache(60, 10);
        let id = cache.put("https://example.com", 1, "seo", Some("Example"), None);
        let json = serde_json::to_value(cache.get(&id).unwrap()).unwrap();
        assert_eq!(json["id"], id);
        assert_eq!(json["url"], "https://example.com");
        assert!(json["snippet"].is_null());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_share_ids() {
        let (cache, _clock) = test_cache(60, 1);
        let cache = Arc::new(cache);

        let mut handles = Vec::new();
        for worker in 0..8u32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                (0..50u32)
                    .map(|i| cache.put(&format!("https://example.com/{}", i % 10), i % 10, "seo", None, None))
                    .inspect(|id| assert!(cache.get(id).is_some(), "worker {worker} lost {id}"))
                    .count()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 50);
        }
        assert_eq!(cache.len(), 10);
    }
}
