//! Memo cache with optional time-to-live
//!
//! Entries are immutable once stored. A lookup that finds no entry, or one
//! older than the TTL, computes the value and stores it. Failed computations
//! are never stored.

use crate::cache::Fingerprint;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{PoisonError, RwLock};

/// A memoized value and when it was stored
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub fingerprint: Fingerprint,
    pub value: V,
    pub created_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    pub fn new(fingerprint: Fingerprint, value: V) -> Self {
        Self {
            fingerprint,
            value,
            created_at: Utc::now(),
        }
    }

    /// Checks the entry against a TTL; `None` never expires
    pub fn is_stale(&self, ttl: Option<Duration>) -> bool {
        match ttl {
            Some(ttl) => self.age() > ttl,
            None => false,
        }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.created_at
    }
}

/// Thread-safe fingerprint → value memo
///
/// Shared between the interactive path and the refresh task through an `Arc`.
#[derive(Debug)]
pub struct MemoCache<V> {
    entries: RwLock<HashMap<Fingerprint, CacheEntry<V>>>,
    ttl: Option<Duration>,
}

impl<V: Clone> MemoCache<V> {
    /// Creates an empty cache; `ttl = None` keeps entries forever
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Returns the stored value if present and fresh
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(fingerprint)
            .filter(|entry| !entry.is_stale(self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Stores `value`, replacing any existing entry
    pub fn insert(&self, fingerprint: Fingerprint, value: V) {
        self.insert_entry(CacheEntry::new(fingerprint, value));
    }

    /// Stores a pre-built entry (keeps its `created_at`)
    pub fn insert_entry(&self, entry: CacheEntry<V>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(entry.fingerprint.clone(), entry);
    }

    /// Returns the memoized value or runs `compute` and memoizes its success
    ///
    /// The lock is not held while `compute` runs. If another caller stores a
    /// value for the same fingerprint in the meantime, that value wins and is
    /// returned, so at most one value per fingerprint is ever memoized.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        fingerprint: Fingerprint,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&fingerprint) {
            tracing::debug!("Cache hit for {}", fingerprint);
            return Ok(value);
        }

        tracing::debug!("Cache miss for {}", fingerprint);
        let value = compute().await?;
        Ok(self.store_first(fingerprint, value))
    }

    /// Inserts unless a fresh entry already exists; returns the stored value
    fn store_first(&self, fingerprint: Fingerprint, value: V) -> V {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&fingerprint) {
            Some(existing) if !existing.is_stale(self.ttl) => existing.value.clone(),
            _ => {
                entries.insert(
                    fingerprint.clone(),
                    CacheEntry::new(fingerprint, value.clone()),
                );
                value
            }
        }
    }

    /// Drops every entry
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    /// Number of stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fp(s: &str) -> Fingerprint {
        Fingerprint::for_crawl(s)
    }

    #[tokio::test]
    async fn test_get_or_compute_runs_once() {
        let cache: MemoCache<String> = MemoCache::new(None);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value = cache
                .get_or_compute(fp("seed"), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, std::convert::Infallible>("computed".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "computed");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_fingerprints_compute_separately() {
        let cache: MemoCache<u32> = MemoCache::new(None);
        let a = cache
            .get_or_compute(fp("a"), || async { Ok::<_, ()>(1) })
            .await
            .unwrap();
        let b = cache
            .get_or_compute(fp("b"), || async { Ok::<_, ()>(2) })
            .await
            .unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_memoized() {
        let cache: MemoCache<u32> = MemoCache::new(None);
        let failed = cache
            .get_or_compute(fp("x"), || async { Err::<u32, _>("boom") })
            .await;
        assert_eq!(failed, Err("boom"));
        assert!(cache.is_empty());

        let ok = cache
            .get_or_compute(fp("x"), || async { Ok::<_, &str>(7) })
            .await;
        assert_eq!(ok, Ok(7));
    }

    #[tokio::test]
    async fn test_stale_entry_is_recomputed() {
        let cache: MemoCache<u32> = MemoCache::new(Some(Duration::hours(24)));
        let mut entry = CacheEntry::new(fp("k"), 1);
        entry.created_at = Utc::now() - Duration::hours(25);
        cache.insert_entry(entry);

        assert_eq!(cache.get(&fp("k")), None);
        let value = cache
            .get_or_compute(fp("k"), || async { Ok::<_, ()>(2) })
            .await
            .unwrap();
        assert_eq!(value, 2);
        assert_eq!(cache.get(&fp("k")), Some(2));
    }

    #[test]
    fn test_fresh_entry_within_ttl() {
        let cache: MemoCache<u32> = MemoCache::new(Some(Duration::hours(24)));
        let mut entry = CacheEntry::new(fp("k"), 1);
        entry.created_at = Utc::now() - Duration::hours(23);
        cache.insert_entry(entry);
        assert_eq!(cache.get(&fp("k")), Some(1));
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let mut entry = CacheEntry::new(fp("k"), 1);
        entry.created_at = Utc::now() - Duration::days(3650);
        assert!(!entry.is_stale(None));
    }

    #[test]
    fn test_insert_replaces() {
        let cache: MemoCache<u32> = MemoCache::new(None);
        cache.insert(fp("k"), 1);
        cache.insert(fp("k"), 2);
        assert_eq!(cache.get(&fp("k")), Some(2));
    }

    #[test]
    fn test_clear() {
        let cache: MemoCache<u32> = MemoCache::new(None);
        cache.insert(fp("a"), 1);
        cache.insert(fp("b"), 2);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&fp("a")), None);
    }
}
