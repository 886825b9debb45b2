//! In-process TTL cache.
//!
//! # Invariants
//! - Expired entries are never returned. Reads drop the expired key they
//!   hit; writes sweep every expired entry, so keys that are never read
//!   again do not outlive the next `set`.
//! - All operations are safe to call from multiple threads.

use crate::cache::{CacheError, CacheResult, CacheStore};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Thread-safe in-memory `CacheStore`.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .map(|entries| entries.values().filter(|entry| entry.expires_at > now).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> CacheResult<MutexGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Unavailable("memory cache lock poisoned".to_string()))
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = self.lock()?;
        match entries.get(key) {
            None => return Ok(None),
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => {}
        }
        entries.remove(key);
        Ok(None)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| CacheError::Unavailable(format!("ttl {ttl:?} overflows clock")))?;
        let mut entries = self.lock()?;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn delete_pattern(&self, pattern: &str) -> CacheResult<usize> {
        let matcher =
            Regex::new(pattern).map_err(|err| CacheError::InvalidPattern(err.to_string()))?;
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|key, _| !matcher.is_match(key));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryCache;
    use crate::cache::{CacheError, CacheStore};
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn set_get_delete() {
        let cache = MemoryCache::new();
        cache.set("progress:goal:1", "{}", TTL).unwrap();
        assert_eq!(cache.get("progress:goal:1").unwrap().as_deref(), Some("{}"));

        cache.delete("progress:goal:1").unwrap();
        assert!(cache.get("progress:goal:1").unwrap().is_none());
        cache.delete("progress:goal:1").unwrap();
    }

    #[test]
    fn expired_entries_are_absent() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Duration::ZERO).unwrap();
        assert!(cache.get("k").unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn writes_sweep_expired_entries_that_are_never_read() {
        let cache = MemoryCache::new();
        for index in 0..1000 {
            cache
                .set(&format!("tasks:u1:page-{index}"), "[]", Duration::ZERO)
                .unwrap();
        }
        cache.set("progress:goal:1", "{}", TTL).unwrap();

        let stored = cache.entries.lock().unwrap().len();
        assert_eq!(stored, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn delete_pattern_removes_only_matches() {
        let cache = MemoryCache::new();
        cache.set("tasks:u1:a", "1", TTL).unwrap();
        cache.set("tasks:u1:b", "2", TTL).unwrap();
        cache.set("tasks:u2:a", "3", TTL).unwrap();

        let removed = cache.delete_pattern("^tasks:u1:").unwrap();
        assert_eq!(removed, 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("tasks:u2:a").unwrap().is_some());
    }

    #[test]
    fn delete_pattern_rejects_invalid_regex() {
        let cache = MemoryCache::new();
        let err = cache.delete_pattern("tasks:(").unwrap_err();
        assert!(matches!(err, CacheError::InvalidPattern(_)));
    }
}
