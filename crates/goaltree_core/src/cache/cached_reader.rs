//! Cache-aside decorator for progress reads.
//!
//! # Responsibility
//! - Serve committed progress snapshots from the cache when present.
//! - Fill the cache from the wrapped reader on miss.
//!
//! # Invariants
//! - This type is just another `ProgressReader`; callers choose it by
//!   composition, the wrapped reader is unaware of it.
//! - Cache failures and undecodable entries fall through to the wrapped
//!   reader and are logged, never returned.
//! - A filled entry is kept only if the row version is unchanged after the
//!   fill. A cascade committing between the read and the `set` has already
//!   run its invalidation, so the stale entry is dropped here instead of
//!   living for the whole TTL.

use crate::cache::keys::progress_cache_key;
use crate::cache::CacheStore;
use crate::model::snapshot::{ProgressKey, ProgressSnapshot};
use crate::repo::error::RepoResult;
use crate::repo::progress_repo::ProgressReader;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

pub struct CachedProgressReader<R: ProgressReader> {
    inner: R,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl<R: ProgressReader> CachedProgressReader<R> {
    pub fn new(inner: R, cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    fn cached(&self, key: ProgressKey, cache_key: &str) -> Option<ProgressSnapshot> {
        let raw = match self.cache.get(cache_key) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(
                    "event=cache_read module=cache status=error key={} error={}",
                    cache_key, err
                );
                return None;
            }
        };

        match serde_json::from_str::<ProgressSnapshot>(&raw) {
            Ok(snapshot) if snapshot.key == key => Some(snapshot),
            Ok(_) => {
                warn!("event=cache_read module=cache status=key_mismatch key={cache_key}");
                None
            }
            Err(err) => {
                warn!(
                    "event=cache_read module=cache status=decode_error key={} error={}",
                    cache_key, err
                );
                None
            }
        }
    }

    fn fill(&self, cache_key: &str, snapshot: &ProgressSnapshot) {
        let raw = match serde_json::to_string(snapshot) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "event=cache_fill module=cache status=encode_error key={} error={}",
                    cache_key, err
                );
                return;
            }
        };
        if let Err(err) = self.cache.set(cache_key, &raw, self.ttl) {
            warn!(
                "event=cache_fill module=cache status=error key={} error={}",
                cache_key, err
            );
            return;
        }

        let current_version = match self.inner.read_progress(snapshot.key) {
            Ok(current) => current.map(|current| current.version),
            Err(err) => {
                warn!(
                    "event=cache_fill module=cache status=verify_error key={} error={}",
                    cache_key, err
                );
                None
            }
        };
        if current_version == Some(snapshot.version) {
            return;
        }
        debug!(
            "event=cache_fill module=cache status=stale key={} filled_version={} current_version={:?}",
            cache_key, snapshot.version, current_version
        );
        if let Err(err) = self.cache.delete(cache_key) {
            warn!(
                "event=cache_fill module=cache status=error key={} error={}",
                cache_key, err
            );
        }
    }
}

impl<R: ProgressReader> ProgressReader for CachedProgressReader<R> {
    fn read_progress(&self, key: ProgressKey) -> RepoResult<Option<ProgressSnapshot>> {
        let cache_key = progress_cache_key(key);
        if let Some(snapshot) = self.cached(key, &cache_key) {
            return Ok(Some(snapshot));
        }

        let snapshot = self.inner.read_progress(key)?;
        if let Some(snapshot) = &snapshot {
            self.fill(&cache_key, snapshot);
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::CachedProgressReader;
    use crate::cache::keys::progress_cache_key;
    use crate::cache::memory::MemoryCache;
    use crate::cache::CacheStore;
    use crate::model::progress::Progress;
    use crate::model::snapshot::{ProgressKey, ProgressSnapshot};
    use crate::repo::error::RepoResult;
    use crate::repo::progress_repo::ProgressReader;
    use std::cell::Cell;
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;

    const TTL: Duration = Duration::from_secs(60);

    /// Returns `versions[n]` on the n-th read, repeating the last one.
    struct ScriptedReader {
        versions: Vec<i64>,
        reads: Cell<usize>,
    }

    impl ScriptedReader {
        fn new(versions: &[i64]) -> Self {
            Self {
                versions: versions.to_vec(),
                reads: Cell::new(0),
            }
        }
    }

    impl ProgressReader for ScriptedReader {
        fn read_progress(&self, key: ProgressKey) -> RepoResult<Option<ProgressSnapshot>> {
            let index = self.reads.get().min(self.versions.len() - 1);
            self.reads.set(self.reads.get() + 1);
            let version = self.versions[index];
            Ok(Some(ProgressSnapshot {
                key,
                progress: Progress::clamped(version * 10),
                achieved: false,
                version,
            }))
        }
    }

    #[test]
    fn fill_is_kept_when_row_did_not_move() {
        let cache = Arc::new(MemoryCache::new());
        let key = ProgressKey::Goal(Uuid::new_v4());
        let reader = CachedProgressReader::new(ScriptedReader::new(&[3]), cache.clone(), TTL);

        let first = reader.read_progress(key).unwrap().unwrap();
        let second = reader.read_progress(key).unwrap().unwrap();

        assert_eq!(first, second);
        assert!(cache.get(&progress_cache_key(key)).unwrap().is_some());
        // miss + verify, then a hit
        assert_eq!(reader.inner.reads.get(), 2);
    }

    #[test]
    fn fill_racing_a_committed_cascade_is_dropped() {
        let cache = Arc::new(MemoryCache::new());
        let key = ProgressKey::Action(Uuid::new_v4());
        let reader = CachedProgressReader::new(ScriptedReader::new(&[1, 2]), cache.clone(), TTL);

        let stale = reader.read_progress(key).unwrap().unwrap();

        assert_eq!(stale.version, 1);
        assert_eq!(cache.get(&progress_cache_key(key)).unwrap(), None);
        let fresh = reader.read_progress(key).unwrap().unwrap();
        assert_eq!(fresh.version, 2);
    }
}
