//! Key-value TTL cache port and implementations.
//!
//! # Responsibility
//! - Define the cache collaborator the cascade engine invalidates.
//! - Provide an in-process TTL cache and a cache-aside progress reader.
//!
//! # Invariants
//! - The cache is never the source of truth; a miss or stale entry can only
//!   cost a re-read, never corrupt persisted progress.
//! - Cache failures are reported as `CacheError` and are best-effort for
//!   every caller in this crate.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub mod cached_reader;
pub mod keys;
pub mod memory;

pub type CacheResult<T> = Result<T, CacheError>;

/// Errors from cache operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// `delete_pattern` received an invalid regular expression.
    InvalidPattern(String),
    /// Backend cannot serve the request right now.
    Unavailable(String),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPattern(message) => write!(f, "invalid cache key pattern: {message}"),
            Self::Unavailable(message) => write!(f, "cache unavailable: {message}"),
        }
    }
}

impl Error for CacheError {}

/// Key-value cache with per-entry time-to-live.
pub trait CacheStore: Send + Sync {
    /// Returns the live value for `key`, or `None` when absent or expired.
    fn get(&self, key: &str) -> CacheResult<Option<String>>;
    fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;
    /// Removes `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> CacheResult<()>;
    /// Removes every key matching the regular expression `pattern` and
    /// returns how many entries were removed.
    fn delete_pattern(&self, pattern: &str) -> CacheResult<usize>;
}
