//! Time-bounded memoization for catalog reads
//!
//! Entries are keyed by an operation name plus the *names* of the entities
//! involved, never by object identity: artists and songs are rebuilt from
//! markup on every page, so two distinct `Artist` values named "Masih" must hit
//! the same entry.
//!
//! Expiry is fixed at insertion (not sliding). When the cache is full, expired
//! entries go first, then the least recently used one.
//!
//! Concurrent callers that miss on the same key both run their producer and the
//! last write wins. Results are deterministic for a given key, so the duplicate
//! fetch only costs bandwidth.

use crate::error::Result;
use crate::types::{Artist, Song};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Something that can appear in a cache key
pub trait CacheKeyPart {
    /// Normalized string form used for hashing
    fn key_part(&self) -> String;
}

impl CacheKeyPart for Artist {
    fn key_part(&self) -> String {
        self.name().to_string()
    }
}

impl CacheKeyPart for Song {
    fn key_part(&self) -> String {
        self.name().to_string()
    }
}

impl CacheKeyPart for str {
    fn key_part(&self) -> String {
        self.to_string()
    }
}

impl CacheKeyPart for String {
    fn key_part(&self) -> String {
        self.clone()
    }
}

impl CacheKeyPart for u32 {
    fn key_part(&self) -> String {
        self.to_string()
    }
}

impl<T: CacheKeyPart + ?Sized> CacheKeyPart for &T {
    fn key_part(&self) -> String {
        (**self).key_part()
    }
}

/// Normalized cache key: operation name plus argument tuple
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: &'static str,
    args: Vec<String>,
}

impl CacheKey {
    /// Start a key for `operation` with no arguments
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            args: Vec::new(),
        }
    }

    /// Append one normalized argument
    #[must_use]
    pub fn arg<P: CacheKeyPart + ?Sized>(mut self, part: &P) -> Self {
        self.args.push(part.key_part());
        self
    }
}

/// Build a [`CacheKey`] from an operation name and its arguments
///
/// ```
/// use musicfa_dl::cache_key;
/// use musicfa_dl::types::Artist;
///
/// let a = Artist::new("Masih", "https://music-fa.com/artist/masih/");
/// let b = Artist::new("Masih", "https://example.org/elsewhere/");
/// assert_eq!(cache_key!("artist_page", a, 2u32), cache_key!("artist_page", b, 2u32));
/// ```
#[macro_export]
macro_rules! cache_key {
    ($operation:expr $(, $arg:expr)* $(,)?) => {
        $crate::cache::CacheKey::new($operation)$(.arg(&$arg))*
    };
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    expires_at: Instant,
    last_used: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<CacheKey, Entry>,
    clock: u64,
    hits: u64,
    misses: u64,
}

/// Hit/miss counters and current size
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that ran the producer
    pub misses: u64,
    /// Live entries (expired ones may linger until evicted)
    pub entries: usize,
}

/// TTL + LRU cache shared by every catalog operation
pub struct CatalogCache {
    ttl: Duration,
    capacity: usize,
    inner: Mutex<Inner>,
}

impl CatalogCache {
    /// Create a cache with a fixed time-to-live and a maximum entry count
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Entries stay consistent even if a holder panicked mid-lookup
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a live entry of type `T`, refreshing its recency
    pub fn get<T>(&self, key: &CacheKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = Instant::now();
        let mut inner = self.lock();
        inner.clock += 1;
        let tick = inner.clock;

        let found = match inner.entries.get_mut(key) {
            Some(entry) if entry.expires_at > now => {
                entry.last_used = tick;
                entry.value.downcast_ref::<T>().cloned()
            }
            Some(_) => {
                trace!(?key, "Cache entry expired");
                inner.entries.remove(key);
                None
            }
            None => None,
        };

        if found.is_some() {
            inner.hits += 1;
        } else {
            inner.misses += 1;
        }
        found
    }

    /// Whether a live entry exists, without touching recency or counters
    pub fn contains(&self, key: &CacheKey) -> bool {
        let now = Instant::now();
        self.lock()
            .entries
            .get(key)
            .is_some_and(|entry| entry.expires_at > now)
    }

    /// Store a value, evicting if the cache is full
    pub fn insert<T>(&self, key: CacheKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        let now = Instant::now();
        let mut inner = self.lock();
        inner.clock += 1;
        let tick = inner.clock;

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            Self::evict_one(&mut inner, now);
        }

        inner.entries.insert(
            key,
            Entry {
                value: Arc::new(value),
                expires_at: now + self.ttl,
                last_used: tick,
            },
        );
    }

    fn evict_one(inner: &mut Inner, now: Instant) {
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| entry.expires_at > now);
        if inner.entries.len() < before {
            debug!(evicted = before - inner.entries.len(), "Evicted expired cache entries");
            return;
        }

        let oldest = inner
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            debug!(?key, "Evicted least recently used cache entry");
            inner.entries.remove(&key);
        }
    }

    /// Return the cached value for `key`, or run `producer` and cache its result
    ///
    /// The lock is not held while the producer runs. Errors are returned as-is and
    /// nothing is cached for them.
    pub async fn get_or_compute<T, F, Fut>(&self, key: CacheKey, producer: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get::<T>(&key) {
            trace!(?key, "Cache hit");
            return Ok(value);
        }

        trace!(?key, "Cache miss");
        let value = producer().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Number of stored entries (including expired ones not yet evicted)
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of hit/miss counters
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.entries.len(),
        }
    }
}
