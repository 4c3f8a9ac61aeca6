//! Caption caching with LRU eviction and a time-to-live.
//!
//! Loading a caption can hit the disk and run tag filters and rules, and a
//! continuous resize re-lays out every visible cell many times per second.
//! Entries older than the TTL are reloaded so edits made outside the
//! gallery show up without an explicit invalidation.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::error::Result;

/// Default number of cached captions.
pub const DEFAULT_CAPTION_CAPACITY: usize = 400;

/// Default age after which a cached caption is reloaded.
pub const DEFAULT_CAPTION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
struct CachedCaption {
    text: Arc<str>,
    inserted: Instant,
}

/// Bounded caption cache keyed by file path.
pub struct CaptionCache {
    entries: Mutex<LruCache<PathBuf, CachedCaption>>,
    ttl: Duration,
}

impl CaptionCache {
    /// Creates a cache holding at most `capacity` captions (at least one).
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the caption for `path`, calling `loader` on a miss or when the
    /// cached value is older than the TTL.
    ///
    /// Loader errors and missing captions both produce an empty caption; the
    /// renderer falls back to the file name. The lock is not held while the
    /// loader runs.
    pub fn get<F>(&self, path: &Path, now: Instant, loader: F) -> Arc<str>
    where
        F: FnOnce(&Path) -> Result<Option<String>>,
    {
        {
            let mut entries = self.entries.lock();
            if let Some(entry) = entries.get(path) {
                if now.saturating_duration_since(entry.inserted) < self.ttl {
                    trace!(?path, "Caption cache hit");
                    return Arc::clone(&entry.text);
                }
                trace!(?path, "Caption expired, reloading");
            }
        }

        let text: Arc<str> = match loader(path) {
            Ok(Some(text)) => text.into(),
            Ok(None) => Arc::from(""),
            Err(e) => {
                warn!(?path, error = %e, "Failed to load caption");
                Arc::from("")
            }
        };

        let entry = CachedCaption {
            text: Arc::clone(&text),
            inserted: now,
        };
        if let Some((evicted, _)) = self.entries.lock().push(path.to_path_buf(), entry) {
            if evicted != path {
                trace!(?evicted, "Evicted caption");
            }
        }
        text
    }

    /// Returns the cached caption without touching LRU order or checking age.
    pub fn peek(&self, path: &Path) -> Option<Arc<str>> {
        self.entries
            .lock()
            .peek(path)
            .map(|entry| Arc::clone(&entry.text))
    }

    /// Drops the caption for one file, e.g. after it was edited and saved.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.entries.lock().pop(path).is_some()
    }

    /// Drops every entry older than the TTL. Returns how many were removed.
    pub fn prune_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let expired: Vec<PathBuf> = entries
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.inserted) >= self.ttl)
            .map(|(path, _)| path.clone())
            .collect();
        for path in &expired {
            entries.pop(path);
        }
        expired.len()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.lock().contains(path)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for CaptionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPTION_CAPACITY, DEFAULT_CAPTION_TTL)
    }
}
