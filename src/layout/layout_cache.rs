use std::num::NonZeroUsize;
use std::ops::RangeInclusive;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;

use crate::layout::caption::CaptionLayout;
use crate::models::GridPosition;

/// Default number of cached caption layouts (the gallery cache size).
pub const DEFAULT_LAYOUT_CACHE_SIZE: usize = 400;

/// LRU cache of computed caption layouts, keyed by grid cell.
///
/// Layouts are expensive to compute during continuous scrolling, so each
/// visible cell's result is kept until it falls out of the LRU window or its
/// cell is invalidated. Entries are shared as `Arc` so renderers can hold on
/// to a layout while the cache keeps churning.
///
/// Each entry remembers the text it was laid out from; a lookup with
/// different text misses, so a refreshed caption is never drawn stale.
pub struct LayoutCache {
    cache: Mutex<LruCache<GridPosition, CachedLayout>>,
}

#[derive(Debug, Clone)]
struct CachedLayout {
    source: Arc<str>,
    layout: Arc<CaptionLayout>,
}

impl LayoutCache {
    /// Creates an empty cache holding at most `capacity` layouts (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the layout cached for `pos` if it was built from `source`,
    /// marking it as recently used.
    pub fn get(&self, pos: GridPosition, source: &str) -> Option<Arc<CaptionLayout>> {
        let mut cache = self.cache.lock();
        match cache.get(&pos) {
            Some(entry) if *entry.source == *source => Some(Arc::clone(&entry.layout)),
            Some(_) => {
                trace!(row = pos.row, column = pos.column, "Caption layout is stale");
                None
            }
            None => None,
        }
    }

    /// Stores the layout built from `source`, evicting the least recently
    /// used one when full.
    pub fn insert(
        &self,
        pos: GridPosition,
        source: Arc<str>,
        layout: CaptionLayout,
    ) -> Arc<CaptionLayout> {
        let layout = Arc::new(layout);
        let entry = CachedLayout {
            source,
            layout: Arc::clone(&layout),
        };
        if let Some((evicted, _)) = self.cache.lock().push(pos, entry) {
            if evicted != pos {
                trace!(row = evicted.row, column = evicted.column, "Evicted caption layout");
            }
        }
        layout
    }

    /// Returns the cached layout for `source`, computing and storing it on a
    /// miss or when the cell was laid out from other text.
    pub fn get_or_insert_with<F>(
        &self,
        pos: GridPosition,
        source: &Arc<str>,
        compute: F,
    ) -> Arc<CaptionLayout>
    where
        F: FnOnce() -> CaptionLayout,
    {
        if let Some(layout) = self.get(pos, source) {
            return layout;
        }
        self.insert(pos, Arc::clone(source), compute())
    }

    /// Removes the layouts of every cell inside the rectangle.
    /// Returns how many entries were dropped.
    pub fn invalidate_range(
        &self,
        rows: RangeInclusive<usize>,
        columns: RangeInclusive<usize>,
    ) -> usize {
        let mut cache = self.cache.lock();
        let doomed: Vec<GridPosition> = cache
            .iter()
            .map(|(pos, _)| *pos)
            .filter(|pos| rows.contains(&pos.row) && columns.contains(&pos.column))
            .collect();
        for pos in &doomed {
            cache.pop(pos);
        }
        doomed.len()
    }

    pub fn invalidate(&self, pos: GridPosition) -> bool {
        self.cache.lock().pop(&pos).is_some()
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        self.cache.lock().contains(&pos)
    }

    /// Clears the entire cache.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Returns the number of cached layouts.
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.lock().cap().get()
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new(DEFAULT_LAYOUT_CACHE_SIZE)
    }
}
