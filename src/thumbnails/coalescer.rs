//! Batches "thumbnail ready" rows into contiguous row-range updates.
//!
//! Thumbnails finish decoding in near arbitrary order. Repainting on every
//! arrival causes redraw storms, so nearby rows are merged into one pending
//! range that is emitted when a short deadline passes. A row far from the
//! pending range flushes it immediately and starts a new one, which keeps a
//! single late arrival from holding an unrelated range open.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::models::RowRange;

/// Default delay before a pending range is emitted.
pub const DEFAULT_COALESCE_DELAY: Duration = Duration::from_millis(20);

/// Rows this close to the pending range are merged into it.
pub const MERGE_SLACK_ROWS: usize = 5;

#[derive(Debug, Clone, Copy)]
struct Pending {
    range: RowRange,
    deadline: Instant,
}

#[derive(Debug)]
pub struct ThumbnailUpdateCoalescer {
    delay: Duration,
    pending: Option<Pending>,
}

impl ThumbnailUpdateCoalescer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Records that `row` has a new thumbnail.
    ///
    /// Returns a range that must be emitted right away when `row` lies outside
    /// the merge window of the pending range.
    pub fn notify(&mut self, row: usize, now: Instant) -> Option<RowRange> {
        if let Some(pending) = self.pending.as_mut() {
            let range = &mut pending.range;
            if row + MERGE_SLACK_ROWS >= range.start && row <= range.end + MERGE_SLACK_ROWS {
                range.start = range.start.min(row);
                range.end = range.end.max(row);
                return None;
            }
        }

        let flushed = self.pending.take().map(|p| p.range);
        if let Some(range) = flushed {
            trace!(start = range.start, end = range.end, row, "Flushing distant update range");
        }
        self.pending = Some(Pending {
            range: RowRange::single(row),
            deadline: now + self.delay,
        });
        flushed
    }

    /// Emits the pending range once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<RowRange> {
        match self.pending {
            Some(pending) if now >= pending.deadline => self.flush(),
            _ => None,
        }
    }

    /// Emits the pending range regardless of its deadline.
    pub fn flush(&mut self) -> Option<RowRange> {
        self.pending.take().map(|p| p.range)
    }

    /// When the host should call [`poll`](Self::poll) next.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    pub fn pending_range(&self) -> Option<RowRange> {
        self.pending.map(|p| p.range)
    }

    /// Drops the pending range without emitting it; used when the grid is
    /// reset and every row is repainted anyway.
    pub fn reset(&mut self) {
        self.pending = None;
    }
}

impl Default for ThumbnailUpdateCoalescer {
    fn default() -> Self {
        Self::new(DEFAULT_COALESCE_DELAY)
    }
}
