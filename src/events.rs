//! Change notifications published by the gallery model.
//!
//! Subscribers get a flume receiver each; events arrive in publish order and
//! are delivered on whichever thread drains the receiver.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use flume::{Receiver, Sender};
use tracing::trace;

use crate::models::{GridPosition, RowRange};
use crate::selection::SelectionState;

#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEvent {
    /// The grid was rebuilt; every row must be re-queried.
    Reset { rows: usize, columns: usize },
    /// Same shape, new header labels.
    HeadersChanged,
    /// Thumbnails changed on these rows, across every column.
    RowsChanged(RowRange),
    /// Cell contents changed inside this rectangle.
    CellsChanged {
        rows: RangeInclusive<usize>,
        columns: RangeInclusive<usize>,
    },
    SelectionChanged {
        file: PathBuf,
        position: Option<GridPosition>,
        state: SelectionState,
    },
    HighlightChanged {
        file: PathBuf,
        position: Option<GridPosition>,
        highlighted: bool,
    },
}

/// Ordered publish/subscribe fan-out.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<GalleryEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<GalleryEvent> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Sends `event` to every live subscriber and forgets dropped ones.
    pub fn publish(&mut self, event: GalleryEvent) {
        trace!(?event, "Publishing gallery event");
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
