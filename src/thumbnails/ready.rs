//! Hand-off point between off-thread thumbnail decoders and the UI thread.
//!
//! - Decoders hold a cloned `ReadySender` and report finished files from any thread
//! - The UI thread drains the channel without blocking and maps files to rows
//! - Uses flume for communication between workers and the UI thread

use std::path::PathBuf;

use flume::{Receiver, Sender};
use tracing::{trace, warn};

/// Sending half given to thumbnail decoders.
#[derive(Debug, Clone)]
pub struct ReadySender {
    tx: Sender<PathBuf>,
}

impl ReadySender {
    /// Reports that the thumbnail for `path` is ready.
    ///
    /// Returns false if the gallery side has been dropped.
    pub fn notify_ready(&self, path: PathBuf) -> bool {
        match self.tx.send(path) {
            Ok(()) => true,
            Err(flume::SendError(path)) => {
                warn!(?path, "Thumbnail ready channel disconnected");
                false
            }
        }
    }
}

/// Unbounded channel of file paths whose thumbnails finished decoding.
#[derive(Debug)]
pub struct ThumbnailReadyChannel {
    tx: Sender<PathBuf>,
    rx: Receiver<PathBuf>,
}

impl ThumbnailReadyChannel {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> ReadySender {
        ReadySender {
            tx: self.tx.clone(),
        }
    }

    /// Poll for completed thumbnails (non-blocking).
    pub fn poll(&self) -> Vec<PathBuf> {
        let mut ready = Vec::new();
        while let Ok(path) = self.rx.try_recv() {
            ready.push(path);
        }
        if !ready.is_empty() {
            trace!(count = ready.len(), "Drained ready thumbnails");
        }
        ready
    }

    /// Number of notifications waiting to be drained.
    pub fn pending_count(&self) -> usize {
        self.rx.len()
    }
}

impl Default for ThumbnailReadyChannel {
    fn default() -> Self {
        Self::new()
    }
}
