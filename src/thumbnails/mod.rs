//! Thumbnail readiness plumbing for the gallery grid.
//!
//! This module provides:
//! - `ThumbnailReadyChannel` - Decoder threads report finished thumbnails
//! - `ThumbnailUpdateCoalescer` - Merges nearby row repaints into one range

pub mod coalescer;
pub mod ready;

pub use coalescer::ThumbnailUpdateCoalescer;
pub use ready::{ReadySender, ThumbnailReadyChannel};
