//! Caption loading for gallery cells.
//!
//! This module provides:
//! - `CaptionSource` - Pluggable raw caption loaders (sidecar text files)
//! - `CaptionPipeline` - Source plus tag filter and rewrite rules
//! - `CaptionCache` - LRU cache with a time-to-live in front of the pipeline

pub mod cache;
pub mod source;

pub use cache::CaptionCache;
pub use source::{
    CaptionPipeline, CaptionRule, CaptionSource, NoCaptions, ReplaceRule, SidecarCaptionSource,
    TagFilter,
};
