//! Directory scanner producing the ordered file list for the gallery.
//!
//! This module provides the `FileScanner` struct which handles:
//! - Recursive directory scanning using walkdir
//! - Image detection by file extension
//! - Path ordering so files of one folder stay contiguous for grouping

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::models::is_image_path;

/// Configuration for the file scanner.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to scan directories recursively.
    pub recursive: bool,
    /// Maximum directory depth (0 = unlimited).
    pub max_depth: usize,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            max_depth: 0, // unlimited
            follow_symlinks: false,
        }
    }
}

/// Walks a directory for gallery files.
pub struct FileScanner {
    config: ScanConfig,
}

impl FileScanner {
    /// Creates a new file scanner with default configuration.
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
        }
    }

    /// Creates a new file scanner with custom configuration.
    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Discovers all image files under `dir`, sorted by path.
    ///
    /// Unreadable entries are skipped with a warning; only a missing or
    /// unreadable root is an error.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let root = dir
            .canonicalize()
            .with_context(|| format!("Failed to open gallery directory {:?}", dir))?;
        info!("Starting scan of {:?}", root);

        let mut walker = WalkDir::new(&root).follow_links(self.config.follow_symlinks);
        if !self.config.recursive {
            walker = walker.max_depth(1);
        } else if self.config.max_depth > 0 {
            walker = walker.max_depth(self.config.max_depth);
        }

        let mut paths = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            // Skip directories
            if entry.file_type().is_dir() {
                continue;
            }

            // Skip non-image files
            if !is_image_path(entry.path()) {
                continue;
            }

            paths.push(entry.into_path());
        }

        // Sort by path for consistent ordering
        paths.sort();

        debug!(count = paths.len(), "Scan complete");
        Ok(paths)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}
