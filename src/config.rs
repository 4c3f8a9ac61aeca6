use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GalleryError, Result};

/// Tunables for the gallery core, stored in `config.toml`.
///
/// Durations are in milliseconds so the file stays hand-editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Preferred cell width; the column count is `viewport / column_target_width`.
    pub column_target_width: f32,
    pub caption_cache_capacity: usize,
    pub caption_ttl_ms: u64,
    /// The gallery cache size, used for caption layouts.
    pub layout_cache_capacity: usize,
    pub coalesce_delay_ms: u64,
    /// Resizes closer together than this are folded into one rebuild.
    pub min_rebuild_interval_ms: u64,
    pub group_by_folder: bool,
    pub caption_max_height: f32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            column_target_width: 200.0,
            caption_cache_capacity: 400,
            caption_ttl_ms: 5_000,
            layout_cache_capacity: 400,
            coalesce_delay_ms: 20,
            min_rebuild_interval_ms: 100,
            group_by_folder: false,
            caption_max_height: 60.0,
        }
    }
}

impl GalleryConfig {
    /// `config.toml` in the platform config directory, if one can be determined.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gallery-grid").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads the default config file, or defaults when it does not exist.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| GalleryError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| GalleryError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, "Loaded gallery config");
        Ok(config)
    }

    pub fn caption_ttl(&self) -> Duration {
        Duration::from_millis(self.caption_ttl_ms)
    }

    pub fn coalesce_delay(&self) -> Duration {
        Duration::from_millis(self.coalesce_delay_ms)
    }

    pub fn min_rebuild_interval(&self) -> Duration {
        Duration::from_millis(self.min_rebuild_interval_ms)
    }
}
