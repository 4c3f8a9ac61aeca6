use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the gallery core.
///
/// The first three variants are contract failures: they mean the file list
/// handed to the grid was broken upstream and there is no way to recover by
/// retrying.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("column count must be at least 1")]
    ZeroColumns,

    #[error("grid is incoherent: {0}")]
    Incoherent(String),

    #[error("file appears more than once in the list: {}", .0.display())]
    DuplicateFile(PathBuf),

    #[error("failed to read caption for {}: {source}", path.display())]
    CaptionIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, GalleryError>;
