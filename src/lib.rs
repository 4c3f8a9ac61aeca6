//! Grouped thumbnail grid model for file galleries.
//!
//! Files are laid out in a fixed-column grid, optionally split into one group
//! per parent folder with a full-width header row before each group. The
//! [`GalleryModel`] owns the grid and the caches behind it and reports every
//! change as a [`events::GalleryEvent`].

pub mod captions;
pub mod config;
pub mod error;
pub mod events;
pub mod gallery;
pub mod layout;
pub mod models;
pub mod scanner;
pub mod selection;
pub mod thumbnails;
pub mod view;

pub use error::{GalleryError, Result};
pub use gallery::{DataKey, GalleryModel};
