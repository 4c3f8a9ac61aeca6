pub mod file_entry;
pub mod grid_item;

pub use file_entry::*;
pub use grid_item::*;
