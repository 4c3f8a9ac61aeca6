pub mod caption;
pub mod grid;
pub mod layout_cache;

pub use caption::{layout_caption, CaptionLayout, FixedAdvanceMetrics, TextMeasure};
pub use grid::{columns_for_width, GridLayout, GridLayoutEngine, RowKind};
pub use layout_cache::LayoutCache;
