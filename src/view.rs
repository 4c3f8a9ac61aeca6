//! Seams between the gallery core and a UI toolkit.
//!
//! A toolkit binds its list/table widget to a [`GridDataSource`] and draws
//! cells through an [`ItemRenderer`]; [`render_rows`] walks the visible rows
//! and hands each occupied cell to the renderer once.

use std::ops::Range;
use std::path::Path;

use crate::layout::GridLayout;
use crate::models::{FileEntry, GridItem, GridPosition, GroupHeader};
use crate::selection::SelectionState;

pub trait GridDataSource {
    fn row_count(&self) -> usize;
    fn column_count(&self) -> usize;
    fn item_at(&self, pos: GridPosition) -> Option<GridItem>;
    fn header(&self, index: usize) -> Option<&GroupHeader>;
    fn file(&self, index: usize) -> Option<&FileEntry>;

    fn selection_state(&self, _file: &Path) -> SelectionState {
        SelectionState::None
    }

    fn is_highlighted(&self, _file: &Path) -> bool {
        false
    }
}

/// Display state of a file cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellState {
    pub selection: SelectionState,
    pub highlighted: bool,
}

pub trait ItemRenderer {
    fn header(&mut self, pos: GridPosition, header: &GroupHeader);
    fn file(&mut self, pos: GridPosition, file: &FileEntry, state: CellState);
}

/// Renders every occupied cell of `rows`, clamped to the grid.
/// Returns the number of cells drawn.
pub fn render_rows<S, R>(source: &S, rows: Range<usize>, renderer: &mut R) -> usize
where
    S: GridDataSource + ?Sized,
    R: ItemRenderer + ?Sized,
{
    let end = rows.end.min(source.row_count());
    let mut drawn = 0;
    for row in rows.start..end {
        for column in 0..source.column_count() {
            let pos = GridPosition::new(row, column);
            match source.item_at(pos) {
                Some(GridItem::Header(index)) => {
                    if let Some(header) = source.header(index) {
                        renderer.header(pos, header);
                        drawn += 1;
                    }
                }
                Some(GridItem::File(index)) => {
                    if let Some(file) = source.file(index) {
                        let state = CellState {
                            selection: source.selection_state(&file.path),
                            highlighted: source.is_highlighted(&file.path),
                        };
                        renderer.file(pos, file, state);
                        drawn += 1;
                    }
                }
                None => {}
            }
        }
    }
    drawn
}

impl GridDataSource for GridLayout {
    fn row_count(&self) -> usize {
        GridLayout::row_count(self)
    }

    fn column_count(&self) -> usize {
        GridLayout::column_count(self)
    }

    fn item_at(&self, pos: GridPosition) -> Option<GridItem> {
        GridLayout::item_at(self, pos)
    }

    fn header(&self, index: usize) -> Option<&GroupHeader> {
        GridLayout::header(self, index)
    }

    fn file(&self, index: usize) -> Option<&FileEntry> {
        GridLayout::file(self, index)
    }
}
