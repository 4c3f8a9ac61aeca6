use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::{GalleryError, Result};
use crate::models::{FileEntry, GridItem, GridPosition, GroupHeader, GroupKey};

/// Number of grid columns that fit a viewport, never less than one.
/// One column is the list view.
pub fn columns_for_width(viewport_width: f32, column_target_width: f32) -> usize {
    if column_target_width <= 0.0 || !viewport_width.is_finite() {
        return 1;
    }
    ((viewport_width / column_target_width).floor() as usize).max(1)
}

/// Fast identity hash of an ordered file list.
/// Any change to the set of files or their order changes the hash.
pub fn compute_list_hash(paths: &[PathBuf]) -> u64 {
    let mut hasher_input = Vec::with_capacity(paths.len() * 64);
    for path in paths {
        hasher_input.extend_from_slice(path.as_os_str().as_encoded_bytes());
        // Separator so ["ab", "c"] and ["a", "bc"] differ.
        hasher_input.push(0);
    }
    xxh3_64(&hasher_input)
}

/// What a single grid row holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Header(usize),
    Files { header: usize, files: Range<usize> },
}

/// An immutable grid snapshot: every file and header with its cell.
///
/// Headers take one full-width row at column 0, followed by
/// `ceil(file_count / columns)` rows of files filled left to right.
#[derive(Debug, Clone)]
pub struct GridLayout {
    files: Vec<FileEntry>,
    headers: Vec<GroupHeader>,
    positions: Vec<GridPosition>,
    index_by_path: HashMap<PathBuf, usize>,
    columns: usize,
    grouped: bool,
    total_rows: usize,
    list_hash: u64,
}

impl GridLayout {
    /// A grid with nothing loaded: no headers and no rows.
    pub fn empty() -> Self {
        Self {
            files: Vec::new(),
            headers: Vec::new(),
            positions: Vec::new(),
            index_by_path: HashMap::new(),
            columns: 1,
            grouped: false,
            total_rows: 0,
            list_hash: compute_list_hash(&[]),
        }
    }

    /// Lays out `paths` in `columns` columns, optionally one group per folder run.
    pub fn build(paths: &[PathBuf], columns: usize, grouped: bool) -> Result<Self> {
        if columns == 0 {
            return Err(GalleryError::ZeroColumns);
        }

        let files: Vec<FileEntry> = paths.iter().cloned().map(FileEntry::new).collect();
        let runs = if grouped {
            partition_by_folder(&files)
        } else {
            vec![(GroupKey::All, files.len())]
        };

        let counted: usize = runs.iter().map(|(_, count)| count).sum();
        if counted != files.len() {
            return Err(GalleryError::Incoherent(format!(
                "groups cover {} files but the list has {}",
                counted,
                files.len()
            )));
        }

        let mut index_by_path = HashMap::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            if index_by_path.insert(file.path.clone(), index).is_some() {
                return Err(GalleryError::DuplicateFile(file.path.clone()));
            }
        }

        let mut headers = Vec::with_capacity(runs.len());
        let mut positions = Vec::with_capacity(files.len());
        let mut row = 0usize;
        let mut first_file = 0usize;

        for (key, file_count) in runs {
            let header = GroupHeader {
                key,
                file_count,
                start_row: row,
                first_file,
            };
            for offset in 0..file_count {
                positions.push(GridPosition::new(
                    row + 1 + offset / columns,
                    offset % columns,
                ));
            }
            row = header.end_row(columns) + 1;
            first_file += file_count;
            headers.push(header);
        }

        Ok(Self {
            files,
            headers,
            positions,
            index_by_path,
            columns,
            grouped,
            total_rows: row,
            list_hash: compute_list_hash(paths),
        })
    }

    pub fn row_count(&self) -> usize {
        self.total_rows
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    pub fn list_hash(&self) -> u64 {
        self.list_hash
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn headers(&self) -> &[GroupHeader] {
        &self.headers
    }

    pub fn file(&self, index: usize) -> Option<&FileEntry> {
        self.files.get(index)
    }

    pub fn header(&self, index: usize) -> Option<&GroupHeader> {
        self.headers.get(index)
    }

    pub fn contains_file(&self, path: &Path) -> bool {
        self.index_by_path.contains_key(path)
    }

    pub fn file_index(&self, path: &Path) -> Option<usize> {
        self.index_by_path.get(path).copied()
    }

    pub fn position_of_file(&self, path: &Path) -> Option<GridPosition> {
        self.file_index(path).map(|index| self.positions[index])
    }

    pub fn position_of_index(&self, index: usize) -> Option<GridPosition> {
        self.positions.get(index).copied()
    }

    pub fn position_of_header(&self, index: usize) -> Option<GridPosition> {
        self.headers
            .get(index)
            .map(|h| GridPosition::new(h.start_row, 0))
    }

    /// Index of the last header starting at or above `row`.
    pub fn header_index_for_row(&self, row: usize) -> Option<usize> {
        self.headers
            .partition_point(|h| h.start_row <= row)
            .checked_sub(1)
    }

    /// Reverse lookup of a cell. Empty trailing cells and the columns of a
    /// header row past column 0 hold nothing.
    pub fn item_at(&self, pos: GridPosition) -> Option<GridItem> {
        if pos.row >= self.total_rows || pos.column >= self.columns {
            return None;
        }
        let index = self.header_index_for_row(pos.row)?;
        let header = &self.headers[index];
        if pos.row == header.start_row {
            return (pos.column == 0).then_some(GridItem::Header(index));
        }
        let offset = (pos.row - header.start_row - 1) * self.columns + pos.column;
        (offset < header.file_count).then(|| GridItem::File(header.first_file + offset))
    }

    pub fn row_kind(&self, row: usize) -> Option<RowKind> {
        if row >= self.total_rows {
            return None;
        }
        let index = self.header_index_for_row(row)?;
        let header = &self.headers[index];
        if row == header.start_row {
            return Some(RowKind::Header(index));
        }
        let start = header.first_file + (row - header.start_row - 1) * self.columns;
        let end = (start + self.columns).min(header.first_file + header.file_count);
        Some(RowKind::Files {
            header: index,
            files: start..end,
        })
    }

    /// Files on `row`, empty for header rows and rows past the end.
    pub fn files_in_row(&self, row: usize) -> &[FileEntry] {
        match self.row_kind(row) {
            Some(RowKind::Files { files, .. }) => &self.files[files],
            _ => &[],
        }
    }

    /// True when both grids have the same files, columns, and header rows,
    /// so only header labels can differ.
    pub fn shape_matches(&self, other: &GridLayout) -> bool {
        self.columns == other.columns
            && self.list_hash == other.list_hash
            && self.headers.len() == other.headers.len()
            && self
                .headers
                .iter()
                .zip(&other.headers)
                .all(|(a, b)| a.start_row == b.start_row && a.file_count == b.file_count)
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::empty()
    }
}

/// Splits files into maximal contiguous runs sharing a parent folder.
fn partition_by_folder(files: &[FileEntry]) -> Vec<(GroupKey, usize)> {
    let mut runs: Vec<(GroupKey, usize)> = Vec::new();
    for file in files {
        match runs.last_mut() {
            Some((GroupKey::Folder(folder), count)) if folder.as_path() == file.folder() => {
                *count += 1;
            }
            _ => runs.push((GroupKey::Folder(file.folder().to_path_buf()), 1)),
        }
    }
    runs
}

/// Owns the current grid snapshot and swaps in rebuilt ones wholesale.
///
/// Readers hold an `Arc<GridLayout>` and never observe a grid mid-build.
pub struct GridLayoutEngine {
    current: Arc<GridLayout>,
}

impl GridLayoutEngine {
    pub fn new() -> Self {
        Self {
            current: Arc::new(GridLayout::empty()),
        }
    }

    pub fn current(&self) -> Arc<GridLayout> {
        Arc::clone(&self.current)
    }

    pub fn layout(&self) -> &GridLayout {
        &self.current
    }

    /// Builds a new grid and makes it current. On error the old grid stays.
    pub fn rebuild(
        &mut self,
        paths: &[PathBuf],
        columns: usize,
        grouped: bool,
    ) -> Result<Arc<GridLayout>> {
        let layout = GridLayout::build(paths, columns, grouped)?;
        Ok(self.install(layout))
    }

    /// Makes an already-built grid current.
    pub fn install(&mut self, layout: GridLayout) -> Arc<GridLayout> {
        debug!(
            rows = layout.row_count(),
            headers = layout.headers().len(),
            files = layout.files().len(),
            columns = layout.column_count(),
            grouped = layout.is_grouped(),
            "Installed grid layout"
        );
        self.current = Arc::new(layout);
        self.current()
    }
}

impl Default for GridLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}
