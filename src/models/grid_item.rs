use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Label used for the single header when grouping is disabled.
pub const ALL_FILES_LABEL: &str = "All Files";

/// A `(row, column)` cell address in the virtualized grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPosition {
    pub row: usize,
    pub column: usize,
}

impl GridPosition {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Folder(PathBuf),
    /// Sentinel key for the ungrouped "all files" pseudo-group.
    All,
}

impl GroupKey {
    pub fn label(&self) -> String {
        match self {
            Self::Folder(path) => path.to_string_lossy().into_owned(),
            Self::All => ALL_FILES_LABEL.to_string(),
        }
    }

    pub fn folder(&self) -> Option<&Path> {
        match self {
            Self::Folder(path) => Some(path),
            Self::All => None,
        }
    }
}

/// A full-width header row introducing one group of files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupHeader {
    pub key: GroupKey,
    pub file_count: usize,
    pub start_row: usize,
    /// Index of the group's first file in the source list.
    pub first_file: usize,
}

impl GroupHeader {
    /// Rows taken by the group's files, excluding the header row.
    pub fn file_rows(&self, columns: usize) -> usize {
        self.file_count.div_ceil(columns)
    }

    /// Last row occupied by this group, header row included.
    pub fn end_row(&self, columns: usize) -> usize {
        self.start_row + self.file_rows(columns)
    }

    pub fn files(&self) -> std::ops::Range<usize> {
        self.first_file..self.first_file + self.file_count
    }
}

/// What occupies a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridItem {
    /// Index into the header list.
    Header(usize),
    /// Index into the file list.
    File(usize),
}

/// Inclusive range of rows, across every column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn single(row: usize) -> Self {
        Self { start: row, end: row }
    }

    pub fn contains(&self, row: usize) -> bool {
        (self.start..=self.end).contains(&row)
    }

    pub fn rows(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_rows() {
        let header = GroupHeader {
            key: GroupKey::Folder("/a".into()),
            file_count: 4,
            start_row: 2,
            first_file: 3,
        };
        assert_eq!(header.file_rows(3), 2);
        assert_eq!(header.end_row(3), 4);
        assert_eq!(header.files(), 3..7);
    }

    #[test]
    fn test_group_key_labels() {
        assert_eq!(GroupKey::All.label(), ALL_FILES_LABEL);
        assert_eq!(GroupKey::Folder("/x/y".into()).label(), "/x/y");
        assert!(GroupKey::All.folder().is_none());
    }

    #[test]
    fn test_row_range_normalizes() {
        let range = RowRange::new(12, 9);
        assert_eq!(range, RowRange { start: 9, end: 12 });
        assert_eq!(range.len(), 4);
        assert!(range.contains(10));
        assert!(!range.contains(13));
    }
}
