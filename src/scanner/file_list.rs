use std::path::{Path, PathBuf};

/// Read side of whatever owns the gallery's file list.
pub trait FileListProvider {
    /// Files in display order.
    fn files(&self) -> &[PathBuf];

    fn current_file(&self) -> Option<&Path>;

    fn selected_files(&self) -> &[PathBuf];
}

/// In-memory provider, used by the binary and by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticFileList {
    files: Vec<PathBuf>,
    current: Option<PathBuf>,
    selected: Vec<PathBuf>,
}

impl StaticFileList {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            current: None,
            selected: Vec::new(),
        }
    }

    pub fn set_files(&mut self, files: Vec<PathBuf>) {
        self.files = files;
        if let Some(current) = &self.current {
            if !self.files.contains(current) {
                self.current = None;
            }
        }
        let files = &self.files;
        self.selected.retain(|path| files.contains(path));
    }

    /// Sets the current file. Paths not in the list are ignored.
    pub fn set_current(&mut self, path: Option<PathBuf>) {
        self.current = path.filter(|p| self.files.contains(p));
    }

    pub fn set_selected(&mut self, paths: Vec<PathBuf>) {
        self.selected = paths
            .into_iter()
            .filter(|p| self.files.contains(p))
            .collect();
    }
}

impl FileListProvider for StaticFileList {
    fn files(&self) -> &[PathBuf] {
        &self.files
    }

    fn current_file(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    fn selected_files(&self) -> &[PathBuf] {
        &self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_and_selection_follow_the_list() {
        let mut list = StaticFileList::new(vec!["/a/1.jpg".into(), "/a/2.jpg".into()]);
        list.set_current(Some("/a/2.jpg".into()));
        list.set_selected(vec!["/a/1.jpg".into(), "/zzz.jpg".into()]);
        assert_eq!(list.current_file(), Some(Path::new("/a/2.jpg")));
        assert_eq!(list.selected_files(), &[PathBuf::from("/a/1.jpg")]);

        list.set_files(vec!["/a/1.jpg".into()]);
        assert_eq!(list.current_file(), None);
        assert_eq!(list.selected_files().len(), 1);
    }

    #[test]
    fn test_unknown_current_is_ignored() {
        let mut list = StaticFileList::new(vec!["/a/1.jpg".into()]);
        list.set_current(Some("/b/9.jpg".into()));
        assert!(list.current_file().is_none());
    }
}
