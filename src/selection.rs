use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// How a file should be drawn with respect to selection.
/// Primary wins over secondary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Primary,
    Secondary,
    None,
}

/// Current file, multi-selection and transient highlight state.
///
/// Every setter returns the files whose displayed state may have changed so
/// consumers repaint only those cells. Set diffs come back sorted by path.
#[derive(Debug, Default, Clone)]
pub struct SelectionTracker {
    primary: Option<PathBuf>,
    secondary: BTreeSet<PathBuf>,
    highlight: BTreeSet<PathBuf>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary(&self) -> Option<&Path> {
        self.primary.as_deref()
    }

    pub fn selected(&self) -> &BTreeSet<PathBuf> {
        &self.secondary
    }

    pub fn highlighted(&self) -> &BTreeSet<PathBuf> {
        &self.highlight
    }

    /// Replaces the multi-selection; returns the symmetric difference.
    pub fn set_selection<I>(&mut self, files: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        replace_diffing(&mut self.secondary, files.into_iter().collect())
    }

    /// Moves the primary selection; returns the old and new primary when
    /// they differ.
    pub fn set_primary(&mut self, file: Option<PathBuf>) -> Vec<PathBuf> {
        if self.primary == file {
            return Vec::new();
        }
        let old = std::mem::replace(&mut self.primary, file);
        old.into_iter().chain(self.primary.clone()).collect()
    }

    /// Replaces the highlight set; returns the symmetric difference.
    pub fn set_highlight<I>(&mut self, files: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        replace_diffing(&mut self.highlight, files.into_iter().collect())
    }

    pub fn display_state(&self, file: &Path) -> SelectionState {
        if self.primary.as_deref() == Some(file) {
            SelectionState::Primary
        } else if self.secondary.contains(file) {
            SelectionState::Secondary
        } else {
            SelectionState::None
        }
    }

    pub fn is_highlighted(&self, file: &Path) -> bool {
        self.highlight.contains(file)
    }

    /// Forgets files that are no longer in the gallery.
    /// Returns every dropped identity, once, sorted.
    pub fn retain_files(&mut self, live: &HashSet<&Path>) -> Vec<PathBuf> {
        let mut dropped = BTreeSet::new();
        if let Some(primary) = &self.primary {
            if !live.contains(primary.as_path()) {
                dropped.insert(primary.clone());
                self.primary = None;
            }
        }
        for set in [&mut self.secondary, &mut self.highlight] {
            set.retain(|file| {
                let keep = live.contains(file.as_path());
                if !keep {
                    dropped.insert(file.clone());
                }
                keep
            });
        }
        dropped.into_iter().collect()
    }
}

fn replace_diffing(current: &mut BTreeSet<PathBuf>, next: BTreeSet<PathBuf>) -> Vec<PathBuf> {
    let changed = current.symmetric_difference(&next).cloned().collect();
    *current = next;
    changed
}
