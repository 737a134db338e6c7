use std::path::{Path, PathBuf};

use notes_book::NoteIndex;

/// Notes selected for a bulk operation, keyed by path and kept in the
/// order they were tagged.
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    paths: Vec<PathBuf>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `path`. Returns whether it is tagged afterwards.
    pub fn toggle(&mut self, path: &Path) -> bool {
        match self.paths.iter().position(|p| p == path) {
            Some(idx) => {
                self.paths.remove(idx);
                false
            }
            None => {
                self.paths.push(path.to_path_buf());
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn members(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Drop every tag whose note is not in `index`.
    pub fn retain_present(&mut self, index: &NoteIndex) {
        let before = self.paths.len();
        self.paths.retain(|p| index.contains(p));
        let dropped = before - self.paths.len();
        if dropped > 0 {
            tracing::debug!(dropped, "tags dropped after rebuild");
        }
    }
}
