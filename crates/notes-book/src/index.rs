use std::fs;
use std::path::Path;

use crate::exclude::ExcludeFilter;
use crate::glob::{Case, NoteGlob};
use crate::note::{Note, NoteMeta};

/// A snapshot of the notebook: every indexed note, ordered for display,
/// plus the distinct sections seen while walking.
#[derive(Debug, Clone, Default)]
pub struct NoteIndex {
    notes: Vec<Note>,
    sections: Vec<String>,
}

impl NoteIndex {
    /// Walk `start` (the notebook root or one of its sections) recursively.
    ///
    /// Notes are derived relative to `root`. A non-empty `name_filter` is a
    /// case-insensitive glob applied to note names. The result is sorted by
    /// name ignoring case, ties broken by path. A filter that does not
    /// compile matches nothing.
    pub fn build(root: &Path, start: &Path, name_filter: &str, exclude: &ExcludeFilter) -> Self {
        let filter = match name_filter {
            "" => None,
            pattern => match NoteGlob::new(pattern, Case::Insensitive) {
                Some(glob) => Some(glob),
                None => return Self::default(),
            },
        };

        let mut index = Self::default();
        index.walk(root, start, filter.as_ref(), exclude);
        index
            .notes
            .sort_by_cached_key(|n| (n.name.to_lowercase(), n.path.clone()));

        tracing::debug!(
            start = %start.display(),
            name_filter,
            notes = index.notes.len(),
            sections = index.sections.len(),
            "index built"
        );
        index
    }

    fn walk(&mut self, root: &Path, dir: &Path, filter: Option<&NoteGlob>, exclude: &ExcludeFilter) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(dir = %dir.display(), %err, "skipping unreadable directory");
                return;
            }
        };

        for entry in entries.flatten() {
            let file_name = entry.file_name();
            if !exclude.include(&file_name.to_string_lossy()) {
                continue;
            }
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_dir() {
                self.walk(root, &path, filter, exclude);
                continue;
            }
            let Ok(meta) = fs::metadata(&path) else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let Some(mut note) = Note::from_path(root, &path) else {
                continue;
            };
            if filter.is_some_and(|f| !f.is_match(&note.name)) {
                continue;
            }
            note.meta = NoteMeta::from_metadata(&meta);
            if !self.sections.contains(&note.section) {
                self.sections.push(note.section.clone());
            }
            self.notes.push(note);
        }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Note> {
        self.notes.get(idx)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    /// Sections in the order they were first observed.
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn position(&self, path: &Path) -> Option<usize> {
        self.notes.iter().position(|n| n.path == path)
    }

    pub fn find(&self, path: &Path) -> Option<&Note> {
        self.notes.iter().find(|n| n.path == path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.position(path).is_some()
    }
}
