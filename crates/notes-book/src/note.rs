use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

// ── Metadata ─────────────────────────────────────────────────────────

/// File attributes captured when the index is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteMeta {
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
    /// Permission bits only (`mode & 0o777`).
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
}

impl NoteMeta {
    pub fn from_metadata(meta: &fs::Metadata) -> Self {
        Self {
            size: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Local>::from),
            mode: meta.mode() & 0o777,
            uid: meta.uid(),
            gid: meta.gid(),
        }
    }

    /// Stat `path`; a file that vanished yields empty metadata.
    pub fn read(path: &Path) -> Self {
        fs::metadata(path)
            .map(|m| Self::from_metadata(&m))
            .unwrap_or_default()
    }
}

// ── Note ─────────────────────────────────────────────────────────────

/// A note file. The absolute path is its identity; the rest is derived from
/// the path relative to the notebook root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub path: PathBuf,
    pub name: String,
    /// Relative directory of the note, empty for the notebook root.
    pub section: String,
    /// File extension without the dot, possibly empty.
    pub ftype: String,
    pub meta: NoteMeta,
}

impl Note {
    /// Build a note for `path` under `root` without touching the filesystem.
    /// Returns `None` when `path` is not inside `root`.
    pub fn from_path(root: &Path, path: &Path) -> Option<Self> {
        let rel = path.strip_prefix(root).ok()?;
        let rel = rel.to_string_lossy();
        if rel.is_empty() {
            return None;
        }

        let (section, file) = match rel.rfind('/') {
            Some(i) => (&rel[..i], &rel[i + 1..]),
            None => ("", rel.as_ref()),
        };
        let (name, ftype) = split_type(file);

        Some(Self {
            path: path.to_path_buf(),
            name: name.to_string(),
            section: section.to_string(),
            ftype: ftype.to_string(),
            meta: NoteMeta::default(),
        })
    }

    /// Like [`Note::from_path`] but with metadata read from disk.
    pub fn load(root: &Path, path: &Path) -> Option<Self> {
        let mut note = Self::from_path(root, path)?;
        note.meta = NoteMeta::read(path);
        Some(note)
    }

    /// `name.type`, or just the name for untyped notes.
    pub fn file_name(&self) -> String {
        if self.ftype.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.ftype)
        }
    }

    /// Path of the note relative to the notebook root.
    pub fn relative_path(&self) -> PathBuf {
        if self.section.is_empty() {
            PathBuf::from(self.file_name())
        } else {
            Path::new(&self.section).join(self.file_name())
        }
    }
}

/// Split `file` at its last period. A leading period belongs to the name.
pub(crate) fn split_type(file: &str) -> (&str, &str) {
    match file.rfind('.') {
        Some(i) if i > 0 => (&file[..i], &file[i + 1..]),
        _ => (file, ""),
    }
}

// ── Tests ────────────────────────────────────────────────────────────
