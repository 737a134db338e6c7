use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{BookError, Result};
use crate::glob::{Case, NoteGlob};
use crate::index::NoteIndex;
use crate::note::{Note, split_type};
use crate::rules::RuleTable;
use crate::section;

/// The notebook on disk plus the settings that govern mutations.
///
/// One value of this type is threaded through every operation; nothing is
/// kept in globals.
#[derive(Debug, Clone)]
pub struct Notebook {
    config: Config,
    clobber: bool,
}

impl Notebook {
    /// A notebook in no-clobber mode: creating over an existing note fails.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clobber: false,
        }
    }

    pub fn with_clobber(mut self, clobber: bool) -> Self {
        self.clobber = clobber;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.notebook
    }

    pub fn rules(&self) -> &RuleTable {
        &self.config.rules
    }

    /// Create the notebook root (mode 0700) if it is missing.
    pub fn init(&self) -> Result<()> {
        let root = self.root();
        if root.is_dir() {
            return Ok(());
        }
        DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(root)
            .map_err(|source| BookError::SectionCreate {
                path: root.to_path_buf(),
                source,
            })?;
        tracing::info!(root = %root.display(), "notebook created");
        Ok(())
    }

    // ── Index ───────────────────────────────────────────────────────────

    /// Index the whole notebook, or only `section` when it is non-empty.
    pub fn build(&self, section: &str, name_filter: &str) -> NoteIndex {
        let root = self.root();
        let start = if section.is_empty() {
            root.to_path_buf()
        } else {
            root.join(section)
        };
        NoteIndex::build(root, &start, name_filter, &self.config.exclude)
    }

    /// Notes whose name matches `pattern` (case-insensitive), optionally
    /// restricted to exactly one section.
    pub fn find(&self, section: Option<&str>, pattern: &str) -> Vec<Note> {
        Self::select(&self.build("", ""), section, pattern)
    }

    /// Like [`Notebook::find`] over an index that is already built.
    pub fn select(all: &NoteIndex, section: Option<&str>, pattern: &str) -> Vec<Note> {
        let Some(glob) = NoteGlob::new(pattern, Case::Insensitive) else {
            return Vec::new();
        };
        let section = section.map(|s| section::normalize(all, s.trim_matches('/')));
        all.iter()
            .filter(|n| section.as_ref().is_none_or(|s| &n.section == s))
            .filter(|n| glob.is_match(&n.name))
            .cloned()
            .collect()
    }

    // ── Create ──────────────────────────────────────────────────────────

    /// Where a note called `name` would live.
    ///
    /// A `section/` prefix in `name` wins over `default_section`. Either is
    /// matched against the sections in `index` ignoring case and created if
    /// missing. `default_type` is appended when `name` has no extension.
    pub fn resolve_target(
        &self,
        index: &NoteIndex,
        name: &str,
        default_section: &str,
        default_type: &str,
    ) -> Result<PathBuf> {
        let (section, path) = self.locate(index, name, default_section, default_type)?;
        section::ensure(self.root(), &section)?;
        Ok(path)
    }

    /// The normalized section and full path for `name`, without touching
    /// the filesystem.
    fn locate(
        &self,
        index: &NoteIndex,
        name: &str,
        default_section: &str,
        default_type: &str,
    ) -> Result<(String, PathBuf)> {
        let (section, file) = match name.rfind('/') {
            Some(i) => (&name[..i], &name[i + 1..]),
            None => (default_section, name),
        };
        if file.is_empty() {
            return Err(BookError::Usage(format!("'{name}' is not a note name")));
        }
        let section = section::validate(section)?;
        let section = section::normalize(index, &section);
        let dir = self.root().join(&section);

        let (_, ftype) = split_type(file);
        let path = if ftype.is_empty() && !default_type.is_empty() {
            dir.join(format!("{file}.{default_type}"))
        } else {
            dir.join(file)
        };
        Ok((section, path))
    }

    /// Make a note called `name`. With `open_for_write` the file is created
    /// (or truncated when clobbering is allowed).
    pub fn create(
        &self,
        index: &NoteIndex,
        name: &str,
        section: &str,
        open_for_write: bool,
    ) -> Result<Note> {
        let path = self.resolve_target(index, name, section, &self.config.default_type)?;
        if open_for_write {
            if !self.clobber && path.exists() {
                return Err(BookError::AlreadyExists(path));
            }
            File::create(&path).map_err(|e| BookError::io(&path, e))?;
            tracing::info!(path = %path.display(), "note created");
        }
        self.note_at(&path)
    }

    fn note_at(&self, path: &Path) -> Result<Note> {
        Note::load(self.root(), path).ok_or_else(|| BookError::NotFound(path.display().to_string()))
    }

    // ── Backup & delete ─────────────────────────────────────────────────

    /// Copy the note into the backup root, mirroring its relative path.
    /// Without a backup root this does nothing.
    pub fn backup(&self, note: &Note) -> Result<()> {
        let Some(backup_root) = &self.config.backup_dir else {
            return Ok(());
        };
        let rel = note
            .path
            .strip_prefix(self.root())
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| note.relative_path());
        let target = backup_root.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| BookError::io(parent, e))?;
        }
        fs::copy(&note.path, &target).map_err(|e| BookError::io(&target, e))?;
        tracing::debug!(target = %target.display(), "note backed up");
        Ok(())
    }

    /// Back up, then remove the note. A failed backup is logged and does
    /// not stop the removal.
    pub fn delete(&self, note: &Note) -> Result<()> {
        self.backup_or_warn(note);
        fs::remove_file(&note.path).map_err(|e| BookError::io(&note.path, e))?;
        tracing::info!(path = %note.path.display(), "note deleted");
        Ok(())
    }

    pub fn backup_or_warn(&self, note: &Note) {
        if let Err(err) = self.backup(note) {
            tracing::warn!(%err, path = %note.path.display(), "backup failed");
        }
    }

    // ── Rename & move ───────────────────────────────────────────────────

    /// Move `note` to `new_name` inside `new_section` (its own section when
    /// `None`). `new_name` may carry a `section/` prefix. Without an
    /// extension the note keeps its type.
    ///
    /// The content is copied first; the source is removed only after the
    /// copy succeeded. If that removal fails both files remain and
    /// [`BookError::PartialMove`] is returned.
    pub fn relocate(
        &self,
        index: &NoteIndex,
        note: &Note,
        new_name: &str,
        new_section: Option<&str>,
    ) -> Result<Note> {
        let section = new_section.unwrap_or(&note.section);
        let (section, dest) = self.locate(index, new_name, section, &note.ftype)?;
        if dest == note.path {
            return Err(BookError::SameTarget(dest));
        }
        if !self.clobber && dest.exists() {
            return Err(BookError::AlreadyExists(dest));
        }
        section::ensure(self.root(), &section)?;

        self.backup_or_warn(note);
        fs::copy(&note.path, &dest).map_err(|e| BookError::io(&dest, e))?;
        fs::remove_file(&note.path).map_err(|source| BookError::PartialMove {
            from: note.path.clone(),
            to: dest.clone(),
            source,
        })?;
        tracing::info!(from = %note.path.display(), to = %dest.display(), "note moved");
        self.note_at(&dest)
    }

    // ── Content ─────────────────────────────────────────────────────────

    /// Copy everything from `input` to the end of the note, creating the
    /// file if needed. Returns the number of bytes written.
    pub fn append(&self, note: &Note, input: &mut dyn Read) -> Result<u64> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&note.path)
            .map_err(|e| BookError::io(&note.path, e))?;
        io::copy(input, &mut file).map_err(|e| BookError::io(&note.path, e))
    }

    /// Write a `=== name ===` header followed by the note's content.
    pub fn print(&self, note: &Note, out: &mut dyn Write) -> Result<()> {
        let mut file = File::open(&note.path).map_err(|e| BookError::io(&note.path, e))?;
        writeln!(out, "=== {} ===", note.name).map_err(|e| BookError::io(&note.path, e))?;
        io::copy(&mut file, out).map_err(|e| BookError::io(&note.path, e))?;
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
