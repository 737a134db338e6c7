use std::fs::DirBuilder;
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Component, Path, PathBuf};

use crate::error::{BookError, Result};
use crate::index::NoteIndex;

/// The casing already used for `candidate` in `index`, or `candidate` itself.
pub fn normalize(index: &NoteIndex, candidate: &str) -> String {
    let wanted = candidate.to_lowercase();
    index
        .sections()
        .iter()
        .find(|s| s.to_lowercase() == wanted)
        .cloned()
        .unwrap_or_else(|| candidate.to_string())
}

/// Reject section names that would leave the notebook. Surrounding slashes
/// are stripped.
pub fn validate(section: &str) -> Result<String> {
    let trimmed = section.trim_matches('/');
    let escapes = Path::new(trimmed)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapes {
        return Err(BookError::InvalidSection(section.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Make sure `root/section` exists, creating it (mode 0700) when needed.
///
/// Failure is reported as [`BookError::SectionCreate`], which is fatal.
pub fn ensure(root: &Path, section: &str) -> Result<PathBuf> {
    let dir = root.join(section);
    if section.is_empty() || dir.is_dir() {
        return Ok(dir);
    }
    match DirBuilder::new().recursive(true).mode(0o700).create(&dir) {
        Ok(()) => {
            tracing::info!(section, "section created");
            Ok(dir)
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(dir),
        Err(source) => Err(BookError::SectionCreate { path: dir, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exclude::ExcludeFilter;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn index_with(dir: &Path, files: &[&str]) -> NoteIndex {
        for rel in files {
            let path = dir.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        NoteIndex::build(dir, dir, "", &ExcludeFilter::new())
    }

    #[test]
    fn test_normalize_uses_seen_casing() {
        let dir = TempDir::new().unwrap();
        let index = index_with(dir.path(), &["bar/note.txt"]);
        assert_eq!(normalize(&index, "Bar"), "bar");
        assert_eq!(normalize(&index, "BAR"), "bar");
    }

    #[test]
    fn test_normalize_unknown_unchanged() {
        let dir = TempDir::new().unwrap();
        let index = index_with(dir.path(), &["other/note.txt"]);
        assert_eq!(normalize(&index, "Bar"), "Bar");
    }

    #[test]
    fn test_validate() {
        assert_eq!(validate("work/").unwrap(), "work");
        assert_eq!(validate("a/b").unwrap(), "a/b");
        assert_eq!(validate("").unwrap(), "");
        assert!(validate("../etc").is_err());
        assert!(validate("a/../../b").is_err());
        assert!(validate("./a").is_err());
    }

    #[test]
    fn test_ensure_creates_private_dir() {
        let dir = TempDir::new().unwrap();
        let created = ensure(dir.path(), "new/nested").unwrap();
        assert!(created.is_dir());
        let mode = fs::metadata(&created).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);

        // Existing directories are fine.
        assert_eq!(ensure(dir.path(), "new/nested").unwrap(), created);
        assert_eq!(ensure(dir.path(), "").unwrap(), dir.path().join(""));
    }

    #[test]
    fn test_ensure_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blocker"), "").unwrap();
        let err = ensure(dir.path(), "blocker/sub").unwrap_err();
        assert!(err.is_fatal());
        // A plain file where the section should be is not a section.
        assert!(ensure(dir.path(), "blocker").unwrap_err().is_fatal());
    }
}
