use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File '{}' already exists.", .0.display())]
    AlreadyExists(PathBuf),

    #[error("no notes found matching '{0}'")]
    NotFound(String),

    #[error("invalid section name '{0}'")]
    InvalidSection(String),

    /// The section directory could not be created. Nothing can be written
    /// without it, so callers abort.
    #[error("mkdir({}): {source}", path.display())]
    SectionCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The copy landed but the source could not be removed; both files exist.
    #[error("'{}' copied to '{}' but removing the original failed: {source}", from.display(), to.display())]
    PartialMove {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{}' is already there", .0.display())]
    SameTarget(PathBuf),

    #[error("usage: {0}")]
    Usage(String),
}

impl BookError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BookError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the process must stop after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BookError::SectionCreate { .. })
    }
}

pub type Result<T> = std::result::Result<T, BookError>;
