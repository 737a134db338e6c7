//! The notebook: notes stored as plain files under a root directory, with
//! sections as subdirectories.

pub mod config;
pub mod error;
pub mod exclude;
pub mod glob;
pub mod index;
pub mod launcher;
pub mod menu;
pub mod note;
pub mod repo;
pub mod rules;
pub mod section;

pub use config::Config;
pub use error::{BookError, Result};
pub use exclude::ExcludeFilter;
pub use index::NoteIndex;
pub use launcher::{Launcher, ShellLauncher};
pub use menu::MenuItem;
pub use note::{Note, NoteMeta};
pub use repo::Notebook;
pub use rules::{Action, RuleTable};
