use crate::glob::{Case, NoteGlob};

/// File names skipped while indexing the notebook.
#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
    patterns: Vec<NoteGlob>,
}

impl ExcludeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every whitespace separated glob in `params`.
    pub fn add_patterns(&mut self, params: &str) {
        self.patterns.extend(
            params
                .split_whitespace()
                .filter_map(|p| NoteGlob::new(p, Case::Insensitive)),
        );
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether a directory entry named `file_name` takes part in the index.
    pub fn include(&self, file_name: &str) -> bool {
        if file_name == "." || file_name == ".." {
            return false;
        }
        !self.patterns.iter().any(|p| p.is_match(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_entries_never_included() {
        let filter = ExcludeFilter::new();
        assert!(!filter.include("."));
        assert!(!filter.include(".."));
        assert!(filter.include("note.txt"));
    }

    #[test]
    fn test_patterns_exclude_case_insensitively() {
        let mut filter = ExcludeFilter::new();
        filter.add_patterns("*.bak  *~\t.git");
        assert_eq!(filter.len(), 3);
        assert!(!filter.include("draft.bak"));
        assert!(!filter.include("DRAFT.BAK"));
        assert!(!filter.include("note.txt~"));
        assert!(!filter.include(".git"));
        assert!(filter.include("draft.txt"));
    }

    #[test]
    fn test_hidden_files_need_dot_pattern() {
        let mut filter = ExcludeFilter::new();
        filter.add_patterns("*");
        assert!(filter.include(".config"));
        assert!(!filter.include("anything"));
    }
}
