use std::path::Path;

use crate::glob::{Case, NoteGlob};
use crate::launcher::{self, Launcher};

// ── Actions ──────────────────────────────────────────────────────────

/// What a rule opens a note for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Edit,
}

impl Action {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'v' => Some(Action::View),
            'e' => Some(Action::Edit),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Action::View => 'v',
            Action::Edit => 'e',
        }
    }

    /// The generic program for this action, used when several notes are
    /// opened in one go and as the catch-all rule.
    pub fn program(self) -> &'static str {
        match self {
            Action::View => "${PAGER:-less}",
            Action::Edit => "${EDITOR:-vi}",
        }
    }
}

// ── Rules ────────────────────────────────────────────────────────────

/// One `rule <action> <glob> <command>` entry.
#[derive(Debug, Clone)]
pub struct Rule {
    pub action: Action,
    glob: NoteGlob,
    pub command: String,
}

impl Rule {
    pub fn pattern(&self) -> &str {
        self.glob.pattern()
    }
}

/// Ordered rules; the first one matching action and file name wins.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and append a `<action> <glob> <command...>` directive.
    ///
    /// Only the first letter of the action word counts (`v`, `view`, `e`,
    /// `edit`). Anything malformed is dropped; returns whether a rule was added.
    pub fn add(&mut self, directive: &str) -> bool {
        let (word, rest) = split_word(directive.trim_start());
        let Some(action) = word.chars().next().and_then(Action::from_char) else {
            return false;
        };
        let (pattern, command) = split_word(rest);
        let command = command.trim_end();
        if pattern.is_empty() || command.is_empty() {
            return false;
        }
        let Some(glob) = NoteGlob::new(pattern, Case::Sensitive) else {
            return false;
        };
        self.rules.push(Rule {
            action,
            glob,
            command: command.to_string(),
        });
        true
    }

    /// Append the catch-all pager and editor rules.
    pub fn add_fallbacks(&mut self) {
        for action in [Action::View, Action::Edit] {
            self.add(&format!("{} * {}", action.as_char(), action.program()));
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// The command line the first matching rule would run for `file`.
    pub fn resolve(&self, action: Action, file: &Path) -> Option<String> {
        let base = file.file_name()?.to_string_lossy();
        let rule = self
            .rules
            .iter()
            .find(|r| r.action == action && r.glob.is_match(&base))?;
        tracing::debug!(pattern = rule.pattern(), file = %file.display(), "rule matched");
        Some(launcher::command_line(&rule.command, [file]))
    }

    /// Open `file` with the first matching rule. Returns whether a rule fired.
    pub fn exec(&self, action: Action, file: &Path, launcher: &mut dyn Launcher) -> bool {
        let Some(cmd) = self.resolve(action, file) else {
            return false;
        };
        if let Err(err) = launcher.run(&cmd) {
            tracing::warn!(%err, command = %cmd, "failed to launch rule command");
        }
        true
    }
}

/// Split off the first whitespace delimited word; the remainder has its
/// leading blanks removed.
fn split_word(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], s[end..].trim_start()),
        None => (s, ""),
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Default)]
    struct Recorder {
        commands: Vec<String>,
    }

    impl Launcher for Recorder {
        fn run(&mut self, command_line: &str) -> io::Result<()> {
            self.commands.push(command_line.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_add_parses_directive() {
        let mut rules = RuleTable::new();
        assert!(rules.add("view *.md   bat --paging=always"));
        let rule = rules.iter().next().unwrap();
        assert_eq!(rule.action, Action::View);
        assert_eq!(rule.pattern(), "*.md");
        assert_eq!(rule.command, "bat --paging=always");
    }

    #[test]
    fn test_add_ignores_malformed() {
        let mut rules = RuleTable::new();
        assert!(!rules.add("x *.md prog"));
        assert!(!rules.add("v *.md"));
        assert!(!rules.add("v"));
        assert!(!rules.add(""));
        assert!(rules.is_empty());
    }

    #[test]
    fn test_exec_first_match_wins() {
        let mut rules = RuleTable::new();
        rules.add("v *.md prog");
        rules.add("v * other");
        let mut rec = Recorder::default();

        assert!(rules.exec(Action::View, Path::new("a/b/note.md"), &mut rec));
        assert_eq!(rec.commands, vec!["prog 'a/b/note.md'".to_string()]);
    }

    #[test]
    fn test_exec_other_action_does_not_fire() {
        let mut rules = RuleTable::new();
        rules.add("v *.md prog");
        let mut rec = Recorder::default();

        assert!(!rules.exec(Action::Edit, Path::new("a/b/note.md"), &mut rec));
        assert!(rec.commands.is_empty());
    }

    #[test]
    fn test_pattern_matches_basename_only() {
        let mut rules = RuleTable::new();
        rules.add("e work* vim");
        assert!(rules.resolve(Action::Edit, Path::new("/n/work/todo.txt")).is_none());
        assert_eq!(
            rules.resolve(Action::Edit, Path::new("/n/home/workout.txt")),
            Some("vim '/n/home/workout.txt'".to_string())
        );
    }

    #[test]
    fn test_fallbacks_come_last() {
        let mut rules = RuleTable::new();
        rules.add("v *.pdf okular");
        rules.add_fallbacks();
        assert_eq!(rules.len(), 3);
        assert_eq!(
            rules.resolve(Action::View, Path::new("/n/x.txt")),
            Some("${PAGER:-less} '/n/x.txt'".to_string())
        );
        assert_eq!(
            rules.resolve(Action::Edit, Path::new("/n/x.txt")),
            Some("${EDITOR:-vi} '/n/x.txt'".to_string())
        );
        assert_eq!(
            rules.resolve(Action::View, Path::new("/n/x.pdf")),
            Some("okular '/n/x.pdf'".to_string())
        );
    }
}
