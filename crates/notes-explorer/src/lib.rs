pub mod tags;
pub mod ui;

use std::path::Path;

use crossterm::event::KeyEvent;
use ratatui::Frame;

use notes_book::launcher::{Launcher, command_line};
use notes_book::glob::{Case, NoteGlob};
use notes_book::{Action as RuleAction, BookError, Note, NoteIndex, Notebook, section};
use notes_core::keybinds::{Action, KeyState, process_normal_key};
use notes_core::line_edit::{EditOutcome, LineEdit};
use notes_core::list_dialog::{DialogOutcome, ListDialog};
use notes_core::markup;
use notes_core::text_view::{HelpEntry, TextView};

use tags::TagSet;

/// How many key presses a status message stays on screen.
const STATUS_TTL: u8 = 2;

/// Shown in the status line when there is no message. `$x` marks a hotkey.
pub const HELP_LINE: &str =
    "$? help, $quit, $view, $edit, $rename, $delete, $new, $filter, $tag, $untag all";

/// Programs offered for browsing the notebook directory.
pub const FILE_MANAGERS: [&str; 5] = ["xdg-open", "nnn", "mc", "thunar", "dolphin"];

// ── Modal state ──────────────────────────────────────────────────────

/// What a line prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Filter,
    Section,
    ChangeSection,
    Delete,
    Rename,
    /// A new note; `edit` opens it in the editor afterwards.
    Create { edit: bool },
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogKind {
    UserMenu,
    FileManager,
}

#[derive(Debug)]
enum Modal {
    None,
    Prompt(PromptKind, LineEdit),
    Dialog(DialogKind, ListDialog),
    Viewer(TextView),
}

#[derive(Debug, Clone)]
struct Status {
    text: String,
    ttl: u8,
}

// ── Explorer ─────────────────────────────────────────────────────────

/// The interactive note list.
///
/// One key event is handled per call to [`Explorer::handle_key`]. External
/// programs run through the [`Launcher`] passed in, which owns the terminal
/// hand-off.
pub struct Explorer {
    book: Notebook,
    index: NoteIndex,
    cursor: usize,
    offset: usize,
    visible_lines: usize,
    filter: String,
    section: String,
    tags: TagSet,
    status: Option<Status>,
    key_state: KeyState,
    modal: Modal,
    running: bool,
}

impl Explorer {
    /// Build the index for `section` (the whole notebook when empty).
    ///
    /// The section is validated and matched case-insensitively against the
    /// existing ones, as the section prompt does.
    pub fn new(book: Notebook, section: &str) -> notes_book::Result<Self> {
        let section = section::validate(section)?;
        let section = section::normalize(&book.build("", ""), &section);
        let index = book.build(&section, "");
        Ok(Self {
            book,
            index,
            cursor: 0,
            offset: 0,
            visible_lines: 20,
            filter: String::new(),
            section,
            tags: TagSet::new(),
            status: None,
            key_state: KeyState::default(),
            modal: Modal::None,
            running: true,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn book(&self) -> &Notebook {
        &self.book
    }

    pub fn index(&self) -> &NoteIndex {
        &self.index
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn visible_lines(&self) -> usize {
        self.visible_lines
    }

    /// Set the number of list rows; the cursor is kept on screen.
    pub fn set_visible_lines(&mut self, lines: usize) {
        self.visible_lines = lines.max(1);
        self.fix_offset();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }

    pub fn current(&self) -> Option<&Note> {
        self.index.get(self.cursor)
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            ttl: STATUS_TTL,
        });
    }

    fn tick_status(&mut self) {
        self.status = self.status.take().and_then(|mut status| {
            status.ttl = status.ttl.checked_sub(1).filter(|&ttl| ttl > 0)?;
            Some(status)
        });
    }

    /// Non-fatal errors become the status message; fatal ones end the loop.
    fn report(&mut self, err: BookError) -> anyhow::Result<()> {
        if err.is_fatal() {
            self.running = false;
            return Err(err.into());
        }
        tracing::warn!(%err, "operation failed");
        self.set_status(err.to_string());
        Ok(())
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    /// Clamp the cursor and scroll so `offset <= cursor < offset + visible`.
    fn fix_offset(&mut self) {
        let count = self.index.len();
        if count == 0 {
            self.cursor = 0;
            self.offset = 0;
            return;
        }
        self.cursor = self.cursor.min(count - 1);
        if self.cursor >= self.offset + self.visible_lines {
            self.offset = self.cursor + 1 - self.visible_lines;
        }
        if self.offset > self.cursor {
            self.offset = self.cursor;
        }
    }

    fn move_down(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_add(n);
        self.fix_offset();
    }

    fn move_up(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_sub(n);
        self.fix_offset();
    }

    // ── Index ───────────────────────────────────────────────────────────

    /// Re-read the notebook, keeping tags only for notes still present.
    pub fn rebuild(&mut self) {
        self.index = self.book.build(&self.section, &self.filter);
        self.tags.retain_present(&self.index);
        self.fix_offset();
    }

    /// Rebuild and put the cursor on `path`, or on the first note.
    fn rebuild_at(&mut self, path: &Path) {
        self.rebuild();
        self.cursor = self.index.position(path).unwrap_or(0);
        self.fix_offset();
    }

    /// Notes a bulk command acts on: the tagged ones, else the highlighted.
    fn targets(&self) -> Vec<Note> {
        if self.tags.is_empty() {
            return self.current().cloned().into_iter().collect();
        }
        self.tags
            .members()
            .iter()
            .filter_map(|p| self.index.find(p).cloned())
            .collect()
    }

    fn target_paths(targets: &[Note]) -> Vec<&Path> {
        targets.iter().map(|n| n.path.as_path()).collect()
    }

    // ── Key handling ────────────────────────────────────────────────────

    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        launcher: &mut dyn Launcher,
    ) -> anyhow::Result<()> {
        match std::mem::replace(&mut self.modal, Modal::None) {
            Modal::None => {
                self.tick_status();
                let action = process_normal_key(key, &mut self.key_state);
                self.dispatch(action, launcher)
            }
            Modal::Prompt(kind, mut edit) => match edit.handle_key(key) {
                EditOutcome::Pending => {
                    self.modal = Modal::Prompt(kind, edit);
                    Ok(())
                }
                EditOutcome::Cancel => Ok(()),
                EditOutcome::Commit(text) => self.commit_prompt(kind, text, launcher),
            },
            Modal::Dialog(kind, mut dialog) => match dialog.handle_key(key) {
                DialogOutcome::Pending => {
                    self.modal = Modal::Dialog(kind, dialog);
                    Ok(())
                }
                DialogOutcome::Cancelled => Ok(()),
                DialogOutcome::Selected(idx) => {
                    self.commit_dialog(kind, idx, launcher);
                    Ok(())
                }
            },
            Modal::Viewer(mut view) => {
                if view.handle_key(key) {
                    self.modal = Modal::Viewer(view);
                }
                Ok(())
            }
        }
    }

    fn prompt(&mut self, kind: PromptKind, prompt: impl Into<String>, initial: impl Into<String>) {
        self.modal = Modal::Prompt(kind, LineEdit::new(prompt, initial));
    }

    fn dispatch(&mut self, action: Action, launcher: &mut dyn Launcher) -> anyhow::Result<()> {
        let page = self.visible_lines;
        let has_notes = !self.index.is_empty();
        match action {
            Action::None => {}
            Action::Quit => {
                self.tags.clear();
                self.running = false;
            }
            Action::Help => self.modal = Modal::Viewer(help_view()),
            Action::MoveDown(n) => self.move_down(n),
            Action::MoveUp(n) => self.move_up(n),
            Action::GotoTop => self.move_up(usize::MAX),
            Action::GotoBottom => self.move_down(usize::MAX),
            Action::PageDown => {
                self.offset = self.offset.saturating_add(page);
                self.move_down(page);
                let last_page = self.index.len().saturating_sub(page);
                self.offset = self.offset.min(last_page);
            }
            Action::PageUp => {
                self.offset = self.offset.saturating_sub(page);
                self.move_up(page);
            }
            Action::HalfPageDown => self.move_down((page / 2).max(1)),
            Action::HalfPageUp => self.move_up((page / 2).max(1)),
            Action::Open => {
                if let Some(note) = self.current().cloned() {
                    self.open_single(RuleAction::View, &note, launcher);
                }
            }
            Action::View if has_notes => self.open(RuleAction::View, launcher),
            Action::Edit if has_notes => self.open(RuleAction::Edit, launcher),
            Action::ToggleTag => {
                if let Some(path) = self.current().map(|n| n.path.clone()) {
                    if self.tags.toggle(&path) {
                        self.move_down(1);
                    }
                }
            }
            Action::ClearTags => {
                self.tags.clear();
                self.set_status("untag all.");
            }
            Action::Filter => {
                let prompt = format!("Set filter (current filter: '{}')", self.filter);
                let initial = self.filter.clone();
                self.prompt(PromptKind::Filter, prompt, initial);
            }
            Action::SelectSection => self.prompt(PromptKind::Section, "Select section?", ""),
            Action::ChangeSection if has_notes => {
                self.prompt(PromptKind::ChangeSection, "Enter the new section", "")
            }
            Action::Delete if has_notes => {
                let prompt = match self.current() {
                    Some(note) if self.tags.is_empty() => {
                        format!("Do you want to delete '{}'?", note.name)
                    }
                    _ => "Delete all tagged notes?".to_string(),
                };
                self.prompt(PromptKind::Delete, prompt, "");
            }
            Action::Rename if has_notes => {
                if let Some(name) = self.current().map(|n| n.name.clone()) {
                    let prompt = format!("Enter the new name for '{name}'");
                    self.prompt(PromptKind::Rename, prompt, name);
                }
            }
            Action::New => self.prompt(PromptKind::Create { edit: true }, "Enter new name", ""),
            Action::Add => self.prompt(PromptKind::Create { edit: false }, "Enter new name", ""),
            Action::UserMenu if has_notes => {
                let labels: Vec<String> = self
                    .book
                    .config()
                    .user_menu
                    .iter()
                    .map(|item| item.label.clone())
                    .collect();
                if labels.is_empty() {
                    self.set_status("no user menu defined.");
                } else {
                    let dialog = ListDialog::new("User Menu", labels);
                    self.modal = Modal::Dialog(DialogKind::UserMenu, dialog);
                }
            }
            Action::Command if has_notes => self.prompt(PromptKind::Command, "Enter command", ""),
            Action::FileManager => {
                let items = FILE_MANAGERS.iter().map(|s| s.to_string()).collect();
                let dialog = ListDialog::new("File Manager", items);
                self.modal = Modal::Dialog(DialogKind::FileManager, dialog);
            }
            Action::Rebuild => {
                self.rebuild();
                self.set_status("rebuilt.");
            }
            // Note actions with an empty list.
            Action::View
            | Action::Edit
            | Action::ChangeSection
            | Action::Delete
            | Action::Rename
            | Action::UserMenu
            | Action::Command => {}
        }
        Ok(())
    }

    // ── Opening notes ───────────────────────────────────────────────────

    fn open_single(&mut self, action: RuleAction, note: &Note, launcher: &mut dyn Launcher) {
        if !self.book.rules().exec(action, &note.path, launcher) {
            self.set_status(format!("no rule to open '{}'.", note.file_name()));
        }
    }

    /// View or edit the targets: one note through its rule, several in a
    /// single pager or editor invocation.
    fn open(&mut self, action: RuleAction, launcher: &mut dyn Launcher) {
        let targets = self.targets();
        if action == RuleAction::Edit {
            for note in &targets {
                self.book.backup_or_warn(note);
            }
        }
        match targets.as_slice() {
            [] => return,
            [note] => self.open_single(action, note, launcher),
            many => {
                let line = command_line(action.program(), Self::target_paths(many));
                if let Err(err) = launcher.run(&line) {
                    tracing::warn!(%err, "failed to launch");
                    self.set_status(format!("failed: {err}"));
                }
            }
        }
        self.tags.clear();
        if action == RuleAction::Edit {
            let at = self.current().map(|n| n.path.clone());
            match at {
                Some(path) => self.rebuild_at(&path),
                None => self.rebuild(),
            }
        }
    }

    /// Run `template` with every target appended, then wait for the user.
    fn run_over_targets(&mut self, template: &str, launcher: &mut dyn Launcher) {
        let targets = self.targets();
        if targets.is_empty() {
            return;
        }
        let line = command_line(template, Self::target_paths(&targets));
        tracing::info!(command = %line, "running command over notes");
        if let Err(err) = launcher.run_and_wait(&line) {
            self.set_status(format!("failed: {err}"));
        }
        self.tags.clear();
        self.rebuild();
    }

    // ── Prompt results ──────────────────────────────────────────────────

    fn commit_prompt(
        &mut self,
        kind: PromptKind,
        text: String,
        launcher: &mut dyn Launcher,
    ) -> anyhow::Result<()> {
        match kind {
            PromptKind::Filter => {
                self.filter = text.trim().to_string();
                self.rebuild();
                self.cursor = 0;
                self.offset = 0;
                if !self.filter.is_empty()
                    && NoteGlob::new(&self.filter, Case::Insensitive).is_none()
                {
                    self.set_status(format!("invalid filter '{}'.", self.filter));
                }
            }
            PromptKind::Section => {
                let wanted = match section::validate(text.trim()) {
                    Ok(s) => s,
                    Err(err) => return self.report(err),
                };
                let all = self.book.build("", "");
                self.section = section::normalize(&all, &wanted);
                self.rebuild();
                self.cursor = 0;
                self.offset = 0;
            }
            PromptKind::ChangeSection => return self.change_section(text.trim()),
            PromptKind::Delete => {
                if is_affirmative(&text) {
                    self.delete_targets();
                }
            }
            PromptKind::Rename => return self.rename(text.trim()),
            PromptKind::Create { edit } => return self.create(text.trim(), edit, launcher),
            PromptKind::Command => {
                let command = text.trim();
                if !command.is_empty() {
                    self.run_over_targets(command, launcher);
                }
            }
        }
        Ok(())
    }

    fn commit_dialog(&mut self, kind: DialogKind, idx: usize, launcher: &mut dyn Launcher) {
        match kind {
            DialogKind::UserMenu => {
                let Some(item) = self.book.config().user_menu.get(idx).cloned() else {
                    return;
                };
                self.run_over_targets(&item.command, launcher);
            }
            DialogKind::FileManager => {
                let Some(program) = FILE_MANAGERS.get(idx) else {
                    return;
                };
                let line = command_line(program, [self.book.root()]);
                if let Err(err) = launcher.run(&line) {
                    self.set_status(format!("failed: {err}"));
                }
                self.rebuild();
            }
        }
    }

    fn delete_targets(&mut self) {
        let targets = self.targets();
        let (mut succ, mut fail) = (0, 0);
        for note in &targets {
            match self.book.delete(note) {
                Ok(()) => succ += 1,
                Err(err) => {
                    tracing::warn!(%err, "delete failed");
                    fail += 1;
                }
            }
        }
        self.set_status(tally(succ, fail, "deleted"));
        self.tags.clear();
        self.rebuild();
    }

    fn change_section(&mut self, dest: &str) -> anyhow::Result<()> {
        if dest.is_empty() {
            return Ok(());
        }
        if dest.contains('/') {
            self.set_status("a section name cannot contain '/'.");
            return Ok(());
        }
        let all = self.book.build("", "");
        let dest = match section::validate(dest) {
            Ok(d) => section::normalize(&all, &d),
            Err(err) => return self.report(err),
        };
        if let Err(err) = section::ensure(self.book.root(), &dest) {
            return self.report(err);
        }

        let (mut succ, mut fail) = (0, 0);
        for note in self.targets() {
            match self.book.relocate(&all, &note, &note.file_name(), Some(&dest)) {
                Ok(_) => succ += 1,
                Err(err) if err.is_fatal() => return self.report(err),
                Err(err) => {
                    tracing::warn!(%err, "move failed");
                    fail += 1;
                }
            }
        }
        self.set_status(tally(succ, fail, "moved"));
        self.tags.clear();
        self.rebuild();
        Ok(())
    }

    fn rename(&mut self, new_name: &str) -> anyhow::Result<()> {
        let Some(note) = self.current().cloned() else {
            return Ok(());
        };
        if new_name.is_empty() || new_name == note.name {
            return Ok(());
        }
        let all = self.book.build("", "");
        match self.book.relocate(&all, &note, new_name, None) {
            Ok(renamed) => {
                self.set_status(format!("'{}' renamed to '{}'.", note.name, renamed.name));
                self.rebuild_at(&renamed.path);
                Ok(())
            }
            Err(err) => {
                let result = self.report(err);
                self.rebuild();
                result
            }
        }
    }

    fn create(
        &mut self,
        name: &str,
        edit: bool,
        launcher: &mut dyn Launcher,
    ) -> anyhow::Result<()> {
        if name.is_empty() {
            return Ok(());
        }
        let all = self.book.build("", "");
        let note = match self.book.create(&all, name, &self.section, !edit) {
            Ok(note) => note,
            Err(err) => return self.report(err),
        };
        self.set_status(format!("'{}' created", note.name));
        if edit {
            self.book.rules().exec(RuleAction::Edit, &note.path, launcher);
        }
        self.rebuild_at(&note.path);
        Ok(())
    }

    // ── Rendering ───────────────────────────────────────────────────────

    pub fn render(&mut self, frame: &mut Frame) {
        ui::render_explorer(frame, self);
    }

    /// The markup shown in the status line.
    fn status_markup(&self) -> String {
        match &self.status {
            Some(status) => status.text.clone(),
            None => markup::colorize_hotkeys(HELP_LINE),
        }
    }

    fn active_prompt(&self) -> Option<&LineEdit> {
        match &self.modal {
            Modal::Prompt(_, edit) => Some(edit),
            _ => None,
        }
    }
}

/// Whether a confirmation answer means yes: its first non-blank character
/// is one of `Y`, `T`, `1` or `+`.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim_start().chars().next().map(|c| c.to_ascii_uppercase()),
        Some('Y' | 'T' | '1' | '+')
    )
}

/// `one note deleted.`, `3 notes moved; 1 failed.`
fn tally(succ: usize, fail: usize, verb: &str) -> String {
    let end = if fail > 0 { ';' } else { '.' };
    let mut msg = if succ == 1 {
        format!("one note {verb}{end}")
    } else {
        format!("{succ} notes {verb}{end}")
    };
    if fail > 0 {
        msg.push_str(&format!(" {fail} failed."));
    }
    msg
}

fn help_view() -> TextView {
    let entries = [
        ("General", "?", "Help. This window."),
        ("General", "q", "Quit."),
        ("General", "F5", "Rebuild the list."),
        ("Move", "j / k", "Down / up."),
        ("Move", "gg / G", "First / last note."),
        ("Move", "PgUp / PgDn", "Page up / down."),
        ("Move", "Ctrl-u / d", "Half page up / down."),
        ("Notes", "Enter", "Display the current note with its view rule."),
        ("Notes", "v", "View the current or the tagged notes."),
        ("Notes", "e", "Edit the current or the tagged notes."),
        ("Notes", "r", "Rename the current note."),
        ("Notes", "dd, Del", "Delete the current or the tagged notes."),
        ("Notes", "n", "New. Opens the editor on a new note; save it there."),
        ("Notes", "a", "Add. Creates a new empty note."),
        ("Sections", "s", "Select section."),
        ("Sections", "c", "Move the current or the tagged notes to a section."),
        ("Tags", "t, Ins", "Tag / untag the current note."),
        ("Tags", "u", "Untag all."),
        ("Other", "f, /", "Set filter [1]."),
        ("Other", "m, F2", "User menu."),
        ("Other", "x, F10", "Run a command with the current or tagged notes."),
        ("Other", "F4", "Open the notes directory in a file manager."),
    ];
    let entries: Vec<HelpEntry> = entries
        .into_iter()
        .map(|(section, key, desc)| HelpEntry::with_section(section, key, desc))
        .collect();
    TextView::help(
        "Help",
        &entries,
        &["[1] Shell patterns with the @(a|b) extension, case ignored."],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use notes_book::Config;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Records command lines instead of spawning anything.
    #[derive(Default)]
    struct Recorder {
        runs: Vec<String>,
        waited: Vec<String>,
    }

    impl Launcher for Recorder {
        fn run(&mut self, command_line: &str) -> io::Result<()> {
            self.runs.push(command_line.to_string());
            Ok(())
        }

        fn run_and_wait(&mut self, command_line: &str) -> io::Result<()> {
            self.waited.push(command_line.to_string());
            Ok(())
        }
    }

    struct Fixture {
        dir: TempDir,
        explorer: Explorer,
        launcher: Recorder,
    }

    impl Fixture {
        fn new(files: &[&str]) -> Self {
            let dir = TempDir::new().unwrap();
            let env = |name: &str| (name == "HOME").then(|| "/nonexistent".to_string());
            let mut config = Config::from_source(Some("umenu Count words;wc -w\n"), &env);
            config.notebook = dir.path().join("notes");
            config.backup_dir = Some(dir.path().join("backup"));
            for rel in files {
                let path = config.notebook.join(rel);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(&path, rel).unwrap();
            }
            let book = Notebook::new(config);
            book.init().unwrap();
            let mut explorer = Explorer::new(book, "").unwrap();
            explorer.set_visible_lines(5);
            Self {
                dir,
                explorer,
                launcher: Recorder::default(),
            }
        }

        fn root(&self) -> PathBuf {
            self.explorer.book().root().to_path_buf()
        }

        fn backup(&self) -> PathBuf {
            self.dir.path().join("backup")
        }

        fn send(&mut self, key: KeyEvent) {
            self.explorer.handle_key(key, &mut self.launcher).unwrap();
            self.assert_cursor_invariant();
        }

        fn press(&mut self, code: KeyCode) {
            self.send(KeyEvent::new(code, KeyModifiers::NONE));
        }

        fn keys(&mut self, s: &str) {
            for c in s.chars() {
                self.press(KeyCode::Char(c));
            }
        }

        /// Type `text` into the open prompt and commit it.
        fn answer(&mut self, text: &str) {
            self.keys(text);
            self.press(KeyCode::Enter);
        }

        fn names(&self) -> Vec<String> {
            self.explorer.index().iter().map(|n| n.file_name()).collect()
        }

        fn quoted(&self, rel: &str) -> String {
            format!("'{}'", self.root().join(rel).display())
        }

        fn assert_cursor_invariant(&self) {
            let e = &self.explorer;
            let count = e.index().len();
            if count == 0 {
                assert_eq!((e.cursor(), e.offset()), (0, 0));
            } else {
                assert!(e.offset() <= e.cursor(), "offset {} > cursor {}", e.offset(), e.cursor());
                assert!(e.cursor() < count);
                assert!(e.cursor() < e.offset() + e.visible_lines());
            }
        }
    }

    fn many(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("note{i:02}.txt")).collect()
    }

    // ── Movement ────────────────────────────────────────────────────────

    #[test]
    fn test_cursor_stays_in_range() {
        let files = many(30);
        let files: Vec<&str> = files.iter().map(String::as_str).collect();
        let mut fx = Fixture::new(&files);

        for _ in 0..7 {
            fx.keys("j");
        }
        assert_eq!((fx.explorer.cursor(), fx.explorer.offset()), (7, 3));
        fx.press(KeyCode::PageDown);
        fx.press(KeyCode::PageDown);
        fx.keys("G");
        assert_eq!(fx.explorer.cursor(), 29);
        fx.press(KeyCode::PageDown);
        assert_eq!(fx.explorer.cursor(), 29);
        fx.send(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(fx.explorer.cursor(), 27);
        fx.press(KeyCode::PageUp);
        fx.keys("k");
        fx.keys("gg");
        assert_eq!((fx.explorer.cursor(), fx.explorer.offset()), (0, 0));
        fx.keys("k");
        assert_eq!(fx.explorer.cursor(), 0);
    }

    #[test]
    fn test_page_down_at_end_keeps_list_full() {
        let files = many(12);
        let files: Vec<&str> = files.iter().map(String::as_str).collect();
        let mut fx = Fixture::new(&files);

        fx.press(KeyCode::PageDown);
        assert_eq!((fx.explorer.cursor(), fx.explorer.offset()), (5, 5));
        fx.press(KeyCode::PageDown);
        assert_eq!((fx.explorer.cursor(), fx.explorer.offset()), (10, 7));
        fx.press(KeyCode::PageDown);
        assert_eq!((fx.explorer.cursor(), fx.explorer.offset()), (11, 7));
    }

    #[test]
    fn test_empty_notebook_is_inert() {
        let mut fx = Fixture::new(&[]);
        fx.keys("jGkvedd");
        fx.press(KeyCode::PageDown);
        fx.press(KeyCode::Enter);
        assert!(fx.launcher.runs.is_empty());
        assert!(fx.explorer.is_running());
    }

    #[test]
    fn test_shrinking_view_keeps_cursor_visible() {
        let files = many(10);
        let files: Vec<&str> = files.iter().map(String::as_str).collect();
        let mut fx = Fixture::new(&files);
        fx.keys("jjjj");
        fx.explorer.set_visible_lines(2);
        fx.assert_cursor_invariant();
        assert_eq!(fx.explorer.offset(), 3);
    }

    // ── Filter & section ────────────────────────────────────────────────

    #[test]
    fn test_filter_prompt() {
        let mut fx = Fixture::new(&["todo.txt", "ToDo-list.md", "shopping.txt"]);
        fx.keys("jj");
        fx.keys("f");
        fx.answer("todo*");
        assert_eq!(fx.explorer.filter(), "todo*");
        assert_eq!(fx.names(), vec!["todo.txt", "ToDo-list.md"]);
        assert_eq!(fx.explorer.cursor(), 0);

        fx.keys("/x");
        fx.press(KeyCode::Esc);
        assert_eq!(fx.explorer.filter(), "todo*");
    }

    #[test]
    fn test_section_and_filter_end_to_end() {
        let mut fx = Fixture::new(&["work/todo.txt", "home/todo.txt"]);
        assert_eq!(fx.explorer.index().len(), 2);
        fx.keys("s");
        fx.answer("WORK");
        assert_eq!(fx.explorer.section(), "work");
        fx.keys("f");
        fx.answer("todo*");

        let paths: Vec<PathBuf> = fx.explorer.index().iter().map(|n| n.path.clone()).collect();
        assert_eq!(paths, vec![fx.root().join("work/todo.txt")]);
    }

    #[test]
    fn test_unclosed_bracket_filter_is_literal() {
        let mut fx = Fixture::new(&["alpha.txt", "beta.txt", "foo[.txt"]);
        fx.keys("f");
        fx.answer("foo[");
        assert_eq!(fx.explorer.filter(), "foo[");
        assert_eq!(fx.names(), vec!["foo[.txt"]);
        assert_eq!(fx.explorer.status(), None);
    }

    #[test]
    fn test_invalid_filter_shows_nothing() {
        let mut fx = Fixture::new(&["alpha.txt", "beta.txt"]);
        fx.keys("f");
        fx.answer("foo\\");
        assert!(fx.names().is_empty());
        assert_eq!(fx.explorer.status(), Some("invalid filter 'foo\\'."));
    }

    #[test]
    fn test_start_section_is_normalized() {
        let fx = Fixture::new(&["work/todo.txt", "home/plan.txt"]);
        let book = fx.explorer.book().clone();
        let explorer = Explorer::new(book, "WORK").unwrap();
        assert_eq!(explorer.section(), "work");
        let names: Vec<String> = explorer.index().iter().map(|n| n.file_name()).collect();
        assert_eq!(names, vec!["todo.txt"]);
    }

    #[test]
    fn test_start_section_outside_notebook_is_refused() {
        let fx = Fixture::new(&["a.txt"]);
        let book = fx.explorer.book().clone();
        assert!(matches!(
            Explorer::new(book, "../.."),
            Err(BookError::InvalidSection(_))
        ));
    }

    #[test]
    fn test_section_outside_notebook_is_refused() {
        let mut fx = Fixture::new(&["a.txt"]);
        fx.keys("s");
        fx.answer("../..");
        assert_eq!(fx.explorer.section(), "");
        assert!(fx.explorer.status().unwrap().contains("invalid section"));
    }

    // ── Tags ────────────────────────────────────────────────────────────

    #[test]
    fn test_tag_advances_and_untag() {
        let mut fx = Fixture::new(&["a.txt", "b.txt", "c.txt"]);
        fx.keys("t");
        assert!(fx.explorer.tags().contains(&fx.root().join("a.txt")));
        assert_eq!(fx.explorer.cursor(), 1);
        fx.keys("kt");
        assert!(fx.explorer.tags().is_empty());
        assert_eq!(fx.explorer.cursor(), 0);

        fx.press(KeyCode::Insert);
        fx.press(KeyCode::Insert);
        assert_eq!(fx.explorer.tags().len(), 2);
        fx.keys("u");
        assert!(fx.explorer.tags().is_empty());
        assert_eq!(fx.explorer.status(), Some("untag all."));
    }

    #[test]
    fn test_rebuild_drops_vanished_tags() {
        let mut fx = Fixture::new(&["a.txt", "b.txt"]);
        fx.keys("tt");
        fs::remove_file(fx.root().join("a.txt")).unwrap();
        fx.press(KeyCode::F(5));
        assert_eq!(fx.explorer.tags().members(), &[fx.root().join("b.txt")]);
        assert_eq!(fx.explorer.status(), Some("rebuilt."));
    }

    // ── Opening notes ───────────────────────────────────────────────────

    #[test]
    fn test_enter_views_with_rule() {
        let mut fx = Fixture::new(&["a.txt"]);
        fx.press(KeyCode::Enter);
        assert_eq!(fx.launcher.runs, vec![format!("${{PAGER:-less}} {}", fx.quoted("a.txt"))]);
    }

    #[test]
    fn test_view_tagged_in_one_process() {
        let mut fx = Fixture::new(&["a.txt", "b.txt", "c.txt"]);
        fx.keys("ttv");
        assert_eq!(
            fx.launcher.runs,
            vec![format!(
                "${{PAGER:-less}} {} {}",
                fx.quoted("a.txt"),
                fx.quoted("b.txt")
            )]
        );
        assert!(fx.explorer.tags().is_empty());
    }

    #[test]
    fn test_edit_backs_up_first() {
        let mut fx = Fixture::new(&["work/a.txt"]);
        fx.keys("e");
        assert_eq!(fx.launcher.runs, vec![format!("${{EDITOR:-vi}} {}", fx.quoted("work/a.txt"))]);
        assert!(fx.backup().join("work/a.txt").is_file());
    }

    // ── Delete ──────────────────────────────────────────────────────────

    #[test]
    fn test_delete_needs_confirmation() {
        let mut fx = Fixture::new(&["a.txt", "b.txt"]);
        fx.keys("jdd");
        fx.answer("no");
        assert!(fx.root().join("b.txt").exists());

        fx.press(KeyCode::Delete);
        fx.answer("  yes");
        assert!(!fx.root().join("b.txt").exists());
        assert_eq!(fs::read_to_string(fx.backup().join("b.txt")).unwrap(), "b.txt");
        assert_eq!(fx.explorer.status(), Some("one note deleted."));
        assert_eq!(fx.names(), vec!["a.txt"]);
        assert_eq!(fx.explorer.cursor(), 0);
    }

    #[test]
    fn test_delete_tagged() {
        let mut fx = Fixture::new(&["a.txt", "b.txt", "c.txt"]);
        fx.keys("tt");
        fx.keys("dd");
        fx.answer("+");
        assert_eq!(fx.names(), vec!["c.txt"]);
        assert!(fx.explorer.tags().is_empty());
        assert_eq!(fx.explorer.status(), Some("2 notes deleted."));
    }

    #[test]
    fn test_affirmative_answers() {
        for yes in ["y", "Yes", "t", "TRUE", "1", "+", "  y"] {
            assert!(is_affirmative(yes), "{yes}");
        }
        for no in ["", "n", "no", "0", "-", "sure"] {
            assert!(!is_affirmative(no), "{no}");
        }
    }

    #[test]
    fn test_tally() {
        assert_eq!(tally(1, 0, "moved"), "one note moved.");
        assert_eq!(tally(0, 2, "deleted"), "0 notes deleted; 2 failed.");
        assert_eq!(tally(3, 1, "moved"), "3 notes moved; 1 failed.");
    }

    // ── Rename & change section ─────────────────────────────────────────

    #[test]
    fn test_rename_follows_note() {
        let mut fx = Fixture::new(&["a.txt", "b.txt", "c.txt"]);
        fx.keys("r");
        fx.press(KeyCode::Backspace);
        fx.answer("z");
        assert_eq!(fx.names(), vec!["b.txt", "c.txt", "z.txt"]);
        assert_eq!(fx.explorer.cursor(), 2);
        assert!(fx.backup().join("a.txt").is_file());
    }

    #[test]
    fn test_rename_onto_existing_is_refused() {
        let mut fx = Fixture::new(&["a.txt", "b.txt"]);
        fx.keys("r");
        fx.press(KeyCode::Backspace);
        fx.answer("b");
        assert!(fx.explorer.status().unwrap().contains("already exists"));
        assert_eq!(fs::read_to_string(fx.root().join("b.txt")).unwrap(), "b.txt");
        assert_eq!(fx.names(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_change_section() {
        let mut fx = Fixture::new(&["a.txt", "b.txt", "Archive/old.txt"]);
        fx.keys("c");
        fx.answer("a/b");
        assert!(fx.explorer.status().unwrap().contains("cannot contain"));
        assert!(fx.root().join("a.txt").exists());

        fx.keys("c");
        fx.answer("archive");
        assert!(fx.root().join("Archive/a.txt").is_file());
        assert!(!fx.root().join("a.txt").exists());
        assert_eq!(fx.explorer.status(), Some("one note moved."));
    }

    #[test]
    fn test_change_section_tagged_creates_section() {
        let mut fx = Fixture::new(&["a.txt", "b.txt"]);
        fx.keys("ttc");
        fx.answer("done");
        assert!(fx.root().join("done/a.txt").is_file());
        assert!(fx.root().join("done/b.txt").is_file());
        assert_eq!(fx.explorer.status(), Some("2 notes moved."));
        assert!(fx.explorer.tags().is_empty());
    }

    // ── Create ──────────────────────────────────────────────────────────

    #[test]
    fn test_add_creates_empty_note() {
        let mut fx = Fixture::new(&["m.txt", "z.txt"]);
        fx.keys("a");
        fx.answer("fresh");
        let path = fx.root().join("fresh.txt");
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert_eq!(fx.explorer.current().unwrap().path, path);
        assert!(fx.launcher.runs.is_empty());
        assert_eq!(fx.explorer.status(), Some("'fresh' created"));
    }

    #[test]
    fn test_add_existing_is_refused() {
        let mut fx = Fixture::new(&["a.txt"]);
        fx.keys("a");
        fx.answer("a");
        assert!(fx.explorer.status().unwrap().contains("already exists"));
        assert_eq!(fs::read_to_string(fx.root().join("a.txt")).unwrap(), "a.txt");
    }

    #[test]
    fn test_new_opens_editor_in_active_section() {
        let mut fx = Fixture::new(&["work/a.txt"]);
        fx.keys("s");
        fx.answer("work");
        fx.keys("n");
        fx.answer("draft");
        assert_eq!(fx.launcher.runs, vec![format!("${{EDITOR:-vi}} {}", fx.quoted("work/draft.txt"))]);
    }

    #[test]
    fn test_section_creation_failure_is_fatal() {
        let mut fx = Fixture::new(&["blocker"]);
        fx.keys("a");
        fx.keys("blocker/x");
        let result = fx
            .explorer
            .handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &mut fx.launcher);
        assert!(result.is_err());
        assert!(!fx.explorer.is_running());
    }

    // ── Commands ────────────────────────────────────────────────────────

    #[test]
    fn test_user_menu_runs_over_targets() {
        let mut fx = Fixture::new(&["a.txt"]);
        fx.keys("m");
        fx.press(KeyCode::Enter);
        assert_eq!(fx.launcher.waited, vec![format!("wc -w {}", fx.quoted("a.txt"))]);
    }

    #[test]
    fn test_command_prompt() {
        let mut fx = Fixture::new(&["a.txt", "b.txt"]);
        fx.keys("tt");
        fx.press(KeyCode::F(10));
        fx.answer("ls -l");
        assert_eq!(
            fx.launcher.waited,
            vec![format!("ls -l {} {}", fx.quoted("a.txt"), fx.quoted("b.txt"))]
        );
        assert!(fx.explorer.tags().is_empty());
    }

    #[test]
    fn test_file_manager_dialog() {
        let mut fx = Fixture::new(&[]);
        fx.press(KeyCode::F(4));
        fx.keys("j");
        fx.press(KeyCode::Enter);
        assert_eq!(fx.launcher.runs, vec![format!("nnn '{}'", fx.root().display())]);

        fx.press(KeyCode::F(4));
        fx.press(KeyCode::Esc);
        assert_eq!(fx.launcher.runs.len(), 1);
    }

    // ── Status, help & quit ─────────────────────────────────────────────

    #[test]
    fn test_status_expires() {
        let mut fx = Fixture::new(&["a.txt"]);
        fx.keys("u");
        assert!(fx.explorer.status().is_some());
        fx.keys("j");
        assert!(fx.explorer.status().is_some());
        fx.keys("j");
        assert!(fx.explorer.status().is_none());
        assert!(fx.explorer.status_markup().contains("uit"));
    }

    #[test]
    fn test_help_viewer_takes_keys_until_closed() {
        let mut fx = Fixture::new(&["a.txt"]);
        fx.keys("?");
        fx.keys("q");
        assert!(fx.explorer.is_running());
        fx.keys("q");
        assert!(!fx.explorer.is_running());
    }

    #[test]
    fn test_ctrl_c_quits_and_clears_tags() {
        let mut fx = Fixture::new(&["a.txt", "b.txt"]);
        fx.keys("t");
        fx.send(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!fx.explorer.is_running());
        assert!(fx.explorer.tags().is_empty());
    }
}
