use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions that can result from a key press in the note list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The key was consumed (or ignored) and nothing happens.
    None,
    Quit,
    Help,
    MoveDown(usize),
    MoveUp(usize),
    GotoTop,
    GotoBottom,
    PageDown,
    PageUp,
    HalfPageDown,
    HalfPageUp,
    /// Show the highlighted note with its view rule.
    Open,
    /// View the current or tagged notes.
    View,
    /// Edit the current or tagged notes.
    Edit,
    ToggleTag,
    ClearTags,
    Filter,
    SelectSection,
    ChangeSection,
    Delete,
    Rename,
    /// Create a note and open it in the editor.
    New,
    /// Create an empty note.
    Add,
    UserMenu,
    Command,
    FileManager,
    Rebuild,
}

/// Pending key state for two-key sequences like `gg` and `dd`.
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    pub pending_key: Option<char>,
}

impl KeyState {
    pub fn reset(&mut self) {
        self.pending_key = None;
    }
}

/// Map a key event to an [`Action`], tracking multi-key sequences in `state`.
pub fn process_normal_key(key: KeyEvent, state: &mut KeyState) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        state.reset();
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('d') => Action::HalfPageDown,
            KeyCode::Char('u') => Action::HalfPageUp,
            _ => Action::None,
        };
    }

    if let Some(pending) = state.pending_key.take() {
        return match (pending, key.code) {
            ('g', KeyCode::Char('g')) => Action::GotoTop,
            ('d', KeyCode::Char('d')) => Action::Delete,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown(1),
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp(1),
        KeyCode::Char('G') | KeyCode::End => Action::GotoBottom,
        KeyCode::Home => Action::GotoTop,
        KeyCode::Char('g') => {
            state.pending_key = Some('g');
            Action::None
        }
        KeyCode::Char('d') => {
            state.pending_key = Some('d');
            Action::None
        }
        KeyCode::PageDown => Action::PageDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::Enter => Action::Open,
        KeyCode::Char('v') => Action::View,
        KeyCode::Char('e') => Action::Edit,
        KeyCode::Char('t') | KeyCode::Insert => Action::ToggleTag,
        KeyCode::Char('u') => Action::ClearTags,
        KeyCode::Char('f') | KeyCode::Char('/') => Action::Filter,
        KeyCode::Char('s') => Action::SelectSection,
        KeyCode::Char('c') => Action::ChangeSection,
        KeyCode::Delete => Action::Delete,
        KeyCode::Char('r') => Action::Rename,
        KeyCode::Char('n') => Action::New,
        KeyCode::Char('a') => Action::Add,
        KeyCode::Char('m') | KeyCode::F(2) => Action::UserMenu,
        KeyCode::Char('x') | KeyCode::F(10) => Action::Command,
        KeyCode::F(4) => Action::FileManager,
        KeyCode::F(5) => Action::Rebuild,
        KeyCode::Char('?') => Action::Help,
        KeyCode::Char('q') => Action::Quit,
        _ => Action::None,
    }
}
