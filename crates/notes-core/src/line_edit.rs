use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

/// What a key press did to the line being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Still editing.
    Pending,
    /// Enter was pressed; carries the final text.
    Commit(String),
    /// Esc (or Ctrl-c) was pressed; the text is discarded.
    Cancel,
}

/// A single-line text input with a prompt.
///
/// `cursor` is a byte offset that always sits on a char boundary.
#[derive(Debug, Clone, Default)]
pub struct LineEdit {
    prompt: String,
    text: String,
    cursor: usize,
    overwrite: bool,
}

impl LineEdit {
    /// Start editing `initial` with the cursor at its end.
    pub fn new(prompt: impl Into<String>, initial: impl Into<String>) -> Self {
        let text = initial.into();
        Self {
            prompt: prompt.into(),
            cursor: text.len(),
            text,
            overwrite: false,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Display column of the cursor within the text.
    pub fn cursor_column(&self) -> usize {
        self.text[..self.cursor].width()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return EditOutcome::Cancel,
                KeyCode::Char('a') => self.cursor = 0,
                KeyCode::Char('e') => self.cursor = self.text.len(),
                KeyCode::Char('u') => {
                    self.text.drain(..self.cursor);
                    self.cursor = 0;
                }
                _ => {}
            }
            return EditOutcome::Pending;
        }

        match key.code {
            KeyCode::Esc => return EditOutcome::Cancel,
            KeyCode::Enter => return EditOutcome::Commit(self.text.clone()),
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Backspace => {
                if let Some(prev) = self.prev_boundary() {
                    self.text.drain(prev..self.cursor);
                    self.cursor = prev;
                }
            }
            KeyCode::Delete => {
                if let Some(next) = self.next_boundary() {
                    self.text.drain(self.cursor..next);
                }
            }
            KeyCode::Left => {
                if let Some(prev) = self.prev_boundary() {
                    self.cursor = prev;
                }
            }
            KeyCode::Right => {
                if let Some(next) = self.next_boundary() {
                    self.cursor = next;
                }
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.text.len(),
            KeyCode::Insert => self.overwrite = !self.overwrite,
            _ => {}
        }
        EditOutcome::Pending
    }

    fn insert(&mut self, c: char) {
        if self.overwrite {
            if let Some(next) = self.next_boundary() {
                self.text.drain(self.cursor..next);
            }
        }
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }

    /// Draw `prompt text` on one line and place the terminal cursor.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let prompt = format!(" {} ", self.prompt);
        let line = Line::from(vec![
            Span::styled(prompt.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(self.text.as_str()),
        ]);
        frame.render_widget(Paragraph::new(line), area);

        let column = prompt.width() + self.cursor_column();
        let x = area.x.saturating_add(column as u16).min(area.right().saturating_sub(1));
        frame.set_cursor_position((x, area.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(edit: &mut LineEdit, s: &str) {
        for c in s.chars() {
            assert_eq!(edit.handle_key(key(KeyCode::Char(c))), EditOutcome::Pending);
        }
    }

    #[test]
    fn test_typing_and_commit() {
        let mut edit = LineEdit::new("Name:", "");
        type_str(&mut edit, "todo");
        assert_eq!(edit.handle_key(key(KeyCode::Enter)), EditOutcome::Commit("todo".into()));
    }

    #[test]
    fn test_starts_with_initial_text() {
        let mut edit = LineEdit::new("Rename:", "draft");
        assert_eq!(edit.cursor_column(), 5);
        type_str(&mut edit, "2");
        assert_eq!(edit.text(), "draft2");
    }

    #[test]
    fn test_cancel() {
        let mut edit = LineEdit::new("Filter:", "abc");
        assert_eq!(edit.handle_key(key(KeyCode::Esc)), EditOutcome::Cancel);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(edit.handle_key(ctrl_c), EditOutcome::Cancel);
    }

    #[test]
    fn test_navigation_and_deletion() {
        let mut edit = LineEdit::new("", "hello");
        edit.handle_key(key(KeyCode::Home));
        edit.handle_key(key(KeyCode::Delete));
        assert_eq!(edit.text(), "ello");
        edit.handle_key(key(KeyCode::End));
        edit.handle_key(key(KeyCode::Left));
        edit.handle_key(key(KeyCode::Backspace));
        assert_eq!(edit.text(), "elo");
        edit.handle_key(key(KeyCode::Right));
        edit.handle_key(key(KeyCode::Right));
        type_str(&mut edit, "!");
        assert_eq!(edit.text(), "elo!");
    }

    #[test]
    fn test_overwrite_toggle() {
        let mut edit = LineEdit::new("", "abc");
        edit.handle_key(key(KeyCode::Home));
        edit.handle_key(key(KeyCode::Insert));
        assert!(edit.overwrite());
        type_str(&mut edit, "XY");
        assert_eq!(edit.text(), "XYc");
        type_str(&mut edit, "ZW");
        assert_eq!(edit.text(), "XYZW");
        edit.handle_key(key(KeyCode::Insert));
        edit.handle_key(key(KeyCode::Home));
        type_str(&mut edit, "_");
        assert_eq!(edit.text(), "_XYZW");
    }

    #[test]
    fn test_multibyte_boundaries() {
        let mut edit = LineEdit::new("", "añ日");
        assert_eq!(edit.cursor_column(), 4);
        edit.handle_key(key(KeyCode::Backspace));
        assert_eq!(edit.text(), "añ");
        edit.handle_key(key(KeyCode::Left));
        edit.handle_key(key(KeyCode::Delete));
        assert_eq!(edit.text(), "a");
        edit.handle_key(key(KeyCode::Right));
        edit.handle_key(key(KeyCode::Right));
        assert_eq!(edit.cursor_column(), 1);
    }

    #[test]
    fn test_ctrl_u_kills_to_start() {
        let mut edit = LineEdit::new("", "section/name");
        for _ in 0..4 {
            edit.handle_key(key(KeyCode::Left));
        }
        edit.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(edit.text(), "name");
        assert_eq!(edit.cursor_column(), 0);
    }
}
