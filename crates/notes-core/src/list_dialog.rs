use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

use crate::ui::centered_rect;

/// Result of a key press in a [`ListDialog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Pending,
    Selected(usize),
    Cancelled,
}

/// A modal single-selection list.
#[derive(Debug)]
pub struct ListDialog {
    title: String,
    items: Vec<String>,
    list_state: ListState,
    /// Rows visible in the last render, used for paging.
    page: usize,
}

impl ListDialog {
    pub fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        let mut list_state = ListState::default();
        if !items.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            title: title.into(),
            items,
            list_state,
            page: 10,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DialogOutcome {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return DialogOutcome::Cancelled,
            KeyCode::Enter => {
                return match self.selected() {
                    Some(idx) => DialogOutcome::Selected(idx),
                    None => DialogOutcome::Cancelled,
                };
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::PageDown => self.move_by(self.page as isize),
            KeyCode::PageUp => self.move_by(-(self.page as isize)),
            KeyCode::Char('g') | KeyCode::Home => self.move_by(isize::MIN / 2),
            KeyCode::Char('G') | KeyCode::End => self.move_by(isize::MAX / 2),
            _ => {}
        }
        DialogOutcome::Pending
    }

    /// Move selection down, wrapping to the top.
    fn move_down(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = if current + 1 >= self.items.len() { 0 } else { current + 1 };
        self.list_state.select(Some(next));
    }

    /// Move selection up, wrapping to the bottom.
    fn move_up(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = if current == 0 { self.items.len() - 1 } else { current - 1 };
        self.list_state.select(Some(next));
    }

    /// Move by `delta` rows, clamping at both ends.
    fn move_by(&mut self, delta: isize) {
        if self.items.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let last = self.items.len() as isize - 1;
        let next = current.saturating_add(delta).clamp(0, last);
        self.list_state.select(Some(next as usize));
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let widest = self.items.iter().map(|s| s.chars().count()).max().unwrap_or(0);
        let width = (widest.max(self.title.chars().count()) as u16 + 6)
            .max(24)
            .min(area.width.saturating_sub(4));
        let height = (self.items.len() as u16 + 2).min(area.height.saturating_sub(4)).max(3);
        let popup = centered_rect(width, height, area);
        self.page = height.saturating_sub(2).max(1) as usize;

        frame.render_widget(Clear, popup);

        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| ListItem::new(Line::from(Span::raw(item.as_str()))))
            .collect();

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL);

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, popup, &mut self.list_state);
    }
}
