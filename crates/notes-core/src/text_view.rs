use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::centered_rect;

/// A single entry in a key help listing.
#[derive(Debug, Clone)]
pub struct HelpEntry {
    /// The key or key combination (e.g., "t, INS", "dd").
    pub key: String,
    pub description: String,
    /// Optional section header this entry belongs to.
    pub section: Option<String>,
}

impl HelpEntry {
    pub fn with_section(
        section: impl Into<String>,
        key: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            section: Some(section.into()),
        }
    }
}

/// A scrollable read-only text window shown over the screen.
#[derive(Debug, Clone)]
pub struct TextView {
    title: String,
    lines: Vec<Line<'static>>,
    scroll: u16,
    /// Rows visible in the last render, used for paging.
    page: u16,
}

impl TextView {
    pub fn new(title: impl Into<String>, lines: Vec<Line<'static>>) -> Self {
        Self {
            title: title.into(),
            lines,
            scroll: 0,
            page: 10,
        }
    }

    /// A viewer listing `entries`, grouped under their section headers.
    pub fn help(title: impl Into<String>, entries: &[HelpEntry], notes: &[&str]) -> Self {
        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut current_section: Option<&str> = None;

        for entry in entries {
            if let Some(section) = entry.section.as_deref() {
                if current_section != Some(section) {
                    if !lines.is_empty() {
                        lines.push(Line::from(""));
                    }
                    lines.push(Line::from(Span::styled(
                        format!(" {section}"),
                        Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    )));
                    current_section = Some(section);
                }
            }
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:>8} ", entry.key),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(" ... ", Style::default().add_modifier(Modifier::DIM)),
                Span::raw(entry.description.clone()),
            ]));
        }

        if !notes.is_empty() {
            lines.push(Line::from(""));
            lines.extend(notes.iter().map(|n| Line::from(format!(" {n}"))));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Esc/q  close    j/k  scroll",
            Style::default().add_modifier(Modifier::DIM),
        )));
        Self::new(title, lines)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    fn max_scroll(&self) -> u16 {
        (self.lines.len() as u16).saturating_sub(self.page)
    }

    /// Returns `false` once the viewer should close.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter => {
                return false;
            }
            KeyCode::Char('j') | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::PageDown | KeyCode::Char(' ') => {
                self.scroll = self.scroll.saturating_add(self.page)
            }
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(self.page),
            KeyCode::Char('g') | KeyCode::Home => self.scroll = 0,
            KeyCode::Char('G') | KeyCode::End => self.scroll = self.max_scroll(),
            _ => {}
        }
        self.scroll = self.scroll.min(self.max_scroll());
        true
    }

    /// Render the viewer centered on screen.
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(8).min(80);
        let height = area
            .height
            .saturating_sub(4)
            .min(self.lines.len() as u16 + 2);
        let popup = centered_rect(width, height, area);
        self.page = height.saturating_sub(2).max(1);
        self.scroll = self.scroll.min(self.max_scroll());

        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL);

        let paragraph = Paragraph::new(self.lines.clone())
            .block(block)
            .scroll((self.scroll, 0));
        frame.render_widget(paragraph, popup);
    }
}
