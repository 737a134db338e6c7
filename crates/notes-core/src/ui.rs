use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::markup;

/// Explorer layout: list (left third) and preview side by side, with a
/// one-line status bar below. Returns (list_area, preview_area, status_area).
pub fn explorer_layout(area: Rect) -> (Rect, Rect, Rect) {
    let [main, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
    let [list_area, preview_area] =
        Layout::horizontal([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)]).areas(main);
    (list_area, preview_area, status_area)
}

/// The status line: ` N notes ┃ message`. `message` may carry markup.
pub fn render_status_bar(frame: &mut Frame, area: Rect, count: usize, message: &str) {
    let mut spans = vec![
        Span::styled(
            format!(" {count} notes "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("┃ "),
    ];
    spans.extend(markup::to_line(message).spans);

    let bar = Paragraph::new(Line::from(spans))
        .style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_widget(bar, area);
}

/// A bordered block with a dimmed frame.
pub fn pane_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::DIM))
}

/// A `width` x `height` rect centered within `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
