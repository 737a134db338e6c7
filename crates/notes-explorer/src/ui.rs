use std::fs::File;
use std::io::{BufRead, BufReader};

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

use notes_book::Note;
use notes_core::markup::{self, ESC};
use notes_core::ui::{explorer_layout, pane_block, render_status_bar};

use crate::{Explorer, Modal};

// ── Main entry point ─────────────────────────────────────────────────

/// Render the list, the preview of the highlighted note, the status line
/// and any open prompt or dialog.
pub fn render_explorer(frame: &mut Frame, explorer: &mut Explorer) {
    let (list_area, preview_area, status_area) = explorer_layout(frame.area());

    let title = if explorer.filter.is_empty() {
        format!("Notes {}", explorer.section)
    } else {
        format!("Notes {} [{}]", explorer.section, explorer.filter)
    };
    let block = pane_block(title.trim_end());
    let inner = block.inner(list_area);
    frame.render_widget(block, list_area);
    explorer.set_visible_lines(inner.height as usize);
    render_list(frame, inner, explorer);

    let block = pane_block("Preview");
    let inner = block.inner(preview_area);
    frame.render_widget(block, preview_area);
    if let Some(note) = explorer.current() {
        let lines = preview_lines(note, inner.width as usize, inner.height as usize);
        frame.render_widget(Paragraph::new(lines), inner);
    }

    match explorer.active_prompt() {
        Some(edit) => edit.render(frame, status_area),
        None => render_status_bar(
            frame,
            status_area,
            explorer.index.len(),
            &explorer.status_markup(),
        ),
    }

    let area = frame.area();
    match &mut explorer.modal {
        Modal::Dialog(_, dialog) => dialog.render(frame, area),
        Modal::Viewer(view) => view.render(frame, area),
        Modal::Prompt(..) | Modal::None => {}
    }
}

// ── Note list ────────────────────────────────────────────────────────

fn render_list(frame: &mut Frame, area: Rect, explorer: &Explorer) {
    if explorer.index.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "* No notes found! *",
            Style::default().add_modifier(Modifier::DIM),
        )));
        frame.render_widget(empty, area);
        return;
    }

    let lines: Vec<Line> = explorer
        .index
        .iter()
        .enumerate()
        .skip(explorer.offset)
        .take(area.height as usize)
        .map(|(i, note)| {
            note_row(
                note,
                explorer.tags.contains(&note.path),
                i == explorer.cursor,
                area.width as usize,
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

/// One list row: tag marker and name on the left, the section dimmed and
/// right-aligned. The cursor row is reversed.
pub fn note_row(note: &Note, tagged: bool, selected: bool, width: usize) -> Line<'static> {
    let left = format!("{}{}", if tagged { '+' } else { ' ' }, note.name);
    let used = left.width() + note.section.width();
    let gap = width.saturating_sub(used).max(1);

    let base = if selected {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    let mut spans = vec![Span::styled(left, base), Span::styled(" ".repeat(gap), base)];
    if !note.section.is_empty() {
        spans.push(Span::styled(
            note.section.clone(),
            base.add_modifier(Modifier::DIM),
        ));
    }
    Line::from(spans)
}

// ── Preview ──────────────────────────────────────────────────────────

/// Header with the note's attributes, a rule, then as much content as fits.
pub fn preview_lines(note: &Note, width: usize, height: usize) -> Vec<Line<'static>> {
    let bold = |s: &str| format!("{ESC}b+{s}{ESC}b-");
    let meta = &note.meta;
    let date = meta
        .modified
        .map(|d| d.format("%F %H:%M").to_string())
        .unwrap_or_else(|| "* error *".to_string());

    let mut header = format!("Name: {}", bold(&note.name));
    if !note.section.is_empty() {
        header.push_str(&format!(", Section: {}", bold(&note.section)));
    }
    let mut lines = vec![
        markup::to_line(&header),
        markup::to_line(&format!("File: {}", bold(&note.path.display().to_string()))),
        markup::to_line(&format!("Date: {}", bold(&date))),
        markup::to_line(&format!(
            "Stat: {} bytes, mode {}, owner {}:{}",
            bold(&format!("{:6}", meta.size)),
            bold(&format!("0{:o}", meta.mode)),
            bold(&meta.uid.to_string()),
            bold(&meta.gid.to_string()),
        )),
        Line::from("─".repeat(width)),
    ];

    let Ok(file) = File::open(&note.path) else {
        return lines;
    };
    let room = height.saturating_sub(lines.len());
    // Non-UTF-8 bytes are shown as replacement characters
    let content = BufReader::new(file)
        .split(b'\n')
        .map_while(Result::ok)
        .map(|mut raw| {
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            String::from_utf8_lossy(&raw).into_owned()
        })
        .take(room);
    if note.ftype == "md" {
        lines.extend(markdown_lines(content));
    } else {
        lines.extend(content.map(Line::from));
    }
    lines
}

/// Bold headings; code blocks and tab-indented lines in colour.
fn markdown_lines(content: impl Iterator<Item = String>) -> Vec<Line<'static>> {
    let code = |s: &str| format!("{ESC}c20+{s}{ESC}c20-");
    let mut inside_code = false;
    content
        .map(|line| {
            let text = if line.starts_with("```") {
                inside_code = !inside_code;
                line
            } else if inside_code || line.starts_with('\t') {
                code(&line)
            } else if line.starts_with('#') {
                format!("{ESC}b+{line}{ESC}b-")
            } else {
                line
            };
            markup::to_line(&text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn note_with(dir: &Path, rel: &str, content: &str) -> Note {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        Note::load(dir, &path).unwrap()
    }

    #[test]
    fn test_note_row_layout() {
        let note = Note::from_path(Path::new("/n"), Path::new("/n/work/plan.md")).unwrap();
        let row = note_row(&note, true, false, 20);
        let text = row.to_string();
        assert!(text.starts_with("+plan"));
        assert!(text.ends_with("work"));
        assert_eq!(text.width(), 20);

        let row = note_row(&note, false, true, 20);
        assert!(row.to_string().starts_with(" plan"));
        assert!(row.spans[0].style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn test_preview_header() {
        let dir = TempDir::new().unwrap();
        let note = note_with(dir.path(), "work/todo.txt", "one\ntwo\n");
        let lines = preview_lines(&note, 10, 40);
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(text[0], "Name: todo, Section: work");
        assert!(text[3].contains("bytes, mode 0"));
        assert_eq!(text[4], "─".repeat(10));
        assert_eq!(&text[5..], &["one", "two"]);
    }

    #[test]
    fn test_preview_is_cut_to_height() {
        let dir = TempDir::new().unwrap();
        let note = note_with(dir.path(), "long.txt", &"x\n".repeat(100));
        assert_eq!(preview_lines(&note, 10, 8).len(), 8);
    }

    #[test]
    fn test_preview_survives_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, b"first\ncaf\xe9\r\nlast\n").unwrap();
        let note = Note::load(dir.path(), &path).unwrap();
        let lines = preview_lines(&note, 10, 40);
        let text: Vec<String> = lines[5..].iter().map(|l| l.to_string()).collect();
        assert_eq!(text, vec!["first", "caf\u{fffd}", "last"]);
    }

    #[test]
    fn test_markdown_colouring() {
        let dir = TempDir::new().unwrap();
        let note = note_with(dir.path(), "doc.md", "# Title\ntext\n```\n# not a heading\n```\n\tindented\n");
        let lines = preview_lines(&note, 10, 40);
        let body = &lines[5..];
        assert!(body[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(body[1].spans[0].style, Style::default());
        assert_eq!(body[3].spans[0].style.fg, Some(Color::Green));
        assert!(!body[3].spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(body[4].spans[0].style, Style::default());
        assert_eq!(body[5].spans[0].style.fg, Some(Color::Green));
    }
}
