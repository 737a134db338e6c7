//! Inline attribute markup.
//!
//! Text may carry escape directives (`ESC` followed by a code):
//!
//! | directive        | effect                                     |
//! |------------------|--------------------------------------------|
//! | `b+` / `b-`      | bold on / off                              |
//! | `u+` / `u-`      | underline on / off                         |
//! | `r+` / `r-`      | reverse on / off                           |
//! | `d+` / `d-`      | dim on / off                               |
//! | `cFB+` / `cFB-`  | foreground `F`, background `B` (hex digit) |
//! | `CXY+` / `CXY-`  | colour pair `0xXY`                         |
//!
//! Unknown directives are kept as literal text. [`parse`] decomposes a
//! string into [`Segment`]s once, so drawing never rescans escapes.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

pub const ESC: char = '\x1b';

/// How a run selects its colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSel {
    /// VGA palette indices 0..=15 for foreground and background.
    Vga { fg: u8, bg: u8 },
    /// A colour pair; high nibble foreground, low nibble background.
    Pair(u8),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attrs {
    pub bold: bool,
    pub underline: bool,
    pub reverse: bool,
    pub dim: bool,
    pub color: Option<ColorSel>,
}

/// A run of text sharing one set of attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub attrs: Attrs,
}

/// Split `text` into attribute runs. Empty runs are never produced.
pub fn parse(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut attrs = Attrs::default();
    let mut buf = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != ESC {
            buf.push(c);
            continue;
        }
        let Some(code) = chars.next() else {
            buf.push(ESC);
            break;
        };

        let mut next = attrs;
        match code {
            'b' | 'u' | 'r' | 'd' => {
                let on = chars.next_if_eq(&'+').is_some();
                if !on {
                    chars.next_if_eq(&'-');
                }
                match code {
                    'b' => next.bold = on,
                    'u' => next.underline = on,
                    'r' => next.reverse = on,
                    _ => next.dim = on,
                }
            }
            'c' | 'C' => {
                let hi = chars.next_if(char::is_ascii_hexdigit);
                let lo = hi.and_then(|_| chars.next_if(char::is_ascii_hexdigit));
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    let on = chars.next_if_eq(&'+').is_some();
                    if !on {
                        chars.next_if_eq(&'-');
                    }
                    let (hi, lo) = (hex(hi), hex(lo));
                    next.color = on.then_some(if code == 'c' {
                        ColorSel::Vga { fg: hi, bg: lo }
                    } else {
                        ColorSel::Pair((hi << 4) | lo)
                    });
                } else {
                    // A malformed selector is dropped along with any lone digit.
                    continue;
                }
            }
            other => {
                buf.push(ESC);
                buf.push(other);
                continue;
            }
        }

        if next != attrs {
            flush(&mut segments, &mut buf, attrs);
            attrs = next;
        }
    }
    flush(&mut segments, &mut buf, attrs);
    segments
}

fn flush(segments: &mut Vec<Segment>, buf: &mut String, attrs: Attrs) {
    if buf.is_empty() {
        return;
    }
    segments.push(Segment {
        text: std::mem::take(buf),
        attrs,
    });
}

fn hex(c: char) -> u8 {
    c.to_digit(16).unwrap_or(0) as u8
}

/// Turn every `$x` into `x` drawn as a highlighted hotkey.
pub fn colorize_hotkeys(src: &str) -> String {
    let mut out = String::with_capacity(src.len() * 2);
    let mut chars = src.chars();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        if let Some(key) = chars.next() {
            out.push(ESC);
            out.push_str("c74+");
            out.push(key);
            out.push(ESC);
            out.push_str("c74-");
        }
    }
    out
}

/// Strip all directives, leaving the plain text.
pub fn plain(text: &str) -> String {
    parse(text).into_iter().map(|s| s.text).collect()
}

// ── Conversion to ratatui ────────────────────────────────────────────

/// The 16-colour VGA palette.
pub fn vga_color(idx: u8) -> Color {
    match idx & 0x0f {
        0 => Color::Black,
        1 => Color::Blue,
        2 => Color::Green,
        3 => Color::Cyan,
        4 => Color::Red,
        5 => Color::Magenta,
        6 => Color::Yellow,
        7 => Color::Gray,
        8 => Color::DarkGray,
        9 => Color::LightBlue,
        10 => Color::LightGreen,
        11 => Color::LightCyan,
        12 => Color::LightRed,
        13 => Color::LightMagenta,
        14 => Color::LightYellow,
        _ => Color::White,
    }
}

impl Attrs {
    pub fn style(&self) -> Style {
        let mut style = Style::default();
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.underline {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        if self.reverse {
            style = style.add_modifier(Modifier::REVERSED);
        }
        if self.dim {
            style = style.add_modifier(Modifier::DIM);
        }
        let (fg, bg) = match self.color {
            Some(ColorSel::Vga { fg, bg }) => (fg, bg),
            Some(ColorSel::Pair(pair)) => (pair >> 4, pair & 0x0f),
            None => return style,
        };
        style.fg(vga_color(fg)).bg(vga_color(bg))
    }
}

/// Parse `text` and build a styled line from its segments.
pub fn to_line(text: &str) -> Line<'static> {
    Line::from(
        parse(text)
            .into_iter()
            .map(|seg| Span::styled(seg.text, seg.attrs.style()))
            .collect::<Vec<_>>(),
    )
}
