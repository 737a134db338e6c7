use globset::{GlobBuilder, GlobMatcher};

/// Letter case handling for a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Sensitive,
    Insensitive,
}

/// A shell glob matched against a single file name.
///
/// Semantics follow `fnmatch(3)` with `FNM_PATHNAME | FNM_PERIOD` plus the
/// ksh `@(a|b)` alternation: `*` and `?` never cross a `/`, and a name with a
/// leading `.` is only matched by a pattern that starts with `.` itself.
#[derive(Debug, Clone)]
pub struct NoteGlob {
    pattern: String,
    matcher: GlobMatcher,
}

impl NoteGlob {
    /// Compile `pattern`. Invalid patterns are logged and yield `None`.
    pub fn new(pattern: &str, case: Case) -> Option<Self> {
        let translated = translate(pattern);
        let built = GlobBuilder::new(&translated)
            .literal_separator(true)
            .backslash_escape(true)
            .case_insensitive(case == Case::Insensitive)
            .build();
        match built {
            Ok(glob) => Some(Self {
                pattern: pattern.to_string(),
                matcher: glob.compile_matcher(),
            }),
            Err(err) => {
                tracing::warn!(pattern, %err, "ignoring invalid pattern");
                None
            }
        }
    }

    /// The pattern as written by the user.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, name: &str) -> bool {
        if name.starts_with('.') && !self.pattern.starts_with('.') {
            return false;
        }
        self.matcher.is_match(name)
    }
}

/// Rewrite an fnmatch pattern into globset syntax.
///
/// `@(a|b)` becomes `{a,b}`; literal braces and commas elsewhere are escaped
/// because fnmatch gives them no meaning.
fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '[' if !in_class => {
                if !class_closes(chars.clone()) {
                    out.push_str("\\[");
                    continue;
                }
                in_class = true;
                out.push(c);
                if let Some(&neg) = chars.peek().filter(|&&n| n == '!' || n == '^') {
                    out.push(neg);
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    out.push(']');
                    chars.next();
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            '@' if !in_class && chars.peek() == Some(&'(') => {
                chars.next();
                let mut alternatives = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == ')' {
                        closed = true;
                        break;
                    }
                    alternatives.push(inner);
                }
                if closed {
                    out.push('{');
                    out.push_str(&alternatives.replace('|', ","));
                    out.push('}');
                } else {
                    out.push_str("@(");
                    out.push_str(&escape_braces(&alternatives));
                }
            }
            '{' | '}' | ',' if !in_class => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Whether the bracket expression starting after a `[` has a closing `]`.
/// A `]` right after the opening (or after `!`/`^`) is a member, not the end.
fn class_closes(rest: impl Iterator<Item = char>) -> bool {
    let mut rest = rest.peekable();
    if rest.peek().is_some_and(|&c| c == '!' || c == '^') {
        rest.next();
    }
    if rest.peek() == Some(&']') {
        rest.next();
    }
    rest.any(|c| c == ']')
}

fn escape_braces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '{' | '}' | ',') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
