use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;

use crate::exclude::ExcludeFilter;
use crate::menu::MenuItem;
use crate::rules::RuleTable;

/// Environment lookup, injectable so parsing stays pure.
pub type Env<'a> = &'a dyn Fn(&str) -> Option<String>;

// ── Locations ────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "notes")
}

/// Candidate configuration files, most preferred first:
/// `~/.config/notes/notesrc` (XDG-compliant), then `~/.notesrc`.
pub fn config_candidates(env: Env) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dirs) = project_dirs() {
        candidates.push(dirs.config_dir().join("notesrc"));
    }
    candidates.push(home(env).join(".notesrc"));
    candidates
}

/// Directory for the log file: `~/.local/share/notes`.
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.data_dir().to_path_buf())
}

fn home(env: Env) -> PathBuf {
    PathBuf::from(env("HOME").unwrap_or_else(|| "/tmp".to_string()))
}

// ── Configuration ────────────────────────────────────────────────────

/// Everything read from the configuration file, with defaults applied.
#[derive(Debug, Clone)]
pub struct Config {
    pub notebook: PathBuf,
    pub backup_dir: Option<PathBuf>,
    pub default_type: String,
    pub on_start: Option<String>,
    pub on_exit: Option<String>,
    pub exclude: ExcludeFilter,
    pub rules: RuleTable,
    pub user_menu: Vec<MenuItem>,
}

/// Variable values as written, before expansion.
#[derive(Debug)]
struct Vars {
    notebook: String,
    backupdir: String,
    deftype: String,
    onstart: String,
    onexit: String,
}

impl Config {
    /// Read the first existing configuration file from the process
    /// environment's candidate locations.
    pub fn load() -> Self {
        let env = |name: &str| std::env::var(name).ok();
        let source = config_candidates(&env).into_iter().find_map(|path| {
            match fs::read_to_string(&path) {
                Ok(text) => {
                    tracing::info!(path = %path.display(), "configuration loaded");
                    Some(text)
                }
                Err(_) => None,
            }
        });
        Self::from_source(source.as_deref(), &env)
    }

    /// Build a configuration from file text (or none) and an environment.
    /// The built-in pager and editor rules are appended after the file's.
    pub fn from_source(source: Option<&str>, env: Env) -> Self {
        let mut vars = Vars {
            notebook: "~/.notes".to_string(),
            backupdir: env("BACKUPDIR").unwrap_or_default(),
            deftype: "txt".to_string(),
            onstart: String::new(),
            onexit: String::new(),
        };
        let mut exclude = ExcludeFilter::new();
        let mut rules = RuleTable::new();
        let mut user_menu = Vec::new();

        for line in source.unwrap_or_default().lines() {
            let Some((name, directive)) = parse_line(line) else {
                continue;
            };
            match directive {
                Directive::Set(value) => {
                    let slot = match name {
                        "notebook" => &mut vars.notebook,
                        "backupdir" => &mut vars.backupdir,
                        "deftype" => &mut vars.deftype,
                        "onstart" => &mut vars.onstart,
                        "onexit" => &mut vars.onexit,
                        _ => {
                            tracing::warn!(variable = name, "unknown configuration variable");
                            continue;
                        }
                    };
                    *slot = value.to_string();
                }
                Directive::Command(params) => match name {
                    "exclude" => exclude.add_patterns(params),
                    "rule" => {
                        rules.add(params);
                    }
                    "umenu" => user_menu.extend(MenuItem::parse(params)),
                    _ => tracing::warn!(command = name, "unknown configuration command"),
                },
            }
        }
        rules.add_fallbacks();

        let backup = expand_vars(&vars.backupdir, env);
        Self {
            notebook: PathBuf::from(expand_vars(&vars.notebook, env)),
            backup_dir: (!backup.is_empty()).then(|| PathBuf::from(backup)),
            default_type: vars.deftype,
            on_start: non_empty(vars.onstart),
            on_exit: non_empty(vars.onexit),
            exclude,
            rules,
            user_menu,
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

// ── Line grammar ─────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Directive<'a> {
    Set(&'a str),
    Command(&'a str),
}

/// Split a line into an identifier and either `= value` or command
/// parameters. Blank lines and `#` comments yield `None`.
fn parse_line(line: &str) -> Option<(&str, Directive<'_>)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let end = line
        .find(|c: char| !(c == '_' || c.is_ascii_alphanumeric()))
        .unwrap_or(line.len());
    let (name, rest) = line.split_at(end);
    let rest = rest.trim_start();
    match rest.strip_prefix('=') {
        Some(value) => Some((name, Directive::Set(value.trim_start()))),
        None => Some((name, Directive::Command(rest))),
    }
}

/// Expand a leading `~`, `$NAME`, `${NAME}` and `${NAME:-default}`.
/// Unset names expand to nothing.
pub fn expand_vars(value: &str, env: Env) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    if let Some(stripped) = value.strip_prefix('~') {
        if stripped.is_empty() || stripped.starts_with('/') {
            out.push_str(&home(env).to_string_lossy());
            rest = stripped;
        }
    }

    let chars: Vec<char> = rest.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '$' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        if chars.get(i + 1) == Some(&'{') {
            let Some(close) = chars[i + 2..].iter().position(|&c| c == '}') else {
                out.push('$');
                i += 1;
                continue;
            };
            let inner: String = chars[i + 2..i + 2 + close].iter().collect();
            let value = match inner.split_once(":-") {
                Some((name, default)) => env(name)
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| default.to_string()),
                None => env(&inner).unwrap_or_default(),
            };
            out.push_str(&value);
            i += close + 3;
            continue;
        }

        let len = chars[i + 1..]
            .iter()
            .take_while(|c| c.is_ascii_alphanumeric() || **c == '_')
            .count();
        if len == 0 {
            out.push('$');
            i += 1;
            continue;
        }
        let name: String = chars[i + 1..i + 1 + len].iter().collect();
        out.push_str(&env(&name).unwrap_or_default());
        i += 1 + len;
    }
    out
}

// ── Tests ────────────────────────────────────────────────────────────
