use std::fs::File;
use std::io::{Read, Write};

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Parser};

use notes_book::launcher::shell;
use notes_book::{Action, Launcher, Note, NoteIndex, Notebook};

/// notes: a personal note manager.
///
/// Without arguments the interactive explorer opens.
#[derive(Parser, Debug)]
#[command(name = "notes", version, about)]
#[command(group(ArgGroup::new("mode").multiple(false)))]
pub struct Cli {
    /// Add a new note; remaining arguments are files copied into it
    #[arg(short = 'a', long, group = "mode")]
    pub add: bool,

    /// Append to a note; remaining arguments are files copied into it
    #[arg(short = 'A', long, group = "mode")]
    pub append: bool,

    /// List notes matching the pattern ('*' lists all)
    #[arg(short, long, group = "mode")]
    pub list: bool,

    /// Like --list but print full paths only (for scripts)
    #[arg(short, long, group = "mode")]
    pub files: bool,

    /// Open the note in the viewer (see --all)
    #[arg(short, long, group = "mode")]
    pub view: bool,

    /// Print the note to standard output (see --all)
    #[arg(short, long, group = "mode")]
    pub print: bool,

    /// Open the note in the editor (see --all); with --add or --append,
    /// edit the note afterwards
    #[arg(
        short,
        long,
        conflicts_with_all = ["list", "files", "view", "print", "delete", "rename", "onstart", "onexit"]
    )]
    pub edit: bool,

    /// Delete every matching note
    #[arg(short, long, group = "mode")]
    pub delete: bool,

    /// Rename or move a note: PATTERN NEW
    #[arg(short, long, group = "mode")]
    pub rename: bool,

    /// Run the configured 'onstart' command and exit with its status
    #[arg(long, group = "mode")]
    pub onstart: bool,

    /// Run the configured 'onexit' command and exit with its status
    #[arg(long, group = "mode")]
    pub onexit: bool,

    /// Restrict to (or create in) this section
    #[arg(short, long, value_name = "SECTION")]
    pub section: Option<String>,

    /// Act on every match instead of the first (view, print, edit)
    #[arg(long)]
    pub all: bool,

    /// Allow --add to overwrite an existing note
    #[arg(long)]
    pub force: bool,

    /// Note name or pattern
    #[arg(value_name = "NOTE|PATTERN")]
    pub target: Option<String>,

    /// Files to copy in ('-' reads standard input), or the new name
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,
}

/// What the command line asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Add { edit: bool },
    Append { edit: bool },
    List,
    Files,
    View,
    Print,
    Edit,
    Delete,
    Rename,
    OnStart,
    OnExit,
    /// List the matches and view the only one.
    Auto,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.add {
            Mode::Add { edit: self.edit }
        } else if self.append {
            Mode::Append { edit: self.edit }
        } else if self.list {
            Mode::List
        } else if self.files {
            Mode::Files
        } else if self.view {
            Mode::View
        } else if self.print {
            Mode::Print
        } else if self.edit {
            Mode::Edit
        } else if self.delete {
            Mode::Delete
        } else if self.rename {
            Mode::Rename
        } else if self.onstart {
            Mode::OnStart
        } else if self.onexit {
            Mode::OnExit
        } else {
            Mode::Auto
        }
    }

    /// No mode and nothing to look for: open the explorer.
    pub fn wants_explorer(&self) -> bool {
        self.mode() == Mode::Auto && self.target.is_none()
    }

    fn reads_stdin(&self) -> bool {
        self.args.iter().any(|a| a == "-")
    }
}

/// Standard streams, swappable in tests.
pub struct Streams<'a> {
    pub input: &'a mut dyn Read,
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

// ── Dispatch ─────────────────────────────────────────────────────────

/// Run a one-shot command-line mode. Returns the process exit status.
pub fn run(
    cli: &Cli,
    book: &Notebook,
    launcher: &mut dyn Launcher,
    io: &mut Streams,
) -> Result<u8> {
    let mode = cli.mode();
    match mode {
        Mode::OnStart => return run_hook(book.config().on_start.as_deref()),
        Mode::OnExit => return run_hook(book.config().on_exit.as_deref()),
        _ => {}
    }

    let target = match (&cli.target, mode) {
        (Some(target), _) => target.as_str(),
        (None, Mode::List | Mode::Files) => "*",
        (None, Mode::Add { .. }) => bail!("usage: notes -a new-note-name"),
        (None, Mode::Append { .. }) => bail!("usage: notes -A note-name"),
        (None, Mode::Rename) => bail!("usage: notes -r note-name new-note-name"),
        (None, _) => bail!("usage: notes {}note-name", mode_flag(mode)),
    };

    match mode {
        Mode::Add { edit } => add(cli, book, target, false, edit, launcher, io),
        Mode::Append { edit } => add(cli, book, target, true, edit, launcher, io),
        _ => on_matches(cli, book, mode, target, launcher, io),
    }
}

fn mode_flag(mode: Mode) -> &'static str {
    match mode {
        Mode::View => "-v ",
        Mode::Print => "-p ",
        Mode::Edit => "-e ",
        Mode::Delete => "-d ",
        _ => "",
    }
}

/// Run a hook command through the shell and hand back its exit status.
/// An unset hook succeeds.
fn run_hook(command: Option<&str>) -> Result<u8> {
    let Some(command) = command else {
        return Ok(0);
    };
    let status = shell(command)
        .status()
        .with_context(|| format!("running '{command}'"))?;
    tracing::info!(command, ?status, "hook finished");
    Ok(status.code().and_then(|c| u8::try_from(c).ok()).unwrap_or(1))
}

// ── Add & append ─────────────────────────────────────────────────────

fn add(
    cli: &Cli,
    book: &Notebook,
    name: &str,
    append: bool,
    edit: bool,
    launcher: &mut dyn Launcher,
    io: &mut Streams,
) -> Result<u8> {
    let index = book.build("", "");
    let section = cli.section.as_deref().unwrap_or("");
    let note = book.create(&index, name, section, !append)?;
    if append {
        book.append(&note, &mut std::io::empty())?;
    }

    for file in cli.args.iter().filter(|a| *a != "-") {
        match File::open(file) {
            Ok(mut input) => {
                book.append(&note, &mut input)?;
                writeln!(io.out, "* '{file}' copied *")?;
            }
            Err(err) => writeln!(io.err, "{file}: {err}")?,
        }
    }
    if cli.reads_stdin() {
        book.append(&note, io.input)?;
    }

    if edit {
        book.rules().exec(Action::Edit, &note.path, launcher);
    }
    Ok(0)
}

// ── Pattern modes ────────────────────────────────────────────────────

fn on_matches(
    cli: &Cli,
    book: &Notebook,
    mode: Mode,
    pattern: &str,
    launcher: &mut dyn Launcher,
    io: &mut Streams,
) -> Result<u8> {
    let index = book.build("", "");
    let matches = Notebook::select(&index, cli.section.as_deref(), pattern);

    if matches!(mode, Mode::List | Mode::Files | Mode::Auto) {
        let width = section_width(&index);
        for note in &matches {
            if mode == Mode::Files {
                writeln!(io.out, "{}", note.path.display())?;
            } else {
                writeln!(io.out, "{}", list_line(note, width))?;
            }
        }
    }
    if matches.is_empty() {
        writeln!(io.err, "* no notes found *")?;
        return Ok(1);
    }

    match mode {
        Mode::List | Mode::Files => Ok(0),
        Mode::Auto if matches.len() == 1 => open(cli, book, Action::View, false, &matches, launcher, io),
        Mode::Auto => Ok(0),
        Mode::View => open(cli, book, Action::View, false, &matches, launcher, io),
        Mode::Print => open(cli, book, Action::View, true, &matches, launcher, io),
        Mode::Edit => open(cli, book, Action::Edit, false, &matches, launcher, io),
        Mode::Delete => delete(book, &matches, io),
        Mode::Rename => rename(cli, book, &index, &matches[0], io),
        Mode::Add { .. } | Mode::Append { .. } | Mode::OnStart | Mode::OnExit => Ok(0),
    }
}

fn section_width(index: &NoteIndex) -> usize {
    index
        .sections()
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0)
}

/// `section (type) - name`, the section padded to `width`.
pub fn list_line(note: &Note, width: usize) -> String {
    format!("{:<width$} ({:<3}) - {}", note.section, note.ftype, note.name)
}

/// View, edit or print the first match, or all of them with `--all`.
fn open(
    cli: &Cli,
    book: &Notebook,
    action: Action,
    print: bool,
    matches: &[Note],
    launcher: &mut dyn Launcher,
    io: &mut Streams,
) -> Result<u8> {
    let take = if cli.all { matches.len() } else { 1 };
    for note in matches.iter().take(take) {
        if action == Action::Edit {
            book.backup_or_warn(note);
        }
        if print {
            book.print(note, io.out)?;
        } else {
            book.rules().exec(action, &note.path, launcher);
        }
    }
    Ok(0)
}

fn delete(book: &Notebook, matches: &[Note], io: &mut Streams) -> Result<u8> {
    let mut code = 0;
    for note in matches {
        match book.delete(note) {
            Ok(()) => writeln!(io.out, "* '{}' deleted *", note.name)?,
            Err(err) => {
                writeln!(io.err, "{err}")?;
                code = 1;
            }
        }
    }
    Ok(code)
}

/// Move the first match. The new name is relative to the notebook root.
fn rename(
    cli: &Cli,
    book: &Notebook,
    index: &NoteIndex,
    note: &Note,
    io: &mut Streams,
) -> Result<u8> {
    let Some(new_name) = cli.args.first() else {
        bail!("usage: notes -r old-name new-name");
    };
    book.relocate(index, note, new_name, Some(""))?;
    writeln!(io.out, "* '{}' -> '{}' succeed *", note.name, new_name)?;
    Ok(0)
}
