use std::io::{self, Stdout, Write};

use anyhow::{Context, Result};
use crossterm::{
    cursor, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use notes_book::Launcher;
use notes_book::launcher::shell;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

// ── Lifecycle ────────────────────────────────────────────────────────

/// Restores the terminal when dropped, whatever way the explorer ends.
pub struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = leave();
    }
}

/// Enter raw mode and the alternate screen. A panic hook restores the
/// terminal before the panic message is printed.
pub fn setup() -> Result<(TerminalGuard, Tui)> {
    enter().context("entering the alternate screen")?;

    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = leave();
        hook(info);
    }));

    let guard = TerminalGuard;
    let terminal = Terminal::new(CrosstermBackend::new(io::stdout())).context("creating terminal")?;
    Ok((guard, terminal))
}

fn enter() -> io::Result<()> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)
}

fn leave() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)
}

// ── Launching from the explorer ──────────────────────────────────────

/// Hands the terminal to child programs. The screen is restored and fully
/// repainted once the child exits.
pub struct TerminalLauncher<'a> {
    terminal: &'a mut Tui,
}

impl<'a> TerminalLauncher<'a> {
    pub fn new(terminal: &'a mut Tui) -> Self {
        Self { terminal }
    }
}

impl Launcher for TerminalLauncher<'_> {
    fn run(&mut self, command_line: &str) -> io::Result<()> {
        let _suspended = Suspended::new(self.terminal)?;
        tracing::info!(command_line, "launching");
        shell(command_line).status()?;
        Ok(())
    }

    /// Show the command, run it, and keep its output on screen until the
    /// user presses Enter.
    fn run_and_wait(&mut self, command_line: &str) -> io::Result<()> {
        let _suspended = Suspended::new(self.terminal)?;
        tracing::info!(command_line, "launching");
        let mut stdout = io::stdout();
        writeln!(stdout, "Executing [{command_line}]")?;
        stdout.flush()?;
        let status = shell(command_line).status();
        write!(stdout, "\nPress Enter to continue...")?;
        stdout.flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        status.map(|_| ())
    }
}

/// The terminal in cooked mode on the main screen for as long as this lives.
struct Suspended<'a> {
    terminal: &'a mut Tui,
}

impl<'a> Suspended<'a> {
    fn new(terminal: &'a mut Tui) -> io::Result<Self> {
        leave()?;
        Ok(Self { terminal })
    }
}

impl Drop for Suspended<'_> {
    fn drop(&mut self) {
        if let Err(err) = enter() {
            tracing::warn!(%err, "failed to restore the terminal");
        }
        if let Err(err) = self.terminal.clear() {
            tracing::warn!(%err, "failed to clear the terminal");
        }
    }
}
