use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use notes_book::{Launcher, Notebook, ShellLauncher};
use notes_explorer::Explorer;

use crate::terminal::{self, TerminalLauncher, Tui};

/// Run the interactive explorer with the `onstart` and `onexit` hooks
/// around it. Hooks run on the normal screen.
///
/// An invalid starting section is reported before anything runs.
pub fn run(book: Notebook, section: &str) -> Result<()> {
    let on_start = book.config().on_start.clone();
    let on_exit = book.config().on_exit.clone();
    let mut explorer = Explorer::new(book, section)?;
    if let Some(cmd) = &on_start {
        run_hook(cmd);
    }

    let result = {
        let (_guard, mut terminal) = terminal::setup()?;
        event_loop(&mut terminal, &mut explorer)
    };

    if let Some(cmd) = &on_exit {
        run_hook(cmd);
    }
    result
}

fn run_hook(cmd: &str) {
    if let Err(err) = ShellLauncher.run(cmd) {
        tracing::warn!(%err, command = cmd, "hook failed");
    }
}

fn event_loop(terminal: &mut Tui, explorer: &mut Explorer) -> Result<()> {
    while explorer.is_running() {
        terminal.draw(|frame| explorer.render(frame))?;

        if let Event::Key(key) = event::read()? {
            // Ignore release/repeat events reported by some terminals
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let mut launcher = TerminalLauncher::new(terminal);
            explorer.handle_key(key, &mut launcher)?;
        }
    }
    Ok(())
}
