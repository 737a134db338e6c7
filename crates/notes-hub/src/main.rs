mod app;
mod cli;
mod terminal;

use std::fs;
use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use notes_book::{Config, Notebook, ShellLauncher, config};

use cli::{Cli, Streams};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = init_logging();

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("notes: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let book = Notebook::new(Config::load()).with_clobber(cli.force);
    book.init().context("creating the notebook")?;

    if cli.wants_explorer() {
        app::run(book, cli.section.as_deref().unwrap_or(""))?;
        return Ok(0);
    }

    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr();
    let mut streams = Streams {
        input: &mut stdin,
        out: &mut stdout,
        err: &mut stderr,
    };
    cli::run(cli, &book, &mut ShellLauncher, &mut streams)
}

/// Log to `notes.log` in the data directory; the terminal belongs to the
/// explorer. Filter from `NOTES_LOG`, `info` by default. Without a usable
/// data directory the program runs unlogged.
fn init_logging() -> Option<WorkerGuard> {
    let dir = config::data_dir()?;
    fs::create_dir_all(&dir).ok()?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("notes.log")
        .build(&dir)
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("NOTES_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}
