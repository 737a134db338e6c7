use std::io;
use std::path::Path;
use std::process::Command;

/// Runs external programs in the foreground.
///
/// Command lines go through `sh -c` so templates like `${PAGER:-less}` are
/// expanded by the shell. Calls block until the child exits; its exit status
/// is not reported back.
pub trait Launcher {
    fn run(&mut self, command_line: &str) -> io::Result<()>;

    /// Run a command whose output the user wants to read before returning.
    fn run_and_wait(&mut self, command_line: &str) -> io::Result<()> {
        self.run(command_line)
    }
}

/// Launcher for the one-shot command-line modes: inherits the terminal as is.
#[derive(Debug, Default)]
pub struct ShellLauncher;

impl Launcher for ShellLauncher {
    fn run(&mut self, command_line: &str) -> io::Result<()> {
        let status = shell(command_line).status()?;
        tracing::debug!(command_line, ?status, "command finished");
        Ok(())
    }
}

/// A `sh -c` invocation of `command_line`.
pub fn shell(command_line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command_line);
    cmd
}

/// Wrap `arg` in single quotes for the shell.
pub fn quote_arg(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// `template` followed by every path as a quoted argument.
pub fn command_line<'a>(template: &str, paths: impl IntoIterator<Item = &'a Path>) -> String {
    let mut line = template.to_string();
    for path in paths {
        line.push(' ');
        line.push_str(&quote_arg(&path.to_string_lossy()));
    }
    line
}
