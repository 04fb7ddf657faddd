//! Command registry for the emulated shell.
//!
//! The command set is closed: each verb maps to one handler in [`COMMANDS`].
//! Handlers receive whitespace-split arguments (no quoting or expansion) and
//! either return output text or a [`CommandError`].

mod files;
mod tmux;

use crate::core::error::{CommandError, FsError};
use crate::core::filesystem::Filesystem;
use crate::core::session::SessionState;

/// Mutable state a command may act on.
pub struct Shell<'a> {
    pub fs: &'a mut Filesystem,
    pub session: &'a mut SessionState,
}

type Handler = fn(&mut Shell<'_>, &[&str]) -> Result<String, CommandError>;

/// One registered command.
pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    run: Handler,
}

const fn command(name: &'static str, usage: &'static str, run: Handler) -> CommandSpec {
    CommandSpec { name, usage, run }
}

pub const COMMANDS: &[CommandSpec] = &[
    command("pwd", "pwd", files::pwd),
    command("ls", "ls [-a] [-l] [path]", files::ls),
    command("cd", "cd [path|~|..]", files::cd),
    command("mkdir", "mkdir [-p] path...", files::mkdir),
    command("touch", "touch path...", files::touch),
    command("cat", "cat path...", files::cat),
    command("cp", "cp src dst", files::cp),
    command("mv", "mv src dst", files::mv),
    command("rm", "rm path...", files::rm),
    command("echo", "echo text... [> file | >> file]", files::echo),
    command("grep", "grep pattern file", files::grep),
    command("find", "find [start] -name pattern", files::find),
    command("clear", "clear", files::clear),
    command("help", "help [command]", help),
    command("tmux", "tmux <subcommand> [flags]", tmux::tmux),
];

pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}

/// Split a line into words. Quotes and backslashes have no special meaning.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Run one tokenized command line.
pub fn dispatch(shell: &mut Shell<'_>, words: &[&str]) -> Result<String, CommandError> {
    let Some((verb, args)) = words.split_first() else {
        return Ok(String::new());
    };
    let spec = lookup(verb).ok_or_else(|| CommandError::CommandNotFound(verb.to_string()))?;
    (spec.run)(shell, args)
}

fn help(_shell: &mut Shell<'_>, args: &[&str]) -> Result<String, CommandError> {
    if let Some(name) = args.first() {
        let spec = lookup(name).ok_or_else(|| CommandError::CommandNotFound(name.to_string()))?;
        return Ok(format!("usage: {}", spec.usage));
    }
    let names: Vec<&str> = COMMANDS.iter().map(|spec| spec.name).collect();
    Ok(format!("Available: {}", names.join(", ")))
}

/// Operands of a command, with `-flag` words dropped.
fn operands<'a>(args: &[&'a str]) -> Vec<&'a str> {
    args.iter().copied().filter(|arg| !arg.starts_with('-')).collect()
}

/// Apply `op` to every operand so that either all succeed or nothing changes.
///
/// With several operands the work runs against a scratch clone that replaces
/// the live tree only once every operand has succeeded.
fn apply_all(
    fs: &mut Filesystem,
    operands: &[&str],
    op: fn(&mut Filesystem, &str) -> Result<(), FsError>,
) -> Result<(), FsError> {
    if let [single] = operands {
        return op(fs, single);
    }
    let mut staged = fs.clone();
    for operand in operands {
        op(&mut staged, operand)?;
    }
    *fs = staged;
    Ok(())
}
