//! `tmux` subcommands mapped onto the session emulator.

use crate::commands::Shell;
use crate::core::error::{CommandError, SessionError};
use crate::core::session::Split;

pub(super) fn tmux(shell: &mut Shell<'_>, args: &[&str]) -> Result<String, CommandError> {
    let session = &mut *shell.session;
    let Some((sub, rest)) = args.split_first() else {
        return Ok(session.new_session(None)?);
    };
    let output = match *sub {
        "new" | "new-session" => session.new_session(flag_value(rest, "-s")?)?,
        "attach" | "attach-session" | "a" | "at" => session.attach(flag_value(rest, "-t")?)?,
        "detach" | "detach-client" | "d" => session.detach()?,
        "ls" | "list-sessions" => session.list()?,
        "split-window" | "splitw" => {
            let split = if rest.contains(&"-h") {
                Split::Horizontal
            } else {
                Split::Vertical
            };
            session.split_window(split)?
        }
        "select-pane" | "selectp" => session.select_pane()?,
        "new-window" | "neww" => session.new_window()?,
        "select-window" | "selectw" => session.select_window(!rest.contains(&"-p"))?,
        "next-window" | "next" => session.select_window(true)?,
        "previous-window" | "prev" => session.select_window(false)?,
        "kill-session" => session.kill_session()?,
        other => return Err(SessionError::UnknownCommand(other.to_string()).into()),
    };
    Ok(output)
}

/// Value following `flag`, if the flag is present.
fn flag_value<'a>(args: &[&'a str], flag: &str) -> Result<Option<&'a str>, CommandError> {
    let Some(pos) = args.iter().position(|arg| *arg == flag) else {
        return Ok(None);
    };
    match args.get(pos + 1) {
        Some(value) => Ok(Some(*value)),
        None => Err(CommandError::missing("tmux", "option requires an argument")),
    }
}
