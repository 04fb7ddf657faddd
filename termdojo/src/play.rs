//! Line-oriented play loop for `termdojo play`.
//!
//! Reads one command per line and writes results back. Lines starting with
//! `:` control the session instead of reaching the sandbox.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::debug;

use crate::runner::MissionRunner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOptions {
    /// Print the hint once after this many attempts; `0` never does.
    pub hint_after_attempts: u32,
    /// Print a `location$ ` prompt before each line.
    pub prompt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Completed,
    Quit,
    /// Input ran out before the goal was met.
    InputEnded,
}

enum Meta {
    Quit,
    Reset,
    Hint,
    Status,
    Unknown,
}

fn parse_meta(line: &str) -> Option<Meta> {
    let name = line.strip_prefix(':')?;
    Some(match name.trim() {
        "quit" | "q" => Meta::Quit,
        "reset" => Meta::Reset,
        "hint" => Meta::Hint,
        "status" => Meta::Status,
        _ => Meta::Unknown,
    })
}

pub fn play<R: BufRead, W: Write>(
    runner: &mut MissionRunner,
    input: R,
    out: &mut W,
    options: &PlayOptions,
) -> Result<PlayOutcome> {
    let mut hinted = false;
    let mut lines = input.lines();
    loop {
        if options.prompt {
            write!(out, "{}$ ", runner.location()).context("write prompt")?;
            out.flush().context("flush prompt")?;
        }
        let Some(line) = lines.next() else {
            return Ok(PlayOutcome::InputEnded);
        };
        let line = line.context("read input line")?;

        if let Some(meta) = parse_meta(line.trim_start()) {
            match meta {
                Meta::Quit => return Ok(PlayOutcome::Quit),
                Meta::Reset => {
                    runner.reset();
                    writeln!(out, "[sandbox reset]")?;
                }
                Meta::Hint => write_hint(runner, out)?,
                Meta::Status => {
                    writeln!(out, "location: {}", runner.location())?;
                    writeln!(out, "{}", runner.session_status())?;
                    writeln!(out, "attempts: {}", runner.attempts())?;
                }
                Meta::Unknown => {
                    writeln!(out, "unknown meta command (try :hint, :status, :reset, :quit)")?;
                }
            }
            continue;
        }

        let result = runner.execute(&line);
        if !result.output.is_empty() {
            writeln!(out, "{}", result.output)?;
        }
        if !result.error.is_empty() {
            writeln!(out, "{}", result.error)?;
        }
        if result.completed {
            debug!(
                mission = %runner.mission().id,
                attempts = runner.attempts(),
                "mission completed"
            );
            writeln!(out, "\nMission complete!")?;
            let explanation = runner.mission().explanation.trim();
            if !explanation.is_empty() {
                writeln!(out, "{explanation}")?;
            }
            return Ok(PlayOutcome::Completed);
        }
        if !hinted
            && options.hint_after_attempts > 0
            && runner.attempts() >= options.hint_after_attempts
        {
            hinted = true;
            write_hint(runner, out)?;
        }
    }
}

fn write_hint<W: Write>(runner: &MissionRunner, out: &mut W) -> Result<()> {
    let hint = runner.mission().hint.trim();
    if hint.is_empty() {
        writeln!(out, "No hint for this mission.")?;
    } else {
        writeln!(out, "Hint: {hint}")?;
    }
    Ok(())
}
