//! Error taxonomy for the sandbox engine.
//!
//! Every variant renders to a learner-facing message; the runner copies that
//! message into the command result instead of propagating it further.

use thiserror::Error;

/// Failures raised by the in-memory filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("no such file or directory: {0}")]
    NotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("is a directory: {0}")]
    IsADirectory(String),

    #[error("cannot remove root directory")]
    RemoveRoot,

    #[error("cannot move '{src}' to a subdirectory of itself, '{dst}'")]
    InvalidMove { src: String, dst: String },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Failures raised by the multiplexer session emulator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("sessions should be nested with care, unset $TMUX to force")]
    Nested,

    #[error("no current client")]
    NotAttached,

    #[error("no sessions")]
    NoSessions,

    #[error("no server running")]
    NoServer,

    #[error("can't find session: {0}")]
    UnknownSession(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// Failures surfaced by a single command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("{command}: {message}")]
    MissingOperand {
        command: &'static str,
        message: &'static str,
    },

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("tmux: {0}")]
    Session(#[from] SessionError),
}

impl CommandError {
    pub(crate) fn missing(command: &'static str, message: &'static str) -> Self {
        Self::MissingOperand { command, message }
    }
}
