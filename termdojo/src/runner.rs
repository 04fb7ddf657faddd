//! Mission runner: one learner working through one mission.
//!
//! Owns the live sandbox, a pristine copy taken after setup (the reset
//! baseline), the session emulator and the parsed goal. Each executed line
//! is dispatched through the command registry, then the goal is evaluated
//! against the resulting state.

use tracing::{debug, warn};

use crate::commands::{Shell, dispatch, tokenize};
use crate::core::error::FsError;
use crate::core::filesystem::Filesystem;
use crate::core::goal::GoalView;
use crate::core::path;
use crate::core::session::SessionState;
use crate::core::types::CommandResult;
use crate::mission::{Mission, SetupAction};

#[derive(Debug, Clone)]
pub struct MissionRunner {
    mission: Mission,
    fs: Filesystem,
    pristine: Filesystem,
    session: SessionState,
    attempts: u32,
    history: Vec<String>,
    completed: bool,
}

impl MissionRunner {
    /// Bootstrap a sandbox for `home`/`user` and apply the mission's setup.
    ///
    /// The first failing setup action rejects the mission.
    pub fn new(mission: Mission, home: &str, user: &str) -> Result<Self, FsError> {
        let mut fs = Filesystem::bootstrap(home, user)?;
        for action in &mission.setup {
            if let Err(err) = apply_setup(&mut fs, action) {
                warn!(mission = %mission.id, ?action, %err, "setup action rejected");
                return Err(err);
            }
        }
        let pristine = fs.clone();
        Ok(Self {
            mission,
            fs,
            pristine,
            session: SessionState::new(),
            attempts: 0,
            history: Vec::new(),
            completed: false,
        })
    }

    /// Run one line of learner input.
    pub fn execute(&mut self, input: &str) -> CommandResult {
        self.attempts += 1;
        self.history.push(input.to_string());

        let line = input.trim();
        if line.is_empty() {
            return CommandResult {
                completed: self.completed,
                ..CommandResult::ok("")
            };
        }

        let words = tokenize(line);
        debug!(mission = %self.mission.id, verb = words[0], attempt = self.attempts, "dispatch");
        let mut shell = Shell {
            fs: &mut self.fs,
            session: &mut self.session,
        };
        let mut result = match dispatch(&mut shell, &words) {
            Ok(output) => CommandResult::ok(output),
            Err(err) => CommandResult::failed(err.to_string()),
        };

        let view = EvalContext {
            fs: &self.fs,
            session: &self.session,
            command: result.success.then_some(line),
        };
        if !self.completed && self.mission.goal.evaluate(&view) {
            debug!(mission = %self.mission.id, attempts = self.attempts, "goal met");
            self.completed = true;
        }
        result.completed = self.completed;
        result
    }

    /// Restore the post-setup sandbox and forget attempts, history and sessions.
    ///
    /// Completion is kept.
    pub fn reset(&mut self) {
        debug!(mission = %self.mission.id, "reset");
        self.fs = self.pristine.clone();
        self.session.reset();
        self.attempts = 0;
        self.history.clear();
    }

    pub fn mission(&self) -> &Mission {
        &self.mission
    }

    pub fn filesystem(&self) -> &Filesystem {
        &self.fs
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Current directory as a learner would describe it.
    pub fn location(&self) -> String {
        let pwd = self.fs.pwd();
        let home = self.fs.home();
        if pwd == home {
            return "~ (your home directory)".to_string();
        }
        if path::is_within(pwd, home)
            && let Some(rest) = pwd.strip_prefix(home)
        {
            return format!("~{rest}");
        }
        pwd.to_string()
    }

    pub fn session_status(&self) -> String {
        self.session.status()
    }
}

fn apply_setup(fs: &mut Filesystem, action: &SetupAction) -> Result<(), FsError> {
    match action {
        SetupAction::Mkdir(dir) => fs.mkdir(dir),
        SetupAction::Cd(dir) => fs.cd(dir),
        SetupAction::Touch(file) => fs.touch(file),
        SetupAction::WriteFile { path, content } => fs.write_file(path, content),
    }
}

/// Goal view over the sandbox, the session emulator and the line just
/// executed. `command` is `None` when that line failed.
struct EvalContext<'a> {
    fs: &'a Filesystem,
    session: &'a SessionState,
    command: Option<&'a str>,
}

impl GoalView for EvalContext<'_> {
    fn pwd(&self) -> &str {
        self.fs.pwd()
    }

    fn exists(&self, path: &str) -> bool {
        self.fs.exists(path)
    }

    fn is_dir(&self, path: &str) -> bool {
        self.fs.is_dir(path)
    }

    fn read_file(&self, path: &str) -> Result<&str, FsError> {
        self.fs.read_file(path)
    }

    fn resolve(&self, path: &str) -> String {
        self.fs.resolve(path)
    }

    fn last_command(&self) -> Option<&str> {
        self.command
    }

    fn attached_panes(&self) -> Option<usize> {
        self.session
            .session()
            .filter(|session| session.attached)
            .map(|session| session.panes)
    }
}
