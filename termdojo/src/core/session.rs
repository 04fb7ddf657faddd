//! Terminal-multiplexer session emulator.
//!
//! A single session at most, in one of three states:
//!
//! ```text
//! NoSession --new--> Attached --detach--> Detached --attach--> Attached
//!     ^                  |                    |
//!     +---kill-session---+--------------------+
//! ```
//!
//! No processes exist behind the session; the state only tracks the counts
//! and indices a learner would see in the status line.

use crate::core::error::SessionError;

/// An existing session. Indices are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub name: String,
    pub panes: usize,
    pub windows: usize,
    pub current_pane: usize,
    pub current_window: usize,
    pub attached: bool,
}

/// Direction given to `split-window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// New pane below the current one (`-v`, the default).
    Vertical,
    /// New pane beside the current one (`-h`).
    Horizontal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    session: Option<Session>,
    /// Sessions created so far; drives default names `0`, `1`, ...
    created: usize,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// True while a session exists and the client is attached to it.
    pub fn in_session(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.attached)
    }

    pub fn new_session(&mut self, name: Option<&str>) -> Result<String, SessionError> {
        if self.in_session() {
            return Err(SessionError::Nested);
        }
        let name = name.map_or_else(|| self.created.to_string(), str::to_string);
        self.created += 1;
        self.session = Some(Session {
            name: name.clone(),
            panes: 1,
            windows: 1,
            current_pane: 0,
            current_window: 0,
            attached: true,
        });
        Ok(format!("[new session: {name}]"))
    }

    pub fn attach(&mut self, target: Option<&str>) -> Result<String, SessionError> {
        if self.in_session() {
            return Err(SessionError::Nested);
        }
        let session = self.session.as_mut().ok_or(SessionError::NoSessions)?;
        if let Some(target) = target
            && target != session.name
        {
            return Err(SessionError::UnknownSession(target.to_string()));
        }
        session.attached = true;
        Ok(format!("[attached to session {}]", session.name))
    }

    pub fn detach(&mut self) -> Result<String, SessionError> {
        let session = self.attached_mut()?;
        session.attached = false;
        Ok(format!("[detached (from session {})]", session.name))
    }

    pub fn list(&self) -> Result<String, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NoServer)?;
        let state = if session.attached { "attached" } else { "detached" };
        Ok(format!(
            "{}: {} windows ({})",
            session.name, session.windows, state
        ))
    }

    /// Add a pane and focus it.
    pub fn split_window(&mut self, split: Split) -> Result<String, SessionError> {
        let session = self.attached_mut()?;
        session.panes += 1;
        session.current_pane = session.panes - 1;
        let orientation = match split {
            Split::Vertical => "vertically",
            Split::Horizontal => "horizontally",
        };
        Ok(format!("[split {orientation}: {} panes]", session.panes))
    }

    /// Move focus to the next pane, wrapping around.
    pub fn select_pane(&mut self) -> Result<String, SessionError> {
        let session = self.attached_mut()?;
        session.current_pane = (session.current_pane + 1) % session.panes;
        Ok(format!("[pane {}/{}]", session.current_pane + 1, session.panes))
    }

    pub fn new_window(&mut self) -> Result<String, SessionError> {
        let session = self.attached_mut()?;
        session.windows += 1;
        session.current_window = session.windows - 1;
        Ok(format!("[window {}/{}]", session.current_window + 1, session.windows))
    }

    /// Move to the next (`forward`) or previous window, wrapping around.
    pub fn select_window(&mut self, forward: bool) -> Result<String, SessionError> {
        let session = self.attached_mut()?;
        let count = session.windows;
        session.current_window = if forward {
            (session.current_window + 1) % count
        } else {
            (session.current_window + count - 1) % count
        };
        Ok(format!("[window {}/{}]", session.current_window + 1, count))
    }

    pub fn kill_session(&mut self) -> Result<String, SessionError> {
        let session = self.session.take().ok_or(SessionError::NoServer)?;
        Ok(format!("[killed session {}]", session.name))
    }

    /// Forget every session, including the default-name counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// One-line description for a status bar.
    pub fn status(&self) -> String {
        match &self.session {
            None => "no tmux session".to_string(),
            Some(session) => format!(
                "tmux: {} ({}) window {}/{} pane {}/{}",
                session.name,
                if session.attached { "attached" } else { "detached" },
                session.current_window + 1,
                session.windows,
                session.current_pane + 1,
                session.panes,
            ),
        }
    }

    fn attached_mut(&mut self) -> Result<&mut Session, SessionError> {
        match self.session.as_mut() {
            Some(session) if session.attached => Ok(session),
            _ => Err(SessionError::NotAttached),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached() -> SessionState {
        let mut state = SessionState::new();
        state.new_session(None).expect("new");
        state
    }

    #[test]
    fn first_session_gets_default_name() {
        let state = attached();
        let session = state.session().expect("session");
        assert_eq!(session.name, "0");
        assert_eq!((session.panes, session.windows), (1, 1));
        assert!(state.in_session());
    }

    #[test]
    fn nested_new_is_guarded() {
        let mut state = attached();
        assert_eq!(state.new_session(Some("x")), Err(SessionError::Nested));
        assert_eq!(state.session().expect("session").name, "0");
    }

    #[test]
    fn detach_then_new_replaces_session_with_next_default_name() {
        let mut state = attached();
        state.detach().expect("detach");
        assert!(!state.in_session());
        assert!(state.session().is_some());
        state.new_session(None).expect("new");
        assert_eq!(state.session().expect("session").name, "1");
        assert!(state.in_session());
    }

    #[test]
    fn attach_guards() {
        let mut state = SessionState::new();
        assert_eq!(state.attach(None), Err(SessionError::NoSessions));
        state.new_session(Some("work")).expect("new");
        assert_eq!(state.attach(None), Err(SessionError::Nested));
        state.detach().expect("detach");
        assert_eq!(
            state.attach(Some("play")),
            Err(SessionError::UnknownSession("play".to_string()))
        );
        state.attach(Some("work")).expect("attach");
        assert!(state.in_session());
    }

    #[test]
    fn detach_requires_attachment() {
        let mut state = SessionState::new();
        assert_eq!(state.detach(), Err(SessionError::NotAttached));
        let mut state = attached();
        state.detach().expect("detach");
        assert_eq!(state.detach(), Err(SessionError::NotAttached));
    }

    #[test]
    fn list_reports_status() {
        let mut state = SessionState::new();
        assert_eq!(state.list(), Err(SessionError::NoServer));
        state.new_session(Some("work")).expect("new");
        assert_eq!(state.list().expect("ls"), "work: 1 windows (attached)");
        state.detach().expect("detach");
        assert_eq!(state.list().expect("ls"), "work: 1 windows (detached)");
    }

    #[test]
    fn panes_split_and_cycle() {
        let mut state = attached();
        assert_eq!(
            state.split_window(Split::Vertical).expect("split"),
            "[split vertically: 2 panes]"
        );
        state.split_window(Split::Horizontal).expect("split");
        let session = state.session().expect("session");
        assert_eq!((session.panes, session.current_pane), (3, 2));
        state.select_pane().expect("select");
        assert_eq!(state.session().expect("session").current_pane, 0);
        state.select_pane().expect("select");
        assert_eq!(state.session().expect("session").current_pane, 1);
    }

    #[test]
    fn windows_create_and_cycle_both_ways() {
        let mut state = attached();
        state.new_window().expect("new-window");
        state.new_window().expect("new-window");
        assert_eq!(state.session().expect("session").current_window, 2);
        state.select_window(true).expect("next");
        assert_eq!(state.session().expect("session").current_window, 0);
        state.select_window(false).expect("prev");
        assert_eq!(state.session().expect("session").current_window, 2);
    }

    #[test]
    fn pane_and_window_commands_require_attachment() {
        let mut state = attached();
        state.detach().expect("detach");
        assert_eq!(state.split_window(Split::Vertical), Err(SessionError::NotAttached));
        assert_eq!(state.select_pane(), Err(SessionError::NotAttached));
        assert_eq!(state.new_window(), Err(SessionError::NotAttached));
        assert_eq!(state.select_window(true), Err(SessionError::NotAttached));
    }

    #[test]
    fn kill_session_clears_state() {
        let mut state = SessionState::new();
        assert_eq!(state.kill_session(), Err(SessionError::NoServer));
        state.new_session(Some("work")).expect("new");
        state.detach().expect("detach");
        state.kill_session().expect("kill");
        assert!(state.session().is_none());
        assert_eq!(state.list(), Err(SessionError::NoServer));
        assert_eq!(state.attach(None), Err(SessionError::NoSessions));
    }

    #[test]
    fn status_line() {
        let mut state = SessionState::new();
        assert_eq!(state.status(), "no tmux session");
        state.new_session(Some("dev")).expect("new");
        state.split_window(Split::Vertical).expect("split");
        assert_eq!(state.status(), "tmux: dev (attached) window 1/1 pane 2/2");
    }
}
