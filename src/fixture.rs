//! JSON workspace fixtures and an in-memory multiplexer backed by them.
//!
//! Used by the `screenshot` and `execute` subcommands to drive the UI
//! without a tmux server, and by the tests.

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, SupertreeError};
use crate::tmux::{
    Location, Multiplexer, Mutation, NodeKind, PaneInfo, SessionInfo, WindowInfo, WindowPosition,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixturePane {
    pub id: String,
    pub index: usize,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureWindow {
    pub id: String,
    pub index: usize,
    pub name: String,
    #[serde(default)]
    pub panes: Vec<FixturePane>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSession {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub windows: Vec<FixtureWindow>,
}

/// View toggles to apply before rendering a fixture
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureView {
    pub show_panes: Option<bool>,
    pub show_numbers: Option<bool>,
    pub show_guides: Option<bool>,
    pub show_hidden_sessions: Option<bool>,
    pub search_term: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub sessions: Vec<FixtureSession>,
    #[serde(default)]
    pub current: Option<Location>,
    #[serde(default)]
    pub view: FixtureView,
}

impl FixturePane {
    pub fn new(id: &str, index: usize, title: &str) -> Self {
        Self {
            id: id.to_string(),
            index,
            title: title.to_string(),
        }
    }
}

impl FixtureWindow {
    pub fn new(id: &str, index: usize, name: &str, panes: Vec<FixturePane>) -> Self {
        Self {
            id: id.to_string(),
            index,
            name: name.to_string(),
            panes,
        }
    }
}

impl FixtureSession {
    pub fn new(id: &str, name: &str, windows: Vec<FixtureWindow>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            windows,
        }
    }
}

impl Fixture {
    pub fn new(sessions: Vec<FixtureSession>) -> Self {
        Self {
            sessions,
            ..Self::default()
        }
    }

    pub fn with_current(mut self, session_id: &str, window_id: &str) -> Self {
        self.current = Some(Location {
            session_id: session_id.to_string(),
            window_id: window_id.to_string(),
        });
        self
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn session_of_window(&self, window_id: &str) -> Option<&FixtureSession> {
        self.sessions
            .iter()
            .find(|s| s.windows.iter().any(|w| w.id == window_id))
    }

    /// Resolve a `switch-client -t` argument to the location it selects
    fn locate(&self, target: &str) -> Option<Location> {
        let window_part = target.rsplit(':').next().unwrap_or(target);

        if window_part.starts_with('$') {
            let session = self.sessions.iter().find(|s| s.id == window_part)?;
            return Some(Location {
                session_id: session.id.clone(),
                window_id: session.windows.first().map(|w| w.id.clone()).unwrap_or_default(),
            });
        }

        if window_part.starts_with('%') {
            let (session, window) = self.sessions.iter().find_map(|s| {
                s.windows
                    .iter()
                    .find(|w| w.panes.iter().any(|p| p.id == window_part))
                    .map(|w| (s, w))
            })?;
            return Some(Location {
                session_id: session.id.clone(),
                window_id: window.id.clone(),
            });
        }

        let session = self.session_of_window(window_part)?;
        Some(Location {
            session_id: session.id.clone(),
            window_id: window_part.to_string(),
        })
    }

    fn next_window_id(&self) -> String {
        let next = self
            .sessions
            .iter()
            .flat_map(|s| s.windows.iter())
            .filter_map(|w| w.id.trim_start_matches('@').parse::<usize>().ok())
            .max()
            .map_or(0, |max| max + 1);
        format!("@{}", next)
    }

    fn apply(&mut self, mutation: &Mutation) -> std::result::Result<(), String> {
        match mutation {
            Mutation::NewWindow {
                target,
                position,
                name,
            } => {
                let id = self.next_window_id();
                let session = self
                    .sessions
                    .iter_mut()
                    .find(|s| &s.id == target || s.windows.iter().any(|w| &w.id == target))
                    .ok_or_else(|| format!("can't find {}", target))?;
                let index = session.windows.iter().map(|w| w.index + 1).max().unwrap_or(0);
                let at = match (position, session.windows.iter().position(|w| &w.id == target)) {
                    (WindowPosition::Before, None) => 0,
                    (WindowPosition::After, None) => session.windows.len(),
                    (WindowPosition::Before, Some(i)) => i,
                    (WindowPosition::After, Some(i)) => i + 1,
                };
                session
                    .windows
                    .insert(at, FixtureWindow::new(&id, index, name, Vec::new()));
            }
            Mutation::RenameSession { id, name } => {
                let session = self
                    .sessions
                    .iter_mut()
                    .find(|s| &s.id == id)
                    .ok_or_else(|| format!("can't find session {}", id))?;
                session.name = name.clone();
            }
            Mutation::RenameWindow { id, name } => {
                let window = self
                    .sessions
                    .iter_mut()
                    .flat_map(|s| s.windows.iter_mut())
                    .find(|w| &w.id == id)
                    .ok_or_else(|| format!("can't find window {}", id))?;
                window.name = name.clone();
            }
            Mutation::Kill { kind, id } => {
                let before = self.entity_count();
                match kind {
                    NodeKind::Session => self.sessions.retain(|s| &s.id != id),
                    NodeKind::Window => {
                        for session in &mut self.sessions {
                            session.windows.retain(|w| &w.id != id);
                        }
                    }
                    NodeKind::Pane => {
                        for window in self.sessions.iter_mut().flat_map(|s| s.windows.iter_mut()) {
                            window.panes.retain(|p| &p.id != id);
                        }
                    }
                }
                if self.entity_count() == before {
                    return Err(format!("can't find {} {}", kind.label(), id));
                }
            }
            Mutation::SwitchClient { target } => {
                let location = self
                    .locate(target)
                    .ok_or_else(|| format!("can't find {}", target))?;
                self.current = Some(location);
            }
        }
        Ok(())
    }

    fn entity_count(&self) -> usize {
        self.sessions
            .iter()
            .map(|s| 1 + s.windows.iter().map(|w| 1 + w.panes.len()).sum::<usize>())
            .sum()
    }
}

/// A `Multiplexer` over an in-memory fixture, recording applied mutations
#[derive(Debug, Default)]
pub struct FixtureTmux {
    state: RefCell<Fixture>,
    applied: RefCell<Vec<Mutation>>,
    failing: RefCell<HashSet<String>>,
    unavailable: Cell<bool>,
}

impl FixtureTmux {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            state: RefCell::new(fixture),
            ..Self::default()
        }
    }

    /// Current state, including the effect of applied mutations
    pub fn fixture(&self) -> Fixture {
        self.state.borrow().clone()
    }

    /// Successfully applied mutations, in order
    pub fn applied(&self) -> Vec<Mutation> {
        self.applied.borrow().clone()
    }

    /// Make every mutation with this tmux command name fail
    pub fn fail_command(&self, command: &str) {
        self.failing.borrow_mut().insert(command.to_string());
    }

    /// Simulate a missing tmux server
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.get() {
            Err(SupertreeError::ProviderUnavailable("no server running".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Multiplexer for FixtureTmux {
    fn list_sessions(&self) -> Result<Vec<SessionInfo>> {
        self.check_available()?;
        Ok(self
            .state
            .borrow()
            .sessions
            .iter()
            .map(|s| SessionInfo {
                id: s.id.clone(),
                name: s.name.clone(),
            })
            .collect())
    }

    fn list_windows(&self, session_id: &str) -> Result<Vec<WindowInfo>> {
        self.check_available()?;
        let state = self.state.borrow();
        let session = state
            .sessions
            .iter()
            .find(|s| s.id == session_id)
            .ok_or_else(|| SupertreeError::ProviderUnavailable(format!("can't find session {}", session_id)))?;
        Ok(session
            .windows
            .iter()
            .map(|w| WindowInfo {
                id: w.id.clone(),
                index: w.index,
                name: w.name.clone(),
            })
            .collect())
    }

    fn list_panes(&self, window_id: &str) -> Result<Vec<PaneInfo>> {
        self.check_available()?;
        let state = self.state.borrow();
        let window = state
            .sessions
            .iter()
            .flat_map(|s| s.windows.iter())
            .find(|w| w.id == window_id)
            .ok_or_else(|| SupertreeError::ProviderUnavailable(format!("can't find window {}", window_id)))?;
        Ok(window
            .panes
            .iter()
            .map(|p| PaneInfo {
                id: p.id.clone(),
                index: p.index,
                title: p.title.clone(),
            })
            .collect())
    }

    fn current_location(&self) -> Result<Location> {
        self.check_available()?;
        self.state
            .borrow()
            .current
            .clone()
            .ok_or_else(|| SupertreeError::ProviderUnavailable("no current client".to_string()))
    }

    fn apply(&self, mutation: &Mutation) -> Result<()> {
        let command = mutation.command_name();
        if self.failing.borrow().contains(command) {
            return Err(SupertreeError::MutationFailed {
                command: command.to_string(),
                message: "simulated failure".to_string(),
            });
        }

        self.state
            .borrow_mut()
            .apply(mutation)
            .map_err(|message| SupertreeError::MutationFailed {
                command: command.to_string(),
                message,
            })?;
        self.applied.borrow_mut().push(mutation.clone());
        Ok(())
    }
}
