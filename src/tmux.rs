use serde::{Deserialize, Serialize};
use std::process::Command;

use crate::error::{Result, SupertreeError};

const SESSION_FORMAT: &str = "#{session_id} #{session_name}";
const WINDOW_FORMAT: &str = "#{window_id} #{window_index} #{window_name}";
const PANE_FORMAT: &str = "#{pane_id} #{pane_index} #{pane_title}";
const LOCATION_FORMAT: &str = "#{session_id} #{window_id}";

/// The three levels of the tmux hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Session,
    Window,
    Pane,
}

impl NodeKind {
    /// The tmux command that destroys a node of this kind
    pub const fn kill_command(self) -> &'static str {
        match self {
            NodeKind::Session => "kill-session",
            NodeKind::Window => "kill-window",
            NodeKind::Pane => "kill-pane",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            NodeKind::Session => "session",
            NodeKind::Window => "window",
            NodeKind::Pane => "pane",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub id: String,
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneInfo {
    pub id: String,
    pub index: usize,
    pub title: String,
}

/// Session and window that were active when the client attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub session_id: String,
    pub window_id: String,
}

/// Where `new-window` places the new window relative to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowPosition {
    Before,
    After,
}

impl WindowPosition {
    fn flag(self) -> &'static str {
        match self {
            WindowPosition::Before => "-b",
            WindowPosition::After => "-a",
        }
    }
}

/// A state-changing tmux command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    NewWindow {
        target: String,
        position: WindowPosition,
        name: String,
    },
    RenameSession { id: String, name: String },
    RenameWindow { id: String, name: String },
    Kill { kind: NodeKind, id: String },
    SwitchClient { target: String },
}

impl Mutation {
    pub fn command_name(&self) -> &'static str {
        match self {
            Mutation::NewWindow { .. } => "new-window",
            Mutation::RenameSession { .. } => "rename-session",
            Mutation::RenameWindow { .. } => "rename-window",
            Mutation::Kill { kind, .. } => kind.kill_command(),
            Mutation::SwitchClient { .. } => "switch-client",
        }
    }

    /// Arguments passed to the `tmux` binary, command name first
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.command_name().to_string()];
        match self {
            Mutation::NewWindow {
                target,
                position,
                name,
            } => {
                args.push(position.flag().to_string());
                args.extend(["-t".to_string(), target.clone()]);
                args.extend(["-n".to_string(), name.clone()]);
                args.extend(["-c".to_string(), "#{pane_current_path}".to_string()]);
            }
            Mutation::RenameSession { id, name } | Mutation::RenameWindow { id, name } => {
                args.extend(["-t".to_string(), id.clone(), name.clone()]);
            }
            Mutation::Kill { id, .. } => {
                args.extend(["-t".to_string(), id.clone()]);
            }
            Mutation::SwitchClient { target } => {
                args.extend(["-t".to_string(), target.clone()]);
            }
        }
        args
    }

    /// Shell-quoted command line, for hand-off to a calling shell. A
    /// non-default server socket goes in front of the command.
    pub fn to_shell(&self, socket: Option<&str>) -> String {
        let mut words = vec!["tmux".to_string()];
        if let Some(socket) = socket {
            words.extend(["-S".to_string(), socket.to_string()]);
        }
        words.extend(self.args());
        shell_words::join(words)
    }
}

/// Enumeration and mutation surface of the terminal multiplexer
#[cfg_attr(test, mockall::automock)]
pub trait Multiplexer {
    fn list_sessions(&self) -> Result<Vec<SessionInfo>>;
    fn list_windows(&self, session_id: &str) -> Result<Vec<WindowInfo>>;
    fn list_panes(&self, window_id: &str) -> Result<Vec<PaneInfo>>;
    fn current_location(&self) -> Result<Location>;
    fn apply(&self, mutation: &Mutation) -> Result<()>;
}

/// Talks to a running tmux server through the `tmux` binary
#[derive(Debug, Clone, Default)]
pub struct TmuxClient {
    socket: Option<String>,
}

impl TmuxClient {
    pub fn new(socket: Option<String>) -> Self {
        Self { socket }
    }

    fn command<S: AsRef<str>>(&self, args: &[S]) -> Command {
        let mut command = Command::new("tmux");
        if let Some(socket) = &self.socket {
            command.arg("-S").arg(socket);
        }
        command.args(args.iter().map(|arg| arg.as_ref()));
        command
    }

    fn query(&self, args: &[&str]) -> Result<String> {
        let output = self
            .command(args)
            .output()
            .map_err(|e| SupertreeError::ProviderUnavailable(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SupertreeError::ProviderUnavailable(format!(
                "{} exited with {}: {}",
                args.first().copied().unwrap_or("tmux"),
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Multiplexer for TmuxClient {
    fn list_sessions(&self) -> Result<Vec<SessionInfo>> {
        let output = self.query(&["list-sessions", "-F", SESSION_FORMAT])?;
        Ok(parse_sessions(&output))
    }

    fn list_windows(&self, session_id: &str) -> Result<Vec<WindowInfo>> {
        let output = self.query(&["list-windows", "-t", session_id, "-F", WINDOW_FORMAT])?;
        Ok(parse_windows(&output))
    }

    fn list_panes(&self, window_id: &str) -> Result<Vec<PaneInfo>> {
        let output = self.query(&["list-panes", "-t", window_id, "-F", PANE_FORMAT])?;
        Ok(parse_panes(&output))
    }

    fn current_location(&self) -> Result<Location> {
        let output = self.query(&["display-message", "-p", LOCATION_FORMAT])?;
        parse_location(&output).ok_or_else(|| {
            SupertreeError::ProviderUnavailable(format!("unexpected location output: {:?}", output))
        })
    }

    fn apply(&self, mutation: &Mutation) -> Result<()> {
        log::info!("tmux: {}", mutation.to_shell(self.socket.as_deref()));
        let output = self
            .command(mutation.args().as_slice())
            .output()
            .map_err(|e| SupertreeError::MutationFailed {
                command: mutation.command_name().to_string(),
                message: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SupertreeError::MutationFailed {
                command: mutation.command_name().to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Parse `list-sessions` output: `<id> <name>` per line
pub fn parse_sessions(output: &str) -> Vec<SessionInfo> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let (id, name) = line.split_once(' ')?;
            Some(SessionInfo {
                id: id.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

/// Parse `list-windows` output: `<id> <index> <name>` per line
pub fn parse_windows(output: &str) -> Vec<WindowInfo> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut parts = line.splitn(3, ' ');
            let id = parts.next()?;
            let index = parts.next()?;
            let name = parts.next()?;
            match index.parse() {
                Ok(index) => Some(WindowInfo {
                    id: id.to_string(),
                    index,
                    name: name.to_string(),
                }),
                Err(_) => {
                    log::warn!("Skipping window line with bad index: {:?}", line);
                    None
                }
            }
        })
        .collect()
}

/// Parse `list-panes` output: `<id> <index> [<title>]` per line
pub fn parse_panes(output: &str) -> Vec<PaneInfo> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut parts = line.splitn(3, ' ');
            let id = parts.next()?;
            let index = parts.next()?.parse().ok()?;
            let title = parts.next().unwrap_or_default();
            Some(PaneInfo {
                id: id.to_string(),
                index,
                title: title.to_string(),
            })
        })
        .collect()
}

pub fn parse_location(output: &str) -> Option<Location> {
    let mut parts = output.split_whitespace();
    let session_id = parts.next()?;
    let window_id = parts.next()?;
    Some(Location {
        session_id: session_id.to_string(),
        window_id: window_id.to_string(),
    })
}
