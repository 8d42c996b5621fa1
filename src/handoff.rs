use std::fs;
use std::path::PathBuf;

use crate::error::Result;
use crate::tmux::Mutation;

/// Commands left behind for the calling shell to run after we exit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handoff {
    pub command_file: Option<PathBuf>,
    pub return_command: Option<String>,
    /// Server socket the written commands must target
    pub socket: Option<String>,
}

impl Handoff {
    pub fn new(command_file: Option<PathBuf>, return_command: Option<String>) -> Self {
        Self {
            command_file,
            return_command,
            socket: None,
        }
    }

    pub fn with_socket(mut self, socket: Option<String>) -> Self {
        self.socket = socket;
        self
    }

    /// Write `mutations` as shell lines, followed by the return command.
    /// Returns `false` without touching the filesystem when no command file
    /// is configured.
    pub fn write(&self, mutations: &[Mutation]) -> Result<bool> {
        let Some(path) = &self.command_file else {
            return Ok(false);
        };

        let mut script = String::new();
        for mutation in mutations {
            script.push_str(&mutation.to_shell(self.socket.as_deref()));
            script.push('\n');
        }
        if let Some(return_command) = &self.return_command {
            script.push_str(return_command);
            script.push('\n');
        }

        fs::write(path, script)?;
        log::info!("Wrote {} command(s) to {}", mutations.len(), path.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmux::WindowPosition;
    use tempfile::TempDir;

    fn new_window() -> Mutation {
        Mutation::NewWindow {
            target: "@2".to_string(),
            position: WindowPosition::After,
            name: "logs".to_string(),
        }
    }

    #[test]
    fn test_unconfigured_is_noop() {
        let handoff = Handoff::default();
        assert!(!handoff.write(&[new_window()]).unwrap());
    }

    #[test]
    fn test_writes_commands_and_return_command() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("commands.sh");
        let handoff = Handoff::new(Some(path.clone()), Some("tmux-supertree".to_string()));

        assert!(handoff.write(&[new_window()]).unwrap());

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            shell_words::split(lines[0]).unwrap(),
            vec!["tmux", "new-window", "-a", "-t", "@2", "-n", "logs", "-c", "#{pane_current_path}"]
        );
        assert_eq!(lines[1], "tmux-supertree");
    }

    #[test]
    fn test_socket_is_carried_into_commands() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("commands.sh");
        let handoff = Handoff::new(Some(path.clone()), None)
            .with_socket(Some("/tmp/other.sock".to_string()));

        assert!(handoff.write(&[new_window()]).unwrap());

        let content = fs::read_to_string(&path).unwrap();
        let words = shell_words::split(content.trim_end()).unwrap();
        assert_eq!(&words[..4], &["tmux", "-S", "/tmp/other.sock", "new-window"]);
        assert_eq!(words.last().map(String::as_str), Some("#{pane_current_path}"));
    }
}
