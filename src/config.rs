use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Environment variable naming an optional JSON configuration file
pub const CONFIG_ENV_VAR: &str = "TMUX_SUPERTREE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub keybindings: KeybindingConfig,
    pub behavior: BehaviorConfig,
    pub tmux: TmuxConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub move_down: char,
    pub move_up: char,
    pub toggle_guides: char,
    pub toggle_numbers: char,
    pub toggle_hidden: char,
    pub toggle_sessions: char,
    pub toggle_panes: char,
    pub add_window: char,
    pub delete: char,
    pub rename: char,
    pub search: char,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub jump_timeout_ms: u64,
    pub hidden_session_prefix: String,
    pub show_guides: bool,
    pub show_numbers: bool,
    pub show_panes: bool,
    /// Switch the tmux client to every node the cursor lands on
    pub preview_on_highlight: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TmuxConfig {
    /// Server socket, passed as `tmux -S <socket>`
    pub socket: Option<String>,
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            move_down: 'j',
            move_up: 'k',
            toggle_guides: 'g',
            toggle_numbers: 'n',
            toggle_hidden: 'h',
            toggle_sessions: 's',
            toggle_panes: 'e',
            add_window: 'a',
            delete: 'd',
            rename: 'r',
            search: '/',
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            jump_timeout_ms: 500,
            hidden_session_prefix: "__".to_string(),
            show_guides: true,
            show_numbers: false,
            show_panes: false,
            preview_on_highlight: false,
        }
    }
}

impl Config {
    /// Load from the file named by `TMUX_SUPERTREE_CONFIG`, falling back to
    /// defaults when unset or unreadable
    pub fn load() -> Self {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::load_from_file(&path).unwrap_or_else(|e| {
                log::warn!("Ignoring config {}: {}", path, e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn jump_timeout(&self) -> Duration {
        Duration::from_millis(self.behavior.jump_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SupertreeError;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.keybindings.toggle_panes, 'e');
        assert_eq!(config.jump_timeout(), Duration::from_millis(500));
        assert_eq!(config.behavior.hidden_session_prefix, "__");
        assert!(config.behavior.show_guides);
        assert!(config.tmux.socket.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"keybindings": {{"delete": "x"}}, "behavior": {{"jump_timeout_ms": 800}}}}"#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.keybindings.delete, 'x');
        assert_eq!(config.keybindings.rename, 'r');
        assert_eq!(config.jump_timeout(), Duration::from_millis(800));
        assert!(!config.behavior.show_panes);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert_matches!(Config::load_from_file(file.path()), Err(SupertreeError::Json(_)));
    }
}
