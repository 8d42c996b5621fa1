use serde::{Deserialize, Serialize};

/// Represents all possible user commands that can be executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    // Navigation
    MoveUp,
    MoveDown,
    Jump(char),

    // View toggles
    ToggleGuides,
    ToggleNumbers,
    ToggleHidden,
    ToggleSessionFocus,
    TogglePanes,
    ToggleSearch,

    // Mutations, each behind a prompt
    AddWindow,
    Delete,
    Rename,

    // Text entry for the search box and prompts
    Input(char),
    Backspace,
    Confirm,
    Cancel,

    // Multi-step commands for scripted runs
    Sequence(Vec<Command>),
}

impl Command {
    /// Parse a command from a string representation
    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "move_up" | "up" | "k" => Ok(Command::MoveUp),
            "move_down" | "down" | "j" => Ok(Command::MoveDown),

            "toggle_guides" => Ok(Command::ToggleGuides),
            "toggle_numbers" => Ok(Command::ToggleNumbers),
            "toggle_hidden" => Ok(Command::ToggleHidden),
            "toggle_sessions" => Ok(Command::ToggleSessionFocus),
            "toggle_panes" => Ok(Command::TogglePanes),
            "toggle_search" | "/" => Ok(Command::ToggleSearch),

            "add_window" => Ok(Command::AddWindow),
            "delete" => Ok(Command::Delete),
            "rename" => Ok(Command::Rename),

            "backspace" => Ok(Command::Backspace),
            "confirm" | "enter" => Ok(Command::Confirm),
            "cancel" | "escape" => Ok(Command::Cancel),

            _ => {
                if let Some(digit) = s.strip_prefix("jump:") {
                    let mut chars = digit.chars();
                    return match (chars.next(), chars.next()) {
                        (Some(d), None) if d.is_ascii_digit() => Ok(Command::Jump(d)),
                        _ => Err(format!("Invalid jump digit: {}", digit)),
                    };
                }

                if let Some(char_str) = s.strip_prefix("input:") {
                    if let Some(ch) = char_str.chars().next() {
                        return Ok(Command::Input(ch));
                    }
                }

                if let Some(inner) = s.strip_prefix("sequence:[").and_then(|s| s.strip_suffix(']')) {
                    if inner.is_empty() {
                        return Ok(Command::Sequence(vec![]));
                    }

                    let mut commands = Vec::new();
                    for cmd_str in inner.split(',') {
                        let cmd_str = cmd_str.trim();
                        match Command::from_string(cmd_str) {
                            Ok(cmd) => commands.push(cmd),
                            Err(e) => {
                                return Err(format!("Invalid command in sequence '{}': {}", cmd_str, e))
                            }
                        }
                    }

                    return Ok(Command::Sequence(commands));
                }

                Err(format!("Unknown command: {}", s))
            }
        }
    }

    /// Convert command to string representation
    pub fn to_string(&self) -> String {
        match self {
            Command::MoveUp => "move_up".to_string(),
            Command::MoveDown => "move_down".to_string(),
            Command::Jump(d) => format!("jump:{}", d),

            Command::ToggleGuides => "toggle_guides".to_string(),
            Command::ToggleNumbers => "toggle_numbers".to_string(),
            Command::ToggleHidden => "toggle_hidden".to_string(),
            Command::ToggleSessionFocus => "toggle_sessions".to_string(),
            Command::TogglePanes => "toggle_panes".to_string(),
            Command::ToggleSearch => "toggle_search".to_string(),

            Command::AddWindow => "add_window".to_string(),
            Command::Delete => "delete".to_string(),
            Command::Rename => "rename".to_string(),

            Command::Input(ch) => format!("input:{}", ch),
            Command::Backspace => "backspace".to_string(),
            Command::Confirm => "confirm".to_string(),
            Command::Cancel => "cancel".to_string(),

            Command::Sequence(commands) => format!(
                "sequence:[{}]",
                commands
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            ),
        }
    }
}
