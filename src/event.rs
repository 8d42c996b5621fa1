use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::InputMode;
use crate::command::Command;
use crate::config::KeybindingConfig;

/// Translate a terminal event into a command for the current input mode
pub fn event_to_command(
    event: &Event,
    mode: InputMode,
    keybindings: &KeybindingConfig,
) -> Option<Command> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => key_to_command(key, mode, keybindings),
        _ => None,
    }
}

pub fn key_to_command(
    key: &KeyEvent,
    mode: InputMode,
    keybindings: &KeybindingConfig,
) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Cancel);
    }

    // Keys shared by every mode
    match key.code {
        KeyCode::Enter => return Some(Command::Confirm),
        KeyCode::Esc => return Some(Command::Cancel),
        KeyCode::Backspace => return Some(Command::Backspace),
        _ => {}
    }

    match mode {
        InputMode::Prompt => match key.code {
            KeyCode::Char(c) => Some(Command::Input(c)),
            _ => None,
        },
        InputMode::Search => match key.code {
            KeyCode::Up => Some(Command::MoveUp),
            KeyCode::Down => Some(Command::MoveDown),
            KeyCode::Char(c) => Some(Command::Input(c)),
            _ => None,
        },
        InputMode::Navigate => match key.code {
            KeyCode::Up => Some(Command::MoveUp),
            KeyCode::Down => Some(Command::MoveDown),
            KeyCode::Char(c) if c.is_ascii_digit() => Some(Command::Jump(c)),
            KeyCode::Char(c) => bound_command(c, keybindings),
            _ => None,
        },
    }
}

fn bound_command(c: char, keybindings: &KeybindingConfig) -> Option<Command> {
    let bindings = [
        (keybindings.move_down, Command::MoveDown),
        (keybindings.move_up, Command::MoveUp),
        (keybindings.toggle_guides, Command::ToggleGuides),
        (keybindings.toggle_numbers, Command::ToggleNumbers),
        (keybindings.toggle_hidden, Command::ToggleHidden),
        (keybindings.toggle_sessions, Command::ToggleSessionFocus),
        (keybindings.toggle_panes, Command::TogglePanes),
        (keybindings.add_window, Command::AddWindow),
        (keybindings.delete, Command::Delete),
        (keybindings.rename, Command::Rename),
        (keybindings.search, Command::ToggleSearch),
    ];

    bindings
        .into_iter()
        .find(|(key, _)| *key == c)
        .map(|(_, command)| command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_navigate_bindings() {
        let bindings = KeybindingConfig::default();
        let mode = InputMode::Navigate;
        assert_eq!(key_to_command(&key(KeyCode::Char('j')), mode, &bindings), Some(Command::MoveDown));
        assert_eq!(key_to_command(&key(KeyCode::Char('e')), mode, &bindings), Some(Command::TogglePanes));
        assert_eq!(key_to_command(&key(KeyCode::Char('3')), mode, &bindings), Some(Command::Jump('3')));
        assert_eq!(key_to_command(&key(KeyCode::Char('z')), mode, &bindings), None);
        assert_eq!(key_to_command(&key(KeyCode::Enter), mode, &bindings), Some(Command::Confirm));
    }

    #[test]
    fn test_text_modes_take_characters() {
        let bindings = KeybindingConfig::default();
        for mode in [InputMode::Search, InputMode::Prompt] {
            assert_eq!(key_to_command(&key(KeyCode::Char('j')), mode, &bindings), Some(Command::Input('j')));
            assert_eq!(key_to_command(&key(KeyCode::Char('1')), mode, &bindings), Some(Command::Input('1')));
            assert_eq!(key_to_command(&key(KeyCode::Esc), mode, &bindings), Some(Command::Cancel));
        }
        assert_eq!(key_to_command(&key(KeyCode::Down), InputMode::Search, &bindings), Some(Command::MoveDown));
        assert_eq!(key_to_command(&key(KeyCode::Down), InputMode::Prompt, &bindings), None);
    }

    #[test]
    fn test_custom_binding_and_ctrl_c() {
        let bindings = KeybindingConfig {
            delete: 'x',
            ..KeybindingConfig::default()
        };
        let mode = InputMode::Navigate;
        assert_eq!(key_to_command(&key(KeyCode::Char('x')), mode, &bindings), Some(Command::Delete));
        assert_eq!(key_to_command(&key(KeyCode::Char('d')), mode, &bindings), None);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_command(&ctrl_c, InputMode::Prompt, &bindings), Some(Command::Cancel));
    }

    #[test]
    fn test_release_events_are_ignored() {
        let bindings = KeybindingConfig::default();
        let mut release = key(KeyCode::Char('j'));
        release.kind = KeyEventKind::Release;
        assert_eq!(event_to_command(&Event::Key(release), InputMode::Navigate, &bindings), None);
        assert_eq!(event_to_command(&Event::Resize(80, 24), InputMode::Navigate, &bindings), None);
    }
}
