use std::time::Instant;

use crate::app::{App, InputMode, Modal};
use crate::command::Command;
use crate::tmux::Multiplexer;

/// Result of executing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status_message: Option<String>,
    pub should_quit: bool,
}

/// Executes commands against the coordinator, interpreting each one for
/// the screen that currently has the keyboard
pub struct Executor;

impl Executor {
    pub fn execute<M: Multiplexer>(app: &mut App<M>, command: Command, now: Instant) -> ExecutionResult {
        if let Command::Sequence(commands) = command {
            for command in commands {
                if app.should_quit() {
                    break;
                }
                Self::execute(app, command, now);
            }
        } else {
            match app.input_mode() {
                InputMode::Prompt => Self::execute_prompt(app, command),
                InputMode::Search => Self::execute_search(app, command),
                InputMode::Navigate => Self::execute_navigate(app, command, now),
            }
        }

        ExecutionResult {
            status_message: (!app.status_message.is_empty()).then(|| app.status_message.clone()),
            should_quit: app.should_quit(),
        }
    }

    fn execute_navigate<M: Multiplexer>(app: &mut App<M>, command: Command, now: Instant) {
        match command {
            Command::MoveUp => app.move_up(),
            Command::MoveDown => app.move_down(),
            Command::Jump(digit) => {
                // Digits address nodes only while their codes are on screen
                if app.view.show_numbers {
                    app.jump_digit(digit, now);
                }
            }

            Command::ToggleGuides => app.toggle_guides(),
            Command::ToggleNumbers => app.toggle_numbers(),
            Command::ToggleHidden => app.toggle_hidden_sessions(),
            Command::ToggleSessionFocus => app.toggle_session_focus(),
            Command::TogglePanes => app.toggle_panes(),
            Command::ToggleSearch => app.toggle_search(),

            Command::AddWindow => app.begin_add_window(),
            Command::Delete => app.begin_delete(),
            Command::Rename => {
                let result = app.begin_rename();
                app.report(result);
            }

            Command::Confirm => {
                let result = app.make_selection();
                app.report(result);
            }
            Command::Cancel => app.cancel_selection(),

            Command::Input(_) | Command::Backspace | Command::Sequence(_) => {}
        }
    }

    fn execute_search<M: Multiplexer>(app: &mut App<M>, command: Command) {
        match command {
            Command::Input(ch) => app.search_input(ch),
            Command::Backspace => app.search_backspace(),
            Command::MoveUp => app.move_up(),
            Command::MoveDown => app.move_down(),
            Command::Confirm | Command::ToggleSearch => app.close_search(false),
            Command::Cancel => app.close_search(true),
            _ => {}
        }
    }

    fn execute_prompt<M: Multiplexer>(app: &mut App<M>, command: Command) {
        let takes_text = match app.modal() {
            Modal::AwaitingInput(prompt) => prompt.kind.takes_text(),
            _ => return,
        };

        match command {
            Command::Confirm => {
                let result = app.submit_prompt();
                app.report(result);
            }
            Command::Cancel => app.cancel_prompt(),
            Command::Input(ch) if takes_text => app.prompt_input(ch),
            Command::Backspace if takes_text => app.prompt_backspace(),
            Command::Input('y') | Command::Input('Y') => {
                let result = app.submit_prompt();
                app.report(result);
            }
            Command::Input(_) => app.cancel_prompt(),
            _ => {}
        }
    }
}
