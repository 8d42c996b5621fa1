use std::time::Instant;

use crate::config::Config;
use crate::error::{Result, SupertreeError};
use crate::fixture::FixtureView;
use crate::handoff::Handoff;
use crate::history::FocusHistory;
use crate::jump::JumpBuffer;
use crate::tmux::{Location, Multiplexer, Mutation, NodeKind, WindowPosition};
use crate::tree::{resync, Target, Tree, TreeOptions, TreeRow};

/// Display toggles owned by the coordinator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub show_panes: bool,
    pub show_numbers: bool,
    pub show_hidden_sessions: bool,
    pub show_guides: bool,
    pub focus_session: Option<String>,
    pub search_term: String,
    pub search_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    AddWindow,
    Rename(Target),
    ConfirmDelete(Target),
}

impl PromptKind {
    /// Whether the prompt collects text, as opposed to a yes/no answer
    pub fn takes_text(&self) -> bool {
        !matches!(self, PromptKind::ConfirmDelete(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub message: String,
    pub input: String,
}

/// Pending modal operation. At most one exists at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Modal {
    #[default]
    Idle,
    AwaitingInput(Prompt),
    Applying(NodeKind),
}

/// Which keys the current screen consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Navigate,
    Search,
    Prompt,
}

/// How the process is leaving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Focus was switched to the selected node
    Selected,
    /// Focus was restored to where it was at startup
    Cancelled,
    /// Commands were written for the calling shell
    HandedOff,
}

/// The navigation and mutation coordinator
pub struct App<M: Multiplexer> {
    tmux: M,
    config: Config,
    pub view: ViewOptions,
    tree: Tree,
    cursor: usize,
    highlighted: Option<Target>,
    history: FocusHistory,
    jump: JumpBuffer,
    modal: Modal,
    handoff: Handoff,
    initial: Option<Location>,
    pub status_message: String,
    pub status_is_error: bool,
    exit: Option<Exit>,
}

impl<M: Multiplexer> App<M> {
    pub fn new(tmux: M, config: Config, handoff: Handoff) -> Self {
        let initial = match tmux.current_location() {
            Ok(location) => Some(location),
            Err(e) => {
                log::warn!("Could not determine the active window: {}", e);
                None
            }
        };

        let view = ViewOptions {
            show_panes: config.behavior.show_panes,
            show_numbers: config.behavior.show_numbers,
            show_guides: config.behavior.show_guides,
            ..ViewOptions::default()
        };

        let mut app = Self {
            jump: JumpBuffer::new(config.jump_timeout()),
            tmux,
            config,
            view,
            tree: Tree::empty(),
            cursor: 0,
            highlighted: None,
            history: FocusHistory::new(),
            modal: Modal::Idle,
            handoff,
            initial,
            status_message: String::new(),
            status_is_error: false,
            exit: None,
        };

        app.tree = resync(&app.tmux, &app.tree_options());
        let start_row = app
            .initial
            .as_ref()
            .and_then(|location| {
                app.tree.row_of(&Target::Window {
                    id: location.window_id.clone(),
                    session_id: location.session_id.clone(),
                })
            })
            .unwrap_or(0);
        app.set_cursor(start_row);
        app
    }

    /// Start with the search box open
    pub fn with_search_mode(mut self, search_mode: bool) -> Self {
        self.view.search_visible = search_mode;
        self
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&TreeRow> {
        self.tree.rows.get(self.cursor)
    }

    pub fn selected_target(&self) -> Option<Target> {
        self.selected().map(|row| row.target.clone())
    }

    pub fn history(&self) -> &FocusHistory {
        &self.history
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn multiplexer(&self) -> &M {
        &self.tmux
    }

    pub fn input_mode(&self) -> InputMode {
        if matches!(self.modal, Modal::AwaitingInput(_)) {
            InputMode::Prompt
        } else if self.view.search_visible {
            InputMode::Search
        } else {
            InputMode::Navigate
        }
    }

    pub fn exit(&self) -> Option<Exit> {
        self.exit
    }

    pub fn should_quit(&self) -> bool {
        self.exit.is_some()
    }

    fn tree_options(&self) -> TreeOptions {
        TreeOptions {
            show_panes: self.view.show_panes,
            show_hidden_sessions: self.view.show_hidden_sessions,
            hidden_session_prefix: self.config.behavior.hidden_session_prefix.clone(),
            focus_session: self.view.focus_session.clone(),
            search_term: self.view.search_term.clone(),
        }
    }

    /// Move the cursor, clamped to the displayed rows. Landing on a
    /// different node records it in the focus history.
    fn set_cursor(&mut self, row: usize) {
        let Some(last) = self.tree.rows.len().checked_sub(1) else {
            self.cursor = 0;
            self.highlighted = None;
            return;
        };

        self.cursor = row.min(last);
        let target = self.tree.rows[self.cursor].target.clone();
        if self.highlighted.as_ref() == Some(&target) {
            return;
        }

        self.highlighted = Some(target.clone());
        if self.config.behavior.preview_on_highlight {
            let preview = Mutation::SwitchClient {
                target: target.switch_target(),
            };
            if let Err(e) = self.tmux.apply(&preview) {
                log::warn!("Preview of {} failed: {}", target.id(), e);
            }
        }
        self.history.push(target);
    }

    fn select_target(&mut self, target: &Target) -> bool {
        match self.tree.row_of(target) {
            Some(row) => {
                self.set_cursor(row);
                true
            }
            None => false,
        }
    }

    /// Rebuild the tree from a fresh snapshot, keeping the cursor on the
    /// same entity when it still exists
    pub fn refresh(&mut self) {
        let previous_row = self.cursor;
        self.tree = resync(&self.tmux, &self.tree_options());

        // a focused session that was killed drops the focus
        let focus_gone = self
            .view
            .focus_session
            .as_ref()
            .is_some_and(|focus| !self.tree.sessions.iter().any(|s| &s.id == focus));
        if focus_gone {
            log::debug!("Focused session {:?} is gone", self.view.focus_session);
            self.view.focus_session = None;
            self.tree = resync(&self.tmux, &self.tree_options());
        }

        let row = self
            .highlighted
            .as_ref()
            .and_then(|target| self.tree.row_of(target))
            .unwrap_or(previous_row);
        let row = self.tree.first_match.unwrap_or(row);
        self.set_cursor(row);
    }

    pub fn move_up(&mut self) {
        self.set_cursor(self.cursor.saturating_sub(1));
    }

    pub fn move_down(&mut self) {
        self.set_cursor(self.cursor + 1);
    }

    /// Feed a digit into the jump buffer and move to the code it spells
    pub fn jump_digit(&mut self, digit: char, now: Instant) {
        if let Some(code) = self.jump.push(digit, now) {
            self.set_cursor(code.saturating_sub(1));
        }
    }

    pub fn toggle_guides(&mut self) {
        self.view.show_guides = !self.view.show_guides;
    }

    pub fn toggle_numbers(&mut self) {
        self.view.show_numbers = !self.view.show_numbers;
    }

    pub fn toggle_hidden_sessions(&mut self) {
        self.view.show_hidden_sessions = !self.view.show_hidden_sessions;
        self.refresh();
    }

    /// Restrict the tree to the selected node's session, or lift the
    /// restriction
    pub fn toggle_session_focus(&mut self) {
        self.view.focus_session = match (&self.view.focus_session, self.selected()) {
            (None, Some(row)) => Some(row.target.session_id().to_string()),
            _ => None,
        };
        self.refresh();
    }

    /// Show or hide panes. Hiding panes while one is selected moves the
    /// cursor to its window.
    pub fn toggle_panes(&mut self) {
        let previous = self.highlighted.clone();
        self.view.show_panes = !self.view.show_panes;
        self.refresh();

        let Some(previous) = previous else {
            return;
        };
        let target = match previous {
            Target::Pane {
                window_id,
                session_id,
                ..
            } if !self.view.show_panes => Target::Window {
                id: window_id,
                session_id,
            },
            other => other,
        };
        self.select_target(&target);
    }

    /// Show the search box, or hide it keeping the current term
    pub fn toggle_search(&mut self) {
        if self.view.search_visible {
            self.close_search(false);
        } else {
            self.open_search();
        }
    }

    pub fn open_search(&mut self) {
        if self.modal != Modal::Idle {
            return;
        }
        self.view.search_visible = true;
        if !self.view.search_term.is_empty() {
            self.view.search_term.clear();
            self.refresh();
        }
    }

    pub fn close_search(&mut self, clear: bool) {
        self.view.search_visible = false;
        if clear && !self.view.search_term.is_empty() {
            self.view.search_term.clear();
            self.refresh();
        }
    }

    pub fn search_input(&mut self, c: char) {
        self.view.search_term.push(c);
        self.refresh();
    }

    pub fn search_backspace(&mut self) {
        if self.view.search_term.pop().is_some() {
            self.refresh();
        }
    }

    fn begin_prompt(&mut self, kind: PromptKind, message: String) {
        self.modal = Modal::AwaitingInput(Prompt {
            kind,
            message,
            input: String::new(),
        });
    }

    /// Ask for the name of a window to create next to the selection
    pub fn begin_add_window(&mut self) {
        if self.modal != Modal::Idle || self.selected().is_none() {
            return;
        }
        self.begin_prompt(PromptKind::AddWindow, "New window name".to_string());
    }

    /// Ask for a new name for the selection. Panes cannot be renamed.
    pub fn begin_rename(&mut self) -> Result<()> {
        if self.modal != Modal::Idle {
            return Ok(());
        }
        let Some(target) = self.selected_target() else {
            return Ok(());
        };
        if target.kind() == NodeKind::Pane {
            return Err(SupertreeError::UnsupportedOperation(
                "Renaming panes".to_string(),
            ));
        }
        self.begin_prompt(PromptKind::Rename(target), "New name".to_string());
        Ok(())
    }

    /// Ask for confirmation before destroying the selection
    pub fn begin_delete(&mut self) {
        if self.modal != Modal::Idle {
            return;
        }
        let Some(row) = self.selected() else {
            return;
        };
        let message = format!("Delete {} \"{}\"?", row.target.kind().label(), row.label.text());
        let target = row.target.clone();
        self.begin_prompt(PromptKind::ConfirmDelete(target), message);
    }

    pub fn prompt_input(&mut self, c: char) {
        if let Modal::AwaitingInput(prompt) = &mut self.modal {
            if prompt.kind.takes_text() {
                prompt.input.push(c);
            }
        }
    }

    pub fn prompt_backspace(&mut self) {
        if let Modal::AwaitingInput(prompt) = &mut self.modal {
            prompt.input.pop();
        }
    }

    /// Drop the pending prompt without side effects
    pub fn cancel_prompt(&mut self) {
        self.modal = Modal::Idle;
    }

    /// Apply the pending prompt. The modal returns to idle whether or not
    /// the operation succeeds.
    pub fn submit_prompt(&mut self) -> Result<()> {
        let Modal::AwaitingInput(prompt) = std::mem::take(&mut self.modal) else {
            return Ok(());
        };

        let result = match prompt.kind {
            PromptKind::AddWindow => self.add_window(&prompt.input),
            PromptKind::Rename(target) => {
                self.modal = Modal::Applying(target.kind());
                self.rename(&target, &prompt.input)
            }
            PromptKind::ConfirmDelete(target) => {
                self.modal = Modal::Applying(target.kind());
                self.delete(&target)
            }
        };
        self.modal = Modal::Idle;
        result
    }

    /// Hand a `new-window` command to the calling shell and exit. Without a
    /// command file this does nothing.
    pub fn add_window(&mut self, name: &str) -> Result<()> {
        let Some(target) = self.selected_target() else {
            return Ok(());
        };
        let position = match target.kind() {
            NodeKind::Session => WindowPosition::Before,
            NodeKind::Window | NodeKind::Pane => WindowPosition::After,
        };
        let mutation = Mutation::NewWindow {
            target: target.id().to_string(),
            position,
            name: name.to_string(),
        };

        if self.handoff.write(&[mutation])? {
            self.exit = Some(Exit::HandedOff);
        } else {
            log::info!("No command file configured, not creating window {:?}", name);
            self.set_status("No command file configured");
        }
        Ok(())
    }

    /// Rename a session or window, then resync. A renamed session is found
    /// again by its new name.
    pub fn rename(&mut self, target: &Target, name: &str) -> Result<()> {
        let mutation = match target {
            Target::Session { id } => Mutation::RenameSession {
                id: id.clone(),
                name: name.to_string(),
            },
            Target::Window { id, .. } => Mutation::RenameWindow {
                id: id.clone(),
                name: name.to_string(),
            },
            Target::Pane { .. } => {
                return Err(SupertreeError::UnsupportedOperation(
                    "Renaming panes".to_string(),
                ))
            }
        };

        self.tmux.apply(&mutation)?;
        self.refresh();

        if target.kind() == NodeKind::Session {
            if let Some(code) = self
                .tree
                .find_session_by_name(name)
                .and_then(|session| session.jump_code)
            {
                self.set_cursor(code - 1);
            }
        }
        self.set_status(format!("Renamed {} to {}", target.kind().label(), name));
        Ok(())
    }

    /// Pick the node to focus once `target` is gone: the most recently
    /// visited node outside the target, else the first other node of the
    /// same kind
    pub fn find_replacement(&self, target: &Target) -> Option<Target> {
        let from_history = self
            .history
            .recent()
            .filter(|candidate| !candidate.is_within(target))
            .find(|candidate| self.tree.contains(candidate))
            .cloned();

        from_history.or_else(|| {
            self.tree
                .all_targets()
                .filter(|candidate| candidate.kind() == target.kind())
                .find(|candidate| !candidate.same_entity(target))
        })
    }

    /// Switch focus away from `target`, destroy it and resync. Any failure
    /// stops the sequence and leaves the tree as it was.
    pub fn delete(&mut self, target: &Target) -> Result<()> {
        let replacement = self.find_replacement(target);
        let name = self
            .tree
            .name_of(target)
            .unwrap_or_else(|| target.id().to_string());

        let mut mutations = Vec::new();
        match &replacement {
            Some(replacement) => mutations.push(Mutation::SwitchClient {
                target: replacement.switch_target(),
            }),
            None => log::warn!(
                "No replacement focus for {} {}, deleting anyway",
                target.kind().label(),
                target.id()
            ),
        }
        mutations.push(Mutation::Kill {
            kind: target.kind(),
            id: target.id().to_string(),
        });

        for mutation in &mutations {
            self.tmux.apply(mutation)?;
        }

        self.refresh();
        if let Some(replacement) = replacement {
            self.select_target(&replacement);
        }
        self.set_status(format!("Deleted {} {}", target.kind().label(), name));
        Ok(())
    }

    /// Switch the client to the selection and exit
    pub fn make_selection(&mut self) -> Result<()> {
        if let Some(target) = self.selected_target() {
            self.tmux.apply(&Mutation::SwitchClient {
                target: target.switch_target(),
            })?;
        }
        self.exit = Some(Exit::Selected);
        Ok(())
    }

    /// Restore focus to the window active at startup and exit
    pub fn cancel_selection(&mut self) {
        if let Some(location) = &self.initial {
            let target = match self.tree.find_window(&location.window_id) {
                Some(window) if window.session_id == location.session_id => Some(window.target()),
                _ => self
                    .tree
                    .sessions
                    .iter()
                    .find(|session| session.id == location.session_id)
                    .map(|session| session.target()),
            };

            if let Some(target) = target {
                let restore = Mutation::SwitchClient {
                    target: target.switch_target(),
                };
                if let Err(e) = self.tmux.apply(&restore) {
                    log::error!("Restoring focus failed: {}", e);
                }
            }
        }
        self.exit = Some(Exit::Cancelled);
    }

    /// Apply the view toggles stored in a fixture
    pub fn apply_fixture_view(&mut self, view: &FixtureView) {
        if let Some(show_panes) = view.show_panes {
            self.view.show_panes = show_panes;
        }
        if let Some(show_numbers) = view.show_numbers {
            self.view.show_numbers = show_numbers;
        }
        if let Some(show_guides) = view.show_guides {
            self.view.show_guides = show_guides;
        }
        if let Some(show_hidden) = view.show_hidden_sessions {
            self.view.show_hidden_sessions = show_hidden;
        }
        if let Some(term) = &view.search_term {
            self.view.search_term = term.clone();
        }
        self.refresh();
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_is_error = false;
    }

    /// Surface a failed operation as a one-line diagnostic
    pub fn report(&mut self, result: Result<()>) {
        if let Err(e) = result {
            log::error!("{}", e);
            self.status_message = e.to_string();
            self.status_is_error = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{Fixture, FixturePane, FixtureSession, FixtureTmux, FixtureWindow};
    use assert_matches::assert_matches;

    fn app() -> App<FixtureTmux> {
        let fixture = Fixture::new(vec![
            FixtureSession::new(
                "$0",
                "main",
                vec![FixtureWindow::new("@0", 0, "editor", vec![FixturePane::new("%0", 0, "vim")])],
            ),
            FixtureSession::new("$1", "notes", vec![]),
        ])
        .with_current("$0", "@0");
        App::new(FixtureTmux::new(fixture), Config::default(), Handoff::default())
    }

    #[test]
    fn test_starts_on_active_window() {
        let app = app();
        assert_eq!(app.cursor(), 1);
        assert_eq!(app.history().len(), 1);
        assert_eq!(app.modal(), &Modal::Idle);
    }

    #[test]
    fn test_only_one_prompt_at_a_time() {
        let mut app = app();
        app.begin_delete();
        let pending = app.modal().clone();
        app.begin_add_window();
        assert_eq!(app.begin_rename().ok(), Some(()));
        assert_eq!(app.modal(), &pending);
    }

    #[test]
    fn test_confirm_prompt_ignores_text() {
        let mut app = app();
        app.begin_delete();
        app.prompt_input('x');
        assert_matches!(app.modal(), Modal::AwaitingInput(prompt) if prompt.input.is_empty());
        app.cancel_prompt();
        assert_eq!(app.modal(), &Modal::Idle);
        assert!(app.multiplexer().applied().is_empty());
    }

    #[test]
    fn test_report_sets_error_status() {
        let mut app = app();
        app.report(Err(SupertreeError::UnsupportedOperation("Renaming panes".to_string())));
        assert!(app.status_is_error);
        assert_eq!(app.status_message, "Renaming panes is not supported");
    }
}
