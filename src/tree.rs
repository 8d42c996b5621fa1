use std::time::Instant;

use crate::filter::{apply_fuzzy_markup, MarkedName};
use crate::tmux::{Multiplexer, NodeKind};

/// Identity of a node, stable across resyncs while the tmux entity lives
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Session {
        id: String,
    },
    Window {
        id: String,
        session_id: String,
    },
    Pane {
        id: String,
        window_id: String,
        session_id: String,
    },
}

impl Target {
    pub fn kind(&self) -> NodeKind {
        match self {
            Target::Session { .. } => NodeKind::Session,
            Target::Window { .. } => NodeKind::Window,
            Target::Pane { .. } => NodeKind::Pane,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Target::Session { id } | Target::Window { id, .. } | Target::Pane { id, .. } => id,
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            Target::Session { id } => id,
            Target::Window { session_id, .. } | Target::Pane { session_id, .. } => session_id,
        }
    }

    pub fn window_id(&self) -> Option<&str> {
        match self {
            Target::Session { .. } => None,
            Target::Window { id, .. } => Some(id),
            Target::Pane { window_id, .. } => Some(window_id),
        }
    }

    /// Same tmux entity, ignoring where it currently lives
    pub fn same_entity(&self, other: &Target) -> bool {
        self.kind() == other.kind() && self.id() == other.id()
    }

    /// True if destroying `container` also destroys this node
    pub fn is_within(&self, container: &Target) -> bool {
        match container {
            Target::Session { id } => self.session_id() == id,
            Target::Window { id, .. } => self.window_id() == Some(id.as_str()),
            Target::Pane { .. } => self.same_entity(container),
        }
    }

    /// Argument for `switch-client -t`
    pub fn switch_target(&self) -> String {
        match self {
            Target::Session { id } => id.clone(),
            Target::Window { id, session_id } => format!("{}:{}", session_id, id),
            Target::Pane { id, .. } => id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneNode {
    pub id: String,
    pub name: String,
    pub index: usize,
    pub window_id: String,
    pub session_id: String,
    pub jump_code: Option<usize>,
    pub is_enabled: bool,
}

impl PaneNode {
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("Pane {}", self.index)
        } else {
            self.name.clone()
        }
    }

    pub fn target(&self) -> Target {
        Target::Pane {
            id: self.id.clone(),
            window_id: self.window_id.clone(),
            session_id: self.session_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowNode {
    pub id: String,
    pub name: String,
    pub index: usize,
    pub session_id: String,
    pub jump_code: Option<usize>,
    pub is_enabled: bool,
    pub panes: Vec<PaneNode>,
}

impl WindowNode {
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("Window {}", self.index)
        } else {
            self.name.clone()
        }
    }

    pub fn target(&self) -> Target {
        Target::Window {
            id: self.id.clone(),
            session_id: self.session_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionNode {
    pub id: String,
    pub name: String,
    pub jump_code: Option<usize>,
    pub is_enabled: bool,
    pub windows: Vec<WindowNode>,
}

impl SessionNode {
    pub fn target(&self) -> Target {
        Target::Session {
            id: self.id.clone(),
        }
    }
}

/// The raw hierarchy as returned by one enumeration pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub sessions: Vec<SessionNode>,
}

impl Snapshot {
    /// Enumerate sessions, then windows per session, then panes per window.
    /// A failed sub-enumeration leaves that branch empty.
    pub fn capture<M: Multiplexer + ?Sized>(tmux: &M) -> Self {
        let sessions = match tmux.list_sessions() {
            Ok(sessions) => sessions,
            Err(e) => {
                log::warn!("Listing sessions failed: {}", e);
                return Self::default();
            }
        };

        let sessions = sessions
            .into_iter()
            .map(|session| {
                let windows = tmux.list_windows(&session.id).unwrap_or_else(|e| {
                    log::warn!("Listing windows of {} failed: {}", session.id, e);
                    Vec::new()
                });

                let windows = windows
                    .into_iter()
                    .map(|window| {
                        let panes = tmux.list_panes(&window.id).unwrap_or_else(|e| {
                            log::warn!("Listing panes of {} failed: {}", window.id, e);
                            Vec::new()
                        });

                        WindowNode {
                            panes: panes
                                .into_iter()
                                .map(|pane| PaneNode {
                                    id: pane.id,
                                    name: pane.title,
                                    index: pane.index,
                                    window_id: window.id.clone(),
                                    session_id: session.id.clone(),
                                    jump_code: None,
                                    is_enabled: true,
                                })
                                .collect(),
                            id: window.id,
                            name: window.name,
                            index: window.index,
                            session_id: session.id.clone(),
                            jump_code: None,
                            is_enabled: true,
                        }
                    })
                    .collect();

                SessionNode {
                    id: session.id,
                    name: session.name,
                    jump_code: None,
                    is_enabled: true,
                    windows,
                }
            })
            .collect();

        Self { sessions }
    }
}

/// Options that change which nodes are displayed and how they are labelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    pub show_panes: bool,
    pub show_hidden_sessions: bool,
    pub hidden_session_prefix: String,
    pub focus_session: Option<String>,
    pub search_term: String,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            show_panes: false,
            show_hidden_sessions: false,
            hidden_session_prefix: "__".to_string(),
            focus_session: None,
            search_term: String::new(),
        }
    }
}

/// One displayed line of the tree, in pre-order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub target: Target,
    pub label: MarkedName,
    pub jump_code: usize,
    pub is_enabled: bool,
    pub depth: usize,
    /// For each level from 1 to `depth`: whether the ancestor (or the row
    /// itself, last entry) is the last child of its parent
    pub last_child: Vec<bool>,
}

/// An addressed, filtered tree built from a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub sessions: Vec<SessionNode>,
    pub rows: Vec<TreeRow>,
    /// Row of the first node carrying match markup, when the filter
    /// disabled at least one node
    pub first_match: Option<usize>,
}

/// Pull a fresh snapshot and build the displayed tree from it
pub fn resync<M: Multiplexer + ?Sized>(tmux: &M, options: &TreeOptions) -> Tree {
    let start = Instant::now();
    let tree = Tree::build(Snapshot::capture(tmux), options);
    log::debug!(
        "resync: {} sessions, {} rows in {:?}",
        tree.sessions.len(),
        tree.rows.len(),
        start.elapsed()
    );
    tree
}

struct RowBuilder<'a> {
    options: &'a TreeOptions,
    rows: Vec<TreeRow>,
    first_match: Option<usize>,
    has_disabled: bool,
}

impl RowBuilder<'_> {
    /// Assign the next jump code and run the filter for one node
    fn add(
        &mut self,
        target: Target,
        parent_name: Option<&str>,
        name: &str,
        last_child: Vec<bool>,
    ) -> (usize, bool) {
        let jump_code = self.rows.len() + 1;
        let (label, is_enabled) =
            match apply_fuzzy_markup(&self.options.search_term, parent_name, name) {
                Some(marked) => (marked, true),
                None => (MarkedName::plain(name), false),
            };

        if !is_enabled {
            self.has_disabled = true;
        } else if self.first_match.is_none() && label.has_matches() {
            self.first_match = Some(self.rows.len());
        }

        self.rows.push(TreeRow {
            target,
            label,
            jump_code,
            is_enabled,
            depth: last_child.len(),
            last_child,
        });
        (jump_code, is_enabled)
    }
}

impl Tree {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number the visible nodes in pre-order and apply the search filter
    pub fn build(snapshot: Snapshot, options: &TreeOptions) -> Self {
        let mut sessions = snapshot.sessions;
        let mut builder = RowBuilder {
            options,
            rows: Vec::new(),
            first_match: None,
            has_disabled: false,
        };

        for session in sessions.iter_mut() {
            let hidden = !options.show_hidden_sessions
                && !options.hidden_session_prefix.is_empty()
                && session.name.starts_with(&options.hidden_session_prefix);
            let unfocused = options
                .focus_session
                .as_ref()
                .is_some_and(|focus| focus != &session.id);

            if hidden || unfocused {
                continue;
            }

            let (code, enabled) = builder.add(session.target(), None, &session.name, Vec::new());
            session.jump_code = Some(code);
            session.is_enabled = enabled;

            let window_count = session.windows.len();
            for (w, window) in session.windows.iter_mut().enumerate() {
                let window_last = w + 1 == window_count;
                let (code, enabled) = builder.add(
                    window.target(),
                    Some(&session.name),
                    &window.display_name(),
                    vec![window_last],
                );
                window.jump_code = Some(code);
                window.is_enabled = enabled;

                if !options.show_panes {
                    continue;
                }

                let window_name = window.name.clone();
                let pane_count = window.panes.len();
                for (p, pane) in window.panes.iter_mut().enumerate() {
                    let (code, enabled) = builder.add(
                        pane.target(),
                        Some(&window_name),
                        &pane.display_name(),
                        vec![window_last, p + 1 == pane_count],
                    );
                    pane.jump_code = Some(code);
                    pane.is_enabled = enabled;
                }
            }
        }

        let first_match = if builder.has_disabled {
            builder.first_match
        } else {
            None
        };

        Self {
            sessions,
            rows: builder.rows,
            first_match,
        }
    }

    /// True when tmux reported no sessions at all
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Row showing the given entity, if it is displayed
    pub fn row_of(&self, target: &Target) -> Option<usize> {
        self.rows.iter().position(|row| row.target.same_entity(target))
    }

    /// Row of the node with this jump code
    pub fn resolve(&self, jump_code: usize) -> Option<&TreeRow> {
        jump_code.checked_sub(1).and_then(|row| self.rows.get(row))
    }

    pub fn contains(&self, target: &Target) -> bool {
        self.all_targets().any(|t| t.same_entity(target))
    }

    pub fn find_session_by_name(&self, name: &str) -> Option<&SessionNode> {
        self.sessions.iter().find(|session| session.name == name)
    }

    pub fn find_window(&self, window_id: &str) -> Option<&WindowNode> {
        self.sessions
            .iter()
            .flat_map(|session| session.windows.iter())
            .find(|window| window.id == window_id)
    }

    /// Display name of an entity anywhere in the snapshot
    pub fn name_of(&self, target: &Target) -> Option<String> {
        self.sessions.iter().find_map(|session| match target {
            Target::Session { id } => (&session.id == id).then(|| session.name.clone()),
            _ => session.windows.iter().find_map(|window| match target {
                Target::Window { id, .. } => (&window.id == id).then(|| window.display_name()),
                _ => window
                    .panes
                    .iter()
                    .find(|pane| pane.id == target.id())
                    .map(|pane| pane.display_name()),
            }),
        })
    }

    /// Every entity in the snapshot, displayed or not, in pre-order
    pub fn all_targets(&self) -> impl Iterator<Item = Target> + '_ {
        self.sessions.iter().flat_map(|session| {
            std::iter::once(session.target()).chain(session.windows.iter().flat_map(|window| {
                std::iter::once(window.target()).chain(window.panes.iter().map(|p| p.target()))
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SupertreeError;
    use crate::tmux::{MockMultiplexer, PaneInfo, SessionInfo, WindowInfo};

    fn session(id: &str, name: &str) -> SessionInfo {
        SessionInfo {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn window(id: &str, index: usize, name: &str) -> WindowInfo {
        WindowInfo {
            id: id.to_string(),
            index,
            name: name.to_string(),
        }
    }

    fn pane(id: &str, index: usize, title: &str) -> PaneInfo {
        PaneInfo {
            id: id.to_string(),
            index,
            title: title.to_string(),
        }
    }

    fn mock_workspace() -> MockMultiplexer {
        let mut tmux = MockMultiplexer::new();
        tmux.expect_list_sessions()
            .returning(|| Ok(vec![session("$0", "A"), session("$1", "B")]));
        tmux.expect_list_windows().returning(|session_id| match session_id {
            "$0" => Ok(vec![window("@0", 0, "a1"), window("@1", 1, "a2")]),
            _ => Ok(vec![]),
        });
        tmux.expect_list_panes().returning(|window_id| match window_id {
            "@0" => Ok(vec![pane("%0", 0, "zsh"), pane("%1", 1, "")]),
            _ => Err(SupertreeError::ProviderUnavailable("gone".to_string())),
        });
        tmux
    }

    fn codes(tree: &Tree) -> Vec<usize> {
        tree.rows.iter().map(|row| row.jump_code).collect()
    }

    #[test]
    fn test_failed_pane_enumeration_leaves_window_empty() {
        let snapshot = Snapshot::capture(&mock_workspace());
        assert_eq!(snapshot.sessions.len(), 2);
        assert_eq!(snapshot.sessions[0].windows[0].panes.len(), 2);
        assert!(snapshot.sessions[0].windows[1].panes.is_empty());
    }

    #[test]
    fn test_failed_session_enumeration_is_empty_tree() {
        let mut tmux = MockMultiplexer::new();
        tmux.expect_list_sessions()
            .returning(|| Err(SupertreeError::ProviderUnavailable("no server".to_string())));
        tmux.expect_list_windows().never();

        let tree = resync(&tmux, &TreeOptions::default());
        assert!(tree.is_empty());
        assert!(tree.rows.is_empty());
    }

    #[test]
    fn test_jump_codes_follow_preorder() {
        let tmux = mock_workspace();
        let tree = resync(&tmux, &TreeOptions::default());
        assert_eq!(codes(&tree), vec![1, 2, 3, 4]);
        assert_eq!(tree.sessions[0].windows[1].jump_code, Some(3));
        assert_eq!(tree.sessions[1].jump_code, Some(4));

        let with_panes = TreeOptions {
            show_panes: true,
            ..TreeOptions::default()
        };
        let tree = resync(&tmux, &with_panes);
        let names: Vec<String> = tree.rows.iter().map(|row| row.label.text()).collect();
        assert_eq!(names, vec!["A", "a1", "zsh", "Pane 1", "a2", "B"]);
        assert_eq!(codes(&tree), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(tree.rows[3].depth, 2);
    }

    #[test]
    fn test_hidden_and_focused_sessions() {
        let mut tmux = MockMultiplexer::new();
        tmux.expect_list_sessions()
            .returning(|| Ok(vec![session("$0", "__scratch"), session("$1", "work")]));
        tmux.expect_list_windows().returning(|_| Ok(vec![]));
        tmux.expect_list_panes().returning(|_| Ok(vec![]));

        let tree = resync(&tmux, &TreeOptions::default());
        assert_eq!(tree.rows.len(), 1);
        assert_eq!(tree.rows[0].label.text(), "work");
        assert_eq!(tree.sessions[0].jump_code, None);

        let options = TreeOptions {
            show_hidden_sessions: true,
            focus_session: Some("$0".to_string()),
            ..TreeOptions::default()
        };
        let tree = resync(&tmux, &options);
        assert_eq!(tree.rows.len(), 1);
        assert_eq!(tree.rows[0].label.text(), "__scratch");
    }

    #[test]
    fn test_filter_disables_without_removing() {
        let options = TreeOptions {
            search_term: "a1".to_string(),
            ..TreeOptions::default()
        };
        let tree = resync(&mock_workspace(), &options);
        let enabled: Vec<bool> = tree.rows.iter().map(|row| row.is_enabled).collect();
        assert_eq!(enabled, vec![true, true, false, true]);
        assert_eq!(tree.rows[1].label.matched_text(), "a1");
        assert_eq!(tree.first_match, Some(1));
        assert_eq!(codes(&tree), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_unnamed_window_does_not_scope_its_panes() {
        let mut tmux = MockMultiplexer::new();
        tmux.expect_list_sessions()
            .returning(|| Ok(vec![session("$0", "A")]));
        tmux.expect_list_windows()
            .returning(|_| Ok(vec![window("@0", 0, "")]));
        tmux.expect_list_panes()
            .returning(|_| Ok(vec![pane("%0", 0, "xterm")]));

        let options = TreeOptions {
            show_panes: true,
            search_term: "zz/x".to_string(),
            ..TreeOptions::default()
        };
        let tree = resync(&tmux, &options);
        let enabled: Vec<bool> = tree.rows.iter().map(|row| row.is_enabled).collect();
        assert_eq!(enabled, vec![false, false, true]);
        assert_eq!(tree.rows[1].label.text(), "Window 0");
    }

    #[test]
    fn test_resync_without_changes_is_stable() {
        let tmux = mock_workspace();
        let options = TreeOptions {
            show_panes: true,
            search_term: "z".to_string(),
            ..TreeOptions::default()
        };
        assert_eq!(resync(&tmux, &options), resync(&tmux, &options));
    }

    #[test]
    fn test_target_containment() {
        let session = Target::Session { id: "$0".to_string() };
        let window = Target::Window {
            id: "@1".to_string(),
            session_id: "$0".to_string(),
        };
        let pane = Target::Pane {
            id: "%2".to_string(),
            window_id: "@1".to_string(),
            session_id: "$0".to_string(),
        };
        assert!(window.is_within(&session));
        assert!(pane.is_within(&window));
        assert!(!session.is_within(&window));
        assert_eq!(window.switch_target(), "$0:@1");
    }

    #[test]
    fn test_lookups() {
        let tree = resync(&mock_workspace(), &TreeOptions::default());
        let a2 = Target::Window {
            id: "@1".to_string(),
            session_id: "$0".to_string(),
        };
        assert_eq!(tree.row_of(&a2), Some(2));
        assert_eq!(tree.resolve(3).map(|row| row.target.clone()), Some(a2.clone()));
        assert!(tree.resolve(0).is_none());
        assert_eq!(tree.name_of(&a2).as_deref(), Some("a2"));
        assert_eq!(tree.find_session_by_name("B").map(|s| s.id.as_str()), Some("$1"));
        assert!(tree.find_window("@0").is_some());
        // panes are part of the snapshot even when hidden
        assert_eq!(tree.all_targets().count(), 6);
    }
}
