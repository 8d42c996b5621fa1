use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, InputMode, Modal};
use crate::theme::{get_theme, Theme};
use crate::tmux::Multiplexer;
use crate::tree::TreeRow;

pub fn draw<M: Multiplexer>(frame: &mut Frame, app: &App<M>) {
    let theme = get_theme();

    let constraints = if app.view.search_visible {
        vec![Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)]
    } else {
        vec![Constraint::Min(0), Constraint::Length(1)]
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    let (tree_area, status_area) = if app.view.search_visible {
        draw_search_box(frame, app, &theme, chunks[0]);
        (chunks[1], chunks[2])
    } else {
        (chunks[0], chunks[1])
    };

    draw_tree(frame, app, &theme, tree_area);
    draw_status_bar(frame, app, &theme, status_area);

    if let Modal::AwaitingInput(prompt) = app.modal() {
        let area = centered_rect(60, 3, frame.area());
        let text = if prompt.kind.takes_text() {
            prompt.input.clone()
        } else {
            "y/n".to_string()
        };
        let block = Block::default()
            .title(format!(" {} ", prompt.message))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.prompt_border));

        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(text).block(block), area);
    }
}

/// Tree guide characters preceding a row's label
pub fn guide_prefix(row: &TreeRow, show_guides: bool) -> String {
    if !show_guides {
        return "  ".repeat(row.depth);
    }

    let mut prefix = String::new();
    for (level, is_last) in row.last_child.iter().enumerate() {
        let is_own_level = level + 1 == row.last_child.len();
        prefix.push_str(match (is_own_level, is_last) {
            (true, true) => "└─ ",
            (true, false) => "├─ ",
            (false, true) => "   ",
            (false, false) => "│  ",
        });
    }
    prefix
}

fn row_line<'a>(row: &'a TreeRow, numbers_width: Option<usize>, show_guides: bool, theme: &Theme) -> Line<'a> {
    let mut spans = Vec::new();

    if let Some(width) = numbers_width {
        spans.push(Span::styled(
            format!("{:>width$}: ", row.jump_code, width = width),
            Style::default().fg(theme.jump_label),
        ));
    }

    spans.push(Span::styled(
        guide_prefix(row, show_guides),
        Style::default().fg(theme.guides),
    ));

    let base = if row.is_enabled {
        Style::default().fg(theme.node_default)
    } else {
        Style::default().fg(theme.node_disabled)
    };
    for segment in row.label.segments() {
        let style = if segment.matched {
            base.patch(theme.match_style())
        } else {
            base
        };
        spans.push(Span::styled(segment.text.as_str(), style));
    }

    Line::from(spans)
}

fn draw_tree<M: Multiplexer>(frame: &mut Frame, app: &App<M>, theme: &Theme, area: Rect) {
    let title = match &app.view.focus_session {
        Some(session_id) => format!(" tmux ({}) ", session_id),
        None => " tmux ".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    let tree = app.tree();
    if tree.is_empty() {
        let paragraph = Paragraph::new("No tmux sessions found")
            .block(block)
            .style(Style::default().fg(theme.placeholder));
        frame.render_widget(paragraph, area);
        return;
    }

    let numbers_width = app
        .view
        .show_numbers
        .then(|| tree.rows.len().to_string().len());
    let items: Vec<ListItem> = tree
        .rows
        .iter()
        .map(|row| ListItem::new(row_line(row, numbers_width, app.view.show_guides, theme)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selected_style())
        .highlight_symbol("");

    let mut list_state = ListState::default();
    list_state.select((!tree.rows.is_empty()).then_some(app.cursor()));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_search_box<M: Multiplexer>(frame: &mut Frame, app: &App<M>, theme: &Theme, area: Rect) {
    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.search_border));
    let paragraph = Paragraph::new(app.view.search_term.as_str()).block(block);
    frame.render_widget(paragraph, area);
}

fn draw_status_bar<M: Multiplexer>(frame: &mut Frame, app: &App<M>, theme: &Theme, area: Rect) {
    let keys = &app.config().keybindings;
    let help_text = match app.input_mode() {
        InputMode::Navigate => format!(
            "Enter: Switch | Esc: Cancel | {}: Search | {}: Add | {}: Rename | {}: Delete | {}: Panes | {}: Numbers",
            keys.search, keys.add_window, keys.rename, keys.delete, keys.toggle_panes, keys.toggle_numbers
        ),
        InputMode::Search => "Enter: Keep filter | Esc: Clear filter | ↑↓: Navigate".to_string(),
        InputMode::Prompt => "Enter: Apply | Esc: Cancel".to_string(),
    };

    let status_style = if app.status_is_error {
        Style::default().fg(theme.status_error)
    } else {
        Style::default().fg(theme.status_bar_fg)
    };

    let mut spans = Vec::new();
    if !app.status_message.is_empty() {
        spans.push(Span::styled(app.status_message.as_str(), status_style));
        spans.push(Span::raw(" | "));
    }
    spans.push(Span::styled(help_text, Style::default().fg(theme.status_help_text)));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.status_bar_bg));
    frame.render_widget(paragraph, area);
}

/// A rectangle `percent_x` wide and `height` rows tall, centered in `area`
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
