use ratatui::{
    backend::TestBackend,
    buffer::Buffer,
    style::{Color, Modifier},
    Terminal,
};

use tmux_supertree::{
    app::App,
    config::Config,
    error::SupertreeError,
    fixture::{Fixture, FixturePane, FixtureSession, FixtureTmux, FixtureWindow},
    handoff::Handoff,
    screenshot::buffer_to_string,
    theme::get_theme,
    ui,
};

fn workspace() -> Fixture {
    Fixture::new(vec![
        FixtureSession::new(
            "$0",
            "A",
            vec![
                FixtureWindow::new("@0", 0, "a1", vec![FixturePane::new("%0", 0, "shell")]),
                FixtureWindow::new("@1", 1, "a2", vec![]),
            ],
        ),
        FixtureSession::new("$1", "B", vec![]),
    ])
}

fn app_with(fixture: Fixture) -> App<FixtureTmux> {
    App::new(FixtureTmux::new(fixture), Config::default(), Handoff::default())
}

/// Render the UI once into an 80x24 buffer
fn render(app: &App<FixtureTmux>) -> Buffer {
    let backend = TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| ui::draw(frame, app)).unwrap();
    terminal.backend().buffer().clone()
}

/// Position of the first cell run spelling `text`
fn find_text(buffer: &Buffer, text: &str) -> Option<(u16, u16)> {
    let wanted: Vec<String> = text.chars().map(|c| c.to_string()).collect();
    let area = buffer.area();
    for y in 0..area.height {
        for x in 0..area.width {
            let fits = wanted.iter().enumerate().all(|(i, sym)| {
                let cx = x + i as u16;
                cx < area.width && buffer[(cx, y)].symbol() == sym
            });
            if fits {
                return Some((x, y));
            }
        }
    }
    None
}

fn line_containing(screen: &str, text: &str) -> Option<String> {
    screen.lines().find(|line| line.contains(text)).map(|line| line.trim_end().to_string())
}

#[test]
fn test_empty_workspace_shows_placeholder() {
    let buffer = render(&app_with(Fixture::default()));
    let (x, y) = find_text(&buffer, "No tmux sessions found").expect("placeholder rendered");
    assert_eq!(buffer[(x, y)].fg, Color::Red);
}

#[test]
fn test_guides_and_jump_labels() {
    let mut app = app_with(workspace());
    app.toggle_panes();
    app.toggle_numbers();
    let screen = buffer_to_string(&render(&app));

    assert!(line_containing(&screen, "1: A").is_some());
    assert!(line_containing(&screen, "2: ├─ a1").is_some());
    assert!(line_containing(&screen, "3: │  └─ shell").is_some());
    assert!(line_containing(&screen, "4: └─ a2").is_some());
    assert!(line_containing(&screen, "5: B").is_some());
}

#[test]
fn test_guides_off_indents_with_spaces() {
    let mut app = app_with(workspace());
    app.toggle_guides();
    let screen = buffer_to_string(&render(&app));

    assert!(line_containing(&screen, "│  a1").is_some());
    assert!(!screen.contains("├─"));
    assert!(!screen.contains("1: A"));
}

#[test]
fn test_search_marks_matches_and_dims_disabled() {
    let mut app = app_with(workspace());
    app.open_search();
    app.search_input('a');
    app.search_input('1');
    let buffer = render(&app);
    let theme = get_theme();

    // the search box sits above the tree
    let (_, box_y) = find_text(&buffer, "Search").unwrap();
    let (x, y) = find_text(&buffer, "─ a1").unwrap();
    assert!(box_y < y);

    for dx in 2..4 {
        let modifier = buffer[(x + dx, y)].modifier;
        assert!(modifier.contains(Modifier::UNDERLINED | Modifier::BOLD));
    }

    let (x, y) = find_text(&buffer, "─ a2").unwrap();
    assert_eq!(buffer[(x + 2, y)].fg, theme.node_disabled);
    assert!(!buffer[(x + 2, y)].modifier.contains(Modifier::UNDERLINED));

    let (x, y) = find_text(&buffer, "B").unwrap();
    assert_ne!(buffer[(x, y)].fg, theme.node_disabled);
}

#[test]
fn test_selected_row_is_highlighted() {
    let mut app = app_with(workspace());
    app.move_down();
    let buffer = render(&app);
    let theme = get_theme();

    let (x, y) = find_text(&buffer, "a1").unwrap();
    assert_eq!(buffer[(x, y)].bg, theme.selected_bg);
    let (x, y) = find_text(&buffer, "a2").unwrap();
    assert_ne!(buffer[(x, y)].bg, theme.selected_bg);
}

#[test]
fn test_delete_prompt_popup() {
    let mut app = app_with(workspace());
    app.begin_delete();
    let screen = buffer_to_string(&render(&app));

    assert!(screen.contains("Delete session \"A\"?"));
    assert!(screen.contains("y/n"));
    assert!(screen.contains("Enter: Apply | Esc: Cancel"));
}

#[test]
fn test_status_bar_shows_errors() {
    let mut app = app_with(workspace());
    app.report(Err(SupertreeError::UnsupportedOperation("Renaming panes".to_string())));
    let buffer = render(&app);

    let (x, y) = find_text(&buffer, "Renaming panes is not supported").unwrap();
    assert_eq!(y, 23);
    assert_eq!(buffer[(x, y)].fg, get_theme().status_error);
}
