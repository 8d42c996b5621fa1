use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::fs;

use crate::app::App;
use crate::config::Config;
use crate::error::Result;
use crate::fixture::{Fixture, FixtureTmux};
use crate::handoff::Handoff;
use crate::tmux::Multiplexer;
use crate::ui;

/// Build an app over a fixture, with the fixture's view toggles applied
pub fn app_from_fixture(fixture: Fixture, config: Config) -> App<FixtureTmux> {
    let view = fixture.view.clone();
    let mut app = App::new(FixtureTmux::new(fixture), config, Handoff::default());
    app.apply_fixture_view(&view);
    app
}

/// Render the app once into an off-screen buffer and return it as text
pub fn render_to_string<M: Multiplexer>(app: &App<M>, width: u16, height: u16) -> Result<String> {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend)?;

    terminal.draw(|frame| {
        ui::draw(frame, app);
    })?;

    Ok(buffer_to_string(terminal.backend().buffer()))
}

pub fn generate_screenshot(
    fixture_path: &str,
    output_path: Option<&str>,
    width: u16,
    height: u16,
) -> Result<()> {
    let fixture = Fixture::load_from_file(fixture_path)?;
    let app = app_from_fixture(fixture, Config::default());
    let screenshot = render_to_string(&app, width, height)?;

    match output_path {
        Some(path) => {
            fs::write(path, screenshot)?;
            println!("Screenshot saved to: {}", path);
        }
        None => {
            print!("{}", screenshot);
        }
    }

    Ok(())
}

pub fn buffer_to_string(buffer: &Buffer) -> String {
    let mut result = String::new();

    for y in 0..buffer.area().height {
        for x in 0..buffer.area().width {
            let cell = &buffer[(x, y)];
            let sym = cell.symbol();

            // Use a space for empty cells to make output more readable
            if sym.is_empty() {
                result.push(' ');
            } else {
                result.push_str(sym);
            }
        }
        result.push('\n');
    }

    result
}
