// Library module containing testable functions from main.rs

use std::fs;
use std::time::Instant;

use crate::app::App;
use crate::command::Command;
use crate::config::Config;
use crate::error::{Result, SupertreeError};
use crate::executor::{ExecutionResult, Executor};
use crate::fixture::{Fixture, FixtureTmux, FixtureView};
use crate::screenshot;

/// Snapshot the app's workspace and view back into fixture form
pub fn fixture_from_app(app: &App<FixtureTmux>) -> Fixture {
    let mut fixture = app.multiplexer().fixture();
    fixture.view = FixtureView {
        show_panes: Some(app.view.show_panes),
        show_numbers: Some(app.view.show_numbers),
        show_guides: Some(app.view.show_guides),
        show_hidden_sessions: Some(app.view.show_hidden_sessions),
        search_term: Some(app.view.search_term.clone()),
    };
    fixture
}

/// Load a fixture, run one command against it and return the resulting
/// app together with the execution summary
pub fn run_command_on_fixture(
    fixture: Fixture,
    command_str: &str,
) -> Result<(App<FixtureTmux>, ExecutionResult)> {
    let command = Command::from_string(command_str).map_err(SupertreeError::from)?;
    let mut app = screenshot::app_from_fixture(fixture, Config::default());
    let result = Executor::execute(&mut app, command, Instant::now());
    Ok((app, result))
}

pub fn execute_command(
    fixture_path: &str,
    command_str: &str,
    output_path: Option<&str>,
    generate_screenshot: bool,
    width: u16,
    height: u16,
) -> Result<()> {
    let fixture = Fixture::load_from_file(fixture_path)?;
    let (app, result) = run_command_on_fixture(fixture, command_str)?;

    let result_json = fixture_from_app(&app).to_json()?;

    match output_path {
        Some(path) => {
            fs::write(path, &result_json)?;
            println!("Result saved to: {}", path);
        }
        None => {
            println!("{}", result_json);
        }
    }

    // Show execution summary
    if let Some(status) = result.status_message {
        eprintln!("Status: {}", status);
    }
    if result.should_quit {
        eprintln!("Command resulted in quit");
    }

    if generate_screenshot {
        let screen = screenshot::render_to_string(&app, width, height)?;
        match output_path {
            Some(path) => {
                let screenshot_path = format!("{}.screenshot.txt", path.trim_end_matches(".json"));
                fs::write(&screenshot_path, screen)?;
                eprintln!("Screenshot saved to: {}", screenshot_path);
            }
            None => print!("{}", screen),
        }
    }

    Ok(())
}
