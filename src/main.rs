use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

use tmux_supertree::app::App;
use tmux_supertree::cli::{Cli, Commands};
use tmux_supertree::config::Config;
use tmux_supertree::error::Result;
use tmux_supertree::event::event_to_command;
use tmux_supertree::executor::Executor;
use tmux_supertree::handoff::Handoff;
use tmux_supertree::tmux::{Multiplexer, TmuxClient};
use tmux_supertree::{main_lib, screenshot, ui};

const LOG_ENV_VAR: &str = "TMUX_SUPERTREE_LOG";

fn main() -> Result<()> {
    // Initialize logger only if TMUX_SUPERTREE_LOG names a file; stderr
    // belongs to the TUI
    if let Ok(log_file) = std::env::var(LOG_ENV_VAR) {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;
        env_logger::Builder::new()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .filter_level(log::LevelFilter::Debug)
            .init();

        log::info!("tmux-supertree starting up");
    }

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let mut config = Config::load();
            config.behavior.preview_on_highlight |= cli.preview;
            let tmux = TmuxClient::new(config.tmux.socket.clone());
            let handoff = Handoff::new(cli.command_file, cli.return_command)
                .with_socket(config.tmux.socket.clone());
            let app = App::new(tmux, config, handoff).with_search_mode(cli.search_mode);
            run_interactive(app)
        }
        Commands::Screenshot {
            fixture,
            output,
            width,
            height,
        } => screenshot::generate_screenshot(&fixture, output.as_deref(), width, height),
        Commands::Execute {
            fixture,
            command,
            output,
            screenshot,
            width,
            height,
        } => main_lib::execute_command(&fixture, &command, output.as_deref(), screenshot, width, height),
    }
}

fn run_interactive<M: Multiplexer>(mut app: App<M>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(exit) = app.exit() {
        log::info!("Exiting: {:?}", exit);
    }
    result
}

fn event_loop<M: Multiplexer>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<M>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if crossterm::event::poll(tick_rate)? {
            let event = crossterm::event::read()?;
            if let Some(command) = event_to_command(&event, app.input_mode(), &app.config().keybindings) {
                log::debug!("command: {}", command.to_string());
                Executor::execute(app, command, Instant::now());
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
