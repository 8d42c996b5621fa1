use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tmux-supertree")]
#[command(about = "A keyboard-driven tree navigator for tmux sessions, windows and panes")]
pub struct Cli {
    /// File to write shell commands into for the calling shell to run
    #[arg(long, global = true)]
    pub command_file: Option<PathBuf>,
    /// Command appended after the written commands, typically to relaunch the navigator
    #[arg(long, global = true)]
    pub return_command: Option<String>,
    /// Start with the search box open
    #[arg(long, global = true)]
    pub search_mode: bool,
    /// Switch the tmux client to each node as it is highlighted. Off by
    /// default; `behavior.preview_on_highlight` in the config file sets it too
    #[arg(long, global = true)]
    pub preview: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive TUI (default)
    Run,
    /// Render a JSON workspace fixture as text
    Screenshot {
        /// Path to the JSON fixture
        #[arg(short, long)]
        fixture: String,
        /// Output file for the screenshot (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
        /// Terminal width for rendering
        #[arg(long, default_value = "80")]
        width: u16,
        /// Terminal height for rendering
        #[arg(long, default_value = "24")]
        height: u16,
    },
    /// Execute a command against a fixture and output the resulting fixture
    Execute {
        /// Path to the JSON fixture
        #[arg(short, long)]
        fixture: String,
        /// Command to execute (e.g., "down", "jump:3", "sequence:[delete,enter]")
        #[arg(short = 'x', long)]
        command: String,
        /// Output file for the resulting fixture (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
        /// Also generate a screenshot of the result
        #[arg(long)]
        screenshot: bool,
        /// Terminal width for screenshot (if enabled)
        #[arg(long, default_value = "80")]
        width: u16,
        /// Terminal height for screenshot (if enabled)
        #[arg(long, default_value = "24")]
        height: u16,
    },
}
