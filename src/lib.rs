pub mod app;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod executor;
pub mod filter;
pub mod fixture;
pub mod handoff;
pub mod history;
pub mod jump;
pub mod main_lib;
pub mod screenshot;
pub mod theme;
pub mod tmux;
pub mod tree;
pub mod ui;
