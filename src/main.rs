//! # todo - a to-do list for the terminal
//!
//! Keeps a flat list of tasks in a plain text file (`tasks.txt` by default) and
//! shows it either as a table or as a board of cards grouped by priority.
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the task table
//! todo
//!
//! # Open the priority board
//! todo board
//!
//! # Add a daily task from the command line
//! todo add "Gym" --daily
//!
//! # List tasks grouped by priority
//! todo list --grouped
//! ```
//!
//! ## Task file
//!
//! One task per line, `<text>|<completed>|<daily>|<priority>`, for example
//! `Gym|0|1|-1`. The file is read once at startup and written once on exit.
//! Set `RUST_LOG=debug` to see what was loaded and saved; while a screen is
//! open, logs are only kept when `--log-file` is given.

use clap::Parser;

pub mod action;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod fields;
pub mod storage;
pub mod store;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod board;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod menu;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::Config;
use error::AppError;
use tui::enums::Screen;

fn main() {
    let cli = Cli::parse();
    let config = Config::from(&cli);
    if let Err(e) = config::init_logging(config.log_file.as_deref()) {
        eprintln!("Error: cannot open log file: {e}");
        std::process::exit(1);
    }
    log::debug!("{config:?}");

    if let Err(e) = run(&config, cli.command.unwrap_or(Commands::Ui)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(config: &Config, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Ui => cmd_ui(config, Screen::Table),
        Commands::Board => cmd_ui(config, Screen::Board),
        Commands::Add { text, daily } => cmd_add(config, text, daily),
        Commands::List { daily, grouped, json } => cmd_list(config, daily, grouped, json),
        Commands::Complete { id } => cmd_complete(config, id),
        Commands::Priority { id, priority } => cmd_priority(config, id, priority),
        Commands::Delete { id } => cmd_delete(config, id),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}
