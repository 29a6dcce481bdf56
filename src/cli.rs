use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::config::DEFAULT_FILE;
use crate::store::DEFAULT_CAPACITY;

/// File-backed to-do list with a task table and a priority board.
/// Runs the table UI when no command is given.
#[derive(Parser, Debug)]
#[command(name = "todo", version, about = "To-do list for the terminal")]
pub struct Cli {
    /// Path to the task file.
    #[arg(long, global = true, env = "TODO_FILE", default_value = DEFAULT_FILE)]
    pub file: PathBuf,

    /// Maximum number of tasks the list holds.
    #[arg(long, global = true, env = "TODO_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Skip unreadable lines in the task file instead of stopping at the first one.
    #[arg(long, global = true, env = "TODO_SKIP_INVALID")]
    pub skip_invalid: bool,

    /// Append log output to this file instead of stderr. Without it, logging
    /// is silenced while a screen is open.
    #[arg(long, global = true, env = "TODO_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
