//! Runtime configuration resolved from command-line flags and environment.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use env_logger::{Env, Target};

use crate::cli::Cli;
use crate::fields::LoadMode;
use crate::store::DEFAULT_CAPACITY;

/// Task file used when none is configured, relative to the working directory.
pub const DEFAULT_FILE: &str = "tasks.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub file: PathBuf,
    pub capacity: usize,
    pub load_mode: LoadMode,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file: PathBuf::from(DEFAULT_FILE),
            capacity: DEFAULT_CAPACITY,
            load_mode: LoadMode::default(),
            log_file: None,
        }
    }
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Config {
            file: cli.file.clone(),
            capacity: cli.capacity,
            load_mode: if cli.skip_invalid {
                LoadMode::SkipInvalid
            } else {
                LoadMode::StopAtFirstError
            },
            log_file: cli.log_file.clone(),
        }
    }
}

/// Set up logging. Quiet unless `RUST_LOG` asks for more. Output goes to
/// `log_file` when given, otherwise to stderr.
pub fn init_logging(log_file: Option<&Path>) -> io::Result<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["todo"]).unwrap();
        let config = Config::from(&cli);
        assert_eq!(config.file, PathBuf::from("tasks.txt"));
        assert_eq!(config.capacity, 100);
        assert_eq!(config.load_mode, LoadMode::StopAtFirstError);
        assert_eq!(config.log_file, None);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "todo",
            "list",
            "--file",
            "/tmp/mine.txt",
            "--capacity",
            "5",
            "--skip-invalid",
            "--log-file",
            "/tmp/todo.log",
        ])
        .unwrap();
        let config = Config::from(&cli);
        assert_eq!(config.file, PathBuf::from("/tmp/mine.txt"));
        assert_eq!(config.capacity, 5);
        assert_eq!(config.load_mode, LoadMode::SkipInvalid);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/todo.log")));
    }
}
