//! Command implementations for the CLI interface.
//!
//! Every command opens a `Session` on the configured task file, works on the
//! in-memory store, and closes the session, which writes the file back once.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use clap_complete::{generate, Shell};
use log::{debug, error, warn};
use serde_json::json;

use crate::action::{apply, Action};
use crate::config::Config;
use crate::error::AppError;
use crate::fields::Priority;
use crate::storage;
use crate::store::TaskStore;
use crate::task::TaskId;
use crate::tui::{
    enums::Screen,
    run::{run_tui, Launch},
};
use crate::view::{print_board, print_table, BoardView, TableView};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the task table interface (the default).
    Ui,

    /// Launch the priority board interface.
    Board,

    /// Add a new task.
    Add {
        /// Text of the task.
        text: String,
        /// Make it a daily task.
        #[arg(long)]
        daily: bool,
    },

    /// List tasks.
    List {
        /// Only daily tasks.
        #[arg(long)]
        daily: bool,
        /// Group tasks by priority, like the board.
        #[arg(long)]
        grouped: bool,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Toggle whether a task is completed.
    Complete {
        /// Task ID as shown by `list`.
        id: u64,
    },

    /// Set the priority of a task.
    Priority {
        /// Task ID as shown by `list`.
        id: u64,
        #[arg(value_enum)]
        priority: Priority,
    },

    /// Delete a task.
    Delete {
        /// Task ID as shown by `list`.
        id: u64,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type: bash | zsh | fish | powershell | elvish.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// A task store loaded from a file, to be written back by `close`.
pub struct Session {
    pub store: TaskStore,
    path: PathBuf,
    /// Some of the file was not loaded; keep a copy before overwriting it.
    partial: bool,
    /// The file exists but could not be read at all.
    unreadable: Option<String>,
}

impl Session {
    /// Load the task file, failing if it exists but cannot be read.
    pub fn open(config: &Config) -> Result<Self, AppError> {
        let loaded = storage::load(&config.file, config.load_mode)?;
        let partial = loaded.is_partial();
        if let Some(line) = loaded.stopped_at {
            warn!("{}: stopped reading at line {line}", config.file.display());
        } else if loaded.rejected > 0 {
            warn!("{}: skipped {} unreadable lines", config.file.display(), loaded.rejected);
        }

        let (store, dropped) = TaskStore::restore(loaded.tasks, config.capacity);
        if dropped > 0 {
            warn!(
                "{}: dropped {dropped} tasks (duplicates or over capacity {})",
                config.file.display(),
                config.capacity
            );
        }
        Ok(Session {
            store,
            path: config.file.clone(),
            partial: partial || dropped > 0,
            unreadable: None,
        })
    }

    /// Like `open`, but an unreadable file yields an empty list. Such a
    /// session refuses to save over the file it could not read.
    pub fn open_or_empty(config: &Config) -> Self {
        Session::open(config).unwrap_or_else(|e| {
            error!("Could not load tasks: {e}");
            Session {
                store: TaskStore::new(config.capacity),
                path: config.file.clone(),
                partial: false,
                unreadable: Some(e.to_string()),
            }
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Why the file could not be read, when `close` will refuse to save.
    pub fn unreadable(&self) -> Option<&str> {
        self.unreadable.as_deref()
    }

    /// Write the store back to the file.
    pub fn close(self) -> Result<(), AppError> {
        if let Some(reason) = self.unreadable {
            return Err(AppError::Unsafe {
                path: self.path,
                reason,
            });
        }
        if self.partial && self.path.exists() {
            let copy = storage::backup(&self.path)?;
            warn!("Kept the original task file as {}", copy.display());
        }
        storage::save(&self.path, self.store.tasks()).map_err(|e| {
            error!("Failed to save tasks: {e}");
            AppError::from(e)
        })
    }
}

/// Run one of the terminal screens, then save.
pub fn cmd_ui(config: &Config, screen: Screen) -> Result<(), AppError> {
    let mut session = Session::open_or_empty(config);
    let unsaved = session.unreadable.clone();
    let launch = Launch {
        screen,
        unsaved: unsaved.as_deref(),
        mute_logs: config.log_file.is_none(),
    };
    let result = run_tui(&mut session.store, launch);
    // Save even when the terminal failed; the edits are in memory.
    session.close()?;
    result?;
    Ok(())
}

pub fn cmd_list(config: &Config, daily: bool, grouped: bool, as_json: bool) -> Result<(), AppError> {
    let session = Session::open(config)?;
    let tasks = if daily {
        session.store.daily()
    } else {
        session.store.list_all()
    };

    match (grouped, as_json) {
        (false, false) => print_table(&TableView::build(&tasks)),
        (true, false) => print_board(&BoardView::build(&tasks)),
        (false, true) => println!("{}", serde_json::to_string_pretty(&tasks)?),
        (true, true) => {
            let groups: Vec<_> = Priority::ALL
                .iter()
                .map(|p| {
                    let members: Vec<_> = tasks.iter().filter(|t| t.priority == *p).collect();
                    json!({ "priority": p, "tasks": members })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&groups)?);
        }
    }
    Ok(())
}

/// Apply a single action to the task file and report what happened.
pub fn cmd_apply(config: &Config, action: Action) -> Result<String, AppError> {
    let mut session = Session::open(config)?;
    let outcome = apply(&mut session.store, action)?;
    debug!("Writing {} tasks to {}", session.store.len(), session.path().display());
    session.close()?;
    Ok(outcome.message())
}

pub fn cmd_add(config: &Config, text: String, daily: bool) -> Result<(), AppError> {
    println!("{}", cmd_apply(config, Action::Add { text, daily })?);
    Ok(())
}

pub fn cmd_complete(config: &Config, id: u64) -> Result<(), AppError> {
    println!("{}", cmd_apply(config, Action::ToggleCompleted(TaskId(id)))?);
    Ok(())
}

pub fn cmd_priority(config: &Config, id: u64, priority: Priority) -> Result<(), AppError> {
    println!("{}", cmd_apply(config, Action::SetPriority(TaskId(id), priority))?);
    Ok(())
}

pub fn cmd_delete(config: &Config, id: u64) -> Result<(), AppError> {
    println!("{}", cmd_apply(config, Action::Remove(TaskId(id)))?);
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::fields::LoadMode;
    use std::fs;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> Config {
        Config {
            file: dir.path().join("tasks.txt"),
            ..Config::default()
        }
    }

    #[test]
    fn test_apply_round_trips_through_file() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        assert_eq!(
            cmd_apply(&config, Action::Add { text: "Buy milk".into(), daily: false }).unwrap(),
            "Added task 1"
        );
        cmd_apply(&config, Action::Add { text: "Gym".into(), daily: true }).unwrap();
        cmd_apply(&config, Action::ToggleCompleted(TaskId(1))).unwrap();
        assert_eq!(
            fs::read_to_string(&config.file).unwrap(),
            "Buy milk|1|0|0\nGym|0|1|-1\n"
        );

        cmd_apply(&config, Action::SetPriority(TaskId(2), Priority::High)).unwrap();
        assert_eq!(
            cmd_apply(&config, Action::Remove(TaskId(1))).unwrap(),
            "Deleted 'Buy milk'"
        );
        assert_eq!(fs::read_to_string(&config.file).unwrap(), "Gym|0|0|2\n");
    }

    #[test]
    fn test_rejected_action_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        fs::write(&config.file, "Gym|0|1|-1\n").unwrap();

        let err = cmd_apply(&config, Action::Add { text: "Gym".into(), daily: false }).unwrap_err();
        assert!(matches!(err, AppError::Task(TaskError::Duplicate(_))));
        let err = cmd_apply(&config, Action::Remove(TaskId(9))).unwrap_err();
        assert_eq!(err.to_string(), "no task with id 9");
        assert_eq!(fs::read_to_string(&config.file).unwrap(), "Gym|0|1|-1\n");
    }

    #[test]
    fn test_partial_load_keeps_backup() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let original = "Gym|0|1|-1\nbroken line\nStretch|0|1|-1\n";
        fs::write(&config.file, original).unwrap();

        let session = Session::open(&config).unwrap();
        assert_eq!(session.store.len(), 1);
        session.close().unwrap();

        let backup = dir.path().join("tasks.txt.bak");
        assert_eq!(fs::read_to_string(backup).unwrap(), original);
        assert_eq!(fs::read_to_string(&config.file).unwrap(), "Gym|0|1|-1\n");
    }

    #[test]
    fn test_skip_invalid_keeps_later_lines() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            load_mode: LoadMode::SkipInvalid,
            ..config(&dir)
        };
        fs::write(&config.file, "Gym|0|1|-1\nbroken line\nStretch|0|1|-1\n").unwrap();

        let session = Session::open(&config).unwrap();
        let texts: Vec<&str> = session.store.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Gym", "Stretch"]);
    }

    #[test]
    fn test_capacity_drops_extra_records() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            capacity: 2,
            ..config(&dir)
        };
        fs::write(&config.file, "a|0|0|0\nb|0|0|0\nc|0|0|0\n").unwrap();

        let mut session = Session::open(&config).unwrap();
        assert_eq!(session.store.len(), 2);
        assert_eq!(
            apply(&mut session.store, Action::Add { text: "d".into(), daily: false }),
            Err(TaskError::CapacityExceeded(2))
        );
        session.close().unwrap();
        assert!(dir.path().join("tasks.txt.bak").exists());
    }

    #[test]
    fn test_unreadable_file_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        // A directory in place of the task file cannot be read as text.
        let config = Config {
            file: dir.path().to_path_buf(),
            ..Config::default()
        };
        assert!(Session::open(&config).is_err());

        let mut session = Session::open_or_empty(&config);
        assert!(session.store.is_empty());
        assert!(session.unreadable().is_some_and(|r| r.contains("failed to access")));
        session.store.add("New", false).unwrap();
        assert!(matches!(session.close(), Err(AppError::Unsafe { .. })));
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let session = Session::open_or_empty(&config);
        assert!(session.store.is_empty());
        assert_eq!(session.unreadable(), None);
        session.close().unwrap();
        assert_eq!(fs::read_to_string(&config.file).unwrap(), "");
        assert!(!dir.path().join("tasks.txt.bak").exists());
    }
}
