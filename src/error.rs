//! Error types for task store mutations and task file access.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::task::TaskId;

/// Why a task store operation was rejected. A rejected operation leaves the
/// store unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("task text is empty")]
    Empty,

    #[error("task '{0}' already exists")]
    Duplicate(String),

    #[error("task text must fit on a single line")]
    MultiLine,

    #[error("task list is full ({0} tasks)")]
    CapacityExceeded(usize),

    #[error("no task with id {0}")]
    NotFound(TaskId),
}

/// Failures while reading or writing the task file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Anything a command can fail with. Printed as `Error: ...` by `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("refusing to overwrite {}: {reason}", path.display())]
    Unsafe { path: PathBuf, reason: String },
}
