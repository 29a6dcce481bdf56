//! Enumerations and field types for task management.
//!
//! This module defines the priority levels a task can carry, their on-disk codes
//! and display labels, and the policy used when a task file contains bad lines.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Priority classification for a task.
///
/// `Daily` doubles as the daily flag: a task is daily exactly when its priority
/// is `Daily`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Daily,
    Low,
    Mid,
    High,
}

impl Priority {
    /// Board groups are laid out in this order.
    pub const ALL: [Priority; 4] = [Priority::Daily, Priority::Low, Priority::Mid, Priority::High];

    /// Integer written to the task file.
    pub fn code(self) -> i8 {
        match self {
            Priority::Daily => -1,
            Priority::Low => 0,
            Priority::Mid => 1,
            Priority::High => 2,
        }
    }

    /// Parse the code as written in the task file. Only the exact spellings
    /// `-1`, `0`, `1` and `2` are accepted, so a line reads back byte for byte.
    pub fn from_code(code: &str) -> Option<Priority> {
        match code {
            "-1" => Some(Priority::Daily),
            "0" => Some(Priority::Low),
            "1" => Some(Priority::Mid),
            "2" => Some(Priority::High),
            _ => None,
        }
    }

    /// Position of this priority's group on the board.
    pub fn group_index(self) -> usize {
        match self {
            Priority::Daily => 0,
            Priority::Low => 1,
            Priority::Mid => 2,
            Priority::High => 3,
        }
    }

    pub fn is_daily(self) -> bool {
        self == Priority::Daily
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(format_priority(*self))
    }
}

/// Format a priority level for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Daily => "Daily",
        Priority::Low => "Low",
        Priority::Mid => "Mid",
        Priority::High => "High",
    }
}

/// Format the task type column ("Daily" or "One-time").
pub fn format_kind(is_daily: bool) -> &'static str {
    if is_daily {
        "Daily"
    } else {
        "One-time"
    }
}

/// Format a completion flag for display.
pub fn format_status(completed: bool) -> &'static str {
    if completed {
        "Completed"
    } else {
        "Not Completed"
    }
}

/// What to do when a line of the task file cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Keep the tasks read so far and ignore the rest of the file.
    #[default]
    StopAtFirstError,
    /// Skip the bad line, count it, and keep reading.
    SkipInvalid,
}
