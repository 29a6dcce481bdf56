//! Task data structure and related functionality.
//!
//! This module defines the `Task` record held by the task store and the stable
//! identifier handed out when a task is created.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fields::Priority;

/// Stable identifier assigned when a task enters a store. Never reused while
/// that store lives, and unaffected by deleting other tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single to-do item.
///
/// `is_daily` mirrors `priority == Priority::Daily`; go through `set_priority`
/// to keep the two in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub is_daily: bool,
    pub priority: Priority,
}

impl Task {
    /// A fresh, incomplete task. Daily tasks start with the Daily priority,
    /// everything else with Low.
    pub fn new(id: TaskId, text: impl Into<String>, is_daily: bool) -> Self {
        let priority = if is_daily { Priority::Daily } else { Priority::Low };
        Task {
            id,
            text: text.into(),
            completed: false,
            is_daily,
            priority,
        }
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
        self.is_daily = priority.is_daily();
    }

    pub fn toggle_completed(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }
}
