//! In-memory task store.
//!
//! `TaskStore` owns the ordered list of tasks for the lifetime of the app. Every
//! mutation is synchronous and either succeeds completely or leaves the store
//! untouched.

use log::debug;

use crate::error::TaskError;
use crate::fields::Priority;
use crate::task::{Task, TaskId};

/// Number of tasks a store accepts unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 100;

/// Ordered, capacity-bounded collection of tasks.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    capacity: usize,
    next_id: u64,
}

impl Default for TaskStore {
    fn default() -> Self {
        TaskStore::new(DEFAULT_CAPACITY)
    }
}

impl TaskStore {
    pub fn new(capacity: usize) -> Self {
        TaskStore {
            tasks: Vec::new(),
            capacity,
            next_id: 1,
        }
    }

    /// Build a store from records read off disk.
    ///
    /// Ids are reassigned 1..n in the given order. Records past `capacity` and
    /// records repeating an earlier text are dropped; the number dropped is
    /// returned alongside the store.
    pub fn restore(records: Vec<Task>, capacity: usize) -> (Self, usize) {
        let mut store = TaskStore::new(capacity);
        let mut dropped = 0;
        for mut task in records {
            if store.is_full() || store.contains_text(&task.text) {
                dropped += 1;
                continue;
            }
            task.id = store.allocate_id();
            store.tasks.push(task);
        }
        debug!("Restored {} tasks, dropped {dropped}", store.tasks.len());
        (store, dropped)
    }

    /// Append a new incomplete task and return its id.
    pub fn add(&mut self, text: &str, is_daily: bool) -> Result<TaskId, TaskError> {
        if text.trim().is_empty() {
            return Err(TaskError::Empty);
        }
        if text.contains(|c| c == '\n' || c == '\r') {
            return Err(TaskError::MultiLine);
        }
        if self.contains_text(text) {
            return Err(TaskError::Duplicate(text.to_string()));
        }
        if self.is_full() {
            return Err(TaskError::CapacityExceeded(self.capacity));
        }
        let id = self.allocate_id();
        self.tasks.push(Task::new(id, text, is_daily));
        debug!("Added task {id}: {text:?} (daily: {is_daily})");
        Ok(id)
    }

    /// Flip the completion flag and return its new value.
    pub fn toggle_completed(&mut self, id: TaskId) -> Result<bool, TaskError> {
        let task = self.get_mut(id).ok_or(TaskError::NotFound(id))?;
        Ok(task.toggle_completed())
    }

    /// Set the priority; the daily flag follows it.
    pub fn set_priority(&mut self, id: TaskId, priority: Priority) -> Result<(), TaskError> {
        let task = self.get_mut(id).ok_or(TaskError::NotFound(id))?;
        task.set_priority(priority);
        Ok(())
    }

    /// Remove a task. Remaining tasks keep their relative order.
    pub fn remove(&mut self, id: TaskId) -> Result<Task, TaskError> {
        let idx = self.position(id).ok_or(TaskError::NotFound(id))?;
        let task = self.tasks.remove(idx);
        debug!("Removed task {id}: {:?}", task.text);
        Ok(task)
    }

    /// Get a task by ID.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Current storage position of a task.
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Snapshot of every task in store order.
    pub fn list_all(&self) -> Vec<&Task> {
        self.tasks.iter().collect()
    }

    /// Tasks matching `predicate`, in store order.
    pub fn list_filtered<F>(&self, predicate: F) -> Vec<&Task>
    where
        F: Fn(&Task) -> bool,
    {
        self.tasks.iter().filter(|t| predicate(t)).collect()
    }

    /// Only the tasks flagged daily.
    pub fn daily(&self) -> Vec<&Task> {
        self.list_filtered(|t| t.is_daily)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.tasks.len() >= self.capacity
    }

    fn contains_text(&self, text: &str) -> bool {
        self.tasks.iter().any(|t| t.text == text)
    }

    fn allocate_id(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }
}
