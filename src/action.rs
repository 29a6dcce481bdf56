//! Typed mutations of the task store.
//!
//! UI handlers and CLI commands describe what the user asked for as an `Action`
//! and hand it to `apply`, which performs at most one store mutation.

use log::debug;

use crate::error::TaskError;
use crate::fields::Priority;
use crate::store::TaskStore;
use crate::task::TaskId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add { text: String, daily: bool },
    ToggleCompleted(TaskId),
    SetPriority(TaskId, Priority),
    Remove(TaskId),
}

/// What a successful action did, for status messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(TaskId),
    Completed { id: TaskId, completed: bool },
    Prioritized { id: TaskId, priority: Priority },
    Removed { id: TaskId, text: String },
}

impl Outcome {
    pub fn message(&self) -> String {
        match self {
            Outcome::Added(id) => format!("Added task {id}"),
            Outcome::Completed { id, completed: true } => format!("Task {id} marked as completed"),
            Outcome::Completed { id, completed: false } => format!("Task {id} marked as not completed"),
            Outcome::Prioritized { id, priority } => format!("Task {id} priority set to {priority}"),
            Outcome::Removed { text, .. } => format!("Deleted '{text}'"),
        }
    }
}

pub fn apply(store: &mut TaskStore, action: Action) -> Result<Outcome, TaskError> {
    debug!("Applying {action:?}");
    match action {
        Action::Add { text, daily } => store.add(&text, daily).map(Outcome::Added),
        Action::ToggleCompleted(id) => store
            .toggle_completed(id)
            .map(|completed| Outcome::Completed { id, completed }),
        Action::SetPriority(id, priority) => store
            .set_priority(id, priority)
            .map(|()| Outcome::Prioritized { id, priority }),
        Action::Remove(id) => store
            .remove(id)
            .map(|task| Outcome::Removed { id, text: task.text }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_sequence() {
        let mut store = TaskStore::default();
        let outcome = apply(
            &mut store,
            Action::Add {
                text: "Write report".into(),
                daily: false,
            },
        )
        .unwrap();
        let Outcome::Added(id) = outcome else {
            panic!("expected Added, got {outcome:?}");
        };

        assert_eq!(
            apply(&mut store, Action::ToggleCompleted(id)),
            Ok(Outcome::Completed { id, completed: true })
        );
        assert_eq!(
            apply(&mut store, Action::SetPriority(id, Priority::Daily)),
            Ok(Outcome::Prioritized {
                id,
                priority: Priority::Daily
            })
        );
        assert!(store.get(id).unwrap().is_daily);

        let removed = apply(&mut store, Action::Remove(id)).unwrap();
        assert_eq!(removed.message(), "Deleted 'Write report'");
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_action_leaves_store_alone() {
        let mut store = TaskStore::default();
        store.add("Gym", true).unwrap();
        let err = apply(
            &mut store,
            Action::Add {
                text: "Gym".into(),
                daily: false,
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "task 'Gym' already exists");
        assert_eq!(store.len(), 1);
        assert_eq!(
            apply(&mut store, Action::Remove(TaskId(9))),
            Err(TaskError::NotFound(TaskId(9)))
        );
    }
}
