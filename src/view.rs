//! Display projections of the task store.
//!
//! Both the table and the board are rebuilt from a fresh snapshot after every
//! change. The terminal UI and the CLI printers consume these projections and
//! never read task fields directly.

use serde::Serialize;

use crate::fields::{format_kind, format_priority, format_status, Priority};
use crate::task::{Task, TaskId};

/// Task text beyond this many characters is cut off when displayed.
pub const MAX_TEXT_DISPLAY: usize = 255;

/// One row of the flat task table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub id: TaskId,
    pub text: String,
    pub kind: &'static str,
    pub status: &'static str,
    pub priority: &'static str,
    #[serde(skip)]
    pub level: Priority,
    #[serde(skip)]
    pub completed: bool,
}

/// The flat table: one row per task, in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableView {
    pub rows: Vec<TableRow>,
}

impl TableView {
    pub fn build(snapshot: &[&Task]) -> Self {
        let rows = snapshot
            .iter()
            .map(|t| TableRow {
                id: t.id,
                text: truncate(&t.text, MAX_TEXT_DISPLAY),
                kind: format_kind(t.is_daily),
                status: format_status(t.completed),
                priority: format_priority(t.priority),
                level: t.priority,
                completed: t.completed,
            })
            .collect();
        TableView { rows }
    }

    /// Ids of the rows, in display order.
    pub fn ids(&self) -> Vec<TaskId> {
        self.rows.iter().map(|r| r.id).collect()
    }
}

/// A task as shown on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub priority: Priority,
    pub cards: Vec<Card>,
}

/// The priority board: Daily, Low, Mid and High groups, always all four.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub groups: [Group; 4],
}

impl BoardView {
    pub fn build(snapshot: &[&Task]) -> Self {
        let mut groups = Priority::ALL.map(|priority| Group {
            priority,
            cards: Vec::new(),
        });
        for task in snapshot {
            groups[task.priority.group_index()].cards.push(Card {
                id: task.id,
                text: truncate(&task.text, MAX_TEXT_DISPLAY),
                completed: task.completed,
            });
        }
        BoardView { groups }
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.cards.len()).sum()
    }
}

/// Print the table with a header, for the CLI.
pub fn print_table(view: &TableView) {
    println!(
        "{:<5} {:<9} {:<14} {:<9} {}",
        "ID", "Type", "Status", "Priority", "Task"
    );
    for row in &view.rows {
        println!(
            "{:<5} {:<9} {:<14} {:<9} {}",
            row.id, row.kind, row.status, row.priority, row.text
        );
    }
}

/// Print the board as one section per priority, for the CLI.
pub fn print_board(view: &BoardView) {
    for group in &view.groups {
        println!("{} ({})", format_priority(group.priority), group.cards.len());
        for card in &group.cards {
            let mark = if card.completed { 'x' } else { ' ' };
            println!("  [{mark}] {:<5} {}", card.id, card.text);
        }
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
