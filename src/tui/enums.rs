//! Enumerations for TUI state management.

use crate::tui::menu::ContextMenu;

/// Which of the two task screens to open.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    /// Flat table of all tasks.
    Table,
    /// Cards grouped into Daily, Low, Mid and High columns.
    Board,
}

/// What the keyboard is currently driving.
#[derive(Clone, Debug)]
pub enum Mode {
    Browse,
    /// Typing a new task into the entry line.
    Entry,
    /// A context menu is open for one task.
    Menu(ContextMenu),
    Help,
    /// A modal error is shown until any key is pressed.
    Error(String),
}

impl Mode {
    pub fn is_browse(&self) -> bool {
        matches!(self, Mode::Browse)
    }
}
