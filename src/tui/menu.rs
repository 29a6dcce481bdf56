//! Per-task context menu.
//!
//! Opened from either screen for the selected task. Choosing an entry yields an
//! `Action` bound to that task's id; the screen applies it and rebuilds.

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};

use crate::action::Action;
use crate::fields::Priority;
use crate::task::{Task, TaskId};
use crate::tui::utils::centered_box;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Delete,
    ToggleCompleted,
    SetPriority(Priority),
}

impl MenuItem {
    fn label(self, completed: bool) -> String {
        match self {
            MenuItem::Delete => "Delete Task".to_string(),
            MenuItem::ToggleCompleted if completed => "Mark Incomplete".to_string(),
            MenuItem::ToggleCompleted => "Mark Complete".to_string(),
            MenuItem::SetPriority(p) => format!("Set Priority: {p}"),
        }
    }

    fn action(self, id: TaskId) -> Action {
        match self {
            MenuItem::Delete => Action::Remove(id),
            MenuItem::ToggleCompleted => Action::ToggleCompleted(id),
            MenuItem::SetPriority(p) => Action::SetPriority(id, p),
        }
    }
}

/// Result of feeding a key to an open menu.
#[derive(Debug, PartialEq, Eq)]
pub enum MenuEvent {
    Open,
    Chosen(Action),
    Closed,
}

#[derive(Clone, Debug)]
pub struct ContextMenu {
    pub task_id: TaskId,
    title: String,
    completed: bool,
    items: Vec<MenuItem>,
    state: ListState,
}

impl ContextMenu {
    fn new(task: &Task, items: Vec<MenuItem>) -> Self {
        let mut state = ListState::default();
        state.select(Some(0));
        ContextMenu {
            task_id: task.id,
            title: task.text.clone(),
            completed: task.completed,
            items,
            state,
        }
    }

    /// Menu of the table screen: delete, completion and every priority.
    pub fn for_table(task: &Task) -> Self {
        let mut items = vec![MenuItem::Delete, MenuItem::ToggleCompleted];
        items.extend(
            [Priority::Low, Priority::Mid, Priority::High, Priority::Daily]
                .into_iter()
                .map(MenuItem::SetPriority),
        );
        Self::new(task, items)
    }

    /// Menu of a board card: delete and completion.
    pub fn for_board(task: &Task) -> Self {
        Self::new(task, vec![MenuItem::Delete, MenuItem::ToggleCompleted])
    }

    pub fn labels(&self) -> Vec<String> {
        self.items.iter().map(|i| i.label(self.completed)).collect()
    }

    pub fn selected(&self) -> Option<MenuItem> {
        self.state.selected().and_then(|i| self.items.get(i)).copied()
    }

    fn next(&mut self) {
        let i = self.state.selected().map_or(0, |i| (i + 1) % self.items.len());
        self.state.select(Some(i));
    }

    fn previous(&mut self) {
        let i = self
            .state
            .selected()
            .map_or(0, |i| (i + self.items.len() - 1) % self.items.len());
        self.state.select(Some(i));
    }

    pub fn handle_key(&mut self, key: KeyCode) -> MenuEvent {
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                return match self.selected() {
                    Some(item) => MenuEvent::Chosen(item.action(self.task_id)),
                    None => MenuEvent::Closed,
                };
            }
            KeyCode::Esc | KeyCode::Char('q') => return MenuEvent::Closed,
            _ => {}
        }
        MenuEvent::Open
    }

    /// Draw the menu as a popup over `area`.
    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let labels = self.labels();
        let width = labels
            .iter()
            .map(|l| l.chars().count())
            .chain(std::iter::once(self.title.chars().count().min(40)))
            .max()
            .unwrap_or(0) as u16
            + 6;
        let height = labels.len() as u16 + 2;
        let popup = centered_box(width, height, area);

        let items: Vec<ListItem> = labels
            .into_iter()
            .map(|l| ListItem::new(Line::from(l)))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(self.title.as_str())
                    .border_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            )
            .style(Style::default().bg(Color::Black))
            .highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol("► ");

        f.render_widget(Clear, popup);
        f.render_stateful_widget(list, popup, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(completed: bool) -> Task {
        let mut t = Task::new(TaskId(7), "Gym", true);
        t.completed = completed;
        t
    }

    #[test]
    fn test_table_menu_entries() {
        let menu = ContextMenu::for_table(&task(false));
        assert_eq!(
            menu.labels(),
            vec![
                "Delete Task",
                "Mark Complete",
                "Set Priority: Low",
                "Set Priority: Mid",
                "Set Priority: High",
                "Set Priority: Daily",
            ]
        );
    }

    #[test]
    fn test_board_menu_offers_undo() {
        let menu = ContextMenu::for_board(&task(true));
        assert_eq!(menu.labels(), vec!["Delete Task", "Mark Incomplete"]);
    }

    #[test]
    fn test_choose_binds_task_id() {
        let mut menu = ContextMenu::for_table(&task(false));
        assert_eq!(menu.handle_key(KeyCode::Enter), MenuEvent::Chosen(Action::Remove(TaskId(7))));

        menu.handle_key(KeyCode::Down);
        menu.handle_key(KeyCode::Down);
        menu.handle_key(KeyCode::Down);
        assert_eq!(
            menu.handle_key(KeyCode::Enter),
            MenuEvent::Chosen(Action::SetPriority(TaskId(7), Priority::Mid))
        );
    }

    #[test]
    fn test_navigation_wraps() {
        let mut menu = ContextMenu::for_board(&task(false));
        assert_eq!(menu.handle_key(KeyCode::Up), MenuEvent::Open);
        assert_eq!(menu.selected(), Some(MenuItem::ToggleCompleted));
        menu.handle_key(KeyCode::Down);
        assert_eq!(menu.selected(), Some(MenuItem::Delete));
        assert_eq!(menu.handle_key(KeyCode::Esc), MenuEvent::Closed);
    }
}
