//! Main application logic for the task table screen.
//!
//! This module contains the `App` struct which shows every task as a table row
//! (text, type, status, priority), with an entry line for new tasks, a daily
//! filter and a per-task context menu.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::action::{apply, Action, Outcome};
use crate::error::TaskError;
use crate::store::TaskStore;
use crate::task::TaskId;
use crate::tui::{
    colors::{priority_color, DARK_GREEN},
    enums::Mode,
    input::{Entry, EntryEvent},
    menu::{ContextMenu, MenuEvent},
    utils::{centered_rect, render_error_dialog, unsaved_message},
};
use crate::view::TableView;

/// State of the table screen. Borrows the store for as long as the screen runs.
pub struct App<'a> {
    store: &'a mut TaskStore,
    view: TableView,
    table_state: TableState,
    /// Where the table was last drawn, for mouse hits.
    table_area: Rect,
    daily_only: bool,
    mode: Mode,
    entry: Entry,
    status_message: String,
    /// Set when the task file could not be read; edits will not be saved.
    unsaved: Option<String>,
}

impl<'a> App<'a> {
    pub fn new(store: &'a mut TaskStore) -> Self {
        let mut app = App {
            store,
            view: TableView::default(),
            table_state: TableState::default(),
            table_area: Rect::default(),
            daily_only: false,
            mode: Mode::Browse,
            entry: Entry::default(),
            status_message: String::new(),
            unsaved: None,
        };
        app.rebuild();
        app
    }

    /// Open with a warning that nothing from this session will be saved.
    pub fn with_unsaved_warning(mut self, reason: Option<&str>) -> Self {
        if let Some(reason) = reason {
            self.mode = Mode::Error(unsaved_message(reason));
            self.unsaved = Some(reason.to_string());
        }
        self
    }

    /// Rebuild the table from the store, keeping the selected task if it is
    /// still shown.
    fn rebuild(&mut self) {
        let old_selected = self.selected_id();
        let snapshot = if self.daily_only {
            self.store.daily()
        } else {
            self.store.list_all()
        };
        self.view = TableView::build(&snapshot);

        let ids = self.view.ids();
        let restored = old_selected.and_then(|id| ids.iter().position(|&i| i == id));
        let selected = match (restored, self.table_state.selected()) {
            _ if ids.is_empty() => None,
            (Some(idx), _) => Some(idx),
            (None, Some(idx)) => Some(idx.min(ids.len() - 1)),
            (None, None) => Some(0),
        };
        self.table_state.select(selected);
    }

    fn select_id(&mut self, id: TaskId) {
        if let Some(idx) = self.view.ids().iter().position(|&i| i == id) {
            self.table_state.select(Some(idx));
        }
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.table_state
            .selected()
            .and_then(|idx| self.view.rows.get(idx))
            .map(|r| r.id)
    }

    /// Apply one action to the store, then rebuild the table once.
    ///
    /// Blank entries are dropped without a message.
    fn dispatch(&mut self, action: Action) {
        match apply(self.store, action) {
            Ok(outcome) => {
                self.status_message = outcome.message();
                self.rebuild();
                if let Outcome::Added(id) = outcome {
                    self.select_id(id);
                }
            }
            Err(TaskError::Empty) => {}
            Err(e) => self.status_message = format!("Error: {e}"),
        }
    }

    fn toggle_daily_filter(&mut self) {
        self.daily_only = !self.daily_only;
        self.rebuild();
        self.status_message = if self.daily_only {
            "Showing daily tasks only".to_string()
        } else {
            "Showing all tasks".to_string()
        };
    }

    fn open_menu(&mut self) {
        match self.selected_id().and_then(|id| self.store.get(id)) {
            Some(task) => self.mode = Mode::Menu(ContextMenu::for_table(task)),
            None => self.status_message = "No task selected".to_string(),
        }
    }

    /// Index of the row drawn at a screen position.
    fn row_at(&self, x: u16, y: u16) -> Option<usize> {
        let area = self.table_area;
        // Top border and column header sit above the first row.
        let first = area.y.saturating_add(2);
        if x <= area.x || x.saturating_add(1) >= area.right() || y < first || y.saturating_add(1) >= area.bottom() {
            return None;
        }
        let idx = self.table_state.offset() + (y - first) as usize;
        (idx < self.view.rows.len()).then_some(idx)
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.view.rows.len();
        if len == 0 {
            return;
        }
        let idx = match self.table_state.selected() {
            Some(i) if down => (i + 1).min(len - 1),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.table_state.select(Some(idx));
    }

    /// Handle one terminal event. Returns true if the application should quit.
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if self.mode.is_browse() {
                    self.status_message.clear();
                }
                match std::mem::replace(&mut self.mode, Mode::Browse) {
                    Mode::Browse => return self.handle_browse_key(key.code, key.modifiers),
                    Mode::Entry => self.handle_entry_key(key.code, key.modifiers),
                    Mode::Menu(menu) => self.handle_menu_key(menu, key.code),
                    Mode::Help | Mode::Error(_) => {}
                }
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Right) => {
                if self.mode.is_browse() {
                    if let Some(idx) = self.row_at(mouse.column, mouse.row) {
                        self.table_state.select(Some(idx));
                        self.open_menu();
                    }
                }
            }
            _ => {}
        }
        false
    }

    fn handle_browse_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Char('q') | KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Char('a') | KeyCode::Char('i') => self.mode = Mode::Entry,
            KeyCode::Char('d') => self.toggle_daily_filter(),
            KeyCode::Char(' ') | KeyCode::Char('c') => {
                if let Some(id) = self.selected_id() {
                    self.dispatch(Action::ToggleCompleted(id));
                }
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.dispatch(Action::Remove(id));
                }
            }
            KeyCode::Enter | KeyCode::Char('m') => self.open_menu(),
            KeyCode::Char('h') | KeyCode::Char('?') => self.mode = Mode::Help,
            _ => {}
        }
        false
    }

    fn handle_entry_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match self.entry.handle_key(key, modifiers) {
            EntryEvent::Editing => self.mode = Mode::Entry,
            EntryEvent::Cancel => {}
            EntryEvent::Submit { text, daily } => self.dispatch(Action::Add { text, daily }),
        }
    }

    fn handle_menu_key(&mut self, mut menu: ContextMenu, key: KeyCode) {
        match menu.handle_key(key) {
            MenuEvent::Open => self.mode = Mode::Menu(menu),
            MenuEvent::Chosen(action) => self.dispatch(action),
            MenuEvent::Closed => {}
        }
    }

    /// Poll for and handle one terminal event.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            return Ok(self.handle_event(event::read()?));
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let filter = if self.daily_only {
            Span::styled(
                "[Daily only]",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("[All tasks]", Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC))
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled("TO-DO LIST", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            filter,
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_table(&mut self, f: &mut Frame, area: Rect) {
        let header = Row::new(
            ["Task", "Type", "Status", "Priority"]
                .iter()
                .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD))),
        )
        .style(Style::default().bg(DARK_GREEN).fg(Color::White))
        .height(1);

        let rows: Vec<Row> = self
            .view
            .rows
            .iter()
            .map(|row| {
                let style = if row.completed {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::White)
                };
                Row::new(vec![
                    Cell::from(row.text.as_str()),
                    Cell::from(row.kind),
                    Cell::from(row.status),
                    Cell::from(row.priority).style(Style::default().fg(priority_color(row.level))),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Min(25),    // Task
            Constraint::Length(9),  // Type
            Constraint::Length(14), // Status
            Constraint::Length(9),  // Priority
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}) - Press 'h' for help",
                self.view.rows.len(),
                self.store.len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.table_state);
        self.table_area = area;
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 70, area);
        let lines = vec![
            Line::from(Span::styled("Keys", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("Up/Down, j/k    Move selection"),
            Line::from("a               Add a task (Tab toggles Daily)"),
            Line::from("Space, c        Mark complete / incomplete"),
            Line::from("Enter, m        Task menu (also right-click)"),
            Line::from("x, Delete       Delete task"),
            Line::from("d               Show daily tasks only / all"),
            Line::from("h, ?            This help"),
            Line::from("q, Esc          Quit and save"),
            Line::from(""),
            Line::from("Press any key to return"),
        ];
        let help = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: false })
            .style(Style::default().bg(Color::Black));
        f.render_widget(Clear, area);
        f.render_widget(help, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if let Some(reason) = &self.unsaved {
            format!("NOT SAVING: {reason}")
        } else {
            match self.mode {
                Mode::Entry => "Type the task, Enter to add, Esc to cancel".to_string(),
                Mode::Menu(_) => "Enter to choose, Esc to close".to_string(),
                _ => format!(
                    "Tasks: {}/{} | a: Add | d: Daily | Enter: Menu | h: Help",
                    self.store.len(),
                    self.store.capacity()
                ),
            }
        };
        let bg = if self.unsaved.is_some() { Color::Red } else { DARK_GREEN };
        let status = Paragraph::new(text)
            .style(Style::default().bg(bg).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Draw the whole screen from the current table.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Entry
                Constraint::Min(0),    // Table
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.entry.render(f, chunks[1], matches!(self.mode, Mode::Entry));
        self.render_table(f, chunks[2]);
        self.render_status_bar(f, chunks[3]);

        if let Mode::Menu(menu) = &mut self.mode {
            menu.render(f, chunks[2]);
        } else if let Mode::Error(message) = &self.mode {
            render_error_dialog(f, chunks[2], "Error", message);
        } else if matches!(self.mode, Mode::Help) {
            self.render_help(f, chunks[2]);
        }
    }

    /// Main event loop for the table screen.
    ///
    /// Handles rendering and input processing until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;
    use crossterm::event::{KeyEvent, MouseEvent};
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_line(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_event(key(KeyCode::Char(c)));
        }
    }

    fn right_click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_add_through_entry_line() {
        let mut store = TaskStore::default();
        {
            let mut app = App::new(&mut store);
            app.handle_event(key(KeyCode::Char('a')));
            type_line(&mut app, "Gym");
            app.handle_event(key(KeyCode::Tab));
            app.handle_event(key(KeyCode::Enter));
            assert!(app.mode.is_browse());
            let text = screen(&mut app);
            assert!(text.contains("Gym"));
            assert!(text.contains("Daily"));
            assert!(text.contains("Not Completed"));
        }
        assert_eq!(store.len(), 1);
        assert!(store.tasks()[0].is_daily);
    }

    #[test]
    fn test_blank_entry_is_ignored_silently() {
        let mut store = TaskStore::default();
        let mut app = App::new(&mut store);
        app.handle_event(key(KeyCode::Char('a')));
        type_line(&mut app, "  ");
        app.handle_event(key(KeyCode::Enter));
        assert!(app.status_message.is_empty());
        assert!(app.view.rows.is_empty());
    }

    #[test]
    fn test_duplicate_shows_in_status_bar() {
        let mut store = TaskStore::default();
        store.add("Read", false).unwrap();
        let mut app = App::new(&mut store);
        app.handle_event(key(KeyCode::Char('a')));
        type_line(&mut app, "Read");
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.status_message, "Error: task 'Read' already exists");
        assert_eq!(app.view.rows.len(), 1);
    }

    #[test]
    fn test_toggle_and_daily_filter() {
        let mut store = TaskStore::default();
        store.add("Buy milk", false).unwrap();
        store.add("Gym", true).unwrap();
        let mut app = App::new(&mut store);

        app.handle_event(key(KeyCode::Char(' ')));
        assert_eq!(app.view.rows[0].status, "Completed");

        app.handle_event(key(KeyCode::Char('d')));
        let shown: Vec<&str> = app.view.rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(shown, vec!["Gym"]);

        app.handle_event(key(KeyCode::Char('d')));
        assert_eq!(app.view.rows.len(), 2);
    }

    #[test]
    fn test_menu_sets_priority() {
        let mut store = TaskStore::default();
        let id = store.add("Buy milk", false).unwrap();
        {
            let mut app = App::new(&mut store);
            app.handle_event(key(KeyCode::Char('m')));
            assert!(matches!(app.mode, Mode::Menu(_)));
            assert!(screen(&mut app).contains("Set Priority: High"));
            // Delete, Mark Complete, Low, Mid, High
            for _ in 0..4 {
                app.handle_event(key(KeyCode::Down));
            }
            app.handle_event(key(KeyCode::Enter));
            assert!(app.mode.is_browse());
            assert_eq!(app.view.rows[0].priority, "High");
        }
        assert_eq!(store.get(id).unwrap().priority, Priority::High);
    }

    #[test]
    fn test_right_click_opens_menu_and_delete_keeps_order() {
        let mut store = TaskStore::default();
        store.add("a", false).unwrap();
        store.add("b", false).unwrap();
        store.add("c", false).unwrap();
        let mut app = App::new(&mut store);
        screen(&mut app);
        // Rows start below the header, entry line, border and column titles.
        app.handle_event(right_click(5, 9));
        assert!(matches!(&app.mode, Mode::Menu(m) if m.task_id == TaskId(2)));
        app.handle_event(key(KeyCode::Enter));
        let shown: Vec<&str> = app.view.rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(shown, vec!["a", "c"]);
        assert_eq!(app.selected_id().map(|id| id.0), Some(3));
    }

    #[test]
    fn test_quit_keys() {
        let mut store = TaskStore::default();
        let mut app = App::new(&mut store);
        assert!(!app.handle_event(key(KeyCode::Char('h'))));
        assert!(!app.handle_event(key(KeyCode::Char('q'))));
        assert!(app.handle_event(key(KeyCode::Char('q'))));
    }

    #[test]
    fn test_right_click_outside_rows_does_nothing() {
        let mut store = TaskStore::default();
        store.add("a", false).unwrap();
        let mut app = App::new(&mut store);
        // Nothing is drawn yet, so no row can be hit.
        app.handle_event(right_click(5, 8));
        assert!(app.mode.is_browse());

        screen(&mut app);
        app.handle_event(right_click(5, 12));
        assert!(app.mode.is_browse());
        app.handle_event(right_click(5, 8));
        assert!(matches!(&app.mode, Mode::Menu(m) if m.task_id == TaskId(1)));
    }

    #[test]
    fn test_unreadable_file_warning_stays_visible() {
        let mut store = TaskStore::default();
        let mut app = App::new(&mut store).with_unsaved_warning(Some("unreadable"));
        let text = screen(&mut app);
        assert!(text.contains("will not be saved"));

        app.handle_event(key(KeyCode::Char('z')));
        assert!(app.mode.is_browse());
        let text = screen(&mut app);
        assert!(!text.contains("will not be saved"));
        assert!(text.contains("NOT SAVING: unreadable"));
    }

    #[test]
    fn test_no_warning_for_readable_file() {
        let mut store = TaskStore::default();
        let mut app = App::new(&mut store).with_unsaved_warning(None);
        assert!(app.mode.is_browse());
        assert!(!screen(&mut app).contains("NOT SAVING"));
    }
}
