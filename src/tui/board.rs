//! Priority board interface.
//!
//! This module implements a board view where tasks are organized into four
//! columns (Daily, Low, Mid, High) by priority. Each card can be completed or
//! deleted in place; adding a duplicate or overfilling the list opens an error
//! dialog.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::action::{apply, Action, Outcome};
use crate::error::TaskError;
use crate::fields::{format_priority, Priority};
use crate::store::TaskStore;
use crate::task::TaskId;
use crate::tui::{
    colors::{priority_color, text_on},
    enums::Mode,
    input::{Entry, EntryEvent},
    menu::{ContextMenu, MenuEvent},
    utils::{centered_rect, render_error_dialog, unsaved_message},
};
use crate::view::{BoardView, Card};

const CARD_HEIGHT: usize = 4;

/// State of the board screen. Borrows the store for as long as the screen runs.
pub struct BoardApp<'a> {
    store: &'a mut TaskStore,
    board: BoardView,
    selected_column: usize,
    selected_card: usize,
    column_scroll_offsets: [usize; 4],
    /// Card area of each column as last drawn, for mouse hits.
    column_areas: [Rect; 4],
    mode: Mode,
    entry: Entry,
    status_message: String,
    /// Set when the task file could not be read; edits will not be saved.
    unsaved: Option<String>,
}

impl<'a> BoardApp<'a> {
    pub fn new(store: &'a mut TaskStore) -> Self {
        let board = BoardView::build(&store.list_all());
        let mut app = BoardApp {
            store,
            board,
            selected_column: 0,
            selected_card: 0,
            column_scroll_offsets: [0; 4],
            column_areas: [Rect::default(); 4],
            mode: Mode::Browse,
            entry: Entry::default(),
            status_message: String::new(),
            unsaved: None,
        };
        app.clamp_selection();
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

    /// Rebuild every column from the store.
    fn rebuild(&mut self) {
        self.board = BoardView::build(&self.store.list_all());
        self.clamp_selection();
    }

    /// Ensure selected column and card indices are valid
    fn clamp_selection(&mut self) {
        let column_len = self.board.groups[self.selected_column].cards.len();
        if column_len == 0 {
            self.selected_card = 0;
            self.column_scroll_offsets[self.selected_column] = 0;
        } else if self.selected_card >= column_len {
            self.selected_card = column_len - 1;
        }
    }

    fn selected(&self) -> Option<&Card> {
        self.board.groups[self.selected_column]
            .cards
            .get(self.selected_card)
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.selected().map(|c| c.id)
    }

    /// Move the selection onto a task wherever it now sits.
    fn select_id(&mut self, id: TaskId) {
        for (col, group) in self.board.groups.iter().enumerate() {
            if let Some(idx) = group.cards.iter().position(|c| c.id == id) {
                self.selected_column = col;
                self.selected_card = idx;
                return;
            }
        }
    }

    /// Apply one action to the store, then rebuild the board once.
    ///
    /// Blank entries are dropped; any other rejection opens the error dialog.
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
            Err(TaskError::Duplicate(text)) => {
                self.mode = Mode::Error(format!("Task '{text}' already exists."));
            }
            Err(e) => self.mode = Mode::Error(format!("{}.", capitalize(&e.to_string()))),
        }
    }

    fn open_menu(&mut self) {
        match self.selected_id().and_then(|id| self.store.get(id)) {
            Some(task) => self.mode = Mode::Menu(ContextMenu::for_board(task)),
            None => self.status_message = "No task selected".to_string(),
        }
    }

    /// Column and card index of the card drawn at a screen position.
    fn card_at(&self, x: u16, y: u16) -> Option<(usize, usize)> {
        let column = self
            .column_areas
            .iter()
            .position(|r| x >= r.x && x < r.right() && y >= r.y && y < r.bottom())?;
        let card = self.column_scroll_offsets[column] + (y - self.column_areas[column].y) as usize / CARD_HEIGHT;
        (card < self.board.groups[column].cards.len()).then_some((column, card))
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
                    Mode::Entry => match self.entry.handle_key(key.code, key.modifiers) {
                        EntryEvent::Editing => self.mode = Mode::Entry,
                        EntryEvent::Cancel => {}
                        EntryEvent::Submit { text, daily } => self.dispatch(Action::Add { text, daily }),
                    },
                    Mode::Menu(mut menu) => match menu.handle_key(key.code) {
                        MenuEvent::Open => self.mode = Mode::Menu(menu),
                        MenuEvent::Chosen(action) => self.dispatch(action),
                        MenuEvent::Closed => {}
                    },
                    // Any key dismisses help and error dialogs.
                    Mode::Help | Mode::Error(_) => {}
                }
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Right) => {
                if self.mode.is_browse() {
                    if let Some((column, card)) = self.card_at(mouse.column, mouse.row) {
                        self.selected_column = column;
                        self.selected_card = card;
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
            KeyCode::Left | KeyCode::Char('h') => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.selected_column < self.board.groups.len() - 1 {
                    self.selected_column += 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_card = self.selected_card.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let column_len = self.board.groups[self.selected_column].cards.len();
                if column_len > 0 && self.selected_card < column_len - 1 {
                    self.selected_card += 1;
                }
            }
            KeyCode::Char('a') | KeyCode::Char('i') => self.mode = Mode::Entry,
            KeyCode::Char('c') | KeyCode::Char(' ') => {
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
            KeyCode::Char('?') => self.mode = Mode::Help,
            _ => {}
        }
        false
    }

    /// Poll for and handle one terminal event.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            return Ok(self.handle_event(event::read()?));
        }
        Ok(false)
    }

    /// Draw the whole screen from the current board.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Entry
                Constraint::Min(0),    // Board
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.entry.render(f, chunks[1], matches!(self.mode, Mode::Entry));
        self.render_board(f, chunks[2]);
        self.render_status_bar(f, chunks[3]);

        if let Mode::Menu(menu) = &mut self.mode {
            menu.render(f, chunks[2]);
        } else if let Mode::Error(message) = &self.mode {
            render_error_dialog(f, chunks[2], "Error", message);
        } else if matches!(self.mode, Mode::Help) {
            render_help(f, chunks[2]);
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let done = self.store.list_filtered(|t| t.completed).len();
        let header = Paragraph::new(Line::from(vec![
            Span::styled("TO-DO BOARD", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("{} tasks, {done} completed", self.store.len()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_board(&mut self, f: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        for (i, &column_area) in columns.iter().enumerate() {
            self.render_column(f, column_area, i);
        }
    }

    fn render_column(&mut self, f: &mut Frame, area: Rect, column_index: usize) {
        let is_selected = column_index == self.selected_column;
        let priority = self.board.groups[column_index].priority;
        let color = priority_color(priority);

        let border_style = if is_selected {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(
                "{} ({})",
                format_priority(priority),
                self.board.groups[column_index].cards.len()
            ))
            .border_style(border_style);
        let inner = block.inner(area);
        f.render_widget(block, area);
        self.column_areas[column_index] = inner;

        let cards = &self.board.groups[column_index].cards;
        if cards.is_empty() {
            self.column_scroll_offsets[column_index] = 0;
            return;
        }

        let visible_cards = (inner.height as usize / CARD_HEIGHT).max(1);
        let mut offset = self.column_scroll_offsets[column_index].min(cards.len() - 1);
        if is_selected {
            if self.selected_card < offset {
                offset = self.selected_card;
            } else if self.selected_card >= offset + visible_cards {
                offset = self.selected_card + 1 - visible_cards;
            }
        }
        self.column_scroll_offsets[column_index] = offset;

        let cards = &self.board.groups[column_index].cards;
        let mut y = 0;
        for (card_index, card) in cards.iter().enumerate().skip(offset) {
            if y + CARD_HEIGHT > inner.height as usize {
                break;
            }
            let card_area = Rect {
                x: inner.x,
                y: inner.y + y as u16,
                width: inner.width,
                height: CARD_HEIGHT as u16,
            };
            let highlighted = is_selected && card_index == self.selected_card;
            render_card(f, card_area, card, priority, highlighted);
            y += CARD_HEIGHT;
        }

        let shown = (y / CARD_HEIGHT).min(cards.len() - offset);
        let remaining = cards.len() - offset - shown;
        if remaining > 0 && inner.height > 0 {
            let more = Paragraph::new(format!("▼ +{remaining} below")).style(Style::default().fg(Color::Cyan));
            f.render_widget(
                more,
                Rect {
                    x: inner.x,
                    y: inner.y + inner.height - 1,
                    width: inner.width,
                    height: 1,
                },
            );
        }
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if let Some(reason) = &self.unsaved {
            format!("NOT SAVING: {reason}")
        } else {
            match self.mode {
                Mode::Entry => "Type the task, Tab for daily, Enter to add, Esc to cancel".to_string(),
                _ => "a: Add | c: Complete | x: Delete | Enter: Menu | ?: Help | q: Quit".to_string(),
            }
        };
        let bg = if self.unsaved.is_some() {
            Color::Red
        } else {
            priority_color(Priority::ALL[self.selected_column])
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(bg).fg(text_on(bg)))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main event loop for the board screen.
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

/// Render a single task card
fn render_card(f: &mut Frame, area: Rect, card: &Card, priority: Priority, highlighted: bool) {
    let color = priority_color(priority);
    let style = if highlighted {
        Style::default().bg(color).fg(text_on(color)).add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(Color::DarkGray)
    };
    let text_style = if card.completed {
        Style::default().add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };
    let mark = if card.completed { "[x]" } else { "[ ]" };
    let lines = vec![
        Line::from(Span::styled(card.text.as_str(), text_style)),
        Line::from(format!("{mark} #{}", card.id)),
    ];
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .style(style)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let area = centered_rect(60, 70, area);
    let lines = vec![
        Line::from(Span::styled("Keys", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("Left/Right      Select priority column"),
        Line::from("Up/Down         Select card"),
        Line::from("a               Add a task (Tab toggles Daily)"),
        Line::from("c, Space        Mark complete / incomplete"),
        Line::from("x, Delete       Delete card"),
        Line::from("Enter, m        Card menu (also right-click)"),
        Line::from("q, Esc          Quit and save"),
        Line::from(""),
        Line::from("Press any key to return"),
    ];
    let help = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .style(Style::default().bg(Color::Black));
    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, MouseEvent};
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn right_click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn add(app: &mut BoardApp, text: &str, daily: bool) {
        app.handle_event(key(KeyCode::Char('a')));
        for c in text.chars() {
            app.handle_event(key(KeyCode::Char(c)));
        }
        if daily {
            app.handle_event(key(KeyCode::Tab));
        }
        app.handle_event(key(KeyCode::Enter));
    }

    fn screen(app: &mut BoardApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
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
    fn test_cards_land_in_priority_columns() {
        let mut store = TaskStore::default();
        let taxes = store.add("Taxes", false).unwrap();
        store.set_priority(taxes, Priority::High).unwrap();
        let mut app = BoardApp::new(&mut store);
        add(&mut app, "Gym", true);
        add(&mut app, "Laundry", false);

        assert_eq!(app.board.groups[0].cards[0].text, "Gym");
        assert_eq!(app.board.groups[1].cards[0].text, "Laundry");
        assert_eq!(app.board.groups[3].cards[0].text, "Taxes");
        // The newly added card is selected.
        assert_eq!(app.selected_column, 1);

        let text = screen(&mut app);
        for label in ["Daily (1)", "Low (1)", "Mid (0)", "High (1)", "Gym", "Laundry", "Taxes"] {
            assert!(text.contains(label), "missing {label}");
        }
    }

    #[test]
    fn test_duplicate_opens_error_dialog() {
        let mut store = TaskStore::default();
        store.add("Gym", true).unwrap();
        let mut app = BoardApp::new(&mut store);
        add(&mut app, "Gym", false);
        assert!(matches!(&app.mode, Mode::Error(m) if m == "Task 'Gym' already exists."));
        assert!(screen(&mut app).contains("Task 'Gym' already exists."));
        assert_eq!(app.board.total(), 1);

        app.handle_event(key(KeyCode::Char('z')));
        assert!(app.mode.is_browse());
    }

    #[test]
    fn test_capacity_opens_error_dialog() {
        let mut store = TaskStore::new(1);
        store.add("Only", false).unwrap();
        let mut app = BoardApp::new(&mut store);
        add(&mut app, "Another", false);
        assert!(matches!(&app.mode, Mode::Error(m) if m == "Task list is full (1 tasks)."));
    }

    #[test]
    fn test_complete_and_delete_selected_card() {
        let mut store = TaskStore::default();
        store.add("a", false).unwrap();
        store.add("b", false).unwrap();
        store.add("c", false).unwrap();
        {
            let mut app = BoardApp::new(&mut store);
            app.handle_event(key(KeyCode::Right));
            app.handle_event(key(KeyCode::Down));
            app.handle_event(key(KeyCode::Char('c')));
            assert!(app.board.groups[1].cards[1].completed);

            // Menu: Delete Task is the first entry.
            app.handle_event(key(KeyCode::Enter));
            assert!(matches!(app.mode, Mode::Menu(_)));
            app.handle_event(key(KeyCode::Enter));
            let left: Vec<&str> = app.board.groups[1].cards.iter().map(|c| c.text.as_str()).collect();
            assert_eq!(left, vec!["a", "c"]);
        }
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_empty_column_has_no_selection() {
        let mut store = TaskStore::default();
        store.add("Low task", false).unwrap();
        let mut app = BoardApp::new(&mut store);
        assert_eq!(app.selected_id(), None);
        app.handle_event(key(KeyCode::Char('x')));
        app.handle_event(key(KeyCode::Right));
        assert!(app.selected_id().is_some());
    }

    #[test]
    fn test_error_dialog_with_huge_message_renders() {
        let mut store = TaskStore::default();
        let mut app = BoardApp::new(&mut store);
        app.mode = Mode::Error("y".repeat(65_533));
        screen(&mut app);

        // A duplicate of a very long task goes through the same dialog.
        let long = "z".repeat(70_000);
        app.store.add(&long, false).unwrap();
        app.rebuild();
        app.mode = Mode::Browse;
        app.dispatch(Action::Add { text: long, daily: false });
        assert!(matches!(app.mode, Mode::Error(_)));
        screen(&mut app);
    }

    #[test]
    fn test_right_click_selects_card_under_cursor() {
        let mut store = TaskStore::default();
        store.add("a", false).unwrap();
        store.add("b", false).unwrap();
        store.add("c", false).unwrap();
        let mut app = BoardApp::new(&mut store);
        screen(&mut app);

        // Empty Daily column: no card there.
        app.handle_event(right_click(5, 8));
        assert!(app.mode.is_browse());

        // Second card of the Low column.
        app.handle_event(right_click(30, 12));
        assert!(matches!(&app.mode, Mode::Menu(m) if m.task_id == TaskId(2)));
        assert_eq!((app.selected_column, app.selected_card), (1, 1));
        app.handle_event(key(KeyCode::Enter));
        let left: Vec<&str> = app.board.groups[1].cards.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(left, vec!["a", "c"]);
    }

    #[test]
    fn test_unreadable_file_warning_stays_visible() {
        let mut store = TaskStore::default();
        let mut app = BoardApp::new(&mut store).with_unsaved_warning(Some("unreadable"));
        assert!(screen(&mut app).contains("will not be saved"));

        app.handle_event(key(KeyCode::Esc));
        assert!(app.mode.is_browse());
        assert!(screen(&mut app).contains("NOT SAVING: unreadable"));
    }
}
