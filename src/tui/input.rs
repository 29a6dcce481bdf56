//! Input field handling for the terminal user interface.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// A single-line text input with a cursor counted in characters.
#[derive(Clone, Debug, Default)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
}

impl InputField {
    /// Create a new empty input field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte offset of the cursor inside `value`.
    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    /// Insert a character at the current cursor position.
    pub fn handle_char(&mut self, c: char) {
        let at = self.byte_index();
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index();
            self.value.remove(at);
        }
    }

    /// Delete the character at the cursor position.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index();
            self.value.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Return the text and leave the field empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }
}

/// Result of feeding a key to the entry line.
#[derive(Debug, PartialEq, Eq)]
pub enum EntryEvent {
    Editing,
    Submit { text: String, daily: bool },
    Cancel,
}

/// The "new task" line: a text field plus a daily checkbox.
#[derive(Clone, Debug, Default)]
pub struct Entry {
    pub field: InputField,
    pub daily: bool,
}

impl Entry {
    /// Feed one key press. Submitting or cancelling resets the entry, including
    /// the checkbox.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> EntryEvent {
        match key {
            KeyCode::Enter => {
                let text = self.field.take();
                let daily = std::mem::take(&mut self.daily);
                return EntryEvent::Submit { text, daily };
            }
            KeyCode::Esc => {
                self.field.clear();
                self.daily = false;
                return EntryEvent::Cancel;
            }
            KeyCode::Tab => self.daily = !self.daily,
            KeyCode::Backspace if modifiers.contains(KeyModifiers::CONTROL) => self.field.clear(),
            KeyCode::Backspace => self.field.handle_backspace(),
            KeyCode::Delete => self.field.handle_delete(),
            KeyCode::Left => self.field.move_cursor_left(),
            KeyCode::Right => self.field.move_cursor_right(),
            KeyCode::Home => self.field.move_home(),
            KeyCode::End => self.field.move_end(),
            KeyCode::Char(c) => self.field.handle_char(c),
            _ => {}
        }
        EntryEvent::Editing
    }

    /// Draw the entry line. The cursor is placed only while `focused`.
    pub fn render(&self, f: &mut Frame, area: Rect, focused: bool) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(if focused {
                "New task (Enter: add | Tab: daily | Esc: cancel)"
            } else {
                "New task (press 'a')"
            })
            .border_style(if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            });
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(16)])
            .split(inner);

        f.render_widget(Paragraph::new(self.field.value.as_str()), chunks[0]);

        let mark = if self.daily { "x" } else { " " };
        let checkbox = Line::from(vec![
            Span::raw("["),
            Span::styled(mark, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("] Daily Task"),
        ]);
        f.render_widget(Paragraph::new(checkbox), chunks[1]);

        if focused {
            let x = (self.field.cursor as u16).min(chunks[0].width.saturating_sub(1));
            f.set_cursor_position((chunks[0].x + x, chunks[0].y));
        }
    }
}
