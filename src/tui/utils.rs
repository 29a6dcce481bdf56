//! Layout helpers shared by the terminal screens.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// A rectangle centred in `r`, sized as a percentage of it.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// A rectangle of fixed size centred in `r`, clipped to fit.
pub fn centered_box(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect::new(
        r.x + (r.width - width) / 2,
        r.y + (r.height - height) / 2,
        width,
        height,
    )
}

/// Opening notice for a session whose task file could not be read.
pub fn unsaved_message(reason: &str) -> String {
    format!("Could not read the task file: {reason}. Changes made now will not be saved.")
}

/// Draw a modal message box over `area`, sized to the message but never
/// larger than the area.
pub fn render_error_dialog(f: &mut Frame, area: Rect, title: &str, message: &str) {
    let chars = u16::try_from(message.chars().count()).unwrap_or(u16::MAX);
    let width = chars.saturating_add(4).max(30).min(area.width);
    let text_width = width.saturating_sub(2).max(1);
    // Message lines, a blank line, the hint and two borders.
    let height = chars.div_ceil(text_width).max(1).saturating_add(4);
    let popup = centered_box(width, height, area);

    let dialog = Paragraph::new(vec![Line::from(message), Line::from(""), Line::from("Press any key")])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(Color::Black));
    f.render_widget(Clear, popup);
    f.render_widget(dialog, popup);
}
