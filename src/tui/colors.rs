//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Priority;

/// Used for Daily tasks
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);
/// Used for Low priority
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Used for Mid priority
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Used for High priority
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);

/// Theme color of a priority group.
pub fn priority_color(p: Priority) -> Color {
    match p {
        Priority::Daily => DARK_PURPLE,
        Priority::Low => DARK_GREEN,
        Priority::Mid => GOLD,
        Priority::High => DARK_RED,
    }
}

/// Readable foreground on top of `bg`.
pub fn text_on(bg: Color) -> Color {
    match bg {
        GOLD => Color::Rgb(20, 20, 20),
        _ => Color::White,
    }
}
