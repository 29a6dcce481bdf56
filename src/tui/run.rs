//! Terminal setup and teardown around the two screens.

use std::io;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::LevelFilter;
use ratatui::{prelude::CrosstermBackend, Terminal};

use crate::store::TaskStore;
use crate::tui::{app::App, board::BoardApp, enums::Screen};

/// How a screen session is started.
#[derive(Debug, Clone, Copy)]
pub struct Launch<'a> {
    pub screen: Screen,
    /// Why the task file could not be read, if it could not.
    pub unsaved: Option<&'a str>,
    /// Silence logging while the screen is up, because it would be drawn over it.
    pub mute_logs: bool,
}

/// Initialise the terminal, run the chosen screen until the user quits, and
/// restore the terminal even if the screen failed.
pub fn run_tui(store: &mut TaskStore, launch: Launch) -> io::Result<()> {
    log::debug!("starting {:?} screen with {} tasks", launch.screen, store.len());
    let _muted = launch.mute_logs.then(MutedLogs::new);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    or_restore(execute!(stdout, EnterAlternateScreen, EnableMouseCapture))?;
    let mut terminal = or_restore(Terminal::new(CrosstermBackend::new(stdout)))?;

    let result = match launch.screen {
        Screen::Table => App::new(store).with_unsaved_warning(launch.unsaved).run(&mut terminal),
        Screen::Board => BoardApp::new(store)
            .with_unsaved_warning(launch.unsaved)
            .run(&mut terminal),
    };

    restore_terminal()?;
    terminal.show_cursor()?;

    result
}

/// Pass `step` through, putting the terminal back first if it failed.
fn or_restore<T>(step: io::Result<T>) -> io::Result<T> {
    or_undo(step, || {
        if let Err(e) = restore_terminal() {
            log::error!("Failed to restore terminal: {e}");
        }
    })
}

fn or_undo<T>(step: io::Result<T>, undo: impl FnOnce()) -> io::Result<T> {
    if step.is_err() {
        undo();
    }
    step
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)
}

/// Turns logging off until dropped, then puts the previous level back.
struct MutedLogs(LevelFilter);

impl MutedLogs {
    fn new() -> Self {
        let previous = log::max_level();
        log::set_max_level(LevelFilter::Off);
        MutedLogs(previous)
    }
}

impl Drop for MutedLogs {
    fn drop(&mut self) {
        log::set_max_level(self.0);
    }
}
