//! Terminal session lifecycle guard.
//!
//! Owns raw-mode and alternate-screen entry, and restores the terminal on
//! drop — including panic unwinding, so a crash never leaves the shell in
//! raw mode.

use std::io::{self, Write};

use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};

/// RAII guard for the interactive terminal session.
pub struct TerminalGuard {
    raw: bool,
    alt: bool,
}

impl TerminalGuard {
    /// Enter raw mode, switch to the alternate screen, and hide the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled; partial setup is
    /// rolled back by the guard.
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut guard = Self {
            raw: true,
            alt: false,
        };
        crossterm::execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        guard.alt = true;
        Ok(guard)
    }

    /// Current terminal size in `(columns, rows)`.
    pub fn size() -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.alt {
            let _ = crossterm::execute!(stdout, Show, LeaveAlternateScreen);
        }
        if self.raw {
            let _ = disable_raw_mode();
        }
        let _ = stdout.flush();
    }
}
