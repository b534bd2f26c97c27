//! Raw-mode control for the process terminal via crossterm.

use anyhow::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{SetTitle, disable_raw_mode, enable_raw_mode},
};
use std::io::stdout;

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn set_title(&mut self, title: &str) -> Result<()>;
}

/// Puts the controlling terminal into raw mode with bracketed paste, so
/// every key reaches the reader unprocessed and pastes arrive framed.
pub struct CrosstermBackend {
    entered: bool,
}

/// Leaves raw mode on drop, including on early return or panic unwinding.
pub struct RawModeGuard<'a> {
    backend: &'a mut CrosstermBackend,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    pub fn is_raw(&self) -> bool {
        self.entered
    }

    pub fn enter_guard(&mut self) -> Result<RawModeGuard<'_>> {
        self.enter()?;
        Ok(RawModeGuard { backend: self })
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            execute!(stdout(), EnableBracketedPaste)?;
            self.entered = true;
            tracing::debug!(target: "terminal.backend", "raw_mode_entered");
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(stdout(), DisableBracketedPaste)?;
            disable_raw_mode()?;
            self.entered = false;
            tracing::debug!(target: "terminal.backend", "raw_mode_left");
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl Drop for RawModeGuard<'_> {
    fn drop(&mut self) {
        let _ = self.backend.leave();
    }
}
