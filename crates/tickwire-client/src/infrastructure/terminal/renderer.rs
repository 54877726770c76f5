//! TerminalRenderer: puts a [`CellSurface`] on a real terminal.
//!
//! Full redraw every frame, one `MoveTo` + `Print` per row.  At 80x34 cells
//! that is small enough not to need diffing.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    style::{Attribute, Print, ResetColor, SetAttribute},
    terminal, QueueableCommand,
};

use crate::infrastructure::terminal::surface::CellSurface;

pub struct TerminalRenderer {
    stdout: io::Stdout,
    active: bool,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            active: false,
        }
    }

    /// Switches to raw mode on the alternate screen.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        self.stdout.queue(terminal::EnterAlternateScreen)?;
        self.stdout.queue(cursor::Hide)?;
        self.stdout.queue(terminal::DisableLineWrap)?;
        self.stdout.queue(terminal::Clear(terminal::ClearType::All))?;
        self.stdout.flush()?;
        Ok(())
    }

    /// Restores the terminal.  Safe to call more than once.
    pub fn exit(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.stdout.queue(ResetColor)?;
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(terminal::EnableLineWrap)?;
        self.stdout.queue(cursor::Show)?;
        self.stdout.queue(terminal::LeaveAlternateScreen)?;
        self.stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub fn draw(&mut self, surface: &CellSurface) -> Result<()> {
        let mut row = 0;
        while let Some(text) = surface.row_text(row) {
            let y = u16::try_from(row).unwrap_or(u16::MAX);
            self.stdout.queue(cursor::MoveTo(0, y))?;
            self.stdout.queue(Print(text))?;
            row += 1;
        }
        self.stdout.flush()?;
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        // Leaves the user's shell usable even after a panic in the loop.
        let _ = self.exit();
    }
}
