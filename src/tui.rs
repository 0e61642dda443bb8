use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, KeyEvent, KeyEventKind},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, time::Duration};

#[derive(Debug, Clone)]
pub enum Event {
    Key(KeyEvent),
    Resize,
    Tick,
}

pub type Frame<'a> = ratatui::Frame<'a>;

/// Owns the terminal while the UI runs. Dropping it restores the terminal
/// even if the run loop returned early with an error.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    tick: Duration,
    active: bool,
}

impl Tui {
    pub fn new(tick: Duration) -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
            .context("Failed to open terminal")?;
        Ok(Self {
            terminal,
            tick,
            active: false,
        })
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        crossterm::execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        self.active = true;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.terminal.show_cursor()?;
        terminal::disable_raw_mode()?;
        crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
        Ok(())
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Waits up to one tick for input.
    pub fn next_event(&self) -> Result<Event> {
        if !event::poll(self.tick)? {
            return Ok(Event::Tick);
        }

        Ok(match event::read()? {
            // Ignore key releases and repeats reported on some platforms.
            event::Event::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
            event::Event::Resize(..) => Event::Resize,
            _ => Event::Tick,
        })
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        // Ignore errors during cleanup
        let _ = self.exit();
    }
}
