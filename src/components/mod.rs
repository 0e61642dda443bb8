use crate::app::AppAction;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

pub mod patients;

pub trait Component {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<AppAction>>;
    fn render(&self, frame: &mut Frame);
}

pub(crate) const BACKGROUND: Color = Color::Rgb(16, 16, 28);
pub(crate) const PANEL: Color = Color::Rgb(22, 22, 35);
pub(crate) const BORDER: Color = Color::Rgb(75, 75, 120);
pub(crate) const TEXT: Color = Color::Rgb(220, 220, 240);
pub(crate) const TITLE: Color = Color::Rgb(230, 230, 250);
pub(crate) const MUTED: Color = Color::Rgb(140, 140, 170);
pub(crate) const HIGHLIGHT: Color = Color::Rgb(250, 250, 110);

/// Fills the screen background and draws a centered title bar in `area`.
pub(crate) fn render_title(frame: &mut Frame, area: Rect, title: &str) {
    frame.render_widget(
        Block::default().style(Style::default().bg(BACKGROUND)),
        frame.area(),
    );

    let header_block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(BORDER))
        .style(Style::default().bg(BACKGROUND));
    frame.render_widget(header_block, area);

    let title = Paragraph::new(title)
        .style(
            Style::default()
                .fg(TITLE)
                .add_modifier(Modifier::BOLD)
                .bg(BACKGROUND),
        )
        .alignment(Alignment::Center);
    frame.render_widget(title, area);
}
