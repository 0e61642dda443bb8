//! Patient list screen.
//!
//! Shows one page of the doctor's patients with:
//! - a search box matching name, doctor or caretaker
//! - sortable columns (keys `1`-`5`, pressing the active column again flips it)
//! - first/previous/next/last page controls and a "Showing X to Y of Z" footer
//! - Enter to open the selected patient

use crate::app::AppAction;
use crate::browser::{BrowserAction, PatientBrowser};
use crate::components::{render_title, Component, BORDER, HIGHLIGHT, MUTED, PANEL, TEXT, TITLE};
use crate::models::{Patient, SortField};
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use std::num::NonZeroUsize;
use time::{macros::format_description, OffsetDateTime};
use tracing::debug;

/// Component listing the browser's current page.
pub struct PatientList {
    browser: PatientBrowser,
    /// Row selection within the visible page.
    state: TableState,
    is_searching: bool,
    /// Where the collection came from, shown in the table title.
    source_label: String,
    refreshed_at: Option<String>,
    error_message: Option<String>,
}

impl PatientList {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            browser: PatientBrowser::new(page_size),
            state: TableState::default(),
            is_searching: false,
            source_label: String::new(),
            refreshed_at: None,
            error_message: None,
        }
    }

    pub fn browser(&self) -> &PatientBrowser {
        &self.browser
    }

    /// Replaces the collection after a successful fetch.
    pub fn load(&mut self, patients: Vec<Patient>, source_label: String) {
        self.browser.set_collection(patients);
        self.source_label = source_label;
        self.refreshed_at = Some(clock_stamp());
        self.error_message = None;
        self.reset_selection();
    }

    /// Shows a fetch failure. The current collection stays browsable.
    pub fn show_error(&mut self, message: String) {
        self.error_message = Some(message);
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    /// ID of the highlighted row, if any.
    pub fn selected_id(&self) -> Option<&str> {
        let page = self.browser.page();
        self.state
            .selected()
            .and_then(|i| page.rows.get(i))
            .map(|&index| self.browser.state().collection()[index].id.as_str())
    }

    /// Changes the browser, resetting the highlight when the page moved.
    fn update(&mut self, change: impl FnOnce(&mut PatientBrowser)) {
        let before = (self.browser.state().page(), self.browser.match_count());
        change(&mut self.browser);
        let after = (self.browser.state().page(), self.browser.match_count());
        if before != after {
            self.reset_selection();
        }
    }

    /// Selects the first row of the page, or nothing on an empty page.
    fn reset_selection(&mut self) {
        let rows = self.browser.page().rows.len();
        self.state.select(if rows == 0 { None } else { Some(0) });
    }

    /// Moves the highlight down, wrapping to the top of the page.
    fn select_next(&mut self) {
        let rows = self.browser.page().rows.len();
        if rows == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < rows => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Moves the highlight up, wrapping to the bottom of the page.
    fn select_previous(&mut self) {
        let rows = self.browser.page().rows.len();
        if rows == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => rows - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn edit_query(&mut self, edit: impl FnOnce(&mut String)) {
        let mut query = self.browser.state().query().to_string();
        edit(&mut query);
        self.update(|browser| browser.set_query(query));
        self.reset_selection();
    }

    fn process_search_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.edit_query(|q| q.push(c)),
            KeyCode::Backspace => self.edit_query(|q| {
                q.pop();
            }),
            KeyCode::Enter | KeyCode::Down | KeyCode::Tab | KeyCode::Esc => {
                self.is_searching = false;
            }
            _ => {}
        }
    }
}

impl Component for PatientList {
    fn handle_input(&mut self, key: KeyEvent) -> Result<Option<AppAction>> {
        if self.is_searching {
            self.process_search_input(key);
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('/') | KeyCode::Char('s') | KeyCode::Char('S') => {
                self.is_searching = true;
            }
            KeyCode::Char(c @ '1'..='5') => {
                let column = c as usize - '1' as usize;
                let field = SortField::ALL[column];
                self.update(|browser| browser.set_sort(field));
                debug!(?field, direction = ?self.browser.state().sort().direction, "sort changed");
            }
            KeyCode::Down => self.select_next(),
            KeyCode::Up => self.select_previous(),
            KeyCode::Left | KeyCode::PageUp => {
                self.update(|browser| browser.dispatch(BrowserAction::PreviousPage))
            }
            KeyCode::Right | KeyCode::PageDown => {
                self.update(|browser| browser.dispatch(BrowserAction::NextPage))
            }
            KeyCode::Home => self.update(|browser| browser.set_page(1)),
            KeyCode::End => self.update(|browser| browser.dispatch(BrowserAction::LastPage)),
            KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    return Ok(Some(AppAction::ViewPatient(id.to_string())));
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => return Ok(Some(AppAction::Refresh)),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                return Ok(Some(AppAction::Quit));
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Search input
                Constraint::Min(8),    // Table
                Constraint::Length(1), // Showing X to Y of Z
                Constraint::Length(1), // Pagination controls
                Constraint::Length(1), // Help text
                Constraint::Length(1), // Error message
            ])
            .margin(1)
            .split(frame.area());

        render_title(frame, layout[0], "🩺 VITALINK PATIENTS");
        self.render_search(frame, layout[1]);
        self.render_table(frame, layout[2]);
        self.render_footer(frame, layout[3], layout[4]);

        let help_text = if self.is_searching {
            "Type to search | Enter/Esc: Back to results"
        } else {
            "/ or s: Search | 1-5: Sort | ↑↓: Select | ←→: Page | Enter: View | R: Refresh | Q: Quit"
        };
        frame.render_widget(
            Paragraph::new(help_text)
                .style(Style::default().fg(MUTED))
                .alignment(Alignment::Center),
            layout[5],
        );

        if let Some(error) = &self.error_message {
            let error_paragraph = Paragraph::new(error.as_str())
                .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center);
            frame.render_widget(error_paragraph, layout[6]);
        }
    }
}

impl PatientList {
    fn render_search(&self, frame: &mut Frame, area: Rect) {
        let search_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Span::styled(
                " Search Patients ",
                Style::default().fg(TITLE).add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(if self.is_searching { HIGHLIGHT } else { BORDER }))
            .style(Style::default().bg(PANEL));

        let mut query = self.browser.state().query().to_string();
        if self.is_searching {
            query.push('▏');
        }
        frame.render_widget(
            Paragraph::new(query)
                .style(Style::default().fg(TEXT).bg(PANEL))
                .block(search_block),
            area,
        );
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let state = self.browser.state();
        let sort = state.sort();

        let header_cells = SortField::ALL.iter().enumerate().map(|(i, &field)| {
            let arrow = if field == sort.field { sort.direction.arrow() } else { "" };
            Cell::from(format!("{} {}{}", i + 1, field.label(), arrow))
                .style(Style::default().fg(TITLE))
        });
        let header = Row::new(header_cells)
            .style(Style::default().bg(Color::Rgb(80, 60, 130)))
            .height(1);

        let rows = self.browser.visible().into_iter().map(|patient| {
            let cells: Vec<Cell> = SortField::ALL
                .iter()
                .map(|&field| Cell::from(patient.cell(field)))
                .collect();
            Row::new(cells).style(Style::default().fg(TEXT))
        });

        let title = if !state.query().is_empty() {
            format!(
                " Patients ({} of {} match) ",
                self.browser.match_count(),
                state.collection().len()
            )
        } else if let Some(at) = &self.refreshed_at {
            format!(" Patients · {} · {} ", self.source_label, at)
        } else {
            " Patients ".to_string()
        };

        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER))
            .style(Style::default().bg(PANEL));

        if self.browser.match_count() == 0 {
            let message = if state.query().is_empty() {
                "No patients found"
            } else {
                "No patients match your search"
            };
            frame.render_widget(
                Paragraph::new(message)
                    .style(Style::default().fg(TEXT))
                    .alignment(Alignment::Center)
                    .block(block),
                area,
            );
            return;
        }

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(28),
                Constraint::Percentage(10),
                Constraint::Percentage(12),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(HIGHLIGHT)
                .bg(Color::Rgb(40, 40, 60))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("► ");

        frame.render_stateful_widget(table, area, &mut self.state.clone());
    }

    fn render_footer(&self, frame: &mut Frame, info_area: Rect, controls_area: Rect) {
        let page = self.browser.page();
        let (first, last) = page.showing();
        let mut info = format!("Showing {first} to {last} of {} entries", page.total_rows);
        let total = self.browser.state().collection().len();
        if page.total_rows != total {
            info.push_str(&format!(" (filtered from {total})"));
        }
        frame.render_widget(
            Paragraph::new(info)
                .style(Style::default().fg(TEXT))
                .alignment(Alignment::Center),
            info_area,
        );

        let control = |label: &'static str, enabled: bool| {
            let style = if enabled {
                Style::default().fg(Color::Rgb(129, 199, 245))
            } else {
                Style::default().fg(Color::Rgb(70, 70, 90))
            };
            Span::styled(label, style)
        };
        let controls = Line::from(vec![
            control("<<  ", page.has_previous()),
            control("<  ", page.has_previous()),
            Span::styled(
                format!("Page {} of {}", page.number, page.total_pages),
                Style::default().fg(TITLE).add_modifier(Modifier::BOLD),
            ),
            control("  >", page.has_next()),
            control("  >>", page.has_next()),
        ]);
        frame.render_widget(
            Paragraph::new(controls).alignment(Alignment::Center),
            controls_area,
        );
    }
}

/// Wall-clock time of the last refresh, local when the offset is known.
fn clock_stamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default()
}
