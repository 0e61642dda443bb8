//! Application state and the main loop.
//!
//! The app owns the patient source and two screens: the patient list, which
//! is always alive so its search, sort and page survive a round trip, and
//! the detail view, which exists only while a patient is open.

use crate::components::patients::{PatientDetails, PatientList};
use crate::components::Component;
use crate::source::PatientSource;
use crate::tui::{self, Frame, Tui};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::num::NonZeroUsize;
use tracing::{debug, info, warn};

/// What a screen asks the app to do after handling a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Open the detail view for the patient with this ID.
    ViewPatient(String),
    BackToList,
    /// Fetch the collection again.
    Refresh,
    Quit,
}

pub struct App {
    source: Box<dyn PatientSource>,
    pub list: PatientList,
    pub details: Option<PatientDetails>,
    pub should_quit: bool,
}

impl App {
    pub fn new(source: Box<dyn PatientSource>, page_size: NonZeroUsize) -> Self {
        Self {
            source,
            list: PatientList::new(page_size),
            details: None,
            should_quit: false,
        }
    }

    /// Fetches the collection from the source.
    ///
    /// A failure leaves the current collection in place and shows the
    /// error on the list screen.
    pub fn refresh(&mut self) {
        let label = self.source.describe();
        match self.source.fetch() {
            Ok(patients) => {
                info!(source = %label, count = patients.len(), "patients loaded");
                self.list.load(patients, self.source.describe());
            }
            Err(e) => {
                warn!(source = %label, error = %format!("{e:#}"), "fetch failed");
                self.list
                    .show_error(format!("Failed to fetch patients: {e:#}. Press R to retry."));
            }
        }

        if let Some(details) = &mut self.details {
            let patient = self.list.browser().find(details.id()).cloned();
            details.refresh(patient);
        }
    }

    /// Runs the main loop until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing or reading terminal events fails.
    pub fn run(&mut self, tui: &mut Tui) -> Result<()> {
        while !self.should_quit {
            tui.draw(|frame| self.render(frame))?;
            match tui.next_event()? {
                tui::Event::Key(key) => self.handle_key(key)?,
                tui::Event::Resize | tui::Event::Tick => {}
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Global keybinding: Ctrl+Q to quit
        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        let action = match &mut self.details {
            Some(details) => details.handle_input(key)?,
            None => self.list.handle_input(key)?,
        };
        if let Some(action) = action {
            self.apply(action);
        }
        Ok(())
    }

    fn apply(&mut self, action: AppAction) {
        match action {
            AppAction::ViewPatient(id) => {
                debug!(%id, "opening patient");
                let patient = self.list.browser().find(&id).cloned();
                self.details = Some(PatientDetails::new(id, patient));
            }
            AppAction::BackToList => {
                debug!("back to patient list");
                self.details = None;
            }
            AppAction::Refresh => self.refresh(),
            AppAction::Quit => self.should_quit = true,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        match &self.details {
            Some(details) => details.render(frame),
            None => self.list.render(frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::key;
    use crate::source::{DemoSource, JsonFileSource};

    fn demo_app() -> App {
        let mut app = App::new(Box::new(DemoSource), NonZeroUsize::new(2).unwrap());
        app.refresh();
        app
    }

    #[test]
    fn refresh_loads_the_collection() {
        let app = demo_app();
        assert_eq!(app.list.browser().match_count(), 5);
        assert_eq!(app.list.error_message(), None);
    }

    #[test]
    fn enter_opens_details_and_escape_returns() {
        let mut app = demo_app();
        app.handle_key(key(KeyCode::Enter)).unwrap();
        let details = app.details.as_ref().unwrap();
        assert_eq!(details.id(), "PAT00004");

        app.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(app.details.is_none());
        assert!(!app.should_quit);

        app.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn list_state_survives_opening_details() {
        let mut app = demo_app();
        app.handle_key(key(KeyCode::Right)).unwrap();
        app.handle_key(key(KeyCode::Enter)).unwrap();
        app.handle_key(key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.list.browser().state().page(), 2);
    }

    #[test]
    fn ctrl_q_quits_from_any_screen() {
        let mut app = demo_app();
        app.handle_key(key(KeyCode::Enter)).unwrap();
        app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn failed_fetch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let mut app = App::new(
            Box::new(JsonFileSource::new(&missing)),
            NonZeroUsize::new(10).unwrap(),
        );
        app.refresh();
        assert_eq!(app.list.browser().match_count(), 0);
        let message = app.list.error_message().unwrap();
        assert!(message.starts_with("Failed to fetch patients"), "{message}");
    }

    #[test]
    fn open_details_resolve_again_after_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.json");
        std::fs::write(&path, r#"[{"ID":"A1","name":"Asha"}]"#).unwrap();

        let mut app = App::new(
            Box::new(JsonFileSource::new(&path)),
            NonZeroUsize::new(10).unwrap(),
        );
        app.refresh();
        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(app.details.as_ref().unwrap().id(), "A1");

        std::fs::write(&path, "[]").unwrap();
        app.handle_key(key(KeyCode::Char('r'))).unwrap();
        let screen = crate::components::test_support::render_to_text(
            app.details.as_ref().unwrap(),
            100,
            24,
        );
        assert!(screen.contains("Patient A1 was not found"));
    }
}
