//! Patient browser core.
//!
//! The browser holds a fetched patient collection together with the
//! query, sort and page the user has chosen, and derives the rows to show:
//!
//! ```text
//! collection --filter(query)--> matches --sort(spec)--> ordered --paginate(page)--> visible
//! ```
//!
//! [`BrowserState`] is an immutable value that only [`PatientBrowser`]
//! advances, through a pure reducer. The browser keeps the current state and
//! memoizes the filtered and sorted order, recomputing it only when the
//! collection, query or sort changed. Page moves just re-slice.

pub mod filter;
pub mod paginate;
pub mod sort;

use crate::models::{Patient, SortField};
use paginate::{clamp_page, total_pages, Page};
use sort::SortSpec;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, trace};

/// Rows per page when none is configured.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

/// Changes a user (or a refetch) can make to the browser.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserAction {
    /// New search text. Returns to page 1.
    SetQuery(String),
    /// Column header pressed. Keeps the current page, clamped.
    SetSort(SortField),
    /// Jump to a 1-based page, clamped.
    SetPage(usize),
    FirstPage,
    PreviousPage,
    NextPage,
    LastPage,
    /// Refetched collection. Returns to page 1.
    SetCollection(Arc<[Patient]>),
}

/// Everything the visible rows are derived from.
#[derive(Debug, Clone)]
pub struct BrowserState {
    collection: Arc<[Patient]>,
    query: String,
    sort: SortSpec,
    page: usize,
    page_size: NonZeroUsize,
}

impl BrowserState {
    /// Empty collection, empty query, name ascending, page 1.
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            collection: Arc::from(Vec::new()),
            query: String::new(),
            sort: SortSpec::default(),
            page: 1,
            page_size,
        }
    }

    pub fn collection(&self) -> &[Patient] {
        &self.collection
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Applies `action` and returns the next state.
    ///
    /// `total_pages` must be the page count derived from `self`, which is
    /// why only [`PatientBrowser::dispatch`] calls this. Actions that keep
    /// the page (sort, page moves) never change the number of matches, so
    /// it also bounds the resulting page.
    fn reduce(self, action: BrowserAction, total_pages: usize) -> Self {
        let clamp = |page: usize| clamp_page(page, total_pages);
        match action {
            BrowserAction::SetQuery(query) => Self {
                query,
                page: 1,
                ..self
            },
            BrowserAction::SetSort(field) => Self {
                sort: self.sort.toggled(field),
                page: clamp(self.page),
                ..self
            },
            BrowserAction::SetPage(page) => Self {
                page: clamp(page),
                ..self
            },
            BrowserAction::FirstPage => Self { page: 1, ..self },
            BrowserAction::PreviousPage => Self {
                page: clamp(self.page.saturating_sub(1)),
                ..self
            },
            BrowserAction::NextPage => Self {
                page: clamp(self.page.saturating_add(1)),
                ..self
            },
            BrowserAction::LastPage => Self {
                page: clamp(total_pages),
                ..self
            },
            BrowserAction::SetCollection(collection) => Self {
                collection,
                page: 1,
                ..self
            },
        }
    }

    /// Whether moving from `previous` to `self` invalidates the ordering.
    fn reorders(&self, previous: &BrowserState) -> bool {
        !Arc::ptr_eq(&self.collection, &previous.collection)
            || self.query != previous.query
            || self.sort != previous.sort
    }

    /// Filtered and sorted positions into the collection.
    fn derive_order(&self) -> Vec<usize> {
        let mut order = filter::filter(&self.collection, &self.query);
        sort::sort(&self.collection, &mut order, self.sort);
        order
    }
}

/// The record store and view binding the list screen talks to.
#[derive(Debug, Clone)]
pub struct PatientBrowser {
    state: BrowserState,
    order: Vec<usize>,
}

impl PatientBrowser {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            state: BrowserState::new(page_size),
            order: Vec::new(),
        }
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    /// Applies `action`, recomputing the ordering only when it changed.
    pub fn dispatch(&mut self, action: BrowserAction) {
        trace!(?action, "browser action");
        let total = self.total_pages();
        let next = self.state.clone().reduce(action, total);

        if next.reorders(&self.state) {
            self.order = next.derive_order();
            debug!(
                query = %next.query,
                field = ?next.sort.field,
                direction = ?next.sort.direction,
                matches = self.order.len(),
                total = next.collection.len(),
                "recomputed patient order"
            );
        }
        self.state = next;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.dispatch(BrowserAction::SetQuery(query.into()));
    }

    pub fn set_sort(&mut self, field: SortField) {
        self.dispatch(BrowserAction::SetSort(field));
    }

    pub fn set_page(&mut self, page: usize) {
        self.dispatch(BrowserAction::SetPage(page));
    }

    pub fn set_collection(&mut self, patients: Vec<Patient>) {
        self.dispatch(BrowserAction::SetCollection(Arc::from(patients)));
    }

    /// Patients matching the current query.
    pub fn match_count(&self) -> usize {
        self.order.len()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.order.len(), self.state.page_size)
    }

    /// The current page as positions into the collection.
    pub fn page(&self) -> Page<'_, usize> {
        paginate::paginate(&self.order, self.state.page, self.state.page_size)
    }

    /// Patients on the current page, in display order.
    pub fn visible(&self) -> Vec<&Patient> {
        self.page()
            .rows
            .iter()
            .map(|&i| &self.state.collection[i])
            .collect()
    }

    /// Resolves a patient by ID against the whole collection.
    pub fn find(&self, id: &str) -> Option<&Patient> {
        self.state.collection.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::Patient;

    pub fn patient(id: &str, name: &str) -> Patient {
        Patient {
            id: id.to_string(),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn full(id: &str, name: &str, age: u32, gender: &str, caretaker: &str) -> Patient {
        Patient {
            age: Some(age),
            gender: Some(gender.to_string()),
            doctor_name: Some("Dr. K. Tamilarasu".to_string()),
            caretaker_name: Some(caretaker.to_string()),
            ..patient(id, name)
        }
    }

    /// Five patients in fetch order.
    pub fn demo() -> Vec<Patient> {
        vec![
            full("1", "Sathiya A", 47, "F", "Dr. P. Ramasamy"),
            full("2", "John Doe", 34, "M", "Dr. S. Kumar"),
            full("3", "Jane Smith", 29, "F", "Dr. R. Nair"),
            full("4", "Alex Johnson", 40, "M", "Dr. L. Bose"),
            full("5", "Maria Lopez", 55, "F", "Dr. P. Sharma"),
        ]
    }

    pub fn names<'a>(patients: &'a [Patient], rows: &[usize]) -> Vec<&'a str> {
        rows.iter().map(|&i| patients[i].display_name()).collect()
    }
}
