//! Patient screens: the searchable list and the detail view it opens.

pub mod details;
pub mod list;

pub use details::PatientDetails;
pub use list::PatientList;
