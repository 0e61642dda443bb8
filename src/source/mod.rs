//! Patient sources.
//!
//! The browser never fetches anything itself: a [`PatientSource`] hands it
//! a complete collection, and a failed fetch is reported to the caller
//! before the browser is touched.

use crate::models::Patient;
use anyhow::Result;
use serde_json::Value;
use tracing::warn;

pub mod cached;
pub mod demo;
pub mod json;
pub mod sqlite;

pub use cached::CachedSource;
pub use demo::DemoSource;
pub use json::JsonFileSource;
pub use sqlite::SqliteSource;

/// Produces the full patient collection for the signed-in doctor.
pub trait PatientSource {
    /// Short human-readable description, shown in the list title.
    fn describe(&self) -> String;

    /// Fetches every patient. Each call returns a fresh collection.
    fn fetch(&self) -> Result<Vec<Patient>>;
}

/// Decodes patients from a JSON document.
///
/// Accepts either a bare array or the doctor dashboard response
/// `{ "patients": [...], "user": {...} }`. Entries that cannot be decoded
/// (no usable ID) are skipped with a warning so one bad record does not
/// hide the rest.
pub fn patients_from_json(document: Value) -> Result<Vec<Patient>> {
    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("patients") {
            Some(Value::Array(entries)) => entries,
            _ => anyhow::bail!("expected a \"patients\" array in the response"),
        },
        other => anyhow::bail!("expected a patient array, found {}", json_kind(&other)),
    };

    let total = entries.len();
    let patients: Vec<Patient> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(patient) => Some(patient),
            Err(error) => {
                warn!(index, %error, "skipping undecodable patient record");
                None
            }
        })
        .collect();

    if patients.len() < total {
        warn!(
            kept = patients.len(),
            skipped = total - patients.len(),
            "some patient records were skipped"
        );
    }
    Ok(patients)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
