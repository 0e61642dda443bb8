//! Patients exported from the VitaLink API as JSON.

use super::{patients_from_json, PatientSource};
use crate::models::Patient;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Reads a saved doctor dashboard response (or a plain patient array).
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PatientSource for JsonFileSource {
    fn describe(&self) -> String {
        format!("JSON {}", self.path.display())
    }

    fn fetch(&self) -> Result<Vec<Patient>> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let document = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not valid JSON", self.path.display()))?;
        let patients = patients_from_json(document)?;
        info!(path = %self.path.display(), count = patients.len(), "loaded patients from JSON");
        Ok(patients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_dashboard_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "patients": [{{ "ID": "PAT00002", "name": "John Doe", "age": 34 }}] }}"#
        )
        .unwrap();

        let patients = JsonFileSource::new(file.path()).fetch().unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].age, Some(34));
    }

    #[test]
    fn missing_file_names_the_path() {
        let source = JsonFileSource::new("/definitely/not/here.json");
        let err = source.fetch().unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.json"));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[{{ not json").unwrap();
        assert!(JsonFileSource::new(file.path()).fetch().is_err());
    }
}
