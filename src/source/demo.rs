//! Bundled demo roster, used when no source is configured.

use super::{patients_from_json, PatientSource};
use crate::models::Patient;
use anyhow::{Context, Result};

const DEMO_ROSTER: &str = include_str!("demo.json");

#[derive(Debug, Clone, Copy, Default)]
pub struct DemoSource;

impl PatientSource for DemoSource {
    fn describe(&self) -> String {
        "demo roster".to_string()
    }

    fn fetch(&self) -> Result<Vec<Patient>> {
        let document = serde_json::from_str(DEMO_ROSTER).context("Bundled demo roster is invalid")?;
        patients_from_json(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_has_five_patients() {
        let patients = DemoSource.fetch().unwrap();
        let names: Vec<_> = patients.iter().map(Patient::display_name).collect();
        assert_eq!(
            names,
            ["Sathiya A", "John Doe", "Jane Smith", "Alex Johnson", "Maria Lopez"]
        );
        assert_eq!(patients[0].prescription.len(), 7);
        assert_eq!(patients[0].latest_inr, Some(0.0));
        assert_eq!(patients[1].latest_inr, Some(2.6));
        assert_eq!(patients[1].prescription.len(), 3);
    }
}
