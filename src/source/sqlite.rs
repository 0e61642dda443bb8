//! SQLite patient cache.
//!
//! This module keeps a local copy of the doctor's patients so the browser
//! still has something to show when the primary source is unreachable.
//! Every call opens its own connection; the schema in `schema.sql` is
//! applied on open and is idempotent.

use super::PatientSource;
use crate::models::{parse_range, Patient};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column list shared by reads, in `row_to_patient` order.
const PATIENT_COLUMNS: &str = "id, name, age, gender, doctor_name, caretaker_name, contact, \
     kin_name, kin_contact, therapy, therapy_start_date, target_inr, latest_inr, \
     latest_inr_date, medical_history, missed_doses, prescription, inr_reports";

/// Patients stored in a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the database file, creating it and the `patients` table if
    /// they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the schema fails.
    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        conn.execute_batch(include_str!("schema.sql"))
            .context("Failed to execute schema")?;
        Ok(conn)
    }

    /// Replaces the cached patients with `patients`.
    ///
    /// The whole collection is written in one transaction, so readers see
    /// either the previous cache or the new one. Fetch order is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or any row fails
    /// to insert; the previous cache is left intact in that case.
    pub fn store(&self, patients: &[Patient]) -> Result<()> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM patients", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO patients (id, name, age, gender, doctor_name, caretaker_name, \
                 contact, kin_name, kin_contact, therapy, therapy_start_date, target_inr, latest_inr, \
                 latest_inr_date, medical_history, missed_doses, prescription, inr_reports, position) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;
            for (position, patient) in patients.iter().enumerate() {
                stmt.execute(params![
                    patient.id,
                    patient.name,
                    patient.age,
                    patient.gender,
                    patient.doctor_name,
                    patient.caretaker_name,
                    patient.contact,
                    patient.kin_name,
                    patient.kin_contact,
                    patient.therapy,
                    patient.therapy_start_date,
                    patient.target_inr.map(|range| range.to_string()),
                    patient.latest_inr,
                    patient.latest_inr_date,
                    patient.medical_history,
                    serde_json::to_string(&patient.missed_doses)?,
                    serde_json::to_string(&patient.prescription)?,
                    serde_json::to_string(&patient.inr_reports)?,
                    position as i64,
                ])
                .with_context(|| format!("Failed to cache patient {}", patient.id))?;
            }
        }
        tx.commit()?;
        debug!(path = %self.path.display(), count = patients.len(), "cached patients");
        Ok(())
    }
}

/// Maps one `PATIENT_COLUMNS` row. Columns holding unexpected values read
/// as missing rather than failing the row.
fn row_to_patient(row: &Row<'_>) -> rusqlite::Result<Patient> {
    let text = |i: usize| row.get::<_, Option<String>>(i).ok().flatten();

    Ok(Patient {
        id: row.get(0)?,
        name: text(1),
        age: row
            .get::<_, Option<i64>>(2)
            .ok()
            .flatten()
            .and_then(|age| u32::try_from(age).ok()),
        gender: text(3),
        doctor_name: text(4),
        caretaker_name: text(5),
        contact: text(6),
        kin_name: text(7),
        kin_contact: text(8),
        therapy: text(9),
        therapy_start_date: text(10),
        target_inr: text(11).as_deref().and_then(parse_range),
        latest_inr: row.get::<_, Option<f64>>(12).ok().flatten(),
        latest_inr_date: text(13),
        medical_history: text(14),
        missed_doses: text(15)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default(),
        prescription: text(16)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default(),
        inr_reports: text(17)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default(),
    })
}

impl PatientSource for SqliteSource {
    fn describe(&self) -> String {
        format!("SQLite {}", self.path.display())
    }

    /// Retrieves all cached patients in the order they were stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or queried.
    fn fetch(&self) -> Result<Vec<Patient>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY position, id"
        ))?;
        let patients = stmt
            .query_map([], row_to_patient)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read cached patients")?;

        info!(path = %self.path.display(), count = patients.len(), "loaded patients from SQLite");
        Ok(patients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InrRange, InrReading};

    fn sathiya() -> Patient {
        Patient {
            id: "PAT00001".into(),
            name: Some("Sathiya A".into()),
            age: Some(47),
            gender: Some("F".into()),
            doctor_name: Some("Dr. K. Tamilarasu".into()),
            caretaker_name: Some("Dr. P. Ramasamy".into()),
            therapy: Some("Acitrom".into()),
            target_inr: Some(InrRange { min: 2.5, max: 3.5 }),
            latest_inr: Some(2.9),
            inr_reports: vec![InrReading {
                date: Some("2025-03-01T09:30".into()),
                value: 2.9,
            }],
            missed_doses: vec!["01-02-2025".into(), "01-03-2025".into()],
            prescription: [("MON".to_string(), "4.0 mg".to_string())].into_iter().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn stored_patients_read_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = SqliteSource::new(dir.path().join("cache.db"));
        let bare = Patient {
            id: "PAT00002".into(),
            ..Default::default()
        };

        source.store(&[bare.clone(), sathiya()]).unwrap();
        let patients = source.fetch().unwrap();

        assert_eq!(patients, vec![bare, sathiya()]);
    }

    #[test]
    fn store_replaces_previous_cache() {
        let dir = tempfile::tempdir().unwrap();
        let source = SqliteSource::new(dir.path().join("cache.db"));

        source.store(&[sathiya()]).unwrap();
        source.store(&[]).unwrap();

        assert!(source.fetch().unwrap().is_empty());
    }

    #[test]
    fn odd_column_values_read_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let source = SqliteSource::new(dir.path().join("cache.db"));
        let conn = source.open().unwrap();
        conn.execute(
            "INSERT INTO patients (id, name, age, target_inr, missed_doses) VALUES (?, ?, ?, ?, ?)",
            params!["X1", "Odd", "forty", "high", "not json"],
        )
        .unwrap();

        let patients = source.fetch().unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].name.as_deref(), Some("Odd"));
        assert_eq!(patients[0].age, None);
        assert_eq!(patients[0].target_inr, None);
        assert!(patients[0].missed_doses.is_empty());
    }
}
