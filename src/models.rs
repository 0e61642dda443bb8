//! Data models for VitaLink.
//!
//! A [`Patient`] is the record a doctor browses. Only the identifier is
//! required; every other field may be absent or malformed on the wire and
//! decodes to `None` instead of failing the whole collection.
//!
//! Two wire shapes are accepted: the dashboard's camelCase records
//! (`targetINR`, `latestINR`, `prescription`) and the stored backend
//! records (`target_inr_min`/`target_inr_max`, `inr_reports`,
//! `dosage_schedule`, structured `medical_history`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Days of the week in prescription order.
pub const WEEKDAYS: [&str; 7] = ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

/// Represents a patient under anticoagulant therapy.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "wire::PatientRecord")]
pub struct Patient {
    /// The server-assigned unique ID.
    pub id: String,
    /// The patient's full name.
    pub name: Option<String>,
    /// Age in years.
    pub age: Option<u32>,
    /// Gender as reported by the API ("M", "F", "Male", ...).
    pub gender: Option<String>,
    /// Name of the assigned doctor.
    pub doctor_name: Option<String>,
    /// Name of the assigned caretaker.
    pub caretaker_name: Option<String>,
    pub contact: Option<String>,
    pub kin_name: Option<String>,
    pub kin_contact: Option<String>,
    /// Anticoagulant being taken (e.g. "Acitrom").
    pub therapy: Option<String>,
    pub therapy_start_date: Option<String>,
    pub target_inr: Option<InrRange>,
    pub latest_inr: Option<f64>,
    pub latest_inr_date: Option<String>,
    /// Diagnoses joined into one line, e.g. `RHD (5 Years); CVA`.
    pub medical_history: Option<String>,
    pub missed_doses: Vec<String>,
    /// Weekly dose keyed by day (`MON` .. `SUN`).
    pub prescription: BTreeMap<String, String>,
    /// INR test results, newest first.
    pub inr_reports: Vec<InrReading>,
}

/// Target INR band, e.g. 2.5 - 3.5.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InrRange {
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for InrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}

/// One INR test result.
///
/// Stored as JSON in the SQLite cache, hence the serde derives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InrReading {
    pub date: Option<String>,
    pub value: f64,
}

/// Fields a patient collection can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    #[default]
    Name,
    Age,
    Gender,
    Doctor,
    Caretaker,
}

impl SortField {
    /// All sortable fields, in column order.
    pub const ALL: [SortField; 5] = [
        SortField::Name,
        SortField::Age,
        SortField::Gender,
        SortField::Doctor,
        SortField::Caretaker,
    ];

    /// Column header label.
    pub fn label(self) -> &'static str {
        match self {
            SortField::Name => "Name",
            SortField::Age => "Age",
            SortField::Gender => "Gender",
            SortField::Doctor => "Doctor",
            SortField::Caretaker => "Caretaker",
        }
    }
}

/// Fields the text query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Name,
    Doctor,
    Caretaker,
}

impl SearchField {
    pub const ALL: [SearchField; 3] = [
        SearchField::Name,
        SearchField::Doctor,
        SearchField::Caretaker,
    ];
}

/// The value a patient holds for a sortable field, with missing values
/// already replaced by their defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Number(u32),
    Text(&'a str),
}

impl Patient {
    /// Looks up a searchable field. Missing values read as the empty string.
    pub fn search_text(&self, field: SearchField) -> &str {
        match field {
            SearchField::Name => or_empty(&self.name),
            SearchField::Doctor => or_empty(&self.doctor_name),
            SearchField::Caretaker => or_empty(&self.caretaker_name),
        }
    }

    /// Looks up a sortable field. Missing text reads as `""`, missing age as `0`.
    pub fn sort_value(&self, field: SortField) -> FieldValue<'_> {
        match field {
            SortField::Age => FieldValue::Number(self.age.unwrap_or_default()),
            SortField::Name => FieldValue::Text(or_empty(&self.name)),
            SortField::Gender => FieldValue::Text(or_empty(&self.gender)),
            SortField::Doctor => FieldValue::Text(or_empty(&self.doctor_name)),
            SortField::Caretaker => FieldValue::Text(or_empty(&self.caretaker_name)),
        }
    }

    /// Text shown in a table cell for the given column.
    pub fn cell(&self, field: SortField) -> String {
        match field {
            SortField::Age => self.age.map(|a| a.to_string()).unwrap_or_default(),
            SortField::Gender => gender_label(or_empty(&self.gender)).to_string(),
            SortField::Name | SortField::Doctor | SortField::Caretaker => {
                match self.sort_value(field) {
                    FieldValue::Text(t) => t.to_string(),
                    FieldValue::Number(n) => n.to_string(),
                }
            }
        }
    }

    /// Display name, falling back to the ID for unnamed records.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

fn or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

/// Expands the API's single-letter gender codes.
pub fn gender_label(raw: &str) -> &str {
    match raw {
        "M" | "m" => "Male",
        "F" | "f" => "Female",
        "O" | "o" => "Other",
        other => other,
    }
}

/// The record as it arrives, before both wire shapes are folded together.
mod wire {
    use super::lenient;
    use super::{InrRange, InrReading, Patient};
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PatientRecord {
        #[serde(alias = "ID", deserialize_with = "lenient::id")]
        id: String,
        #[serde(default, deserialize_with = "lenient::text")]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient::age")]
        age: Option<u32>,
        #[serde(default, deserialize_with = "lenient::text")]
        gender: Option<String>,
        #[serde(default, alias = "doctor", deserialize_with = "lenient::text")]
        doctor_name: Option<String>,
        #[serde(default, deserialize_with = "lenient::text")]
        caretaker_name: Option<String>,
        #[serde(default, alias = "contactNumber", deserialize_with = "lenient::text")]
        contact: Option<String>,
        #[serde(default, alias = "kin_name", deserialize_with = "lenient::text")]
        kin_name: Option<String>,
        #[serde(default, alias = "kin_contact", deserialize_with = "lenient::text")]
        kin_contact: Option<String>,
        #[serde(default, deserialize_with = "lenient::text")]
        therapy: Option<String>,
        #[serde(
            default,
            alias = "therapy_start_date",
            deserialize_with = "lenient::text"
        )]
        therapy_start_date: Option<String>,
        #[serde(
            default,
            alias = "targetINR",
            alias = "target_inr",
            deserialize_with = "lenient::inr_range"
        )]
        target_inr: Option<InrRange>,
        #[serde(default, rename = "target_inr_min", deserialize_with = "lenient::number")]
        target_inr_min: Option<f64>,
        #[serde(default, rename = "target_inr_max", deserialize_with = "lenient::number")]
        target_inr_max: Option<f64>,
        #[serde(default, alias = "latestINR", deserialize_with = "lenient::number")]
        latest_inr: Option<f64>,
        #[serde(default, alias = "latestINRDate", deserialize_with = "lenient::text")]
        latest_inr_date: Option<String>,
        #[serde(
            default,
            alias = "medical_history",
            deserialize_with = "lenient::history"
        )]
        medical_history: Option<String>,
        #[serde(default, alias = "missed_doses", deserialize_with = "lenient::strings")]
        missed_doses: Vec<String>,
        #[serde(default, deserialize_with = "lenient::prescription")]
        prescription: BTreeMap<String, String>,
        #[serde(default, rename = "dosage_schedule", deserialize_with = "lenient::prescription")]
        dosage_schedule: BTreeMap<String, String>,
        #[serde(default, rename = "inr_reports", deserialize_with = "lenient::inr_reports")]
        inr_reports: Vec<InrReading>,
    }

    impl From<PatientRecord> for Patient {
        fn from(record: PatientRecord) -> Self {
            let target_inr = record.target_inr.or_else(|| {
                record
                    .target_inr_min
                    .zip(record.target_inr_max)
                    .map(|(min, max)| InrRange { min, max })
            });
            let latest = record.inr_reports.first();
            let latest_inr = record.latest_inr.or_else(|| latest.map(|r| r.value));
            let latest_inr_date = record
                .latest_inr_date
                .or_else(|| latest.and_then(|r| r.date.clone()));
            let prescription = if record.prescription.is_empty() {
                record.dosage_schedule
            } else {
                record.prescription
            };

            Patient {
                id: record.id,
                name: record.name,
                age: record.age,
                gender: record.gender,
                doctor_name: record.doctor_name,
                caretaker_name: record.caretaker_name,
                contact: record.contact,
                kin_name: record.kin_name,
                kin_contact: record.kin_contact,
                therapy: record.therapy,
                therapy_start_date: record.therapy_start_date,
                target_inr,
                latest_inr,
                latest_inr_date,
                medical_history: record.medical_history,
                missed_doses: record.missed_doses,
                prescription,
                inr_reports: record.inr_reports,
            }
        }
    }
}

/// Deserializers that never fail on a bad value, only on a missing ID.
mod lenient {
    use super::{InrRange, InrReading};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::collections::BTreeMap;

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "patient id must be a string or number, got {other}"
            ))),
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar(&Value::deserialize(d)?))
    }

    fn scalar(v: &Value) -> Option<String> {
        match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn age<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(float(&Value::deserialize(d)?))
    }

    fn float(v: &Value) -> Option<f64> {
        match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    /// Accepts free text or `[{ "diagnosis": "RHD", "duration": 5, "durationUnit": "Years" }]`.
    pub fn history<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(entries) => {
                let diagnoses: Vec<String> = entries.iter().filter_map(diagnosis).collect();
                (!diagnoses.is_empty()).then(|| diagnoses.join("; "))
            }
            other => scalar(&other),
        })
    }

    fn diagnosis(entry: &Value) -> Option<String> {
        if let Value::String(s) = entry {
            return (!s.trim().is_empty()).then(|| s.clone());
        }
        let name = entry.get("diagnosis").and_then(scalar)?;
        if name.trim().is_empty() {
            return None;
        }
        let duration = entry.get("duration").and_then(scalar).unwrap_or_default();
        let unit = entry.get("durationUnit").and_then(scalar).unwrap_or_default();
        Some(match (duration.trim(), unit.trim()) {
            ("", _) => name,
            (duration, "") => format!("{name} ({duration})"),
            (duration, unit) => format!("{name} ({duration} {unit})"),
        })
    }

    /// Accepts `{ "min": 2.5, "max": 3.5 }` or `"2.5 - 3.5"`.
    pub fn inr_range<'de, D: Deserializer<'de>>(d: D) -> Result<Option<InrRange>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Object(map) => {
                let min = map.get("min").and_then(Value::as_f64);
                let max = map.get("max").and_then(Value::as_f64);
                min.zip(max).map(|(min, max)| InrRange { min, max })
            }
            Value::String(s) => parse_range(&s),
            _ => None,
        })
    }

    /// Accepts `[{ "date": "...", "inr_value": 2.9 }]`. Entries without a
    /// readable value are dropped; order is kept.
    pub fn inr_reports<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<InrReading>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(entries) => entries
                .iter()
                .filter_map(|entry| {
                    let value = entry
                        .get("inr_value")
                        .or_else(|| entry.get("value"))
                        .and_then(float)?;
                    Some(InrReading {
                        date: entry.get("date").and_then(scalar),
                        value,
                    })
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    /// Accepts `{ "MON": "4.0 mg" }`, `{ "mon": { "enabled": true, "value": "4" } }`
    /// or `[{ "day": "MON", "dosage": 4.0 }]`.
    pub fn prescription<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<BTreeMap<String, String>, D::Error> {
        let mut out = BTreeMap::new();
        match Value::deserialize(d)? {
            Value::Object(map) => {
                for (day, dose) in map {
                    if let Some(dose) = dose_text(&dose) {
                        out.insert(day.to_uppercase(), dose);
                    }
                }
            }
            Value::Array(entries) => {
                for entry in entries {
                    let day = entry.get("day").and_then(Value::as_str);
                    let dose = entry
                        .get("dosage")
                        .or_else(|| entry.get("dose"))
                        .and_then(dose_text);
                    if let (Some(day), Some(dose)) = (day, dose) {
                        out.insert(day.to_uppercase(), dose);
                    }
                }
            }
            _ => {}
        }
        Ok(out)
    }

    fn dose_text(v: &Value) -> Option<String> {
        match v {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(format!("{n} mg")),
            Value::Object(map) => {
                if map.get("enabled").and_then(Value::as_bool) == Some(false) {
                    return None;
                }
                map.get("value").and_then(dose_text)
            }
            _ => None,
        }
    }

    pub fn parse_range(s: &str) -> Option<InrRange> {
        let (min, max) = s.split_once('-')?;
        Some(InrRange {
            min: min.trim().parse().ok()?,
            max: max.trim().parse().ok()?,
        })
    }
}

pub(crate) use lenient::parse_range;
