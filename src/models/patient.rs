//! Canonical patient record and admission status.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use super::fields::{date_field, str_field};

/// Admission status, normalized to a single canonical casing at the
/// model boundary. Input parsing is case-insensitive and tolerates
/// `_`/space separators ("IN_LABOR", "in labor", "In-labor").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdmissionStatus {
    Admitted,
    InLabor,
    Delivered,
}

#[derive(Debug, Error)]
#[error("unrecognized admission status: {0}")]
pub struct ParseStatusError(String);

impl FromStr for AdmissionStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "admitted" => Ok(AdmissionStatus::Admitted),
            "in-labor" => Ok(AdmissionStatus::InLabor),
            "delivered" => Ok(AdmissionStatus::Delivered),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

impl fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AdmissionStatus::Admitted => "Admitted",
            AdmissionStatus::InLabor => "In-labor",
            AdmissionStatus::Delivered => "Delivered",
        })
    }
}

impl Serialize for AdmissionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AdmissionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Canonical patient record, constructed fresh on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub id: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub room_number: String,
    pub admission_date: NaiveDate,
    pub status: AdmissionStatus,
}

const ID_ALIASES: &[&str] = &["id", "patient_id", "patientId", "user_id"];
const FIRST_NAME_ALIASES: &[&str] = &["first_name", "firstName", "fname"];
const MIDDLE_NAME_ALIASES: &[&str] = &["middle_name", "middleName", "mname"];
const LAST_NAME_ALIASES: &[&str] = &["last_name", "lastName", "lname"];
const ROOM_ALIASES: &[&str] = &["room_number", "roomNumber", "room"];
const ADMISSION_DATE_ALIASES: &[&str] = &["admission_date", "admissionDate", "admitted_at", "created_at"];
const STATUS_ALIASES: &[&str] = &["status", "admission_status"];
const DISCHARGE_DATE_ALIASES: &[&str] = &["discharge_date", "dischargeDate", "discharged_at"];

fn id_of(record: &Value) -> Option<String> {
    str_field(record, ID_ALIASES)
}

fn status_of(record: &Value) -> Option<AdmissionStatus> {
    str_field(record, STATUS_ALIASES).and_then(|s| s.parse().ok())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl PatientRecord {
    /// Normalize a flat patient-shaped record. Returns `None` when no
    /// identifier can be derived, since a record without an id is
    /// unusable downstream.
    pub fn from_value(record: &Value) -> Option<Self> {
        let id = id_of(record)?;
        Some(Self {
            id,
            first_name: str_field(record, FIRST_NAME_ALIASES).unwrap_or_default(),
            middle_name: str_field(record, MIDDLE_NAME_ALIASES).unwrap_or_default(),
            last_name: str_field(record, LAST_NAME_ALIASES).unwrap_or_default(),
            room_number: str_field(record, ROOM_ALIASES).unwrap_or_else(|| "N/A".to_string()),
            admission_date: date_field(record, ADMISSION_DATE_ALIASES).unwrap_or_else(today),
            status: status_of(record).unwrap_or(AdmissionStatus::Admitted),
        })
    }

    /// Normalize an admission record, which nests patient identity under
    /// a `patient` object (or carries it flattened on the admission
    /// itself). Returns `None` unless the admission status parses to an
    /// in-facility status.
    pub fn from_admission(record: &Value) -> Option<Self> {
        let status = status_of(record)?;
        let patient = record.get("patient").unwrap_or(record);
        let id = id_of(patient).or_else(|| id_of(record))?;
        Some(Self {
            id,
            first_name: str_field(patient, FIRST_NAME_ALIASES)
                .or_else(|| str_field(record, FIRST_NAME_ALIASES))
                .unwrap_or_default(),
            middle_name: str_field(patient, MIDDLE_NAME_ALIASES)
                .or_else(|| str_field(record, MIDDLE_NAME_ALIASES))
                .unwrap_or_default(),
            last_name: str_field(patient, LAST_NAME_ALIASES)
                .or_else(|| str_field(record, LAST_NAME_ALIASES))
                .unwrap_or_default(),
            room_number: str_field(record, ROOM_ALIASES)
                .or_else(|| str_field(patient, ROOM_ALIASES))
                .unwrap_or_else(|| "N/A".to_string()),
            admission_date: date_field(record, ADMISSION_DATE_ALIASES).unwrap_or_else(today),
            status,
        })
    }

    /// Heuristic for legacy endpoints with no status concept: a record
    /// counts as currently admitted when it carries an admission date
    /// and no discharge date.
    pub fn looks_admitted(record: &Value) -> bool {
        date_field(record, ADMISSION_DATE_ALIASES).is_some()
            && str_field(record, DISCHARGE_DATE_ALIASES).is_none()
    }

    pub fn full_name(&self) -> String {
        let mut name = String::new();
        for part in [&self.first_name, &self.middle_name, &self.last_name] {
            if !part.is_empty() {
                if !name.is_empty() {
                    name.push(' ');
                }
                name.push_str(part);
            }
        }
        name
    }
}
