//! Admitted-patients resolver.
//!
//! The backend has gone through several generations of admission
//! endpoints, and deployments differ in which of them actually work.
//! The resolver tries an ordered chain of candidates and returns the
//! first usable result, degrading eventually to bundled sample records
//! so the caller always has something to render. Degraded results carry
//! a human-readable warning; ordinary backend failures never surface as
//! errors.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, Envelope};
use crate::error::Error;
use crate::models::{AdmissionStatus, PatientRecord};

const WARN_FULLY_PAID_UNAVAILABLE: &str =
    "fully-paid filter unavailable, showing all admitted patients";
const WARN_PATIENTS_FALLBACK: &str =
    "using patients list as fallback, admission details may be limited";
const WARN_LEGACY_RECORDS: &str =
    "using legacy admission records, details may be incomplete";
const WARN_SAMPLE_DATA: &str =
    "backend unreachable, showing placeholder sample data";

/// Resolver outcome. `warning` is set whenever the list came from a
/// fallback or degraded source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPatients {
    pub patients: Vec<PatientRecord>,
    pub warning: Option<String>,
}

/// Why a candidate was skipped in favor of the next one.
#[derive(Debug)]
enum SkipReason {
    Unavailable(Error),
    NoData,
    Empty,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unavailable(err) => write!(f, "endpoint unavailable: {}", err),
            SkipReason::NoData => f.write_str("response carried no data array"),
            SkipReason::Empty => f.write_str("no matching records"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Candidate {
    FullyPaid,
    AdmittedCharges,
    Admissions,
    Patients,
    LegacyPair,
}

impl Candidate {
    fn name(&self) -> &'static str {
        match self {
            Candidate::FullyPaid => "discharge/fully-paid-patients",
            Candidate::AdmittedCharges => "patient-charges/admitted-patients",
            Candidate::Admissions => "patient-admissions",
            Candidate::Patients => "patients",
            Candidate::LegacyPair => "patient-admission+patients",
        }
    }
}

const CHAIN: [Candidate; 5] = [
    Candidate::FullyPaid,
    Candidate::AdmittedCharges,
    Candidate::Admissions,
    Candidate::Patients,
    Candidate::LegacyPair,
];

#[derive(Debug, Clone)]
pub struct PatientResolver {
    api: ApiClient,
}

impl PatientResolver {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Produce the best-available list of currently-admitted patients
    /// for a facility. Fails hard only for a missing facility id; every
    /// backend failure degrades through the chain instead.
    #[instrument(skip(self), fields(facility_id = %facility_id))]
    pub async fn resolve_admitted(
        &self,
        facility_id: &str,
        search: Option<&str>,
    ) -> Result<ResolvedPatients, Error> {
        if facility_id.trim().is_empty() {
            return Err(Error::MissingFacility);
        }

        for candidate in CHAIN {
            match self.attempt(candidate, facility_id, search).await {
                Ok(resolved) => {
                    info!(
                        source = candidate.name(),
                        count = resolved.patients.len(),
                        degraded = resolved.warning.is_some(),
                        "resolved admitted patients"
                    );
                    return Ok(resolved);
                }
                Err(reason) => debug!(source = candidate.name(), %reason, "skipping candidate"),
            }
        }

        warn!("every admission endpoint failed, falling back to sample data");
        Ok(ResolvedPatients {
            patients: sample_patients(),
            warning: Some(WARN_SAMPLE_DATA.to_string()),
        })
    }

    async fn attempt(
        &self,
        candidate: Candidate,
        facility_id: &str,
        search: Option<&str>,
    ) -> Result<ResolvedPatients, SkipReason> {
        match candidate {
            Candidate::FullyPaid => self.fully_paid(facility_id, search).await,
            Candidate::AdmittedCharges => self.admitted_charges(facility_id).await,
            Candidate::Admissions => self.admissions(facility_id).await,
            Candidate::Patients => self.patients(facility_id).await,
            Candidate::LegacyPair => self.legacy_pair(facility_id).await,
        }
    }

    async fn fetch(
        &self,
        facility_id: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Envelope, SkipReason> {
        self.api
            .get(facility_id, path, query)
            .await
            .map_err(SkipReason::Unavailable)
    }

    /// Step 1: discharge-eligible fully-paid patients, search-filtered
    /// server-side. Structural success returns directly, even when the
    /// list is empty.
    async fn fully_paid(
        &self,
        facility_id: &str,
        search: Option<&str>,
    ) -> Result<ResolvedPatients, SkipReason> {
        let mut query = Vec::new();
        if let Some(term) = search {
            query.push(("search", term));
        }
        let env = self
            .fetch(facility_id, "discharge/fully-paid-patients", &query)
            .await?;
        if !env.success {
            return Err(SkipReason::NoData);
        }
        let rows = env.rows().ok_or(SkipReason::NoData)?;
        Ok(ResolvedPatients {
            patients: rows.iter().filter_map(PatientRecord::from_value).collect(),
            warning: None,
        })
    }

    /// Step 2: general admitted-patient charges list; no server-side
    /// search support.
    async fn admitted_charges(&self, facility_id: &str) -> Result<ResolvedPatients, SkipReason> {
        let env = self
            .fetch(facility_id, "patient-charges/admitted-patients", &[])
            .await?;
        if !env.success {
            return Err(SkipReason::NoData);
        }
        let rows = env.rows().ok_or(SkipReason::NoData)?;
        Ok(ResolvedPatients {
            patients: rows.iter().filter_map(PatientRecord::from_value).collect(),
            warning: Some(WARN_FULLY_PAID_UNAVAILABLE.to_string()),
        })
    }

    /// Step 3: admissions with nested patient shapes, filtered
    /// client-side to in-facility statuses.
    async fn admissions(&self, facility_id: &str) -> Result<ResolvedPatients, SkipReason> {
        let env = self.fetch(facility_id, "patient-admissions", &[]).await?;
        let rows = env.rows().ok_or(SkipReason::NoData)?;
        let patients: Vec<PatientRecord> =
            rows.iter().filter_map(PatientRecord::from_admission).collect();
        if patients.is_empty() {
            return Err(SkipReason::Empty);
        }
        Ok(ResolvedPatients {
            patients,
            warning: None,
        })
    }

    /// Step 4: generic patients list with no admission concept; every
    /// returned patient is treated as admitted.
    async fn patients(&self, facility_id: &str) -> Result<ResolvedPatients, SkipReason> {
        let env = self.fetch(facility_id, "patients", &[]).await?;
        let rows = env.rows().ok_or(SkipReason::NoData)?;
        let patients: Vec<PatientRecord> = rows
            .iter()
            .filter_map(PatientRecord::from_value)
            .map(|mut p| {
                p.status = AdmissionStatus::Admitted;
                p
            })
            .collect();
        if patients.is_empty() {
            return Err(SkipReason::Empty);
        }
        Ok(ResolvedPatients {
            patients,
            warning: Some(WARN_PATIENTS_FALLBACK.to_string()),
        })
    }

    /// Step 5: legacy alias pair, heuristically filtered for records with
    /// an admission date and no discharge date.
    async fn legacy_pair(&self, facility_id: &str) -> Result<ResolvedPatients, SkipReason> {
        for path in ["patient-admission", "patients"] {
            let env = match self.fetch(facility_id, path, &[]).await {
                Ok(env) => env,
                Err(reason) => {
                    debug!(path, %reason, "legacy endpoint skipped");
                    continue;
                }
            };
            let rows = match env.rows() {
                Some(rows) => rows,
                None => continue,
            };
            let patients: Vec<PatientRecord> = rows
                .iter()
                .filter(|row| PatientRecord::looks_admitted(row))
                .filter_map(PatientRecord::from_value)
                .collect();
            if !patients.is_empty() {
                return Ok(ResolvedPatients {
                    patients,
                    warning: Some(WARN_LEGACY_RECORDS.to_string()),
                });
            }
        }
        Err(SkipReason::Empty)
    }
}

/// Bundled placeholder records for the terminal fallback. All fictional.
pub fn sample_patients() -> Vec<PatientRecord> {
    fn record(
        id: &str,
        first: &str,
        middle: &str,
        last: &str,
        room: &str,
        date: (i32, u32, u32),
        status: AdmissionStatus,
    ) -> PatientRecord {
        PatientRecord {
            id: id.to_string(),
            first_name: first.to_string(),
            middle_name: middle.to_string(),
            last_name: last.to_string(),
            room_number: room.to_string(),
            // Constructed from literals, always in range.
            admission_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            status,
        }
    }

    vec![
        record("sample-1", "Maria", "L", "Santos", "101", (2025, 6, 2), AdmissionStatus::Admitted),
        record("sample-2", "Angelica", "", "Cruz", "102", (2025, 6, 5), AdmissionStatus::InLabor),
        record("sample-3", "Jasmine", "D", "Reyes", "201", (2025, 6, 7), AdmissionStatus::Delivered),
        record("sample-4", "Katrina", "", "Mendoza", "N/A", (2025, 6, 9), AdmissionStatus::Admitted),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_dataset_has_four_records() {
        let samples = sample_patients();
        assert_eq!(samples.len(), 4);
        assert!(samples.iter().all(|p| p.id.starts_with("sample-")));
    }

    #[test]
    fn sample_warning_names_sample_data() {
        assert!(WARN_SAMPLE_DATA.contains("sample data"));
    }
}
