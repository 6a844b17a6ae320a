//! Canonical data models for the birthcare admin toolkit.

pub mod billing;
pub mod fields;
pub mod patient;

pub use billing::{billing_status, BillingStatus, BillingTotals, Charge, Payment};
pub use patient::{AdmissionStatus, PatientRecord};
