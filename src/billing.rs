//! Billing aggregator.
//!
//! Computes a patient's current billing position from potentially
//! incomplete backend data. The bill-summary call is the primary source
//! and its failure is the one error surfaced to the caller; payment
//! enrichment is best-effort and any of its failures leaves the result
//! partial instead of failed.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::api::ApiClient;
use crate::error::Error;
use crate::models::fields::{array_field, bool_field, num_field, str_field};
use crate::models::{BillingTotals, Charge, Payment};

/// A patient's aggregated billing position. Recomputed on every call,
/// never cached. `bills` keeps the raw records from the secondary
/// endpoint so nothing the backend sent is lost.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSnapshot {
    pub bills: Vec<Value>,
    pub charges: Vec<Charge>,
    pub payments: Vec<Payment>,
    pub totals: BillingTotals,
}

#[derive(Debug, Clone)]
pub struct BillingAggregator {
    api: ApiClient,
}

impl BillingAggregator {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Aggregate charges, payments and totals for one patient.
    ///
    /// `has_bill = false` from the summary is a legitimate empty state
    /// and yields an all-zero snapshot, not an error.
    #[instrument(skip(self), fields(facility_id = %facility_id, patient_id = %patient_id))]
    pub async fn patient_billing(
        &self,
        facility_id: &str,
        patient_id: &str,
    ) -> Result<BillingSnapshot, Error> {
        if patient_id.trim().is_empty() {
            return Err(Error::MissingPatient);
        }

        let summary = self
            .api
            .get(
                facility_id,
                &format!("patient-charges/bill-summary/{}", patient_id),
                &[],
            )
            .await?;

        let has_bill = bool_field(&summary.data, &["has_bill", "hasBill"]).unwrap_or(false);
        if !summary.success || !has_bill {
            debug!("no bills for patient yet");
            return Ok(BillingSnapshot::default());
        }

        let charges: Vec<Charge> = array_field(&summary.data, &["bill_items", "billItems", "items"])
            .map(|rows| rows.iter().map(Charge::from_value).collect())
            .unwrap_or_default();
        let summary_total =
            num_field(&summary.data, &["total_amount", "totalAmount", "total"]).unwrap_or(0.0);

        let (bills, payments) = self.enrich_payments(facility_id, patient_id).await;

        let charge_sum: f64 = charges.iter().map(|c| c.total_amount).sum();
        let bill_sum: f64 = bills
            .iter()
            .filter_map(|b| num_field(b, &["total_amount", "totalAmount", "amount"]))
            .sum();
        // The three sources can disagree when enrichment is partial; the
        // maximum is the defensive estimate of what is actually owed.
        let total_charges = charge_sum.max(bill_sum).max(summary_total);
        let total_payments: f64 = payments.iter().map(|p| p.amount).sum();
        let totals = BillingTotals::new(total_charges, total_payments);

        info!(
            charges = charges.len(),
            payments = payments.len(),
            outstanding = totals.outstanding_balance,
            "aggregated patient billing"
        );

        Ok(BillingSnapshot {
            bills,
            charges,
            payments,
            totals,
        })
    }

    /// Best-effort enrichment: the bills list for the patient, then a
    /// per-bill payment history. Every failure here is swallowed; a bill
    /// whose history is unavailable simply contributes no payments.
    async fn enrich_payments(
        &self,
        facility_id: &str,
        patient_id: &str,
    ) -> (Vec<Value>, Vec<Payment>) {
        let mut bills = Vec::new();
        let mut payments = Vec::new();

        let env = match self
            .api
            .get(facility_id, "payments", &[("patient_id", patient_id)])
            .await
        {
            Ok(env) => env,
            Err(err) => {
                debug!(%err, "payments endpoint unavailable, skipping enrichment");
                return (bills, payments);
            }
        };

        let rows = match env.rows() {
            Some(rows) => rows.to_vec(),
            None => return (bills, payments),
        };

        for bill in rows {
            let bill_id = str_field(&bill, &["id", "bill_id", "billId"]);
            let bill_number = str_field(&bill, &["bill_number", "billNumber"]);
            bills.push(bill.clone());

            let Some(bill_id) = bill_id else { continue };
            match self
                .api
                .get(facility_id, &format!("payments/{}/payments", bill_id), &[])
                .await
            {
                Ok(history) => {
                    if let Some(records) = history.rows() {
                        payments.extend(records.iter().map(|record| {
                            Payment::from_value(record, bill_number.clone(), Some(bill_id.clone()))
                        }));
                    }
                }
                Err(err) => debug!(bill_id = %bill_id, %err, "payment history unavailable for bill"),
            }
        }

        (bills, payments)
    }
}
