//! Billing models and the pure status classification.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fields::{date_field, num_field, str_field};

/// One mapped bill item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    pub service_name: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_amount: f64,
    pub charge_date: Option<NaiveDate>,
}

impl Charge {
    pub fn from_value(item: &Value) -> Self {
        Self {
            service_name: str_field(item, &["service_name", "serviceName", "name"])
                .unwrap_or_default(),
            description: str_field(item, &["description", "details"]).unwrap_or_default(),
            quantity: num_field(item, &["quantity", "qty"])
                .map(|n| n as u32)
                .filter(|n| *n > 0)
                .unwrap_or(1),
            unit_price: num_field(item, &["unit_price", "unitPrice", "price"]).unwrap_or(0.0),
            total_amount: num_field(item, &["total_amount", "totalAmount", "amount"])
                .unwrap_or(0.0),
            charge_date: date_field(item, &["charge_date", "chargeDate", "created_at"]),
        }
    }
}

/// One payment collected against a bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub amount: f64,
    pub payment_date: Option<NaiveDate>,
    pub bill_number: Option<String>,
    pub bill_id: Option<String>,
}

impl Payment {
    pub fn from_value(record: &Value, bill_number: Option<String>, bill_id: Option<String>) -> Self {
        Self {
            amount: num_field(record, &["amount", "amount_paid", "payment_amount"]).unwrap_or(0.0),
            payment_date: date_field(record, &["payment_date", "paymentDate", "created_at"]),
            bill_number,
            bill_id,
        }
    }
}

/// Aggregate billing position. `outstanding_balance` may go negative on
/// overpayment; display layers clamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingTotals {
    pub total_charges: f64,
    pub total_payments: f64,
    pub outstanding_balance: f64,
}

impl BillingTotals {
    pub fn new(total_charges: f64, total_payments: f64) -> Self {
        Self {
            total_charges,
            total_payments,
            outstanding_balance: total_charges - total_payments,
        }
    }

    pub fn status(&self) -> BillingStatus {
        billing_status(self.total_charges, self.total_payments)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingStatus {
    Paid,
    Partial,
    Unpaid,
}

/// Classify a billing position from its totals. Pure, no I/O.
pub fn billing_status(total_charges: f64, total_payments: f64) -> BillingStatus {
    let balance = total_charges - total_payments;
    if balance <= 0.0 {
        BillingStatus::Paid
    } else if total_payments > 0.0 {
        BillingStatus::Partial
    } else {
        BillingStatus::Unpaid
    }
}
