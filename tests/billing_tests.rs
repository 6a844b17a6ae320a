//! Billing aggregation against a mock facility API.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use birthcare::api::ApiClient;
use birthcare::billing::BillingAggregator;
use birthcare::models::BillingStatus;
use birthcare::Error;

const FACILITY: &str = "fac-1";
const PATIENT: &str = "42";

async fn aggregator_for(server: &MockServer) -> BillingAggregator {
    let api = ApiClient::new(&server.uri(), None).expect("valid mock server url");
    BillingAggregator::new(api)
}

fn facility_path(endpoint: &str) -> String {
    format!("/api/birthcare/{}/{}", FACILITY, endpoint)
}

fn bill_summary() -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "has_bill": true,
            "total_amount": 34500.0,
            "bill_items": [
                {
                    "service_name": "Normal delivery package",
                    "description": "Delivery, room and board",
                    "quantity": 1,
                    "unit_price": "30000.00",
                    "total_amount": "30000.00",
                    "charge_date": "2025-07-01"
                },
                {
                    "service_name": "Newborn screening",
                    "quantity": 2,
                    "unit_price": 1000,
                    "total_amount": 2000,
                    "charge_date": "2025-07-02"
                }
            ]
        }
    })
}

#[tokio::test]
async fn no_bill_yet_yields_zero_totals_without_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(facility_path("patient-charges/bill-summary/42")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": {"has_bill": false}})),
        )
        .mount(&server)
        .await;

    let snapshot = aggregator_for(&server)
        .await
        .patient_billing(FACILITY, PATIENT)
        .await
        .unwrap();

    assert!(snapshot.charges.is_empty());
    assert!(snapshot.bills.is_empty());
    assert!(snapshot.payments.is_empty());
    assert_eq!(snapshot.totals.total_charges, 0.0);
    assert_eq!(snapshot.totals.total_payments, 0.0);
    assert_eq!(snapshot.totals.outstanding_balance, 0.0);
}

#[tokio::test]
async fn full_enrichment_takes_maximum_of_charge_sources() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(facility_path("patient-charges/bill-summary/42")))
        .respond_with(ResponseTemplate::new(200).set_body_json(bill_summary()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(facility_path("payments")))
        .and(query_param("patient_id", PATIENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": 7, "bill_number": "B-007", "total_amount": 34500.0}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(facility_path("payments/7/payments")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"amount": 20000.0, "payment_date": "2025-07-10"},
                {"amount": "9500.00", "payment_date": "2025-07-20"}
            ]
        })))
        .mount(&server)
        .await;

    let snapshot = aggregator_for(&server)
        .await
        .patient_billing(FACILITY, PATIENT)
        .await
        .unwrap();

    // Mapped charges sum to 32 000 but both the bill list and the
    // summary report 34 500; the aggregator takes the maximum.
    assert_eq!(snapshot.charges.len(), 2);
    assert_eq!(snapshot.bills.len(), 1);
    assert_eq!(snapshot.totals.total_charges, 34_500.0);
    assert_eq!(snapshot.totals.total_payments, 29_500.0);
    assert_eq!(snapshot.totals.outstanding_balance, 5_000.0);
    assert_eq!(snapshot.totals.status(), BillingStatus::Partial);

    let payment = &snapshot.payments[0];
    assert_eq!(payment.bill_number.as_deref(), Some("B-007"));
    assert_eq!(payment.bill_id.as_deref(), Some("7"));
}

#[tokio::test]
async fn unavailable_payments_endpoint_leaves_result_partial() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(facility_path("patient-charges/bill-summary/42")))
        .respond_with(ResponseTemplate::new(200).set_body_json(bill_summary()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(facility_path("payments")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let snapshot = aggregator_for(&server)
        .await
        .patient_billing(FACILITY, PATIENT)
        .await
        .unwrap();

    assert!(snapshot.bills.is_empty());
    assert!(snapshot.payments.is_empty());
    // Summary total still wins over the mapped charge sum of 32 000.
    assert_eq!(snapshot.totals.total_charges, 34_500.0);
    assert_eq!(snapshot.totals.status(), BillingStatus::Unpaid);
}

#[tokio::test]
async fn one_failed_payment_history_does_not_abort_the_rest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(facility_path("patient-charges/bill-summary/42")))
        .respond_with(ResponseTemplate::new(200).set_body_json(bill_summary()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(facility_path("payments")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"id": 7, "bill_number": "B-007"},
                {"id": 8, "bill_number": "B-008"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(facility_path("payments/7/payments")))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(facility_path("payments/8/payments")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"amount": 5000.0}]
        })))
        .mount(&server)
        .await;

    let snapshot = aggregator_for(&server)
        .await
        .patient_billing(FACILITY, PATIENT)
        .await
        .unwrap();

    assert_eq!(snapshot.bills.len(), 2);
    assert_eq!(snapshot.payments.len(), 1);
    assert_eq!(snapshot.payments[0].bill_number.as_deref(), Some("B-008"));
    assert_eq!(snapshot.totals.total_payments, 5_000.0);
}

#[tokio::test]
async fn primary_summary_failure_is_a_hard_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(facility_path("patient-charges/bill-summary/42")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = aggregator_for(&server)
        .await
        .patient_billing(FACILITY, PATIENT)
        .await;

    match result {
        Err(Error::Status { status, .. }) => assert_eq!(status.as_u16(), 500),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_patient_id_is_rejected() {
    let server = MockServer::start().await;
    let result = aggregator_for(&server)
        .await
        .patient_billing(FACILITY, " ")
        .await;
    assert!(matches!(result, Err(Error::MissingPatient)));
}
