//! Birthcare facility administration toolkit
//!
//! CLI entry point: admitted-patient listings, per-patient billing
//! position, and an auto-refreshing admitted-patients view.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use birthcare::api::ApiClient;
use birthcare::billing::{BillingAggregator, BillingSnapshot};
use birthcare::config;
use birthcare::poll::Poller;
use birthcare::resolver::{PatientResolver, ResolvedPatients};

#[derive(Parser)]
#[command(name = "birthcare", about = "Birthcare facility administration toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Override the configured API base URL
    #[arg(long)]
    base_url: Option<String>,
    /// Override the configured bearer token
    #[arg(long)]
    token: Option<String>,
    /// Emit canonical JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List currently-admitted patients for a facility
    Admitted {
        facility_id: String,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a patient's billing position
    Billing {
        facility_id: String,
        patient_id: String,
    },
    /// Auto-refreshing admitted-patients view (Ctrl-C to stop)
    Watch {
        facility_id: String,
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = config::load_settings()?;
    if let Some(base_url) = &cli.base_url {
        settings.api.base_url = base_url.clone();
    }
    if let Some(token) = &cli.token {
        settings.api.token = Some(token.clone());
    }

    let api = ApiClient::from_settings(&settings.api)?;

    match &cli.command {
        Commands::Admitted {
            facility_id,
            search,
        } => {
            let resolver = PatientResolver::new(api);
            let resolved = resolver
                .resolve_admitted(facility_id, search.as_deref())
                .await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&resolved)?);
            } else {
                print_patients(&resolved);
            }
        }
        Commands::Billing {
            facility_id,
            patient_id,
        } => {
            let aggregator = BillingAggregator::new(api);
            let snapshot = aggregator.patient_billing(facility_id, patient_id).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_billing(&snapshot);
            }
        }
        Commands::Watch {
            facility_id,
            interval_secs,
        } => {
            let period = Duration::from_secs(interval_secs.unwrap_or(settings.poll.interval_secs));
            let resolver = PatientResolver::new(api);
            let facility = facility_id.clone();
            let poller = Poller::spawn(period, move || {
                let resolver = resolver.clone();
                let facility = facility.clone();
                async move {
                    match resolver.resolve_admitted(&facility, None).await {
                        Ok(resolved) => print_patients(&resolved),
                        Err(err) => error!(%err, "refresh failed"),
                    }
                }
            });
            tokio::signal::ctrl_c().await?;
            poller.stop().await;
        }
    }

    Ok(())
}

fn print_patients(resolved: &ResolvedPatients) {
    if let Some(warning) = &resolved.warning {
        warn!("{}", warning);
    }
    println!(
        "{:<12} {:<28} {:<6} {:<12} {}",
        "ID", "NAME", "ROOM", "ADMITTED", "STATUS"
    );
    for patient in &resolved.patients {
        println!(
            "{:<12} {:<28} {:<6} {:<12} {}",
            patient.id,
            patient.full_name(),
            patient.room_number,
            patient.admission_date,
            patient.status
        );
    }
    println!("{} patient(s)", resolved.patients.len());
}

fn print_billing(snapshot: &BillingSnapshot) {
    if snapshot.charges.is_empty() && snapshot.totals.total_charges == 0.0 {
        println!("no bills yet");
        return;
    }

    println!("{:<32} {:>4} {:>12} {:>12}", "SERVICE", "QTY", "UNIT", "TOTAL");
    for charge in &snapshot.charges {
        println!(
            "{:<32} {:>4} {:>12.2} {:>12.2}",
            charge.service_name, charge.quantity, charge.unit_price, charge.total_amount
        );
    }
    for payment in &snapshot.payments {
        println!(
            "payment {:>12.2}  bill {}",
            payment.amount,
            payment.bill_number.as_deref().unwrap_or("-")
        );
    }

    let totals = &snapshot.totals;
    println!("total charges:  {:>12.2}", totals.total_charges);
    println!("total payments: {:>12.2}", totals.total_payments);
    // Display clamps at zero; the aggregator itself does not.
    let balance = totals.outstanding_balance.max(0.0);
    print!("balance due:    {:>12.2}", balance);
    if totals.outstanding_balance < 0.0 {
        print!("  (overpaid by {:.2})", -totals.outstanding_balance);
    }
    println!();
    println!("status: {:?}", totals.status());
}
