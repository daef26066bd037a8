//! List recent high-risk predictions with the alerts and vitals linked to them.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;

use clap::Parser;
use tokio::runtime::Builder;
use vitalwatch::domain::Prediction;
use vitalwatch::domain::ports::{AlertRepository, MeasurementRepository, PredictionRepository};
use vitalwatch::outbound::persistence::{
    DbPool, DieselAlertRepository, DieselMeasurementRepository, DieselPredictionRepository,
    PoolConfig,
};

const DATABASE_URL_ENV: &str = "APP_DATABASE_URL";

/// `risk-audit` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "risk-audit",
    about = "List recent high-risk predictions with their alerts and measurements",
    version
)]
struct CliArgs {
    /// Maximum number of predictions to list, newest first.
    #[arg(long, default_value_t = 50)]
    limit: usize,
    /// Database connection URL. Falls back to `APP_DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

struct Audit {
    predictions: DieselPredictionRepository,
    measurements: DieselMeasurementRepository,
    alerts: DieselAlertRepository,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url)?;
    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(2))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let audit = Audit {
        predictions: DieselPredictionRepository::new(pool.clone()),
        measurements: DieselMeasurementRepository::new(pool.clone()),
        alerts: DieselAlertRepository::new(pool),
    };

    let recent = audit
        .predictions
        .list_recent_high_risk(args.limit)
        .await
        .map_err(|error| io::Error::other(format!("list predictions: {error}")))?;
    println!("high_risk_predictions={}", recent.len());
    for prediction in &recent {
        audit.report(prediction).await?;
    }
    Ok(())
}

impl Audit {
    async fn report(&self, prediction: &Prediction) -> io::Result<()> {
        println!(
            "prediction={} created_at={} model={} patient={}",
            prediction.id,
            prediction.created_at.to_rfc3339(),
            prediction.model,
            prediction
                .patient_id
                .map_or_else(|| "-".to_owned(), |id| id.to_string()),
        );
        let Some(measurement_id) = prediction.measurement_id else {
            println!("  measurement=-");
            return Ok(());
        };

        let measurement = self
            .measurements
            .find_by_id(&measurement_id)
            .await
            .map_err(|error| io::Error::other(format!("load measurement: {error}")))?;
        match measurement {
            Some(found) => println!(
                "  measurement={} vitals={:?}",
                found.id,
                found.vitals.to_array()
            ),
            None => println!("  measurement={measurement_id} (missing)"),
        }

        let alerts = self
            .alerts
            .list_by_measurement(&measurement_id)
            .await
            .map_err(|error| io::Error::other(format!("load alerts: {error}")))?;
        for alert in alerts {
            println!(
                "  alert={} doctor={} read={} message={:?}",
                alert.id.0, alert.doctor_id, alert.read, alert.message
            );
        }
        Ok(())
    }
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    env::var(DATABASE_URL_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "database URL missing: set --database-url or APP_DATABASE_URL",
            )
        })
}
