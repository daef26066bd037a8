//! PostgreSQL adapters built on Diesel with `diesel-async` and `bb8`.
//!
//! Row structs in [`models`] stay private to this module; each repository
//! converts rows to domain types and maps Diesel failures to its port's
//! `Connection`/`Query` errors.

mod diesel_alert_repository;
mod diesel_measurement_repository;
mod diesel_prediction_repository;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
mod postgres_store_status;
mod schema;

pub use diesel_alert_repository::DieselAlertRepository;
pub use diesel_measurement_repository::{
    DieselHypertensionRepository, DieselMeasurementRepository,
};
pub use diesel_prediction_repository::DieselPredictionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
pub use postgres_store_status::PostgresStoreStatus;
