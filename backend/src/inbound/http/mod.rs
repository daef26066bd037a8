//! HTTP inbound adapter exposing REST endpoints.
//!
//! Account routes sit at the root (`/register`, `/login`, `/me`); vitals,
//! predictions, alerts, and status routes sit under `/api`.

pub mod accounts;
pub mod alerts;
pub mod auth;
pub mod envelope;
pub mod error;
pub mod health;
pub mod measurements;
pub mod predictions;
pub mod state;
#[cfg(test)]
pub mod test_utils;

use actix_web::web;

pub use error::ApiResult;

/// Register every REST route plus the JSON extractor error handler.
///
/// Callers still provide `web::Data<HttpState>` and `web::Data<HealthState>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            crate::domain::Error::invalid_request(err.to_string()).into()
        }))
        .service(accounts::register)
        .service(accounts::login)
        .service(accounts::me)
        .service(accounts::update_symptoms)
        .service(health::ready)
        .service(health::live)
        .service(
            web::scope("/api")
                .service(health::ml_health)
                .service(health::db_status)
                .service(measurements::create_measurement)
                .service(measurements::create_hypertension)
                .service(predictions::predict)
                .service(predictions::predict_heart_from_form)
                .service(alerts::list_alerts)
                .service(alerts::get_alert)
                .service(alerts::mark_read)
                .service(alerts::mark_unread),
        );
}
