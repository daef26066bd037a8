//! Health endpoints: orchestration probes plus ML and store status.
//!
//! `/health/ready` and `/health/live` answer from process state only.
//! `/api/health` calls the model service and `/api/dbstatus` pings the store.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde_json::json;
use tracing::warn;

use crate::domain::ports::StoreStatusReport;

use super::state::HttpState;

/// Readiness and liveness flags shared with the server bootstrap.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Not ready, but live.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness so orchestrators stop routing during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Readiness probe. 200 once startup finished, 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe. 200 while alive, 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

/// Node status plus whatever the model service answers at its root.
#[utoipa::path(
    get,
    path = "/api/health",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "`{node, mlStatus, mlBody}`"),
        (status = 502, description = "`{node, ml: \"unreachable\", error}`")
    )
)]
#[get("/health")]
pub async fn ml_health(state: web::Data<HttpState>) -> HttpResponse {
    match state.predictor.status().await {
        Ok(status) => HttpResponse::Ok().json(json!({
            "node": "ok",
            "mlStatus": status.status,
            "mlBody": status.body,
        })),
        Err(err) => {
            warn!(error = %err, "ML health check failed");
            HttpResponse::BadGateway().json(json!({
                "node": "ok",
                "ml": "unreachable",
                "error": err.to_string(),
            }))
        }
    }
}

/// Which store backs the service and whether it answers.
#[utoipa::path(
    get,
    path = "/api/dbstatus",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Store reachable", body = StoreStatusReport),
        (status = 503, description = "Store unreachable", body = StoreStatusReport)
    )
)]
#[get("/dbstatus")]
pub async fn db_status(state: web::Data<HttpState>) -> HttpResponse {
    let report = state.store.check().await;
    if report.ok {
        HttpResponse::Ok().json(report)
    } else {
        HttpResponse::ServiceUnavailable().json(report)
    }
}
