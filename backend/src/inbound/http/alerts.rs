//! Doctor alert inbox.
//!
//! Every route is scoped to the caller's own id taken from the bearer token;
//! alerts belonging to someone else are reported as missing.
//!
//! ```text
//! GET /api/alerts?riskOnly=1
//! GET /api/alerts/{id}
//! PATCH /api/alerts/{id}/read
//! PATCH /api/alerts/{id}/unread
//! ```

use actix_web::{get, patch, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Alert, AlertFilter, AlertId, AlertView, Error};

use super::ApiResult;
use super::auth::Authenticated;
use super::envelope::Envelope;
use super::state::HttpState;

/// Query string for `GET /api/alerts`.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertListQuery {
    /// `1` or `true` keeps only high-risk alerts.
    pub risk_only: Option<String>,
}

impl AlertListQuery {
    fn filter(&self) -> AlertFilter {
        let risk_only = self
            .risk_only
            .as_deref()
            .map(str::trim)
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        AlertFilter { risk_only }
    }
}

fn parse_alert_id(raw: &str) -> Result<AlertId, Error> {
    raw.parse().map_err(|_| Error::not_found("Alert not found"))
}

/// The caller's alerts, newest first.
#[utoipa::path(
    get,
    path = "/api/alerts",
    params(AlertListQuery),
    responses(
        (status = 200, description = "Alerts", body = Envelope<Vec<AlertView>>),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["alerts"],
    operation_id = "listAlerts"
)]
#[get("/alerts")]
pub async fn list_alerts(
    state: web::Data<HttpState>,
    caller: Authenticated,
    query: web::Query<AlertListQuery>,
) -> ApiResult<web::Json<Envelope<Vec<AlertView>>>> {
    let views = state.alerts.list(caller.user_id(), query.filter()).await?;
    Ok(web::Json(Envelope::ok(views)))
}

/// One of the caller's alerts with patient and measurement resolved.
#[utoipa::path(
    get,
    path = "/api/alerts/{id}",
    params(("id" = String, Path, description = "Alert id")),
    responses(
        (status = 200, description = "Alert", body = Envelope<AlertView>),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Alert not found", body = Error)
    ),
    tags = ["alerts"],
    operation_id = "getAlert"
)]
#[get("/alerts/{id}")]
pub async fn get_alert(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<AlertView>>> {
    let alert_id = parse_alert_id(&path)?;
    let view = state.alerts.get(caller.user_id(), alert_id).await?;
    Ok(web::Json(Envelope::ok(view)))
}

/// Mark an alert read. Repeating the call is harmless.
#[utoipa::path(
    patch,
    path = "/api/alerts/{id}/read",
    params(("id" = String, Path, description = "Alert id")),
    responses(
        (status = 200, description = "Updated alert", body = Envelope<Alert>),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Alert not found", body = Error)
    ),
    tags = ["alerts"],
    operation_id = "markAlertRead"
)]
#[patch("/alerts/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<Alert>>> {
    let alert_id = parse_alert_id(&path)?;
    let alert = state.alerts.mark_read(caller.user_id(), alert_id).await?;
    Ok(web::Json(Envelope::ok(alert)))
}

/// Mark an alert unread. Repeating the call is harmless.
#[utoipa::path(
    patch,
    path = "/api/alerts/{id}/unread",
    params(("id" = String, Path, description = "Alert id")),
    responses(
        (status = 200, description = "Updated alert", body = Envelope<Alert>),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Alert not found", body = Error)
    ),
    tags = ["alerts"],
    operation_id = "markAlertUnread"
)]
#[patch("/alerts/{id}/unread")]
pub async fn mark_unread(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<Alert>>> {
    let alert_id = parse_alert_id(&path)?;
    let alert = state.alerts.mark_unread(caller.user_id(), alert_id).await?;
    Ok(web::Json(Envelope::ok(alert)))
}
