//! Direct vital-sign submissions.
//!
//! ```text
//! POST /api/measurements {"systolic":120,"diastolic":80,"heartRate":70,...}
//! POST /api/hypertension {"systolic":150,"age":54,"saltIntake":9,...}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Error, HypertensionQuestionnaire, NewHypertensionRecord, NewMeasurement, PartialVitals,
    RecordReceipt, UserId,
};

use super::ApiResult;
use super::auth::MaybeAuthenticated;
use super::envelope::Envelope;
use super::state::HttpState;

/// Body for `POST /api/measurements`; every vital is required.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRequest {
    pub patient_id: Option<UserId>,
    #[serde(flatten)]
    pub vitals: PartialVitals,
}

/// Body for `POST /api/hypertension`; vitals default to zero.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HypertensionRequest {
    pub patient_id: Option<UserId>,
    #[serde(flatten)]
    pub vitals: PartialVitals,
    #[serde(flatten)]
    pub questionnaire: HypertensionQuestionnaire,
}

/// Store one complete set of vitals.
#[utoipa::path(
    post,
    path = "/api/measurements",
    request_body = MeasurementRequest,
    responses(
        (status = 201, description = "Measurement stored", body = Envelope<RecordReceipt>),
        (status = 400, description = "A vital is missing", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["measurements"],
    operation_id = "createMeasurement"
)]
#[post("/measurements")]
pub async fn create_measurement(
    state: web::Data<HttpState>,
    caller: MaybeAuthenticated,
    payload: web::Json<MeasurementRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let vitals = request.vitals.require_all().map_err(|missing| {
        Error::invalid_request(missing.to_string())
            .with_details(json!({ "field": missing.field }))
    })?;
    let receipt = state
        .intake
        .record_measurement(NewMeasurement {
            patient_id: caller.patient_or(request.patient_id),
            vitals,
        })
        .await?;
    Ok(HttpResponse::Created().json(Envelope::ok(receipt)))
}

/// Store vitals with hypertension questionnaire answers.
#[utoipa::path(
    post,
    path = "/api/hypertension",
    request_body = HypertensionRequest,
    responses(
        (status = 201, description = "Record stored", body = Envelope<RecordReceipt>),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["measurements"],
    operation_id = "createHypertensionRecord"
)]
#[post("/hypertension")]
pub async fn create_hypertension(
    state: web::Data<HttpState>,
    caller: MaybeAuthenticated,
    payload: web::Json<HypertensionRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let receipt = state
        .intake
        .record_hypertension(NewHypertensionRecord {
            patient_id: caller.patient_or(request.patient_id),
            vitals: request.vitals.coerce(),
            questionnaire: request.questionnaire.normalised(),
        })
        .await?;
    Ok(HttpResponse::Created().json(Envelope::ok(receipt)))
}
