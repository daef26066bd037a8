//! Risk prediction endpoints.
//!
//! Bodies are forwarded to the model verbatim, so they are taken as raw
//! JSON and only the pieces the pipeline needs are extracted here.
//!
//! ```text
//! POST /api/predict {"input":[150,90,80,110,37,98],"patientId":"..."}
//! POST /api/predict/heart_from_form {"systolic":150,"diastolic":90,...}
//! ```

use actix_web::{post, web};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::domain::ports::{AssessmentOutcome, AssessmentRequest, PredictorRoute};
use crate::domain::vitals::VITAL_FIELDS;
use crate::domain::{Error, FeatureVector, MeasurementId, PredictionId, SymptomTags, UserId};

use super::ApiResult;
use super::accounts::SymptomsInput;
use super::auth::MaybeAuthenticated;
use super::state::HttpState;

/// Prediction result returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    /// Upstream HTTP status, or `"fallback"` for rule-based answers.
    #[serde(rename = "fromMLStatus")]
    #[schema(value_type = Object)]
    pub from_ml_status: Value,
    #[schema(value_type = Object)]
    pub body: Value,
    pub measurement_id: Option<MeasurementId>,
    pub prediction_id: Option<PredictionId>,
    pub alerts_created: usize,
}

impl From<AssessmentOutcome> for PredictionResponse {
    fn from(outcome: AssessmentOutcome) -> Self {
        Self {
            from_ml_status: outcome.source.to_json(),
            body: outcome.body,
            measurement_id: outcome.measurement_id,
            prediction_id: outcome.prediction_id,
            alerts_created: outcome.alerts_created,
        }
    }
}

/// Numbers and numeric strings; anything else is a hole.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn named_features(body: &Map<String, Value>) -> FeatureVector {
    FeatureVector::from_optional(
        VITAL_FIELDS
            .iter()
            .map(|field| body.get(*field).and_then(number)),
    )
}

/// Features for `/api/predict`: a non-empty `input` array wins, then the
/// named vitals when `systolic` is present, else nothing.
fn predict_features(body: &Map<String, Value>) -> FeatureVector {
    match body.get("input") {
        Some(Value::Array(items)) if !items.is_empty() => {
            FeatureVector::from_optional(items.iter().map(number))
        }
        _ if body.contains_key("systolic") => named_features(body),
        _ => FeatureVector::default(),
    }
}

fn patient_id(body: &Map<String, Value>) -> Result<Option<UserId>, Error> {
    match body.get("patientId") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.parse().map(Some).map_err(|_| {
            Error::invalid_request("patientId must be a UUID")
                .with_details(serde_json::json!({ "field": "patientId" }))
        }),
        Some(_) => Err(Error::invalid_request("patientId must be a UUID")
            .with_details(serde_json::json!({ "field": "patientId" }))),
    }
}

fn symptoms(body: &Map<String, Value>) -> SymptomTags {
    body.get("symptoms")
        .cloned()
        .and_then(|raw| serde_json::from_value::<SymptomsInput>(raw).ok())
        .map(SymptomTags::from)
        .unwrap_or_default()
}

/// Extract an [`AssessmentRequest`] from a raw prediction body.
pub fn parse_assessment(route: PredictorRoute, payload: Value) -> Result<AssessmentRequest, Error> {
    let Value::Object(body) = &payload else {
        return Err(Error::invalid_request("expected a JSON object"));
    };
    let features = match route {
        PredictorRoute::Predict => predict_features(body),
        PredictorRoute::HeartFromForm => named_features(body),
    };
    Ok(AssessmentRequest {
        route,
        patient_id: patient_id(body)?,
        symptoms: symptoms(body),
        features,
        payload,
    })
}

async fn run(
    state: &HttpState,
    caller: &MaybeAuthenticated,
    route: PredictorRoute,
    payload: Value,
) -> ApiResult<web::Json<PredictionResponse>> {
    let mut request = parse_assessment(route, payload)?;
    request.patient_id = caller.patient_or(request.patient_id);
    let outcome = state.risk.assess(request).await?;
    Ok(web::Json(PredictionResponse::from(outcome)))
}

/// Classify vitals, record them, and alert matching doctors on high risk.
#[utoipa::path(
    post,
    path = "/api/predict",
    request_body(content = Object, description = "`{input:[...]}` or named vitals, plus optional patientId and symptoms"),
    responses(
        (status = 200, description = "Prediction", body = PredictionResponse),
        (status = 400, description = "Malformed body", body = Error),
        (status = 502, description = "ML service failed or unreachable with fallback disabled", body = Error)
    ),
    tags = ["predictions"],
    operation_id = "predict"
)]
#[post("/predict")]
pub async fn predict(
    state: web::Data<HttpState>,
    caller: MaybeAuthenticated,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<PredictionResponse>> {
    run(&state, &caller, PredictorRoute::Predict, payload.into_inner()).await
}

/// Form-based variant forwarding to the model's form endpoint.
#[utoipa::path(
    post,
    path = "/api/predict/heart_from_form",
    request_body(content = Object, description = "Named vitals plus optional patientId and symptoms"),
    responses(
        (status = 200, description = "Prediction", body = PredictionResponse),
        (status = 400, description = "Malformed body", body = Error),
        (status = 502, description = "ML service failed or unreachable with fallback disabled", body = Error)
    ),
    tags = ["predictions"],
    operation_id = "predictHeartFromForm"
)]
#[post("/predict/heart_from_form")]
pub async fn predict_heart_from_form(
    state: web::Data<HttpState>,
    caller: MaybeAuthenticated,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<PredictionResponse>> {
    run(
        &state,
        &caller,
        PredictorRoute::HeartFromForm,
        payload.into_inner(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PredictionSource, RiskFlag, Role};
    use crate::inbound::http::test_utils::{TestPorts, bearer, test_token};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::input_array(
        json!({ "input": [150, 90, 80, 110, 37, 98], "systolic": 1 }),
        vec![Some(150.0), Some(90.0), Some(80.0), Some(110.0), Some(37.0), Some(98.0)]
    )]
    #[case::empty_input_uses_named(
        json!({ "input": [], "systolic": "150", "heartRate": 80 }),
        vec![Some(150.0), None, Some(80.0), None, None, None]
    )]
    #[case::no_systolic_no_features(json!({ "heartRate": 120 }), vec![])]
    #[case::non_numeric_entries_are_holes(
        json!({ "input": [150, "x", null] }),
        vec![Some(150.0), None, None]
    )]
    fn predict_feature_extraction(#[case] body: Value, #[case] expected: Vec<Option<f64>>) {
        let request = parse_assessment(PredictorRoute::Predict, body).expect("parsed");
        assert_eq!(request.features.values(), expected.as_slice());
    }

    #[test]
    fn form_route_always_reads_named_fields() {
        let request = parse_assessment(
            PredictorRoute::HeartFromForm,
            json!({ "heartRate": 120, "input": [1, 2, 3] }),
        )
        .expect("parsed");
        assert_eq!(request.features.len(), 6);
        assert_eq!(request.features.heart_rate(), Some(120.0));
        assert_eq!(request.features.systolic(), None);
    }

    #[rstest]
    #[case(json!([1, 2, 3]))]
    #[case(json!({ "patientId": "not-a-uuid" }))]
    #[case(json!({ "patientId": 42 }))]
    fn malformed_bodies_are_rejected(#[case] body: Value) {
        let error = parse_assessment(PredictorRoute::Predict, body).expect_err("rejected");
        assert_eq!(error.code(), crate::domain::ErrorCode::InvalidRequest);
    }

    #[test]
    fn symptoms_and_patient_id_are_extracted_and_body_is_kept() {
        let patient = UserId::random();
        let body = json!({
            "input": [150],
            "patientId": patient.to_string(),
            "symptoms": "Diabetes, Asthma"
        });
        let request = parse_assessment(PredictorRoute::Predict, body.clone()).expect("parsed");
        assert_eq!(request.patient_id, Some(patient));
        assert_eq!(request.symptoms.as_slice(), ["Diabetes", "Asthma"]);
        assert_eq!(request.payload, body);
    }

    fn outcome(source: PredictionSource) -> AssessmentOutcome {
        AssessmentOutcome {
            source,
            flag: RiskFlag::High,
            body: json!({ "model": "heart", "prediction": 1 }),
            measurement_id: None,
            prediction_id: None,
            alerts_created: 2,
        }
    }

    #[rstest]
    #[case(PredictionSource::Fallback, json!("fallback"))]
    #[case(PredictionSource::Model { status: 200 }, json!(200))]
    #[actix_web::test]
    async fn response_reports_source_and_counts(
        #[case] source: PredictionSource,
        #[case] expected: Value,
    ) {
        let caller = UserId::random();
        let mut ports = TestPorts::default().accepting_test_tokens();
        ports
            .risk
            .expect_assess()
            .withf(move |req| {
                req.patient_id == Some(caller) && req.route == PredictorRoute::Predict
            })
            .returning(move |_| Ok(outcome(source)));
        let app = actix_test::init_service(
            App::new()
                .app_data(ports.into_data())
                .service(web::scope("/api").service(predict).service(predict_heart_from_form)),
        )
        .await;

        let request = actix_test::TestRequest::post()
            .uri("/api/predict")
            .insert_header(("Authorization", bearer(&test_token(caller, Role::Patient))))
            .set_json(json!({ "input": [150, 90, 80, 110, 37, 98] }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value["fromMLStatus"], expected);
        assert_eq!(value["alertsCreated"], 2);
        assert_eq!(value["measurementId"], Value::Null);
        assert_eq!(value["body"]["prediction"], 1);
    }

    #[actix_web::test]
    async fn gateway_errors_pass_through() {
        let mut ports = TestPorts::default();
        ports.risk.expect_assess().returning(|_| {
            Err(Error::bad_gateway("ML service error")
                .with_details(json!({ "mlStatus": 500, "mlBody": {} })))
        });
        let app = actix_test::init_service(
            App::new()
                .app_data(ports.into_data())
                .service(web::scope("/api").service(predict_heart_from_form)),
        )
        .await;

        let request = actix_test::TestRequest::post()
            .uri("/api/predict/heart_from_form")
            .set_json(json!({ "systolic": 150 }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
