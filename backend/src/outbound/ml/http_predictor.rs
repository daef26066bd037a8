//! Reqwest-backed risk predictor.
//!
//! The adapter forwards JSON payloads verbatim and normalises the answer:
//! whatever the model returns is preserved as the raw body, while the
//! `prediction` flag, `model` name, and optional `features` are decoded into
//! a [`ModelPrediction`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{Value, json};

use crate::domain::ports::{
    PredictorResponse, PredictorRoute, PredictorStatus, RiskPredictor, RiskPredictorError,
};
use crate::domain::{FeatureVector, HEART_MODEL, ModelPrediction, RiskFlag};

const EMPTY_BODY_MESSAGE: &str = "no content from ML service";

/// Predictor adapter bound to one base URL.
pub struct HttpRiskPredictor {
    client: Client,
    base: Url,
}

impl HttpRiskPredictor {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    fn url_for(&self, path: &str) -> Result<Url, RiskPredictorError> {
        self.base
            .join(path)
            .map_err(|err| RiskPredictorError::transport(format!("invalid ML url: {err}")))
    }
}

#[async_trait]
impl RiskPredictor for HttpRiskPredictor {
    async fn predict(
        &self,
        route: PredictorRoute,
        payload: &Value,
    ) -> Result<PredictorResponse, RiskPredictorError> {
        let response = self
            .client
            .post(self.url_for(route.path())?)
            .json(payload)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;
        let body = parse_body(&text);
        if !status.is_success() {
            return Err(RiskPredictorError::rejected(status.as_u16(), body));
        }
        Ok(PredictorResponse {
            status: status.as_u16(),
            prediction: normalise(body)?,
        })
    }

    async fn status(&self) -> Result<PredictorStatus, RiskPredictorError> {
        let response = self
            .client
            .get(self.url_for("/")?)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_transport_error)?;
        Ok(PredictorStatus {
            status,
            body: parse_body(&text),
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> RiskPredictorError {
    if error.is_timeout() {
        RiskPredictorError::timeout(error.to_string())
    } else {
        RiskPredictorError::transport(error.to_string())
    }
}

/// Decode a response body, keeping non-JSON text under `raw`.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return json!({ "message": EMPTY_BODY_MESSAGE });
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}

fn decode_flag(value: Option<&Value>) -> Result<RiskFlag, RiskPredictorError> {
    let value = value.ok_or_else(|| RiskPredictorError::decode("missing `prediction` field"))?;
    let numeric = value
        .as_u64()
        .map(|n| n as f64)
        .or_else(|| value.as_f64())
        .ok_or_else(|| RiskPredictorError::decode(format!("non-numeric prediction: {value}")))?;
    if numeric == 0.0 {
        Ok(RiskFlag::Low)
    } else if numeric == 1.0 {
        Ok(RiskFlag::High)
    } else {
        Err(RiskPredictorError::decode(format!(
            "prediction must be 0 or 1, got {value}"
        )))
    }
}

fn decode_features(value: Option<&Value>) -> Result<Option<FeatureVector>, RiskPredictorError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => serde_json::from_value(raw.clone())
            .map(Some)
            .map_err(|err| RiskPredictorError::decode(format!("invalid features: {err}"))),
    }
}

fn normalise(body: Value) -> Result<ModelPrediction, RiskPredictorError> {
    let flag = decode_flag(body.get("prediction"))?;
    let model = body
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or(HEART_MODEL)
        .to_owned();
    let features = decode_features(body.get("features"))?;
    Ok(ModelPrediction {
        model,
        flag,
        features,
        raw: body,
    })
}

#[cfg(test)]
mod tests {
    //! Coverage for body decoding; network paths are exercised in `tests/`.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty("", json!({ "message": EMPTY_BODY_MESSAGE }))]
    #[case::blank("  \n", json!({ "message": EMPTY_BODY_MESSAGE }))]
    #[case::html("<html>oops</html>", json!({ "raw": "<html>oops</html>" }))]
    #[case::json(r#"{"prediction":1}"#, json!({ "prediction": 1 }))]
    fn parse_body_preserves_whatever_was_sent(#[case] text: &str, #[case] expected: Value) {
        assert_eq!(parse_body(text), expected);
    }

    #[rstest]
    #[case(json!(0), RiskFlag::Low)]
    #[case(json!(1), RiskFlag::High)]
    #[case(json!(1.0), RiskFlag::High)]
    fn decodes_binary_flags(#[case] raw: Value, #[case] expected: RiskFlag) {
        assert_eq!(decode_flag(Some(&raw)), Ok(expected));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(json!(2)))]
    #[case(Some(json!(0.4)))]
    #[case(Some(json!("1")))]
    fn rejects_other_flags(#[case] raw: Option<Value>) {
        assert!(matches!(
            decode_flag(raw.as_ref()),
            Err(RiskPredictorError::Decode { .. })
        ));
    }

    #[test]
    fn normalise_defaults_model_and_keeps_raw_body() {
        let body = json!({ "prediction": 1, "confidence": 0.93 });
        let prediction = normalise(body.clone()).expect("valid body");
        assert_eq!(prediction.model, HEART_MODEL);
        assert_eq!(prediction.flag, RiskFlag::High);
        assert!(prediction.features.is_none());
        assert_eq!(prediction.raw, body);
    }

    #[test]
    fn normalise_decodes_features_with_holes() {
        let body = json!({
            "model": "diabetes",
            "prediction": 0,
            "features": [120, null, 70, 110, 36.6, 98],
        });
        let prediction = normalise(body).expect("valid body");
        assert_eq!(prediction.model, "diabetes");
        let features = prediction.features.expect("features");
        assert_eq!(features.systolic(), Some(120.0));
        assert_eq!(features.oxygen_saturation(), Some(98.0));
    }
}
