//! Port for the remote risk model.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ModelPrediction;

use super::define_port_error;

define_port_error! {
    /// Errors raised by risk predictor adapters.
    pub enum RiskPredictorError {
        /// The model answered with a non-success status.
        Rejected { status: u16, body: Value } =>
            "predictor returned status {status}",
        /// The request did not complete within the configured timeout.
        Timeout { message: String } =>
            "predictor request timed out: {message}",
        /// The connection failed or was interrupted.
        Transport { message: String } =>
            "predictor transport failed: {message}",
        /// The response body did not match the expected shape.
        Decode { message: String } =>
            "predictor response could not be decoded: {message}",
    }
}

/// Predictor endpoint to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorRoute {
    /// `POST /predict`, accepting an `input` array or named vitals.
    Predict,
    /// `POST /predict/heart_from_form`, accepting named vitals.
    HeartFromForm,
}

impl PredictorRoute {
    pub fn path(self) -> &'static str {
        match self {
            Self::Predict => "/predict",
            Self::HeartFromForm => "/predict/heart_from_form",
        }
    }
}

/// Successful model answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorResponse {
    pub status: u16,
    pub prediction: ModelPrediction,
}

/// Whatever the predictor's root endpoint answered.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorStatus {
    pub status: u16,
    pub body: Value,
}

/// Remote classifier consumed over HTTP.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RiskPredictor: Send + Sync {
    /// Forward `payload` to `route` and normalise the answer.
    async fn predict(
        &self,
        route: PredictorRoute,
        payload: &Value,
    ) -> Result<PredictorResponse, RiskPredictorError>;

    /// Query the service root. Any HTTP answer is `Ok`.
    async fn status(&self) -> Result<PredictorStatus, RiskPredictorError>;
}
