//! Driving port for the predict-persist-alert pipeline.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{
    Error, FeatureVector, MeasurementId, PredictionId, PredictionSource, RiskFlag, SymptomTags,
    UserId,
};

use super::PredictorRoute;

/// One prediction submission.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentRequest {
    pub route: PredictorRoute,
    /// Body forwarded verbatim to the predictor.
    pub payload: Value,
    pub features: FeatureVector,
    pub patient_id: Option<UserId>,
    /// Tags supplied by the client, used when the patient record has none.
    pub symptoms: SymptomTags,
}

/// Result of a submission.
///
/// `measurement_id` and `prediction_id` are `None` when the corresponding
/// write failed; the prediction itself is still returned.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentOutcome {
    pub source: PredictionSource,
    pub flag: RiskFlag,
    /// Body to return to the client: the model's answer or the fallback body.
    pub body: Value,
    pub measurement_id: Option<MeasurementId>,
    pub prediction_id: Option<PredictionId>,
    pub alerts_created: usize,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RiskAssessment: Send + Sync {
    async fn assess(&self, request: AssessmentRequest) -> Result<AssessmentOutcome, Error>;
}
