//! The risk-alert pipeline.
//!
//! A submission is classified by the remote model (or the rule-based
//! fallback), the measurement and prediction are recorded, and when the
//! risk flag is high every doctor whose specialties overlap the patient's
//! conditions receives an alert. Steps run sequentially within the request
//! task. Only predictor failures reach the caller; persistence and delivery
//! failures are logged and the prediction is still returned.
//!
//! A submitted patient id is only recorded once it resolves to an account.
//! Unknown ids are dropped so stored rows never reference a missing user.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    AssessmentOutcome, AssessmentRequest, MeasurementRepository, PredictionRepository,
    ReachabilityProbe, RiskAssessment, RiskPredictor, RiskPredictorError, UserRepository,
};
use crate::domain::{
    AlertDispatcher, AlertDraft, AlertSubject, Error, FeatureVector, Measurement, ModelPrediction,
    NewMeasurement, NewPrediction, PatientSnapshot, Prediction, PredictionSource,
    RateLimitedWarner, User, UserId, fallback_prediction, match_doctors, resolve_patient_tags,
};

/// Collaborators of [`RiskPipeline`].
#[derive(Clone)]
pub struct RiskPipelineDeps {
    pub probe: Arc<dyn ReachabilityProbe>,
    pub predictor: Arc<dyn RiskPredictor>,
    pub measurements: Arc<dyn MeasurementRepository>,
    pub predictions: Arc<dyn PredictionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub dispatcher: AlertDispatcher,
    pub warner: Arc<RateLimitedWarner>,
}

/// Implements [`RiskAssessment`].
#[derive(Clone)]
pub struct RiskPipeline {
    deps: RiskPipelineDeps,
    allow_fallback: bool,
}

impl RiskPipeline {
    /// `allow_fallback = false` turns every predictor outage into a
    /// `bad_gateway` error instead of a rule-based answer.
    pub fn new(deps: RiskPipelineDeps, allow_fallback: bool) -> Self {
        Self {
            deps,
            allow_fallback,
        }
    }

    async fn classify(
        &self,
        request: &AssessmentRequest,
    ) -> Result<(PredictionSource, ModelPrediction), Error> {
        if !self.deps.probe.is_reachable().await {
            let target = self.deps.probe.target();
            let base = format!("ML service not reachable on {target}");
            if !self.allow_fallback {
                self.deps.warner.warn(&format!("{base}; fallback disabled"));
                return Err(Error::bad_gateway("ML unreachable").with_details(json!({
                    "mlHost": target.host,
                    "mlPort": target.port,
                })));
            }
            self.deps.warner.warn(&format!("{base}; returning fallback"));
            return Ok((
                PredictionSource::Fallback,
                fallback_prediction(&request.features),
            ));
        }

        match self
            .deps
            .predictor
            .predict(request.route, &request.payload)
            .await
        {
            Ok(response) => Ok((
                PredictionSource::Model {
                    status: response.status,
                },
                response.prediction,
            )),
            Err(RiskPredictorError::Rejected { status, body }) => {
                error!(status, "ML service returned non-success status");
                Err(Error::bad_gateway("ML service error").with_details(json!({
                    "mlStatus": status,
                    "mlBody": body,
                })))
            }
            Err(err) if self.allow_fallback => {
                warn!(error = %err, "ML call failed; returning fallback");
                Ok((
                    PredictionSource::Fallback,
                    fallback_prediction(&request.features),
                ))
            }
            Err(err) => {
                error!(error = %err, "ML call failed; fallback disabled");
                Err(Error::bad_gateway("ML proxy failed")
                    .with_details(json!({ "error": err.to_string() })))
            }
        }
    }

    async fn load_patient(&self, patient_id: Option<UserId>) -> Option<User> {
        let id = patient_id?;
        match self.deps.users.find_by_id(&id).await {
            Ok(Some(found)) => Some(found),
            Ok(None) => {
                warn!(patient_id = %id, "unknown patient id; recording anonymously");
                None
            }
            Err(err) => {
                warn!(patient_id = %id, error = %err, "patient lookup failed");
                None
            }
        }
    }

    async fn record_measurement(
        &self,
        patient_id: Option<UserId>,
        features: &FeatureVector,
    ) -> Option<Measurement> {
        let new = NewMeasurement {
            patient_id,
            vitals: features.to_vitals(),
        };
        match self.deps.measurements.save(&new).await {
            Ok(saved) => Some(saved),
            Err(err) => {
                warn!(error = %err, "failed to save measurement");
                None
            }
        }
    }

    async fn record_prediction(&self, new: NewPrediction) -> Option<Prediction> {
        match self.deps.predictions.save(&new).await {
            Ok(saved) => Some(saved),
            Err(err) => {
                warn!(error = %err, "failed to save prediction");
                None
            }
        }
    }

    async fn raise_alerts(
        &self,
        request: &AssessmentRequest,
        patient: Option<&User>,
        measurement: Option<&Measurement>,
        prediction: &ModelPrediction,
    ) -> usize {
        let (tags, source) = resolve_patient_tags(patient, &request.symptoms, &request.features);
        if tags.is_empty() {
            debug!("high risk but no resolvable symptom tags; no alerts");
            return 0;
        }
        let candidates = match self.deps.users.find_doctors_with_any_symptom(&tags).await {
            Ok(candidates) => candidates,
            Err(err) => {
                error!(error = %err, "doctor lookup failed; no alerts raised");
                return 0;
            }
        };
        let doctors: Vec<User> = match_doctors(&tags, &candidates)
            .into_iter()
            .cloned()
            .collect();
        info!(
            tags = %tags.joined(),
            tag_source = ?source,
            doctors = doctors.len(),
            "matched doctors for high-risk prediction"
        );

        let subject = AlertSubject {
            patient_id: patient.map(|p| p.id),
            snapshot: patient.map(PatientSnapshot::from).unwrap_or_default(),
        };
        let draft = AlertDraft {
            subject,
            measurement_id: measurement.map(|m| m.id),
            prediction: prediction.flag,
            ml_body: prediction.raw.clone(),
            symptoms: tags,
        };
        self.deps.dispatcher.dispatch(&draft, &doctors).await.len()
    }
}

#[async_trait]
impl RiskAssessment for RiskPipeline {
    async fn assess(&self, request: AssessmentRequest) -> Result<AssessmentOutcome, Error> {
        let (source, prediction) = self.classify(&request).await?;
        let patient = self.load_patient(request.patient_id).await;
        let patient_id = patient.as_ref().map(|p| p.id);

        let measurement = self.record_measurement(patient_id, &request.features).await;
        let stored = self
            .record_prediction(NewPrediction {
                patient_id,
                measurement_id: measurement.as_ref().map(|m| m.id),
                model: prediction.model.clone(),
                flag: prediction.flag,
                features: prediction
                    .features
                    .clone()
                    .unwrap_or_else(|| request.features.clone()),
                ml_body: prediction.raw.clone(),
            })
            .await;

        let alerts_created = if prediction.flag.is_high() {
            self.raise_alerts(
                &request,
                patient.as_ref(),
                measurement.as_ref(),
                &prediction,
            )
            .await
        } else {
            0
        };

        Ok(AssessmentOutcome {
            source,
            flag: prediction.flag,
            body: prediction.raw,
            measurement_id: measurement.map(|m| m.id),
            prediction_id: stored.map(|p| p.id),
            alerts_created,
        })
    }
}

#[cfg(test)]
#[path = "risk_pipeline_tests.rs"]
mod tests;
