//! Alert creation, delivery, and the doctor-facing inbox.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::domain::ports::{
    AlertInbox, AlertPublisher, AlertRepository, AlertRepositoryError, MeasurementRepository,
    UserRepository,
};
use crate::domain::{
    Alert, AlertFilter, AlertId, AlertSubject, AlertView, Error, MeasurementId, NewAlert,
    PatientSummary, RiskFlag, SymptomTags, User, UserId, alert_message,
};

fn map_repository_error(error: AlertRepositoryError) -> Error {
    match error {
        AlertRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("alert repository unavailable: {message}"))
        }
        AlertRepositoryError::Query { message } => {
            Error::internal(format!("alert repository error: {message}"))
        }
    }
}

/// Everything about a high-risk event except the recipients.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDraft {
    pub subject: AlertSubject,
    pub measurement_id: Option<MeasurementId>,
    pub prediction: RiskFlag,
    pub ml_body: Value,
    pub symptoms: SymptomTags,
}

impl AlertDraft {
    fn for_doctor(&self, doctor: &User, message: &str) -> NewAlert {
        NewAlert {
            patient_id: self.subject.patient_id,
            doctor_id: doctor.id,
            measurement_id: self.measurement_id,
            prediction: self.prediction,
            ml_body: self.ml_body.clone(),
            patient_snapshot: self.subject.snapshot.clone(),
            message: message.to_owned(),
            symptoms: self.symptoms.clone(),
        }
    }
}

/// Persists one alert per doctor and pushes each to its doctor's channel.
#[derive(Clone)]
pub struct AlertDispatcher {
    alerts: Arc<dyn AlertRepository>,
    publisher: Arc<dyn AlertPublisher>,
}

impl AlertDispatcher {
    pub fn new(alerts: Arc<dyn AlertRepository>, publisher: Arc<dyn AlertPublisher>) -> Self {
        Self { alerts, publisher }
    }

    /// Create and deliver alerts for `doctors`.
    ///
    /// All alerts are written in one batch. A failed write is logged and
    /// yields no alerts; delivery failures are logged and otherwise ignored,
    /// since the alert stays visible through the inbox.
    pub async fn dispatch(&self, draft: &AlertDraft, doctors: &[User]) -> Vec<Alert> {
        if doctors.is_empty() {
            return Vec::new();
        }
        let message = alert_message(&draft.subject, &draft.symptoms);
        let batch: Vec<NewAlert> = doctors
            .iter()
            .map(|doctor| draft.for_doctor(doctor, &message))
            .collect();

        let created = match self.alerts.insert_batch(&batch).await {
            Ok(created) => created,
            Err(err) => {
                error!(error = %err, doctors = doctors.len(), "failed to persist alerts");
                return Vec::new();
            }
        };

        for alert in &created {
            match self.publisher.publish(alert) {
                Ok(sessions) => debug!(
                    alert_id = %alert.id,
                    doctor_id = %alert.doctor_id,
                    sessions,
                    "alert published"
                ),
                Err(err) => warn!(
                    alert_id = %alert.id,
                    doctor_id = %alert.doctor_id,
                    error = %err,
                    "alert publish failed"
                ),
            }
        }
        created
    }
}

/// Doctor-scoped alert queries and read-state changes.
#[derive(Clone)]
pub struct AlertInboxService {
    alerts: Arc<dyn AlertRepository>,
    users: Arc<dyn UserRepository>,
    measurements: Arc<dyn MeasurementRepository>,
}

impl AlertInboxService {
    pub fn new(
        alerts: Arc<dyn AlertRepository>,
        users: Arc<dyn UserRepository>,
        measurements: Arc<dyn MeasurementRepository>,
    ) -> Self {
        Self {
            alerts,
            users,
            measurements,
        }
    }

    async fn patient_summary(&self, patient_id: Option<UserId>) -> Option<PatientSummary> {
        let id = patient_id?;
        match self.users.find_by_id(&id).await {
            Ok(user) => user.as_ref().map(PatientSummary::from),
            Err(err) => {
                warn!(patient_id = %id, error = %err, "failed to resolve alert patient");
                None
            }
        }
    }

    async fn resolve(
        &self,
        alert: Alert,
        patients: &mut HashMap<UserId, Option<PatientSummary>>,
    ) -> AlertView {
        let patient = match alert.patient_id {
            Some(id) => {
                if let Some(cached) = patients.get(&id) {
                    cached.clone()
                } else {
                    let summary = self.patient_summary(Some(id)).await;
                    patients.insert(id, summary.clone());
                    summary
                }
            }
            None => None,
        };
        let measurement = match alert.measurement_id {
            Some(id) => self.measurements.find_by_id(&id).await.unwrap_or_else(|err| {
                warn!(measurement_id = %id, error = %err, "failed to resolve alert measurement");
                None
            }),
            None => None,
        };
        AlertView {
            alert,
            patient,
            measurement,
        }
    }

    async fn set_read(
        &self,
        doctor_id: UserId,
        alert_id: AlertId,
        read: bool,
    ) -> Result<Alert, Error> {
        let current = self
            .alerts
            .find_for_doctor(&doctor_id, &alert_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("alert not found"))?;
        if current.read == read {
            return Ok(current);
        }
        self.alerts
            .set_read(&doctor_id, &alert_id, read)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("alert not found"))
    }
}

#[async_trait]
impl AlertInbox for AlertInboxService {
    async fn list(&self, doctor_id: UserId, filter: AlertFilter) -> Result<Vec<AlertView>, Error> {
        let alerts = self
            .alerts
            .list_for_doctor(&doctor_id, filter)
            .await
            .map_err(map_repository_error)?;
        let mut patients = HashMap::new();
        let mut views = Vec::with_capacity(alerts.len());
        for alert in alerts {
            views.push(self.resolve(alert, &mut patients).await);
        }
        Ok(views)
    }

    async fn get(&self, doctor_id: UserId, alert_id: AlertId) -> Result<AlertView, Error> {
        let alert = self
            .alerts
            .find_for_doctor(&doctor_id, &alert_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("alert not found"))?;
        Ok(self.resolve(alert, &mut HashMap::new()).await)
    }

    async fn mark_read(&self, doctor_id: UserId, alert_id: AlertId) -> Result<Alert, Error> {
        self.set_read(doctor_id, alert_id, true).await
    }

    async fn mark_unread(&self, doctor_id: UserId, alert_id: AlertId) -> Result<Alert, Error> {
        self.set_read(doctor_id, alert_id, false).await
    }
}

#[cfg(test)]
#[path = "alert_service_tests.rs"]
mod tests;
