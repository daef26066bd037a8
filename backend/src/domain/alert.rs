//! Doctor-scoped alerts raised for high-risk predictions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{EmailAddress, Measurement, MeasurementId, RiskFlag, SymptomTags, User, UserId};

/// Persisted alert identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct AlertId(pub Uuid);

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for AlertId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Patient identity copied onto the alert when it is raised.
///
/// Later edits to the patient account do not change existing alerts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientSnapshot {
    pub name: Option<String>,
    pub email: Option<String>,
    pub number: Option<String>,
}

impl From<&User> for PatientSnapshot {
    fn from(user: &User) -> Self {
        Self {
            name: Some(user.name.clone()),
            email: Some(user.email.to_string()),
            number: user.number.clone(),
        }
    }
}

/// The patient an alert is about, as far as the pipeline knows them.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSubject {
    pub patient_id: Option<UserId>,
    pub snapshot: PatientSnapshot,
}

impl AlertSubject {
    /// Human label: the patient's name, else their id, else `unknown`.
    pub fn label(&self) -> String {
        match (&self.snapshot.name, self.patient_id) {
            (Some(name), _) if !name.trim().is_empty() => name.clone(),
            (_, Some(id)) => id.to_string(),
            _ => "unknown".to_owned(),
        }
    }
}

/// Build the human-readable alert message.
///
/// # Examples
/// ```
/// use vitalwatch::domain::{AlertSubject, PatientSnapshot, SymptomTags, alert_message};
///
/// let subject = AlertSubject {
///     patient_id: None,
///     snapshot: PatientSnapshot { name: Some("Ada".into()), ..Default::default() },
/// };
/// let message = alert_message(&subject, &SymptomTags::new(["Asthma"]));
/// assert_eq!(message, "Patient Ada high-risk detected — symptoms: Asthma");
/// ```
pub fn alert_message(subject: &AlertSubject, symptoms: &SymptomTags) -> String {
    format!(
        "Patient {} high-risk detected — symptoms: {}",
        subject.label(),
        symptoms.joined()
    )
}

/// Alert about to be persisted; one per matched doctor.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub patient_id: Option<UserId>,
    pub doctor_id: UserId,
    pub measurement_id: Option<MeasurementId>,
    pub prediction: RiskFlag,
    pub ml_body: Value,
    pub patient_snapshot: PatientSnapshot,
    pub message: String,
    pub symptoms: SymptomTags,
}

/// Stored alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: AlertId,
    pub patient_id: Option<UserId>,
    pub doctor_id: UserId,
    pub measurement_id: Option<MeasurementId>,
    pub prediction: RiskFlag,
    #[schema(value_type = Object)]
    pub ml_body: Value,
    pub patient_snapshot: PatientSnapshot,
    pub message: String,
    pub symptoms: SymptomTags,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Alert {
    /// Materialise a new alert with a fresh id and `read = false`.
    pub fn from_new(new: NewAlert, now: DateTime<Utc>) -> Self {
        Self {
            id: AlertId(Uuid::new_v4()),
            patient_id: new.patient_id,
            doctor_id: new.doctor_id,
            measurement_id: new.measurement_id,
            prediction: new.prediction,
            ml_body: new.ml_body,
            patient_snapshot: new.patient_snapshot,
            message: new.message,
            symptoms: new.symptoms,
            read: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filter for alert listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertFilter {
    /// Only alerts whose prediction flag is high.
    pub risk_only: bool,
}

/// Current name and email of the patient behind an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: UserId,
    pub name: String,
    pub email: EmailAddress,
}

impl From<&User> for PatientSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Alert with its patient and measurement references resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertView {
    #[serde(flatten)]
    pub alert: Alert,
    pub patient: Option<PatientSummary>,
    pub measurement: Option<Measurement>,
}
