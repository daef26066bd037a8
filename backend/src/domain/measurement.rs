//! Raw vital-sign submissions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{UserId, VitalSigns};

/// Persisted measurement identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct MeasurementId(pub Uuid);

impl fmt::Display for MeasurementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Measurement about to be persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewMeasurement {
    pub patient_id: Option<UserId>,
    pub vitals: VitalSigns,
}

/// Stored measurement. Immutable once written.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: MeasurementId,
    pub patient_id: Option<UserId>,
    #[serde(flatten)]
    pub vitals: VitalSigns,
    pub created_at: DateTime<Utc>,
}

/// Identifier and timestamp returned after an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordReceipt {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&Measurement> for RecordReceipt {
    fn from(value: &Measurement) -> Self {
        Self {
            id: value.id.0,
            created_at: value.created_at,
        }
    }
}
