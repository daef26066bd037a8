//! Risk predictions and their provenance.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{FeatureVector, MeasurementId, UserId};

/// Model name recorded for the heart-risk classifier and its fallback.
pub const HEART_MODEL: &str = "heart";

/// Binary risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RiskFlag {
    #[default]
    Low,
    High,
}

// Serialised as a `u8` restricted to 0..=1; utoipa cannot derive this for enums.
impl utoipa::PartialSchema for RiskFlag {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        use utoipa::openapi::schema::{KnownFormat, ObjectBuilder, SchemaFormat, Type};
        ObjectBuilder::new()
            .schema_type(Type::Integer)
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Int32)))
            .minimum(Some(0))
            .maximum(Some(1))
            .into()
    }
}

impl ToSchema for RiskFlag {}

impl RiskFlag {
    pub fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }
}

impl From<bool> for RiskFlag {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

impl From<RiskFlag> for u8 {
    fn from(value: RiskFlag) -> Self {
        value.as_u8()
    }
}

/// Raised when a numeric flag is neither 0 nor 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("risk flag must be 0 or 1, got {0}")]
pub struct InvalidRiskFlag(pub u8);

impl TryFrom<u8> for RiskFlag {
    type Error = InvalidRiskFlag;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Low),
            1 => Ok(Self::High),
            other => Err(InvalidRiskFlag(other)),
        }
    }
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Predictor output after boundary normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPrediction {
    pub model: String,
    pub flag: RiskFlag,
    pub features: Option<FeatureVector>,
    /// Untouched response body, kept for audit.
    pub raw: Value,
}

/// Where a prediction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionSource {
    /// The remote model answered with the given HTTP status.
    Model { status: u16 },
    /// The rule-based predictor stood in.
    Fallback,
}

impl PredictionSource {
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::Fallback)
    }

    /// Wire form: the numeric status, or the string `"fallback"`.
    pub fn to_json(self) -> Value {
        match self {
            Self::Model { status } => Value::from(status),
            Self::Fallback => Value::from("fallback"),
        }
    }
}

/// Persisted prediction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct PredictionId(pub Uuid);

impl fmt::Display for PredictionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Prediction about to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrediction {
    pub patient_id: Option<UserId>,
    pub measurement_id: Option<MeasurementId>,
    pub model: String,
    pub flag: RiskFlag,
    pub features: FeatureVector,
    pub ml_body: Value,
}

/// Stored prediction record. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: PredictionId,
    pub patient_id: Option<UserId>,
    pub measurement_id: Option<MeasurementId>,
    pub model: String,
    pub prediction: RiskFlag,
    pub features: FeatureVector,
    #[schema(value_type = Object)]
    pub ml_body: Value,
    pub created_at: DateTime<Utc>,
}
