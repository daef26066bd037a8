//! Vital-sign readings, feature vectors, and the shared clinical thresholds.
//!
//! The thresholds here are the single source for both the rule-based
//! fallback predictor and the symptom derivation used to route alerts.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::SymptomTags;

/// Systolic pressure (mmHg) at or above which hypertension is flagged.
pub const SYSTOLIC_HIGH: f64 = 140.0;
/// Glucose level (mg/dL) at or above which diabetes is flagged.
pub const GLUCOSE_HIGH: f64 = 140.0;
/// Heart rate (bpm) at or above which heart disease is flagged.
pub const HEART_RATE_HIGH: f64 = 100.0;
/// Oxygen saturation (%) below which asthma is flagged.
pub const SPO2_LOW: f64 = 92.0;

/// Condition label emitted for high systolic pressure.
pub const HYPERTENSION: &str = "Hypertension";
/// Condition label emitted for high glucose.
pub const DIABETES: &str = "Diabetes";
/// Condition label emitted for high heart rate.
pub const HEART_DISEASE: &str = "Heart Disease";
/// Condition label emitted for low oxygen saturation.
pub const ASTHMA: &str = "Asthma";

/// Field names in feature order, as used on the wire.
pub const VITAL_FIELDS: [&str; 6] = [
    "systolic",
    "diastolic",
    "heartRate",
    "glucoseLevel",
    "temperature",
    "oxygenSaturation",
];

/// Six complete vital-sign values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    pub systolic: f64,
    pub diastolic: f64,
    pub heart_rate: f64,
    pub glucose_level: f64,
    pub temperature: f64,
    pub oxygen_saturation: f64,
}

impl VitalSigns {
    /// Values in feature order.
    pub fn to_array(self) -> [f64; 6] {
        [
            self.systolic,
            self.diastolic,
            self.heart_rate,
            self.glucose_level,
            self.temperature,
            self.oxygen_saturation,
        ]
    }

    pub fn features(self) -> FeatureVector {
        FeatureVector::new(self.to_array().to_vec())
    }
}

/// Decode an optional number that form clients may post as a string.
///
/// `54`, `"54"` and `" 54 "` all read as `Some(54.0)`. Blank, non-numeric
/// and non-finite text reads as absent.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Submitted {
        Number(f64),
        Text(String),
    }

    let value = match Option::<Submitted>::deserialize(deserializer)? {
        Some(Submitted::Number(value)) => Some(value),
        Some(Submitted::Text(text)) => text.trim().parse::<f64>().ok(),
        None => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}

/// Vital-sign values as submitted, any of which may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartialVitals {
    #[serde(default, deserialize_with = "lenient_number")]
    pub systolic: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub diastolic: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub heart_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub glucose_level: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub oxygen_saturation: Option<f64>,
}

/// Raised by [`PartialVitals::require_all`] naming the first absent field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{field} is required")]
pub struct MissingVital {
    pub field: &'static str,
}

impl PartialVitals {
    fn in_order(self) -> [Option<f64>; 6] {
        [
            self.systolic,
            self.diastolic,
            self.heart_rate,
            self.glucose_level,
            self.temperature,
            self.oxygen_saturation,
        ]
    }

    /// True when no value was supplied at all.
    pub fn is_empty(self) -> bool {
        self.in_order().iter().all(Option::is_none)
    }

    /// Demand every value, reporting the first missing field.
    pub fn require_all(self) -> Result<VitalSigns, MissingVital> {
        if let Some(index) = self.in_order().iter().position(Option::is_none) {
            return Err(MissingVital {
                field: VITAL_FIELDS[index],
            });
        }
        Ok(self.coerce())
    }

    /// Fill absent values with zero.
    pub fn coerce(self) -> VitalSigns {
        VitalSigns {
            systolic: self.systolic.unwrap_or_default(),
            diastolic: self.diastolic.unwrap_or_default(),
            heart_rate: self.heart_rate.unwrap_or_default(),
            glucose_level: self.glucose_level.unwrap_or_default(),
            temperature: self.temperature.unwrap_or_default(),
            oxygen_saturation: self.oxygen_saturation.unwrap_or_default(),
        }
    }

    /// Feature vector with absent values left as holes.
    pub fn features(self) -> FeatureVector {
        FeatureVector::from_optional(self.in_order())
    }
}

/// Ordered feature values submitted to the predictor.
///
/// Order is systolic, diastolic, heart rate, glucose level, temperature,
/// oxygen saturation. Vectors may be shorter than six when clients send a
/// raw `input` array; absent positions read as `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct FeatureVector(Vec<Option<f64>>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values.into_iter().map(Some).collect())
    }

    pub fn from_optional(values: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self(values.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn at(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied().flatten()
    }

    pub fn systolic(&self) -> Option<f64> {
        self.at(0)
    }

    pub fn heart_rate(&self) -> Option<f64> {
        self.at(2)
    }

    pub fn glucose_level(&self) -> Option<f64> {
        self.at(3)
    }

    pub fn oxygen_saturation(&self) -> Option<f64> {
        self.at(5)
    }

    /// Complete vitals with absent positions stored as zero.
    pub fn to_vitals(&self) -> VitalSigns {
        let v = |i| self.at(i).unwrap_or_default();
        VitalSigns {
            systolic: v(0),
            diastolic: v(1),
            heart_rate: v(2),
            glucose_level: v(3),
            temperature: v(4),
            oxygen_saturation: v(5),
        }
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.0
    }
}

/// Which clinical thresholds a feature vector crosses.
///
/// Missing values never cross a threshold: absent systolic, glucose, and
/// heart rate read as zero and absent oxygen saturation reads as 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VitalFindings {
    pub high_systolic: bool,
    pub high_glucose: bool,
    pub high_heart_rate: bool,
    pub low_oxygen: bool,
}

impl VitalFindings {
    pub fn assess(features: &FeatureVector) -> Self {
        Self {
            high_systolic: features.systolic().unwrap_or(0.0) >= SYSTOLIC_HIGH,
            high_glucose: features.glucose_level().unwrap_or(0.0) >= GLUCOSE_HIGH,
            high_heart_rate: features.heart_rate().unwrap_or(0.0) >= HEART_RATE_HIGH,
            low_oxygen: features.oxygen_saturation().unwrap_or(100.0) < SPO2_LOW,
        }
    }

    /// The cardiovascular risk rule used when no model is available.
    ///
    /// Glucose alone does not raise the flag.
    pub fn is_high_risk(self) -> bool {
        self.high_systolic || self.high_heart_rate || self.low_oxygen
    }

    /// Condition labels for every crossed threshold.
    pub fn conditions(self) -> SymptomTags {
        let pairs = [
            (self.high_systolic, HYPERTENSION),
            (self.high_glucose, DIABETES),
            (self.high_heart_rate, HEART_DISEASE),
            (self.low_oxygen, ASTHMA),
        ];
        pairs
            .into_iter()
            .filter_map(|(hit, label)| hit.then_some(label))
            .collect()
    }
}
