//! Hypertension questionnaire submissions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::vitals::lenient_number;
use super::{UserId, VitalSigns};

/// Lifestyle and history answers collected alongside vitals.
///
/// Every field is optional; blank strings are treated as absent. Numeric
/// answers may arrive as strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HypertensionQuestionnaire {
    #[serde(default, deserialize_with = "lenient_number")]
    pub age: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub salt_intake: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stress_score: Option<f64>,
    pub bp_history: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub sleep_duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub bmi: Option<f64>,
    pub medication: Option<String>,
    pub family_history: Option<String>,
    pub exercise_level: Option<String>,
    pub smoking_status: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    })
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

impl HypertensionQuestionnaire {
    /// Drop blank and zero answers so they persist as absent.
    #[must_use]
    pub fn normalised(self) -> Self {
        Self {
            age: non_zero(self.age),
            salt_intake: non_zero(self.salt_intake),
            stress_score: non_zero(self.stress_score),
            bp_history: non_blank(self.bp_history),
            sleep_duration: non_zero(self.sleep_duration),
            bmi: non_zero(self.bmi),
            medication: non_blank(self.medication),
            family_history: non_blank(self.family_history),
            exercise_level: non_blank(self.exercise_level),
            smoking_status: non_blank(self.smoking_status),
        }
    }
}

/// Hypertension record about to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHypertensionRecord {
    pub patient_id: Option<UserId>,
    pub vitals: VitalSigns,
    pub questionnaire: HypertensionQuestionnaire,
}
