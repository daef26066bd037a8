//! Rule-based stand-in for the remote risk model.

use serde_json::{Value, json};

use super::{FeatureVector, HEART_MODEL, ModelPrediction, RiskFlag, VitalFindings};

/// Note attached to fallback bodies so clients can tell them apart.
pub const FALLBACK_NOTE: &str = "fallback prediction - ML unreachable";

/// Classify `features` with the fixed vital-sign thresholds.
///
/// Risk is high when systolic is at least 140, heart rate at least 100, or
/// oxygen saturation below 92. Pure and infallible.
///
/// # Examples
/// ```
/// use vitalwatch::domain::{FeatureVector, RiskFlag, fallback_flag};
///
/// let features = FeatureVector::new(vec![150.0, 90.0, 80.0, 110.0, 37.0, 98.0]);
/// assert_eq!(fallback_flag(&features), RiskFlag::High);
/// ```
pub fn fallback_flag(features: &FeatureVector) -> RiskFlag {
    RiskFlag::from(VitalFindings::assess(features).is_high_risk())
}

/// Full fallback prediction including the marked response body.
pub fn fallback_prediction(features: &FeatureVector) -> ModelPrediction {
    let flag = fallback_flag(features);
    ModelPrediction {
        model: HEART_MODEL.to_owned(),
        flag,
        features: Some(features.clone()),
        raw: fallback_body(flag, features),
    }
}

fn fallback_body(flag: RiskFlag, features: &FeatureVector) -> Value {
    json!({
        "model": HEART_MODEL,
        "prediction": flag.as_u8(),
        "features": features,
        "note": FALLBACK_NOTE,
        "fallback": true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::systolic_at_threshold([140.0, 80.0, 70.0, 90.0, 36.6, 98.0], RiskFlag::High)]
    #[case::heart_rate_at_threshold([120.0, 80.0, 100.0, 90.0, 36.6, 98.0], RiskFlag::High)]
    #[case::spo2_below_threshold([120.0, 80.0, 70.0, 90.0, 36.6, 91.0], RiskFlag::High)]
    #[case::spo2_at_threshold([120.0, 80.0, 70.0, 90.0, 36.6, 92.0], RiskFlag::Low)]
    #[case::all_normal([120.0, 80.0, 70.0, 99.0, 36.6, 99.0], RiskFlag::Low)]
    #[case::documented_high([150.0, 90.0, 80.0, 110.0, 37.0, 98.0], RiskFlag::High)]
    #[case::documented_low([120.0, 90.0, 70.0, 110.0, 37.0, 99.0], RiskFlag::Low)]
    fn thresholds(#[case] values: [f64; 6], #[case] expected: RiskFlag) {
        let features = FeatureVector::new(values.to_vec());
        assert_eq!(fallback_flag(&features), expected);
    }

    #[test]
    fn empty_input_is_low_risk() {
        assert_eq!(fallback_flag(&FeatureVector::default()), RiskFlag::Low);
    }

    #[test]
    fn fallback_body_is_marked() {
        let features = FeatureVector::new(vec![150.0, 90.0, 80.0, 110.0, 37.0, 98.0]);
        let prediction = fallback_prediction(&features);
        assert_eq!(prediction.model, HEART_MODEL);
        assert_eq!(prediction.raw["prediction"], 1);
        assert_eq!(prediction.raw["note"], FALLBACK_NOTE);
        assert_eq!(prediction.raw["fallback"], true);
    }
}
