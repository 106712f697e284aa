use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::features::FeatureVector;
use crate::prediction::error::PredictionError;
use crate::risk::RiskAssessment;

/// Result of one prediction call. Transient, never persisted.
pub type PredictionOutcome = Result<RiskAssessment, PredictionError>;

/// External risk model. Implementations hold no per-call state and are
/// shared as `Arc<dyn Predictor>`.
#[async_trait]
pub trait Predictor: Send + Sync {
    fn id(&self) -> &str;
    async fn predict(&self, features: &FeatureVector) -> PredictionOutcome;
    /// Best-effort liveness probe.
    async fn health(&self) -> Result<(), PredictionError>;
}

pub const FIELD_RISK_SCORE: &str = "risk_score";
pub const FIELD_PREDICTED_CLASS: &str = "predicted_class";
pub const FIELD_CONFIDENCE: &str = "confidence";

/// Validates a decoded response object. Missing, mistyped, non-finite or
/// out-of-range fields are `Validation` errors; accepted values are returned
/// untouched.
pub fn parse_assessment(object: &Map<String, Value>) -> PredictionOutcome {
    let score = unit_interval_field(object, FIELD_RISK_SCORE)?;
    let confidence = unit_interval_field(object, FIELD_CONFIDENCE)?;

    let predicted_class = match object.get(FIELD_PREDICTED_CLASS) {
        None | Some(Value::Null) => {
            return Err(PredictionError::Validation(format!(
                "response missing '{FIELD_PREDICTED_CLASS}'"
            )))
        }
        Some(Value::String(label)) if !label.trim().is_empty() => label.clone(),
        Some(Value::String(_)) => {
            return Err(PredictionError::Validation(format!(
                "'{FIELD_PREDICTED_CLASS}' is empty"
            )))
        }
        Some(other) => {
            return Err(PredictionError::Validation(format!(
                "'{FIELD_PREDICTED_CLASS}' must be a string, got {other}"
            )))
        }
    };

    Ok(RiskAssessment {
        score,
        predicted_class,
        confidence,
    })
}

fn unit_interval_field(object: &Map<String, Value>, field: &str) -> Result<f64, PredictionError> {
    let value = object
        .get(field)
        .filter(|value| !value.is_null())
        .ok_or_else(|| PredictionError::Validation(format!("response missing '{field}'")))?;

    let number = value.as_f64().ok_or_else(|| {
        PredictionError::Validation(format!("'{field}' must be a number, got {value}"))
    })?;

    if !number.is_finite() || !(0.0..=1.0).contains(&number) {
        return Err(PredictionError::Validation(format!(
            "'{field}' must be within [0, 1], got {number}"
        )));
    }
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("test payload is an object")
    }

    #[test]
    fn test_accepts_well_formed_response() {
        let parsed = parse_assessment(&object(json!({
            "risk_score": 0.42,
            "predicted_class": "moderate",
            "confidence": 0.9,
            "model_version": "hi-2"
        })))
        .unwrap();
        assert_eq!(parsed, RiskAssessment::new(0.42, "moderate", 0.9));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let parsed = parse_assessment(&object(json!({
            "risk_score": 1.0,
            "predicted_class": "critical",
            "confidence": 0.0
        })))
        .unwrap();
        assert_eq!(parsed.score, 1.0);
        assert_eq!(parsed.confidence, 0.0);
    }

    #[test]
    fn test_rejects_out_of_range_and_missing_fields() {
        let cases = [
            json!({ "risk_score": 1.01, "predicted_class": "high", "confidence": 0.5 }),
            json!({ "risk_score": -0.1, "predicted_class": "low", "confidence": 0.5 }),
            json!({ "risk_score": 0.5, "predicted_class": "high", "confidence": 2 }),
            json!({ "predicted_class": "high", "confidence": 0.5 }),
            json!({ "risk_score": 0.5, "confidence": 0.5 }),
            json!({ "risk_score": 0.5, "predicted_class": "", "confidence": 0.5 }),
            json!({ "risk_score": "0.5", "predicted_class": "high", "confidence": 0.5 }),
            json!({ "risk_score": 0.5, "predicted_class": 3, "confidence": 0.5 }),
            json!({ "risk_score": null, "predicted_class": "high", "confidence": 0.5 }),
        ];
        for case in cases {
            let result = parse_assessment(&object(case.clone()));
            assert!(
                matches!(result, Err(PredictionError::Validation(_))),
                "expected validation error for {case}, got {result:?}"
            );
        }
    }
}
