//! Risk assessment values and their display mapping.

mod color;

use serde::{Deserialize, Serialize};

pub use color::{risk_color, ColorStop, RiskPalette, Rgb};

/// Score, class and confidence triple returned by the prediction service.
/// Values are kept exactly as the service returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: f64,
    pub predicted_class: String,
    pub confidence: f64,
}

impl RiskAssessment {
    pub fn new(score: f64, predicted_class: impl Into<String>, confidence: f64) -> Self {
        Self {
            score,
            predicted_class: predicted_class.into(),
            confidence,
        }
    }

    pub fn color(&self) -> Rgb {
        risk_color(self.score)
    }
}
