//! Subjects being monitored and the partial updates applied to them.

mod roster;

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::risk::RiskAssessment;

pub use roster::{generate_name, generate_roster, generate_subject};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    /// Full vector: demographic, environmental and statistical fields.
    pub features: FeatureVector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskAssessment>,
}

impl Subject {
    pub fn new(id: impl Into<String>, name: impl Into<String>, features: FeatureVector) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            features,
            risk: None,
        }
    }

    pub fn with_risk(mut self, risk: RiskAssessment) -> Self {
        self.risk = Some(risk);
        self
    }

    /// Merges the changed fields. Risk is replaced only when the update
    /// carries one, so a feature-only update never clears it.
    pub fn apply(&mut self, update: &SubjectUpdate) {
        self.features.overlay(&update.features);
        if let Some(risk) = &update.risk {
            self.risk = Some(risk.clone());
        }
    }
}

/// Fields that changed on one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectUpdate {
    #[serde(default, skip_serializing_if = "FeatureVector::is_empty")]
    pub features: FeatureVector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskAssessment>,
}

impl SubjectUpdate {
    pub fn features(features: FeatureVector) -> Self {
        Self {
            features,
            risk: None,
        }
    }

    pub fn risk(risk: RiskAssessment) -> Self {
        Self {
            features: FeatureVector::new(),
            risk: Some(risk),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty() && self.risk.is_none()
    }
}
