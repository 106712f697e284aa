//! Failure taxonomy for prediction errors.
//!
//! Classification decides the severity bucket shown to the user and whether
//! a failure counts toward the run's failure ceilings. It never triggers an
//! in-tick retry: the next tick is the retry.

use serde::Serialize;

use crate::prediction::PredictionError;
use crate::simulation::config::{FailurePolicy, HaltReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Timeout,
    ApiError,
    Validation,
    /// Raised by the engine itself when a failure ceiling is reached.
    PolicyHalt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub kind: ErrorKind,
    pub is_retryable: bool,
    pub counts_toward_ceiling: bool,
    pub user_message: String,
}

pub fn classify(error: &PredictionError) -> Classification {
    let (kind, user_message) = match error {
        PredictionError::Network(_) => (
            ErrorKind::Network,
            "Prediction service unreachable. Values keep updating; risk is stale.".to_string(),
        ),
        PredictionError::Timeout(_) => (
            ErrorKind::Timeout,
            "Prediction service is slow to respond. Risk is stale.".to_string(),
        ),
        PredictionError::Api {
            status: Some(code), ..
        } if (400..500).contains(code) => (
            ErrorKind::ApiError,
            format!("Prediction service rejected the request (HTTP {code})."),
        ),
        PredictionError::Api {
            status: Some(code), ..
        } => (
            ErrorKind::ApiError,
            format!("Prediction service error (HTTP {code}). Will try again next tick."),
        ),
        PredictionError::Api { status: None, .. } | PredictionError::Config(_) => (
            ErrorKind::ApiError,
            "Prediction service returned an unusable response.".to_string(),
        ),
        PredictionError::Validation(detail) => (
            ErrorKind::Validation,
            format!("Prediction service returned an invalid assessment: {detail}"),
        ),
    };

    Classification {
        kind,
        is_retryable: error.is_retryable(),
        counts_toward_ceiling: true,
        user_message,
    }
}

impl Classification {
    /// Severity given the consecutive-failure count after this failure was
    /// recorded. Failures become `Warning` once the next one would halt the run.
    pub fn severity(&self, consecutive_failures: u32, policy: &FailurePolicy) -> Severity {
        match self.kind {
            ErrorKind::PolicyHalt => Severity::Critical,
            ErrorKind::Validation => Severity::Warning,
            _ if consecutive_failures + 1 >= policy.max_consecutive_failures => Severity::Warning,
            _ => Severity::Low,
        }
    }
}

/// Upstream error report delivered through the observer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationError {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub retryable: bool,
    pub status: Option<u16>,
    pub message: String,
    pub user_message: String,
}

impl SimulationError {
    pub fn from_prediction(
        error: &PredictionError,
        classification: Classification,
        severity: Severity,
    ) -> Self {
        Self {
            kind: classification.kind,
            severity,
            retryable: classification.is_retryable,
            status: error.status(),
            message: error.to_string(),
            user_message: classification.user_message,
        }
    }

    pub fn policy_halt(reason: HaltReason) -> Self {
        Self {
            kind: ErrorKind::PolicyHalt,
            severity: Severity::Critical,
            retryable: false,
            status: None,
            message: format!("simulation halted by failure policy: {reason}"),
            user_message: "Simulation stopped: the prediction service kept failing.".to_string(),
        }
    }
}
