//! Client for the external heat-stress prediction service.
//!
//! The service accepts a flat JSON record of feature values and answers with
//! `{risk_score, predicted_class, confidence}`. Failures are typed so the
//! simulation engine can classify them without inspecting strings.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::HttpPredictionClient;
pub use config::PredictionConfig;
pub use error::PredictionError;
pub use types::{parse_assessment, PredictionOutcome, Predictor};
