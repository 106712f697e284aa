use serde::{Deserialize, Serialize};

use crate::prediction::error::PredictionError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_predict_path")]
    pub predict_path: String,
    #[serde(default = "default_health_path")]
    pub health_path: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_health_timeout_ms")]
    pub health_timeout_ms: u64,
    /// In-call retries for retryable failures. Zero leaves retrying to the
    /// next tick.
    #[serde(default)]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            predict_path: default_predict_path(),
            health_path: default_health_path(),
            timeout_ms: default_timeout_ms(),
            health_timeout_ms: default_health_timeout_ms(),
            retry_attempts: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl PredictionConfig {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("HEATGUARD_PREDICTION_URL") {
            if !value.trim().is_empty() {
                self.base_url = value.trim().to_string();
            }
        }
        if let Ok(value) = std::env::var("HEATGUARD_PREDICTION_TIMEOUT_MS") {
            match value.trim().parse::<u64>() {
                Ok(timeout_ms) => self.timeout_ms = timeout_ms,
                Err(error) => {
                    tracing::warn!("ignoring HEATGUARD_PREDICTION_TIMEOUT_MS='{value}': {error}")
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), PredictionError> {
        if self.base_url.trim().is_empty() {
            return Err(PredictionError::Config(
                "prediction base_url cannot be empty".to_string(),
            ));
        }
        reqwest::Url::parse(self.base_url.trim()).map_err(|error| {
            PredictionError::Config(format!(
                "invalid prediction base_url '{}': {error}",
                self.base_url
            ))
        })?;
        if !self.predict_path.starts_with('/') || !self.health_path.starts_with('/') {
            return Err(PredictionError::Config(
                "prediction paths must start with '/'".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(PredictionError::Config(
                "prediction timeout must be greater than 0".to_string(),
            ));
        }
        if self.health_timeout_ms == 0 {
            return Err(PredictionError::Config(
                "health probe timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn predict_url(&self) -> String {
        format!("{}{}", self.base_url.trim().trim_end_matches('/'), self.predict_path)
    }

    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url.trim().trim_end_matches('/'), self.health_path)
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_predict_path() -> String {
    "/predict".to_string()
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_health_timeout_ms() -> u64 {
    2_000
}

fn default_retry_backoff_ms() -> u64 {
    250
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: PredictionConfig =
            serde_json::from_str(r#"{ "base_url": "http://model:9000/" }"#).unwrap();
        assert_eq!(config.timeout_ms, 5_000);
        assert_eq!(config.retry_attempts, 0);
        assert_eq!(config.predict_url(), "http://model:9000/predict");
        assert_eq!(config.health_url(), "http://model:9000/health");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PredictionConfig::default();
        config.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(PredictionError::Config(_))));

        let mut config = PredictionConfig::default();
        config.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = PredictionConfig::default();
        config.predict_path = "predict".to_string();
        assert!(config.validate().is_err());
    }
}
