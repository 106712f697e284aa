use std::time::Duration;

use crate::features::FeatureVector;
use crate::prediction::config::PredictionConfig;
use crate::prediction::error::PredictionError;
use crate::prediction::types::{parse_assessment, PredictionOutcome, Predictor};
use crate::risk::RiskAssessment;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// HTTP client for the external risk model.
pub struct HttpPredictionClient {
    predict_url: String,
    health_url: String,
    timeout_ms: u64,
    health_timeout: Duration,
    retry_attempts: u32,
    retry_backoff: Duration,
    client: reqwest::Client,
}

impl HttpPredictionClient {
    pub fn new(config: PredictionConfig) -> Result<Self, PredictionError> {
        config.validate()?;

        Ok(Self {
            predict_url: config.predict_url(),
            health_url: config.health_url(),
            timeout_ms: config.timeout_ms,
            health_timeout: Duration::from_millis(config.health_timeout_ms),
            retry_attempts: config.retry_attempts,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .build()
                .map_err(|error| PredictionError::Config(error.to_string()))?,
        })
    }

    async fn predict_once(&self, features: &FeatureVector) -> PredictionOutcome {
        let response = self
            .client
            .post(&self.predict_url)
            .json(features)
            .send()
            .await
            .map_err(|error| self.map_transport_error(error))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| self.map_transport_error(error))?;

        tracing::debug!("prediction response: status={}", status);

        if !status.is_success() {
            return Err(PredictionError::Api {
                status: Some(status.as_u16()),
                message: truncate_body(&body),
            });
        }

        let payload: serde_json::Value = serde_json::from_str(&body).map_err(|error| {
            PredictionError::Api {
                status: Some(status.as_u16()),
                message: format!("failed to parse prediction JSON: {error}"),
            }
        })?;

        let object = payload.as_object().ok_or_else(|| PredictionError::Api {
            status: Some(status.as_u16()),
            message: format!("prediction response is not a JSON object: {}", truncate_body(&body)),
        })?;

        parse_assessment(object)
    }

    fn map_transport_error(&self, error: reqwest::Error) -> PredictionError {
        if error.is_timeout() {
            return PredictionError::Timeout(format!(
                "prediction request timed out after {} ms",
                self.timeout_ms
            ));
        }
        if error.is_connect() {
            return PredictionError::Network(format!(
                "could not reach prediction service at {}: {error}",
                self.predict_url
            ));
        }
        PredictionError::from(error)
    }
}

#[async_trait::async_trait]
impl Predictor for HttpPredictionClient {
    fn id(&self) -> &str {
        &self.predict_url
    }

    async fn predict(&self, features: &FeatureVector) -> Result<RiskAssessment, PredictionError> {
        let mut attempt = 0u32;
        loop {
            match self.predict_once(features).await {
                Err(error) if error.is_retryable() && attempt < self.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "prediction attempt {} of {} failed ({}), retrying in {}ms",
                        attempt,
                        self.retry_attempts + 1,
                        error,
                        self.retry_backoff.as_millis()
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
                outcome => return outcome,
            }
        }
    }

    async fn health(&self) -> Result<(), PredictionError> {
        let response = self
            .client
            .get(&self.health_url)
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    PredictionError::Timeout(format!(
                        "health probe timed out after {} ms",
                        self.health_timeout.as_millis()
                    ))
                } else {
                    PredictionError::from(error)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PredictionError::Api {
                status: Some(status.as_u16()),
                message: format!("health probe at {} failed", self.health_url),
            })
        }
    }
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_ERROR_BODY_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    out.push_str("...");
    out
}
