#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timeout: {0}")]
    Timeout(String),
    #[error("prediction service error{}: {message}", status_suffix(.status))]
    Api { status: Option<u16>, message: String },
    #[error("invalid prediction: {0}")]
    Validation(String),
    #[error("config error: {0}")]
    Config(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" (status {code})"))
        .unwrap_or_default()
}

impl PredictionError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether re-sending the same request could succeed. Client errors and
    /// semantically invalid responses never qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => status.map_or(true, |code| code >= 500),
            Self::Validation(_) | Self::Config(_) => false,
        }
    }
}

impl From<reqwest::Error> for PredictionError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            return Self::Timeout(value.to_string());
        }
        if value.is_status() || value.is_decode() {
            return Self::Api {
                status: value.status().map(|status| status.as_u16()),
                message: value.to_string(),
            };
        }
        Self::Network(value.to_string())
    }
}
