//! Application configuration.
//!
//! Resolution order: built-in defaults, then the optional JSON file, then
//! environment variables (after `.env` has been loaded).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::prediction::PredictionConfig;
use crate::simulation::SimulationConfig;
use crate::AppError;

pub const CONFIG_PATH_ENV: &str = "HEATGUARD_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl AppConfig {
    /// Parses a config file. Missing sections and fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|error| {
            AppError::Config(format!("failed to read config {}: {error}", path.display()))
        })?;
        serde_json::from_str::<AppConfig>(&raw).map_err(|error| {
            AppError::Config(format!("invalid config {}: {error}", path.display()))
        })
    }

    pub fn apply_env_overrides(&mut self) {
        self.prediction.apply_env_overrides();
        self.simulation.apply_env_overrides();
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.prediction.validate()?;
        self.simulation.validate()?;
        Ok(())
    }
}

/// Loads `.env`, the config file (explicit path, else `HEATGUARD_CONFIG`),
/// and environment overrides, then validates the result.
pub fn load_app_config(explicit_path: Option<&Path>) -> Result<AppConfig, AppError> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("loaded environment from {}", path.display()),
        Err(error) if error.not_found() => {}
        Err(error) => tracing::warn!("failed to load .env: {error}"),
    }

    let path = explicit_path.map(Path::to_path_buf).or_else(|| {
        std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| PathBuf::from(value.trim()))
    });

    let mut config = match path {
        Some(path) => AppConfig::from_file(&path)?,
        None => AppConfig::default(),
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::simulation::TickPeriod;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "prediction": {{ "base_url": "http://models.local:9000" }}, "simulation": {{ "tick_period": 500 }} }}"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).expect("config should parse");
        assert_eq!(config.prediction.base_url, "http://models.local:9000");
        assert_eq!(config.prediction.timeout_ms, 5_000);
        assert_eq!(config.simulation.tick_period, TickPeriod::Millis500);
        assert_eq!(config.simulation.duration_ms, 30_000);
        assert_eq!(config.simulation.failure_policy.max_total_failures, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heatguard.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::from_file(&path), Err(AppError::Config(_))));

        let missing = dir.path().join("missing.json");
        assert!(matches!(AppConfig::from_file(&missing), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_surfaces_section_errors() {
        let mut config = AppConfig::default();
        config.prediction.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(AppError::Prediction(_))));

        let mut config = AppConfig::default();
        config.simulation.duration_ms = 0;
        assert!(matches!(config.validate(), Err(AppError::Engine(_))));
    }
}
