//! Heat-stress simulation backend.
//!
//! Drives synthetic worker telemetry from a comfortable baseline toward a
//! heat or cold extreme, asks an external model for a risk assessment on
//! every tick, and keeps a headless dashboard in sync.
//!
//! # Architecture
//!
//! - `features`: typed feature vectors, endpoint profiles, interpolation
//! - `risk`: risk assessments and the score to color mapping
//! - `prediction`: HTTP client for the external risk model
//! - `simulation`: the tick-driven state machine and failure policy
//! - `subject`: monitored subjects and partial updates
//! - `dashboard`: canonical subject store and notification feed
//! - `bus`: broadcast event bus
//! - `config`: file and environment configuration

pub mod bus;
pub mod config;
pub mod dashboard;
pub mod features;
pub mod prediction;
pub mod risk;
pub mod simulation;
pub mod subject;

use std::sync::Arc;

use bus::EventBus;
use config::AppConfig;
use dashboard::Dashboard;
use features::ProfileStore;
use prediction::{HttpPredictionClient, PredictionError, Predictor};
use simulation::{EngineError, SimulationEngine};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Prediction(#[from] PredictionError),
    #[error("{0}")]
    Engine(#[from] EngineError),
}

/// Process-wide collaborators, built once at startup.
pub struct AppState {
    pub config: AppConfig,
    pub bus: Arc<EventBus>,
    pub dashboard: Arc<Dashboard>,
    pub profiles: Arc<ProfileStore>,
    pub engine: SimulationEngine,
}

impl AppState {
    /// Wires the HTTP prediction client described by `config`.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let client = HttpPredictionClient::new(config.prediction.clone())?;
        Self::with_predictor(config, Arc::new(client))
    }

    pub fn with_predictor(config: AppConfig, predictor: Arc<dyn Predictor>) -> Result<Self, AppError> {
        let bus = Arc::new(EventBus::new());
        let dashboard = Arc::new(Dashboard::new(bus.clone()));
        let profiles = Arc::new(ProfileStore::builtin());
        let engine = SimulationEngine::new(
            predictor,
            dashboard.clone(),
            profiles.clone(),
            config.simulation.clone(),
        )?;
        Ok(Self {
            config,
            bus,
            dashboard,
            profiles,
            engine,
        })
    }
}
