//! Shared helpers for simulation integration tests.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use heatguard_lib::bus::BusEvent;
use heatguard_lib::config::AppConfig;
use heatguard_lib::features::{FeatureKey, ProfileId, ProfileStore};
use heatguard_lib::simulation::{ManualTicker, SimulationEngine};
use heatguard_lib::subject::Subject;
use heatguard_lib::AppState;
use tokio::sync::broadcast;

pub const SUBJECT_ID: &str = "worker-001";

/// App wired to the given prediction service, with a manually advanced ticker.
pub fn app_for(base_url: String, duration_ms: u64) -> (AppState, SimulationEngine, Arc<ManualTicker>) {
    let mut config = AppConfig::default();
    config.prediction.base_url = base_url;
    config.prediction.timeout_ms = 1_000;
    config.simulation.duration_ms = duration_ms;

    let state = AppState::new(config).expect("app should build");
    let ticker = Arc::new(ManualTicker::new());
    let engine = state.engine.clone().with_ticker(ticker.clone());
    state.dashboard.insert_subject(subject(&state.profiles));
    (state, engine, ticker)
}

pub fn subject(profiles: &ProfileStore) -> Subject {
    let mut features = profiles.get(ProfileId::Neutral).values.clone();
    features.set(FeatureKey::Age, 29.0);
    features.set(FeatureKey::Gender, 1.0);
    Subject::new(SUBJECT_ID, "Priya Jensen", features)
}

pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    within(async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
}

pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out")
}

/// Everything currently buffered on the receiver.
pub fn drain(rx: &mut broadcast::Receiver<BusEvent>) -> Vec<BusEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
