use serde::Serialize;

use crate::simulation::classifier::SimulationError;
use crate::simulation::state::{PredictionMode, RunEnd, ScenarioKind};
use crate::subject::SubjectUpdate;

/// Counters at the moment a failure was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureContext {
    pub run_id: String,
    pub subject_id: String,
    pub scenario: ScenarioKind,
    pub tick: u32,
    pub consecutive_failures: u32,
    pub total_failures: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LifecycleKind {
    Started { mode: PredictionMode },
    Ended { reason: RunEnd },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleEvent {
    pub run_id: String,
    pub subject_id: String,
    pub scenario: ScenarioKind,
    pub elapsed_ticks: u32,
    pub total_ticks: u32,
    #[serde(flatten)]
    pub kind: LifecycleKind,
}

/// Upstream callbacks. The engine never mutates a subject directly; every
/// change flows through `on_subject_update`.
///
/// Callbacks run while the engine holds its state lock. Implementations must
/// return promptly and must not call back into the engine.
pub trait SimulationObserver: Send + Sync {
    fn on_subject_update(&self, subject_id: &str, update: &SubjectUpdate);
    fn on_simulation_error(&self, error: &SimulationError, context: &FailureContext);
    fn on_lifecycle(&self, _event: &LifecycleEvent) {}
}
