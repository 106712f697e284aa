use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::risk::RiskAssessment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioKind {
    #[serde(rename = "heatup")]
    HeatUp,
    #[serde(rename = "cooldown")]
    CoolDown,
}

impl ScenarioKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HeatUp => "heatup",
            Self::CoolDown => "cooldown",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScenarioKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "heatup" | "heat-up" | "heat_up" | "heat" => Ok(Self::HeatUp),
            "cooldown" | "cool-down" | "cool_down" | "cool" => Ok(Self::CoolDown),
            _ => Err(format!(
                "unsupported scenario '{value}'. Use heatup or cooldown"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMode {
    Live,
    /// The health probe failed; risk fields stay as they were at start.
    InterpolationOnly,
}

/// How a run left the `Running` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEnd {
    Completed,
    Stopped,
    Superseded,
    Halted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentValues {
    pub features: FeatureVector,
    pub risk: Option<RiskAssessment>,
}

/// Engine-owned state of the current or most recent run. Kept after the run
/// ends so the last values can be inspected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationState {
    pub run_id: String,
    pub is_active: bool,
    pub scenario: ScenarioKind,
    pub target_subject_id: String,
    pub prediction_mode: PredictionMode,
    pub current_values: CurrentValues,
    pub elapsed_ticks: u32,
    pub total_ticks: u32,
    pub consecutive_failures: u32,
    pub total_failures: u32,
    pub started_at: String,
    pub ended: Option<RunEnd>,
}

impl SimulationState {
    /// Interpolation fraction for the current tick count, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.total_ticks == 0 {
            return 1.0;
        }
        (self.elapsed_ticks as f64 / self.total_ticks as f64).min(1.0)
    }
}
