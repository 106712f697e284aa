use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::simulation::error::EngineError;

/// Allowed tick periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum TickPeriod {
    Millis200,
    Millis500,
    Millis1000,
    Millis2000,
}

impl TickPeriod {
    pub const fn as_millis(&self) -> u64 {
        match self {
            Self::Millis200 => 200,
            Self::Millis500 => 500,
            Self::Millis1000 => 1_000,
            Self::Millis2000 => 2_000,
        }
    }

    pub const fn as_duration(&self) -> Duration {
        Duration::from_millis(self.as_millis())
    }

    pub const fn all() -> &'static [TickPeriod] {
        &[
            TickPeriod::Millis200,
            TickPeriod::Millis500,
            TickPeriod::Millis1000,
            TickPeriod::Millis2000,
        ]
    }
}

impl Default for TickPeriod {
    fn default() -> Self {
        Self::Millis1000
    }
}

impl fmt::Display for TickPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.as_millis())
    }
}

impl TryFrom<u64> for TickPeriod {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::all()
            .iter()
            .copied()
            .find(|period| period.as_millis() == value)
            .ok_or_else(|| {
                format!("unsupported tick period {value}ms. Use 200, 500, 1000, or 2000")
            })
    }
}

impl From<TickPeriod> for u64 {
    fn from(value: TickPeriod) -> Self {
        value.as_millis()
    }
}

/// Failure ceilings that force a run to halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailurePolicy {
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
    #[serde(default = "default_max_total_failures")]
    pub max_total_failures: u32,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self {
            max_consecutive_failures: default_max_consecutive_failures(),
            max_total_failures: default_max_total_failures(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "ceiling", rename_all = "snake_case")]
pub enum HaltReason {
    ConsecutiveFailures { count: u32, limit: u32 },
    TotalFailures { count: u32, limit: u32 },
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConsecutiveFailures { count, limit } => {
                write!(f, "{count} consecutive prediction failures (limit {limit})")
            }
            Self::TotalFailures { count, limit } => {
                write!(f, "{count} prediction failures in this run (limit {limit})")
            }
        }
    }
}

impl FailurePolicy {
    /// The ceiling reached by the given counters, if any. The consecutive
    /// ceiling is reported first when both are reached on the same tick.
    pub fn breach(&self, consecutive: u32, total: u32) -> Option<HaltReason> {
        if consecutive >= self.max_consecutive_failures {
            return Some(HaltReason::ConsecutiveFailures {
                count: consecutive,
                limit: self.max_consecutive_failures,
            });
        }
        if total >= self.max_total_failures {
            return Some(HaltReason::TotalFailures {
                count: total,
                limit: self.max_total_failures,
            });
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub tick_period: TickPeriod,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Probe the prediction service before each run and fall back to
    /// interpolation-only mode when it is down.
    #[serde(default = "default_health_probe")]
    pub health_probe: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_period: TickPeriod::default(),
            duration_ms: default_duration_ms(),
            failure_policy: FailurePolicy::default(),
            health_probe: default_health_probe(),
        }
    }
}

impl SimulationConfig {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("HEATGUARD_TICK_MS") {
            match value
                .trim()
                .parse::<u64>()
                .map_err(|error| error.to_string())
                .and_then(TickPeriod::try_from)
            {
                Ok(period) => self.tick_period = period,
                Err(error) => tracing::warn!("ignoring HEATGUARD_TICK_MS='{value}': {error}"),
            }
        }
        if let Ok(value) = std::env::var("HEATGUARD_DURATION_MS") {
            match value.trim().parse::<u64>() {
                Ok(duration_ms) => self.duration_ms = duration_ms,
                Err(error) => tracing::warn!("ignoring HEATGUARD_DURATION_MS='{value}': {error}"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.duration_ms == 0 {
            return Err(EngineError::Config(
                "simulation duration must be greater than 0".to_string(),
            ));
        }
        let policy = &self.failure_policy;
        if policy.max_consecutive_failures == 0 || policy.max_total_failures == 0 {
            return Err(EngineError::Config(
                "failure ceilings must be greater than 0".to_string(),
            ));
        }
        if policy.max_total_failures < policy.max_consecutive_failures {
            return Err(EngineError::Config(format!(
                "total failure ceiling ({}) cannot be lower than the consecutive ceiling ({})",
                policy.max_total_failures, policy.max_consecutive_failures
            )));
        }
        Ok(())
    }

    /// Number of ticks a run lasts at the given period, at least one.
    pub fn total_ticks(&self, period: TickPeriod) -> u32 {
        let ticks = self.duration_ms.div_ceil(period.as_millis()).max(1);
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }
}

fn default_max_consecutive_failures() -> u32 {
    3
}

fn default_max_total_failures() -> u32 {
    10
}

fn default_duration_ms() -> u64 {
    30_000
}

fn default_health_probe() -> bool {
    true
}
