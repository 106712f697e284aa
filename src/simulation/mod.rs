//! Scenario simulation state machine.
//!
//! A run moves one subject's features from a start profile to an end profile
//! over a fixed number of ticks. Each tick writes the interpolated values,
//! asks the prediction service for a fresh risk assessment, and either merges
//! the result or records a failure. Runs end when the last tick lands, when
//! `stop()` is called, when a new scenario replaces them, or when the failure
//! policy halts them.
//!
//! # Sub-modules
//!
//! - `engine`: `SimulationEngine`, run lifecycle and tick loop
//! - `classifier`: failure taxonomy and severity
//! - `observer`: upstream callbacks
//! - `ticker`: timer abstraction driving the tick loop
//! - `config`: tick period, duration and failure ceilings
//! - `state`: engine-owned run state

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod observer;
pub mod state;
pub mod ticker;

pub use classifier::{classify, Classification, ErrorKind, Severity, SimulationError};
pub use config::{FailurePolicy, HaltReason, SimulationConfig, TickPeriod};
pub use engine::{SimulationEngine, TickOutcome};
pub use error::EngineError;
pub use observer::{FailureContext, LifecycleEvent, LifecycleKind, SimulationObserver};
pub use state::{
    CurrentValues, EngineStatus, PredictionMode, RunEnd, ScenarioKind, SimulationState,
};
pub use ticker::{ManualTicker, Ticker, TokioTicker};
