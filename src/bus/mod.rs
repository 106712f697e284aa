//! In-process event bus.
//!
//! The dashboard republishes every subject update, simulation error and run
//! lifecycle change here so any number of consumers (the CLI log, tests, a
//! future UI bridge) can follow a run without touching engine state.

mod event_bus;
pub mod event_types;

pub use event_bus::{BusEvent, EventBus};
