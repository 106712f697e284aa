//! Event category and type constants.

use super::event_bus::BusEvent;

pub const CATEGORY_SUBJECT: &str = "subject";
pub const CATEGORY_SIMULATION: &str = "simulation";

pub const EVENT_SUBJECT_UPDATED: &str = "subject.updated";
pub const EVENT_SIMULATION_ERROR: &str = "simulation.error";
pub const EVENT_SIMULATION_HALTED: &str = "simulation.halted";
pub const EVENT_SIMULATION_LIFECYCLE: &str = "simulation.lifecycle";

/// Events a consumer should surface prominently rather than just record.
pub fn is_alert(event: &BusEvent) -> bool {
    event.event_type == EVENT_SIMULATION_HALTED
        || (event.event_type == EVENT_SIMULATION_ERROR
            && event.payload["severity"].as_str() != Some("low"))
}
