//! Headless dashboard state.
//!
//! Owns the canonical subjects and the user notification feed. The engine
//! reaches it only through `SimulationObserver`; every change is mirrored on
//! the event bus with the subject's current risk color.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::bus::event_types::{
    CATEGORY_SIMULATION, CATEGORY_SUBJECT, EVENT_SIMULATION_ERROR, EVENT_SIMULATION_HALTED,
    EVENT_SIMULATION_LIFECYCLE, EVENT_SUBJECT_UPDATED,
};
use crate::bus::EventBus;
use crate::risk::RiskPalette;
use crate::simulation::{
    ErrorKind, FailureContext, LifecycleEvent, Severity, SimulationError, SimulationObserver,
};
use crate::subject::{Subject, SubjectUpdate};

pub const MAX_NOTIFICATIONS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: String,
    pub severity: Severity,
    pub kind: ErrorKind,
    pub message: String,
    pub run_id: String,
    pub subject_id: String,
    pub created_at: String,
}

pub struct Dashboard {
    subjects: DashMap<String, Subject>,
    notifications: Mutex<VecDeque<Notification>>,
    palette: RiskPalette,
    bus: Arc<EventBus>,
}

impl Dashboard {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self::with_palette(bus, RiskPalette::default())
    }

    pub fn with_palette(bus: Arc<EventBus>, palette: RiskPalette) -> Self {
        Self {
            subjects: DashMap::new(),
            notifications: Mutex::new(VecDeque::with_capacity(MAX_NOTIFICATIONS)),
            palette,
            bus,
        }
    }

    pub fn insert_subject(&self, subject: Subject) {
        self.subjects.insert(subject.id.clone(), subject);
    }

    pub fn subject(&self, id: &str) -> Option<Subject> {
        self.subjects.get(id).map(|entry| entry.value().clone())
    }

    /// All subjects ordered by id.
    pub fn subjects(&self) -> Vec<Subject> {
        let mut subjects: Vec<Subject> = self
            .subjects
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        subjects.sort_by(|a, b| a.id.cmp(&b.id));
        subjects
    }

    /// Display color for the subject's last known risk, if any.
    pub fn risk_color_hex(&self, id: &str) -> Option<String> {
        let subject = self.subjects.get(id)?;
        let risk = subject.risk.as_ref()?;
        Some(self.palette.color_for(risk.score).to_hex())
    }

    /// Newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock_notifications().iter().rev().cloned().collect()
    }

    pub fn clear_notifications(&self) {
        self.lock_notifications().clear();
    }

    fn lock_notifications(&self) -> std::sync::MutexGuard<'_, VecDeque<Notification>> {
        self.notifications
            .lock()
            .expect("notification feed mutex poisoned")
    }

    fn push_notification(&self, notification: Notification) {
        let mut feed = self.lock_notifications();
        if feed.len() == MAX_NOTIFICATIONS {
            feed.pop_front();
        }
        feed.push_back(notification);
    }
}

impl SimulationObserver for Dashboard {
    fn on_subject_update(&self, subject_id: &str, update: &SubjectUpdate) {
        let risk = {
            let Some(mut subject) = self.subjects.get_mut(subject_id) else {
                tracing::warn!("dropping update for unknown subject {subject_id}");
                return;
            };
            subject.apply(update);
            subject.risk.clone()
        };

        let color = risk
            .as_ref()
            .map(|risk| self.palette.color_for(risk.score).to_hex());
        self.bus.emit(
            CATEGORY_SUBJECT,
            EVENT_SUBJECT_UPDATED,
            None,
            Some(subject_id.to_string()),
            json!({
                "update": update,
                "risk": risk,
                "risk_color": color,
            }),
        );
    }

    fn on_simulation_error(&self, error: &SimulationError, context: &FailureContext) {
        self.push_notification(Notification {
            id: Uuid::new_v4().to_string(),
            severity: error.severity,
            kind: error.kind,
            message: error.user_message.clone(),
            run_id: context.run_id.clone(),
            subject_id: context.subject_id.clone(),
            created_at: Utc::now().to_rfc3339(),
        });

        let event_type = if error.kind == ErrorKind::PolicyHalt {
            EVENT_SIMULATION_HALTED
        } else {
            EVENT_SIMULATION_ERROR
        };
        self.bus.emit(
            CATEGORY_SIMULATION,
            event_type,
            Some(context.run_id.clone()),
            Some(context.subject_id.clone()),
            json!({
                "kind": error.kind,
                "severity": error.severity,
                "retryable": error.retryable,
                "status": error.status,
                "message": error.message,
                "user_message": error.user_message,
                "context": context,
                "risk_color": self.risk_color_hex(&context.subject_id),
            }),
        );
    }

    fn on_lifecycle(&self, event: &LifecycleEvent) {
        self.bus.emit(
            CATEGORY_SIMULATION,
            EVENT_SIMULATION_LIFECYCLE,
            Some(event.run_id.clone()),
            Some(event.subject_id.clone()),
            json!({
                "event": event,
                "risk_color": self.risk_color_hex(&event.subject_id),
            }),
        );
    }
}
