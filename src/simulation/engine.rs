use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{oneshot, Mutex as AsyncMutex};
use uuid::Uuid;

use crate::features::{interpolate, FeatureProfile, FeatureVector, ProfileStore};
use crate::prediction::{PredictionOutcome, Predictor};
use crate::subject::{Subject, SubjectUpdate};

use super::classifier::{classify, SimulationError};
use super::config::{SimulationConfig, TickPeriod};
use super::error::EngineError;
use super::observer::{FailureContext, LifecycleEvent, LifecycleKind, SimulationObserver};
use super::state::{
    CurrentValues, EngineStatus, PredictionMode, RunEnd, ScenarioKind, SimulationState,
};
use super::ticker::{Ticker, TokioTicker};

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No run was active.
    Idle,
    /// The run continues.
    Continue,
    Completed,
    Halted,
    /// The run was stopped or replaced while the prediction was pending.
    Discarded,
}

/// Observer callbacks are delivered while the engine state lock is held, so
/// they arrive in the same order as the state changes they describe.
/// Observers must not call back into the engine.
#[derive(Clone)]
pub struct SimulationEngine {
    predictor: Arc<dyn Predictor>,
    observer: Arc<dyn SimulationObserver>,
    profiles: Arc<ProfileStore>,
    ticker: Arc<dyn Ticker>,
    config: Arc<SimulationConfig>,
    inner: Arc<Mutex<EngineInner>>,
    /// Held for a whole tick so results apply strictly in tick order.
    tick_turn: Arc<AsyncMutex<()>>,
}

struct EngineInner {
    generation: u64,
    tick_period: TickPeriod,
    active: Option<ActiveRun>,
    state: Option<SimulationState>,
}

struct ActiveRun {
    generation: u64,
    start: FeatureProfile,
    end: FeatureProfile,
    /// Subject features at start; the prediction payload is this overlaid
    /// with the interpolated fields.
    base_features: FeatureVector,
    cancel: oneshot::Sender<()>,
}

/// Observer calls collected while merging a tick result.
enum Notice {
    Update(String, SubjectUpdate),
    Error(SimulationError, FailureContext),
    Lifecycle(LifecycleEvent),
}

struct PreparedTick {
    run_id: String,
    subject_id: String,
    tick: u32,
    mode: PredictionMode,
    payload: FeatureVector,
}

impl SimulationEngine {
    pub fn new(
        predictor: Arc<dyn Predictor>,
        observer: Arc<dyn SimulationObserver>,
        profiles: Arc<ProfileStore>,
        config: SimulationConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let tick_period = config.tick_period;
        Ok(Self {
            predictor,
            observer,
            profiles,
            ticker: Arc::new(TokioTicker),
            config: Arc::new(config),
            inner: Arc::new(Mutex::new(EngineInner {
                generation: 0,
                tick_period,
                active: None,
                state: None,
            })),
            tick_turn: Arc::new(AsyncMutex::new(())),
        })
    }

    /// Replaces the timer that paces the driver task.
    pub fn with_ticker(mut self, ticker: Arc<dyn Ticker>) -> Self {
        self.ticker = ticker;
        self
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().expect("simulation engine mutex poisoned")
    }

    pub fn status(&self) -> EngineStatus {
        if self.lock().active.is_some() {
            EngineStatus::Running
        } else {
            EngineStatus::Idle
        }
    }

    /// State of the current run, or of the last one if it has ended.
    pub fn snapshot(&self) -> Option<SimulationState> {
        self.lock().state.clone()
    }

    pub fn tick_period(&self) -> TickPeriod {
        self.lock().tick_period
    }

    pub fn set_tick_period(&self, period: TickPeriod) -> Result<(), EngineError> {
        let mut inner = self.lock();
        if inner.active.is_some() {
            return Err(EngineError::Busy("tick period"));
        }
        inner.tick_period = period;
        Ok(())
    }

    /// Starts a scenario for `subject`. Any run in progress is stopped before
    /// the health check, then the new run is installed. The first tick fires
    /// one tick period later. Returns the new run id.
    pub async fn start(&self, scenario: ScenarioKind, subject: &Subject) -> Result<String, EngineError> {
        {
            let mut inner = self.lock();
            if let Some(event) = supersede_active(&mut inner) {
                self.observer.on_lifecycle(&event);
            }
        }

        let mode = self.probe_mode().await;
        let (start, end) = self.profiles.endpoints(scenario);
        let run_id = Uuid::new_v4().to_string();

        let mut inner = self.lock();
        // A concurrent start may have installed its run during the health check.
        if let Some(event) = supersede_active(&mut inner) {
            self.observer.on_lifecycle(&event);
        }

        inner.generation += 1;
        let generation = inner.generation;
        let period = inner.tick_period;
        let total_ticks = self.config.total_ticks(period);

        let (cancel, cancelled) = oneshot::channel();
        inner.active = Some(ActiveRun {
            generation,
            start: start.clone(),
            end: end.clone(),
            base_features: subject.features.clone(),
            cancel,
        });
        inner.state = Some(SimulationState {
            run_id: run_id.clone(),
            is_active: true,
            scenario,
            target_subject_id: subject.id.clone(),
            prediction_mode: mode,
            current_values: CurrentValues {
                features: start.values.clone(),
                risk: subject.risk.clone(),
            },
            elapsed_ticks: 0,
            total_ticks,
            consecutive_failures: 0,
            total_failures: 0,
            started_at: Utc::now().to_rfc3339(),
            ended: None,
        });

        let engine = self.clone();
        tokio::spawn(async move {
            engine.drive(generation, cancelled, period.as_duration()).await;
        });

        tracing::info!(
            "simulation {run_id} started: {scenario} for subject {} ({total_ticks} ticks at {period}, {mode:?})",
            subject.id
        );
        self.observer.on_lifecycle(&LifecycleEvent {
            run_id: run_id.clone(),
            subject_id: subject.id.clone(),
            scenario,
            elapsed_ticks: 0,
            total_ticks,
            kind: LifecycleKind::Started { mode },
        });
        Ok(run_id)
    }

    /// Stops the active run. Current values stay as they were; a prediction
    /// still in flight is discarded when it resolves. Returns whether a run
    /// was active.
    pub fn stop(&self) -> bool {
        let mut inner = self.lock();
        let Some(run) = inner.active.take() else {
            return false;
        };
        let _ = run.cancel.send(());
        if let Some(event) = finish_state(&mut inner.state, RunEnd::Stopped) {
            tracing::info!("simulation {} stopped at tick {}", event.run_id, event.elapsed_ticks);
            self.observer.on_lifecycle(&event);
        }
        true
    }

    /// Advances the active run by one tick.
    pub async fn tick(&self) -> TickOutcome {
        let generation = match self.lock().active.as_ref() {
            Some(run) => run.generation,
            None => return TickOutcome::Idle,
        };
        self.tick_generation(generation).await
    }

    async fn probe_mode(&self) -> PredictionMode {
        if !self.config.health_probe {
            return PredictionMode::Live;
        }
        match self.predictor.health().await {
            Ok(()) => PredictionMode::Live,
            Err(error) => {
                tracing::warn!(
                    "prediction service '{}' failed health probe, running interpolation only: {error}",
                    self.predictor.id()
                );
                PredictionMode::InterpolationOnly
            }
        }
    }

    async fn drive(self, generation: u64, mut cancelled: oneshot::Receiver<()>, period: Duration) {
        loop {
            tokio::select! {
                biased;
                _ = &mut cancelled => break,
                _ = self.ticker.wait(period) => {}
            }
            if self.tick_generation(generation).await != TickOutcome::Continue {
                break;
            }
        }
        tracing::debug!("tick driver for generation {generation} exited");
    }

    async fn tick_generation(&self, generation: u64) -> TickOutcome {
        let _turn = self.tick_turn.lock().await;

        let prepared = {
            let mut inner = self.lock();
            let EngineInner { active, state, .. } = &mut *inner;
            let (Some(run), Some(state)) = (active.as_ref(), state.as_mut()) else {
                return TickOutcome::Idle;
            };
            if run.generation != generation {
                return TickOutcome::Idle;
            }

            state.elapsed_ticks = (state.elapsed_ticks + 1).min(state.total_ticks);
            let features = interpolate(&run.start, &run.end, state.progress());
            state.current_values.features = features.clone();

            let mut payload = run.base_features.clone();
            payload.overlay(&features);

            tracing::debug!(
                "simulation {} tick {}/{}",
                state.run_id,
                state.elapsed_ticks,
                state.total_ticks
            );
            self.observer
                .on_subject_update(&state.target_subject_id, &SubjectUpdate::features(features));

            PreparedTick {
                run_id: state.run_id.clone(),
                subject_id: state.target_subject_id.clone(),
                tick: state.elapsed_ticks,
                mode: state.prediction_mode,
                payload,
            }
        };

        let outcome = match prepared.mode {
            PredictionMode::Live => Some(self.predictor.predict(&prepared.payload).await),
            PredictionMode::InterpolationOnly => None,
        };

        let mut inner = self.lock();
        let (result, notices) = self.apply_outcome(&mut inner, generation, &prepared, outcome);
        self.dispatch(notices);
        result
    }

    fn apply_outcome(
        &self,
        inner: &mut EngineInner,
        generation: u64,
        prepared: &PreparedTick,
        outcome: Option<PredictionOutcome>,
    ) -> (TickOutcome, Vec<Notice>) {
        let mut notices = Vec::new();

        let is_current = inner
            .active
            .as_ref()
            .is_some_and(|run| run.generation == generation);
        let Some(state) = inner.state.as_mut().filter(|_| is_current) else {
            tracing::debug!(
                "dropping tick {} result for superseded run {}",
                prepared.tick,
                prepared.run_id
            );
            return (TickOutcome::Discarded, notices);
        };

        let policy = self.config.failure_policy;
        let mut halt = None;
        match outcome {
            None => {}
            Some(Ok(risk)) => {
                state.consecutive_failures = 0;
                state.current_values.risk = Some(risk.clone());
                notices.push(Notice::Update(
                    prepared.subject_id.clone(),
                    SubjectUpdate::risk(risk),
                ));
            }
            Some(Err(error)) => {
                let classification = classify(&error);
                let counted = classification.counts_toward_ceiling;
                if counted {
                    state.consecutive_failures += 1;
                    state.total_failures += 1;
                }
                let severity = classification.severity(state.consecutive_failures, &policy);
                tracing::warn!(
                    "simulation {} tick {}: prediction failed ({}/{} consecutive, {}/{} total): {error}",
                    prepared.run_id,
                    prepared.tick,
                    state.consecutive_failures,
                    policy.max_consecutive_failures,
                    state.total_failures,
                    policy.max_total_failures
                );
                let context = FailureContext {
                    run_id: prepared.run_id.clone(),
                    subject_id: prepared.subject_id.clone(),
                    scenario: state.scenario,
                    tick: prepared.tick,
                    consecutive_failures: state.consecutive_failures,
                    total_failures: state.total_failures,
                };
                notices.push(Notice::Error(
                    SimulationError::from_prediction(&error, classification, severity),
                    context.clone(),
                ));
                let breach = if counted {
                    policy.breach(state.consecutive_failures, state.total_failures)
                } else {
                    None
                };
                if let Some(reason) = breach {
                    tracing::error!("simulation {} halted: {reason}", prepared.run_id);
                    notices.push(Notice::Error(SimulationError::policy_halt(reason), context));
                    halt = Some(RunEnd::Halted);
                }
            }
        }

        let finished = state.elapsed_ticks >= state.total_ticks;
        let end = halt.or(finished.then_some(RunEnd::Completed));
        let Some(end) = end else {
            return (TickOutcome::Continue, notices);
        };

        if let Some(run) = inner.active.take() {
            let _ = run.cancel.send(());
        }
        if let Some(event) = finish_state(&mut inner.state, end) {
            if end == RunEnd::Completed {
                tracing::info!("simulation {} completed after {} ticks", event.run_id, event.elapsed_ticks);
            }
            notices.push(Notice::Lifecycle(event));
        }

        let result = match end {
            RunEnd::Halted => TickOutcome::Halted,
            _ => TickOutcome::Completed,
        };
        (result, notices)
    }

    fn dispatch(&self, notices: Vec<Notice>) {
        for notice in notices {
            match notice {
                Notice::Update(subject_id, update) => {
                    self.observer.on_subject_update(&subject_id, &update)
                }
                Notice::Error(error, context) => self.observer.on_simulation_error(&error, &context),
                Notice::Lifecycle(event) => self.observer.on_lifecycle(&event),
            }
        }
    }
}

/// Cancels the active run, if any, and marks its state as superseded.
fn supersede_active(inner: &mut EngineInner) -> Option<LifecycleEvent> {
    let previous = inner.active.take()?;
    let _ = previous.cancel.send(());
    let event = finish_state(&mut inner.state, RunEnd::Superseded)?;
    tracing::info!(
        "simulation {} superseded at tick {}",
        event.run_id,
        event.elapsed_ticks
    );
    Some(event)
}

/// Marks the run state as ended and describes the transition.
fn finish_state(state: &mut Option<SimulationState>, reason: RunEnd) -> Option<LifecycleEvent> {
    let state = state.as_mut()?;
    state.is_active = false;
    state.ended = Some(reason);
    Some(LifecycleEvent {
        run_id: state.run_id.clone(),
        subject_id: state.target_subject_id.clone(),
        scenario: state.scenario,
        elapsed_ticks: state.elapsed_ticks,
        total_ticks: state.total_ticks,
        kind: LifecycleKind::Ended { reason },
    })
}
