use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::effects::{dispatch, SideEffectDispatcher};
use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::models::{Progress, SessionSummary, StepDisplay};
use crate::session::progress::ProgressTracker;
use crate::timer::{StepRegistry, StepStatus};

/// Synchronous engine core: registry, progress and side effects behind one
/// surface.
///
/// Every operation takes the current clock reading as a parameter and
/// returns the events the caller should publish; the state itself never
/// reads a clock and never blocks.
pub struct SessionState {
    session_id: String,
    started_at: DateTime<Utc>,
    config: EngineConfig,
    registry: StepRegistry,
    progress: ProgressTracker,
    dispatcher: Arc<dyn SideEffectDispatcher>,
}

impl SessionState {
    pub fn new(config: EngineConfig, dispatcher: Arc<dyn SideEffectDispatcher>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            config,
            registry: StepRegistry::new(),
            progress: ProgressTracker::new(),
            dispatcher,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn register(
        &mut self,
        step_id: &str,
        duration_secs: Option<u64>,
    ) -> Result<(), EngineError> {
        self.registry.register(step_id, duration_secs)
    }

    pub fn start(&mut self, step_id: &str, now: Instant) -> Result<Vec<EngineEvent>, EngineError> {
        let timer = self.registry.timer_mut(step_id)?;
        let total_ms = timer.total_ms;
        timer.start(total_ms, now);
        let display = timer.display(now);
        info!("step {step_id} started ({}s)", display.total_secs);
        Ok(vec![EngineEvent::StepStateChanged {
            step_id: step_id.to_string(),
            display,
        }])
    }

    pub fn pause(&mut self, step_id: &str, now: Instant) -> Result<Vec<EngineEvent>, EngineError> {
        let timer = self.registry.timer_mut(step_id)?;
        if !timer.pause(now) {
            // Not running; a UI race, deliberately silent.
            return Ok(Vec::new());
        }
        let display = timer.display(now);
        info!("step {step_id} paused at {}s", display.remaining_secs);
        Ok(vec![EngineEvent::StepStateChanged {
            step_id: step_id.to_string(),
            display,
        }])
    }

    pub fn resume(&mut self, step_id: &str, now: Instant) -> Result<Vec<EngineEvent>, EngineError> {
        let timer = self.registry.timer_mut(step_id)?;
        if !timer.resume(now) {
            return Ok(Vec::new());
        }
        let display = timer.display(now);
        info!("step {step_id} resumed at {}s", display.remaining_secs);
        Ok(vec![EngineEvent::StepStateChanged {
            step_id: step_id.to_string(),
            display,
        }])
    }

    pub fn reset(
        &mut self,
        step_id: &str,
        duration_secs: u64,
        now: Instant,
    ) -> Result<Vec<EngineEvent>, EngineError> {
        if duration_secs == 0 {
            return Err(EngineError::InvalidDuration(duration_secs));
        }
        let timer = self.registry.timer_mut(step_id)?;
        timer.reset(duration_secs.saturating_mul(1000));
        let display = timer.display(now);
        Ok(vec![EngineEvent::StepStateChanged {
            step_id: step_id.to_string(),
            display,
        }])
    }

    /// Mark a step done. Idempotent; completing the final step of a
    /// non-empty session fires the celebration exactly once per reset
    /// cycle.
    pub fn mark_complete(
        &mut self,
        step_id: &str,
        now: Instant,
    ) -> Result<Vec<EngineEvent>, EngineError> {
        if !self.registry.contains(step_id) {
            return Err(EngineError::UnknownStep(step_id.to_string()));
        }
        if !self.progress.mark_complete(step_id) {
            return Ok(Vec::new());
        }

        let mut events = Vec::new();

        // A completed step keeps no live countdown.
        if let Ok(timer) = self.registry.timer_mut(step_id) {
            if matches!(timer.status, StepStatus::Running | StepStatus::Paused) {
                timer.cancel();
                events.push(EngineEvent::StepStateChanged {
                    step_id: step_id.to_string(),
                    display: timer.display(now),
                });
            }
        }

        let progress = self.progress.progress(self.registry.len());
        info!(
            "step {step_id} complete ({}/{})",
            progress.completed, progress.total
        );
        events.push(EngineEvent::ProgressChanged { progress });

        if self.progress.try_celebrate(self.registry.len()) {
            let summary = SessionSummary {
                session_id: self.session_id.clone(),
                started_at: self.started_at,
                completed_at: Utc::now(),
                total_steps: self.registry.len(),
            };
            info!("session {} complete", self.session_id);
            dispatch(
                "session complete cue",
                self.dispatcher.play_session_complete_cue(),
            );
            dispatch(
                "session complete message",
                self.dispatcher.show_message("All steps complete"),
            );
            events.push(EngineEvent::SessionCompleted { summary });
        }

        Ok(events)
    }

    pub fn display(&self, step_id: &str, now: Instant) -> Result<StepDisplay, EngineError> {
        if !self.registry.contains(step_id) {
            return Err(EngineError::UnknownStep(step_id.to_string()));
        }
        self.registry
            .timer(step_id)
            .map(|timer| timer.display(now))
            .ok_or_else(|| EngineError::StepNotTimed(step_id.to_string()))
    }

    pub fn progress(&self) -> Progress {
        self.progress.progress(self.registry.len())
    }

    /// First step in registration order that is not yet complete. This is
    /// the walk the presentation layer feeds to its bring-into-view hint.
    pub fn next_incomplete_step(&self) -> Option<String> {
        self.registry
            .step_ids()
            .iter()
            .find(|id| !self.progress.is_complete(id))
            .cloned()
    }

    /// Forward a caller-computed bring-into-view hint to the dispatcher.
    pub fn request_focus(&self, step_id: &str) -> Result<(), EngineError> {
        if !self.registry.contains(step_id) {
            return Err(EngineError::UnknownStep(step_id.to_string()));
        }
        dispatch("bring into view", self.dispatcher.bring_into_view(step_id));
        Ok(())
    }

    pub fn any_running(&self) -> bool {
        self.registry.any_running()
    }

    /// Resync every running timer. Both the periodic tick and the host's
    /// foreground-resume hook land here, so a timer that elapsed during a
    /// suspension finishes (and fires its effects) on the first call back.
    pub fn sweep(&mut self, now: Instant) -> Vec<EngineEvent> {
        let outcomes = self.registry.sweep(now, &self.config);
        let mut events = Vec::new();

        for (step_id, outcome) in outcomes {
            if outcome.finished {
                info!("step {step_id} finished");
                dispatch("finish cue", self.dispatcher.play_finish_cue(&step_id));
                dispatch(
                    "finish notification",
                    self.dispatcher
                        .request_notification("Timer done", &format!("Step {step_id} is done")),
                );
                events.push(EngineEvent::StepFinished {
                    step_id: step_id.clone(),
                });
                if let Some(timer) = self.registry.timer(&step_id) {
                    events.push(EngineEvent::StepStateChanged {
                        step_id,
                        display: timer.display(now),
                    });
                }
                continue;
            }

            if outcome.warning_fired {
                dispatch("warning cue", self.dispatcher.play_warning_cue(&step_id));
                events.push(EngineEvent::StepWarning {
                    step_id: step_id.clone(),
                    remaining_secs: outcome.remaining_secs,
                });
            }
            if outcome.critical_entered {
                events.push(EngineEvent::StepCritical {
                    step_id: step_id.clone(),
                    remaining_secs: outcome.remaining_secs,
                });
            }
            if let Some(timer) = self.registry.timer(&step_id) {
                events.push(EngineEvent::StepTick {
                    step_id,
                    display: timer.display(now),
                });
            }
        }

        events
    }

    /// Clear completions and return every timer to `Stopped`; the
    /// celebration latch re-arms. Step registrations survive.
    pub fn reset_session(&mut self, now: Instant) -> Vec<EngineEvent> {
        self.progress.reset();
        self.registry.reset_all();
        info!("session {}: progress cleared", self.session_id);

        let mut events: Vec<EngineEvent> = self
            .registry
            .step_ids()
            .iter()
            .filter_map(|id| {
                self.registry.timer(id).map(|timer| EngineEvent::StepStateChanged {
                    step_id: id.clone(),
                    display: timer.display(now),
                })
            })
            .collect();
        events.push(EngineEvent::ProgressChanged {
            progress: self.progress.progress(self.registry.len()),
        });
        events
    }
}
