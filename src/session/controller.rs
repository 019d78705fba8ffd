use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::effects::SideEffectDispatcher;
use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::models::{Progress, StepDisplay};

use super::state::SessionState;

/// Cloneable handle driving one cooking session.
///
/// Operations serialize on one internal lock and return immediately. The
/// tick task only refreshes displays and detects finishes; remaining time
/// never depends on it firing, so the host suspending it costs nothing but
/// display staleness until the next sweep.
#[derive(Clone)]
pub struct SessionController {
    state: Arc<Mutex<SessionState>>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<EngineEvent>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    cancel_token: CancellationToken,
    tick_interval: Duration,
}

impl SessionController {
    pub fn new(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        dispatcher: Arc<dyn SideEffectDispatcher>,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        let tick_interval = config.tick_interval;

        Self {
            state: Arc::new(Mutex::new(SessionState::new(config, dispatcher))),
            clock,
            events,
            ticker: Arc::new(Mutex::new(None)),
            cancel_token: CancellationToken::new(),
            tick_interval,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub async fn session_id(&self) -> String {
        self.state.lock().await.session_id().to_string()
    }

    /// Register (or replace) a step; `None` registers an untimed step that
    /// still counts toward progress.
    pub async fn register(
        &self,
        step_id: &str,
        duration_secs: Option<u64>,
    ) -> Result<(), EngineError> {
        self.state.lock().await.register(step_id, duration_secs)
    }

    pub async fn start(&self, step_id: &str) -> Result<(), EngineError> {
        let now = self.clock.now();
        let events = self.state.lock().await.start(step_id, now)?;
        self.publish(events);
        self.ensure_ticker().await;
        Ok(())
    }

    pub async fn pause(&self, step_id: &str) -> Result<(), EngineError> {
        let now = self.clock.now();
        let events = self.state.lock().await.pause(step_id, now)?;
        self.publish(events);
        Ok(())
    }

    pub async fn resume(&self, step_id: &str) -> Result<(), EngineError> {
        let now = self.clock.now();
        let events = self.state.lock().await.resume(step_id, now)?;
        let resumed = !events.is_empty();
        self.publish(events);
        if resumed {
            self.ensure_ticker().await;
        }
        Ok(())
    }

    pub async fn reset(&self, step_id: &str, duration_secs: u64) -> Result<(), EngineError> {
        let now = self.clock.now();
        let events = self.state.lock().await.reset(step_id, duration_secs, now)?;
        self.publish(events);
        Ok(())
    }

    pub async fn mark_complete(&self, step_id: &str) -> Result<(), EngineError> {
        let now = self.clock.now();
        let events = self.state.lock().await.mark_complete(step_id, now)?;
        self.publish(events);
        Ok(())
    }

    pub async fn display(&self, step_id: &str) -> Result<StepDisplay, EngineError> {
        let now = self.clock.now();
        self.state.lock().await.display(step_id, now)
    }

    pub async fn progress(&self) -> Progress {
        self.state.lock().await.progress()
    }

    pub async fn next_incomplete_step(&self) -> Option<String> {
        self.state.lock().await.next_incomplete_step()
    }

    /// Forward a caller-computed bring-into-view hint to the dispatcher.
    pub async fn request_focus(&self, step_id: &str) -> Result<(), EngineError> {
        self.state.lock().await.request_focus(step_id)
    }

    /// Host hook for foreground-resume: resync every running timer now
    /// instead of waiting for the next scheduled tick. Timers that elapsed
    /// during the suspension finish here, effects included.
    pub async fn on_resync(&self) {
        let now = self.clock.now();
        let events = self.state.lock().await.sweep(now);
        self.publish(events);
    }

    /// Clear completions and stop every timer; registrations survive and
    /// the session-complete celebration re-arms.
    pub async fn reset_session(&self) {
        let now = self.clock.now();
        let events = self.state.lock().await.reset_session(now);
        self.publish(events);
    }

    /// Tear down the tick task so no recurring work outlives the session.
    /// Idempotent.
    pub async fn shutdown(&self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
        info!("session controller shut down");
    }

    fn publish(&self, events: Vec<EngineEvent>) {
        for event in events {
            // Send fails only when nobody subscribes; that is fine.
            let _ = self.events.send(event);
        }
    }

    /// Spawn the tick task if it is not already live. The task exits on its
    /// own once nothing is running; `start`/`resume` bring it back.
    async fn ensure_ticker(&self) {
        let mut guard = self.ticker.lock().await;
        if let Some(handle) = guard.as_ref() {
            if !handle.is_finished() {
                return;
            }
        }
        if self.cancel_token.is_cancelled() {
            return;
        }

        let state = self.state.clone();
        let clock = self.clock.clone();
        let events = self.events.clone();
        let token = self.cancel_token.clone();
        let tick_interval = self.tick_interval;

        *guard = Some(tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let now = clock.now();
                        let (batch, still_running) = {
                            let mut guard = state.lock().await;
                            let batch = guard.sweep(now);
                            (batch, guard.any_running())
                        };
                        for event in batch {
                            let _ = events.send(event);
                        }
                        if !still_running {
                            break;
                        }
                    }
                    _ = token.cancelled() => {
                        info!("tick task shutting down");
                        break;
                    }
                }
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::effects::NoopDispatcher;
    use crate::timer::StepStatus;

    fn controller_with_clock() -> (SessionController, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let controller = SessionController::new(
            EngineConfig::default(),
            clock.clone(),
            Arc::new(NoopDispatcher),
        );
        (controller, clock)
    }

    fn drain(rx: &mut broadcast::Receiver<EngineEvent>) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn start_publishes_a_state_change() {
        let (controller, _clock) = controller_with_clock();
        let mut rx = controller.subscribe();
        controller.register("boil", Some(300)).await.unwrap();

        controller.start("boil").await.unwrap();

        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|event| matches!(event, EngineEvent::StepStateChanged { step_id, .. } if step_id == "boil")));
        controller.shutdown().await;
    }

    #[tokio::test]
    async fn resync_after_suspension_finishes_elapsed_timers() {
        let (controller, clock) = controller_with_clock();
        let mut rx = controller.subscribe();
        controller.register("boil", Some(120)).await.unwrap();
        controller.start("boil").await.unwrap();
        drain(&mut rx);

        // Host suspended; no ticks delivered while the clock jumps.
        clock.advance_secs(120);
        controller.on_resync().await;

        let display = controller.display("boil").await.unwrap();
        assert_eq!(display.remaining_secs, 0);
        assert_eq!(display.status, StepStatus::Finished);

        let finishes = drain(&mut rx)
            .iter()
            .filter(|event| matches!(event, EngineEvent::StepFinished { .. }))
            .count();
        assert_eq!(finishes, 1);

        // A second resync reports nothing new.
        controller.on_resync().await;
        assert!(drain(&mut rx).is_empty());
        controller.shutdown().await;
    }

    #[tokio::test]
    async fn pause_resume_preserves_remaining_with_no_elapsed_time() {
        let (controller, clock) = controller_with_clock();
        controller.register("simmer", Some(600)).await.unwrap();
        controller.start("simmer").await.unwrap();

        clock.advance_secs(45);
        controller.pause("simmer").await.unwrap();
        controller.resume("simmer").await.unwrap();

        let display = controller.display("simmer").await.unwrap();
        assert_eq!(display.remaining_secs, 555);
        controller.shutdown().await;
    }

    #[tokio::test]
    async fn paused_timers_survive_arbitrary_suspension() {
        let (controller, clock) = controller_with_clock();
        controller.register("rest", Some(300)).await.unwrap();
        controller.start("rest").await.unwrap();

        clock.advance_secs(100);
        controller.pause("rest").await.unwrap();
        clock.advance_secs(10_000);
        controller.resume("rest").await.unwrap();

        let display = controller.display("rest").await.unwrap();
        assert_eq!(display.remaining_secs, 200);
        controller.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_step_is_surfaced_through_the_public_api() {
        let (controller, _clock) = controller_with_clock();
        assert_eq!(
            controller.start("ghost").await.err(),
            Some(EngineError::UnknownStep("ghost".into()))
        );
        assert_eq!(
            controller.display("ghost").await.err(),
            Some(EngineError::UnknownStep("ghost".into()))
        );
        controller.shutdown().await;
    }

    #[tokio::test]
    async fn mark_complete_updates_progress_and_stops_timers() {
        let (controller, _clock) = controller_with_clock();
        controller.register("chop", None).await.unwrap();
        controller.register("boil", Some(300)).await.unwrap();
        controller.start("boil").await.unwrap();

        controller.mark_complete("chop").await.unwrap();
        controller.mark_complete("boil").await.unwrap();

        let progress = controller.progress().await;
        assert_eq!((progress.completed, progress.total), (2, 2));
        assert_eq!(progress.ratio, 1.0);

        let display = controller.display("boil").await.unwrap();
        assert_eq!(display.status, StepStatus::Stopped);
        controller.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_is_idempotent_and_blocks_new_tickers() {
        let (controller, _clock) = controller_with_clock();
        controller.register("boil", Some(300)).await.unwrap();
        controller.shutdown().await;
        controller.shutdown().await;

        // Operations still work; only the recurring tick task is gone.
        controller.start("boil").await.unwrap();
        assert!(controller.ticker.lock().await.is_none());
        controller.shutdown().await;
    }
}
