use std::collections::HashMap;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::error::EngineError;

use super::state::{StepStatus, StepTimer, TickOutcome};

/// One registered step. Steps without a duration carry no timer but still
/// count toward session progress.
#[derive(Debug, Clone)]
pub struct StepEntry {
    pub timer: Option<StepTimer>,
}

/// Owns every step of a session, in recipe order.
///
/// The registry is the unit of "many concurrent timers": one sweep resyncs
/// all running timers against a single clock reading, so there is no
/// per-timer scheduled callback to drop, leak, or fire stale.
#[derive(Debug, Default)]
pub struct StepRegistry {
    entries: HashMap<String, StepEntry>,
    order: Vec<String>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a step. A zero duration is rejected before any
    /// state changes; `None` registers an untimed step.
    pub fn register(
        &mut self,
        step_id: &str,
        duration_secs: Option<u64>,
    ) -> Result<(), EngineError> {
        if duration_secs == Some(0) {
            return Err(EngineError::InvalidDuration(0));
        }
        let timer = duration_secs.map(|secs| StepTimer::new(secs.saturating_mul(1000)));
        if self
            .entries
            .insert(step_id.to_string(), StepEntry { timer })
            .is_none()
        {
            self.order.push(step_id.to_string());
        }
        Ok(())
    }

    pub fn contains(&self, step_id: &str) -> bool {
        self.entries.contains_key(step_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Step ids in registration order.
    pub fn step_ids(&self) -> &[String] {
        &self.order
    }

    pub fn timer(&self, step_id: &str) -> Option<&StepTimer> {
        self.entries.get(step_id).and_then(|entry| entry.timer.as_ref())
    }

    /// Mutable timer lookup with the caller-facing error taxonomy applied.
    pub fn timer_mut(&mut self, step_id: &str) -> Result<&mut StepTimer, EngineError> {
        let entry = self
            .entries
            .get_mut(step_id)
            .ok_or_else(|| EngineError::UnknownStep(step_id.to_string()))?;
        entry
            .timer
            .as_mut()
            .ok_or_else(|| EngineError::StepNotTimed(step_id.to_string()))
    }

    pub fn any_running(&self) -> bool {
        self.entries
            .values()
            .any(|entry| matches!(&entry.timer, Some(timer) if timer.status == StepStatus::Running))
    }

    /// Resync every running timer against `now` in one pass. Timers whose
    /// deadline elapsed while the host was suspended finish right here.
    pub fn sweep(&mut self, now: Instant, config: &EngineConfig) -> Vec<(String, TickOutcome)> {
        let mut outcomes = Vec::new();
        for id in &self.order {
            if let Some(entry) = self.entries.get_mut(id) {
                if let Some(timer) = entry.timer.as_mut() {
                    if let Some(outcome) = timer.tick(now, config) {
                        outcomes.push((id.clone(), outcome));
                    }
                }
            }
        }
        outcomes
    }

    /// Return every timer to `Stopped` at its configured duration.
    pub fn reset_all(&mut self) {
        for entry in self.entries.values_mut() {
            if let Some(timer) = entry.timer.as_mut() {
                let total_ms = timer.total_ms;
                timer.reset(total_ms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn register_rejects_zero_duration() {
        let mut registry = StepRegistry::new();
        assert_eq!(
            registry.register("chop", Some(0)),
            Err(EngineError::InvalidDuration(0))
        );
        assert!(!registry.contains("chop"));
    }

    #[test]
    fn untimed_steps_count_but_have_no_timer() {
        let mut registry = StepRegistry::new();
        registry.register("plate", None).unwrap();

        assert!(registry.contains("plate"));
        assert_eq!(registry.len(), 1);
        assert!(registry.timer("plate").is_none());
        assert_eq!(
            registry.timer_mut("plate").err(),
            Some(EngineError::StepNotTimed("plate".into()))
        );
    }

    #[test]
    fn reregistering_replaces_in_place() {
        let now = Instant::now();
        let mut registry = StepRegistry::new();
        registry.register("simmer", Some(600)).unwrap();
        registry.register("rest", Some(300)).unwrap();

        registry.timer_mut("simmer").unwrap().start(600_000, now);
        registry.register("simmer", Some(900)).unwrap();

        let timer = registry.timer("simmer").unwrap();
        assert_eq!(timer.status, StepStatus::Stopped);
        assert_eq!(timer.total_secs(), 900);
        assert_eq!(registry.step_ids(), ["simmer", "rest"]);
    }

    #[test]
    fn unknown_step_is_surfaced() {
        let mut registry = StepRegistry::new();
        assert_eq!(
            registry.timer_mut("ghost").err(),
            Some(EngineError::UnknownStep("ghost".into()))
        );
    }

    #[test]
    fn sweep_visits_running_timers_in_order() {
        let now = Instant::now();
        let mut registry = StepRegistry::new();
        registry.register("boil", Some(300)).unwrap();
        registry.register("simmer", Some(600)).unwrap();
        registry.register("plate", None).unwrap();

        registry.timer_mut("simmer").unwrap().start(600_000, now);
        registry.timer_mut("boil").unwrap().start(300_000, now);

        let outcomes = registry.sweep(now + Duration::from_secs(10), &config());
        let ids: Vec<&str> = outcomes.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["boil", "simmer"]);
    }

    #[test]
    fn sweep_finishes_timers_elapsed_during_suspension() {
        let now = Instant::now();
        let mut registry = StepRegistry::new();
        registry.register("boil", Some(300)).unwrap();
        registry.timer_mut("boil").unwrap().start(300_000, now);

        let outcomes = registry.sweep(now + Duration::from_secs(400), &config());
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].1.finished);
        assert!(!registry.any_running());
    }

    #[test]
    fn reset_all_restores_configured_durations() {
        let now = Instant::now();
        let mut registry = StepRegistry::new();
        registry.register("boil", Some(300)).unwrap();
        registry.timer_mut("boil").unwrap().start(300_000, now);
        registry.sweep(now + Duration::from_secs(400), &config());

        registry.reset_all();
        let timer = registry.timer("boil").unwrap();
        assert_eq!(timer.status, StepStatus::Stopped);
        assert_eq!(timer.remaining_secs(now), 300);
    }
}
