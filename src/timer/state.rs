use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::models::StepDisplay;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StepStatus {
    Stopped,
    Running,
    Paused,
    Finished,
}

impl Default for StepStatus {
    fn default() -> Self {
        StepStatus::Stopped
    }
}

/// What one resync of a running timer observed.
///
/// `warning_fired` and `critical_entered` report crossings that happened on
/// THIS resync; the latches on the timer keep them from repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub remaining_secs: u64,
    pub warning_fired: bool,
    pub critical_entered: bool,
    pub finished: bool,
}

/// Countdown state for a single timed step.
///
/// Remaining time is always recomputed from the absolute `deadline`; nothing
/// is ever decremented per tick. A single resync after an arbitrary gap
/// (throttled tab, suspended host) lands on the same value as if ticks had
/// fired continuously.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTimer {
    pub status: StepStatus,
    pub total_ms: u64,
    /// Absolute finish time; set only while `Running`.
    #[serde(skip)]
    deadline: Option<Instant>,
    /// Remaining milliseconds captured by `pause`; set only while `Paused`.
    paused_remaining_ms: Option<u64>,
    warning_fired: bool,
    critical_entered: bool,
}

impl StepTimer {
    pub fn new(total_ms: u64) -> Self {
        Self {
            status: StepStatus::Stopped,
            total_ms,
            deadline: None,
            paused_remaining_ms: None,
            warning_fired: false,
            critical_entered: false,
        }
    }

    /// Begin a run. Valid from any state; restarting cancels the in-flight
    /// run and re-arms the threshold latches.
    pub fn start(&mut self, total_ms: u64, now: Instant) {
        self.total_ms = total_ms;
        self.deadline = Some(now + Duration::from_millis(total_ms));
        self.paused_remaining_ms = None;
        self.warning_fired = false;
        self.critical_entered = false;
        self.status = StepStatus::Running;
    }

    /// Snapshot the remaining time and leave `Running`. No-op outside
    /// `Running`; UI double-fires land here harmlessly.
    pub fn pause(&mut self, now: Instant) -> bool {
        if self.status != StepStatus::Running {
            return false;
        }
        self.paused_remaining_ms = Some(self.remaining_ms(now));
        self.deadline = None;
        self.status = StepStatus::Paused;
        true
    }

    /// Recompute the deadline from the paused snapshot. Resuming never
    /// trusts scheduling that may have stalled while paused.
    pub fn resume(&mut self, now: Instant) -> bool {
        if self.status != StepStatus::Paused {
            return false;
        }
        let remaining = match self.paused_remaining_ms.take() {
            Some(ms) => ms,
            None => return false,
        };
        self.deadline = Some(now + Duration::from_millis(remaining));
        self.status = StepStatus::Running;
        true
    }

    /// Return to `Stopped` at the given duration, clearing every latch.
    pub fn reset(&mut self, total_ms: u64) {
        self.total_ms = total_ms;
        self.deadline = None;
        self.paused_remaining_ms = None;
        self.warning_fired = false;
        self.critical_entered = false;
        self.status = StepStatus::Stopped;
    }

    /// Stop without reaching `Finished`; used when a step is completed
    /// manually while its countdown is still live.
    pub fn cancel(&mut self) {
        let total_ms = self.total_ms;
        self.reset(total_ms);
    }

    pub fn remaining_ms(&self, now: Instant) -> u64 {
        match self.status {
            StepStatus::Stopped => self.total_ms,
            StepStatus::Finished => 0,
            StepStatus::Paused => self.paused_remaining_ms.unwrap_or(0),
            StepStatus::Running => match self.deadline {
                Some(deadline) => deadline.saturating_duration_since(now).as_millis() as u64,
                None => 0,
            },
        }
    }

    /// Whole seconds left, rounded up: a freshly started timer shows its
    /// full duration and the display only reaches zero at the deadline.
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        self.remaining_ms(now).div_ceil(1000)
    }

    pub fn total_secs(&self) -> u64 {
        self.total_ms.div_ceil(1000)
    }

    pub fn display(&self, now: Instant) -> StepDisplay {
        StepDisplay {
            remaining_secs: self.remaining_secs(now),
            total_secs: self.total_secs(),
            status: self.status,
        }
    }

    /// Resync from the deadline. Only acts while `Running`: recomputes the
    /// remaining time, latches threshold crossings, and transitions to
    /// `Finished` at zero.
    ///
    /// A threshold applies only when it sits strictly below the run's total
    /// duration; a run that begins at or under a threshold has no crossing
    /// to report.
    pub fn tick(&mut self, now: Instant, config: &EngineConfig) -> Option<TickOutcome> {
        if self.status != StepStatus::Running {
            return None;
        }

        if self.remaining_ms(now) == 0 {
            self.status = StepStatus::Finished;
            self.deadline = None;
            return Some(TickOutcome {
                remaining_secs: 0,
                warning_fired: false,
                critical_entered: false,
                finished: true,
            });
        }

        let remaining_secs = self.remaining_secs(now);
        let mut outcome = TickOutcome {
            remaining_secs,
            warning_fired: false,
            critical_entered: false,
            finished: false,
        };

        if !self.warning_fired
            && config.warning_secs < self.total_secs()
            && remaining_secs <= config.warning_secs
        {
            self.warning_fired = true;
            outcome.warning_fired = true;
        }

        if !self.critical_entered
            && config.critical_secs < self.total_secs()
            && remaining_secs <= config.critical_secs
        {
            self.critical_entered = true;
            outcome.critical_entered = true;
        }

        Some(outcome)
    }
}
