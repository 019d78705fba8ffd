use std::time::Duration;

/// Engine tunables with cooking-friendly defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Remaining-seconds mark at which the one-shot warning cue fires
    pub warning_secs: u64,

    /// Remaining-seconds mark at which a step enters its critical display state
    pub critical_secs: u64,

    /// UI refresh cadence; never load-bearing for remaining-time accuracy
    pub tick_interval: Duration,

    /// Event channel capacity before slow subscribers start lagging
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            warning_secs: 60,
            critical_secs: 30,
            tick_interval: Duration::from_millis(250),
            event_capacity: 256,
        }
    }
}
