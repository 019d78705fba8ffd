use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Monotonic time source for the engine.
///
/// Remaining time is always derived from an absolute deadline and a fresh
/// reading of this clock, never from decrementing a counter per tick, so
/// any number of dropped or delayed ticks resolves to the same remaining
/// value on the next reading.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Production clock backed by `Instant::now()`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-advanced clock for deterministic tests and replay tooling.
///
/// A single large `advance` models a host that suspended all scheduled
/// callbacks for that long (a backgrounded tab, a sleeping laptop).
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap()
    }
}
