//! Guided cooking-session engine.
//!
//! Tracks many independently timed steps, each with a drift-free countdown
//! and pause/resume control, and aggregates session progress. Remaining
//! time is always derived from absolute deadlines and a clock reading, so
//! a host that throttles or suspends background callbacks (an inactive
//! browser tab, a sleeping machine) loses nothing: one resync after the gap
//! lands on the exact remaining value.
//!
//! The engine is presentation-agnostic. It emits events on a broadcast
//! channel and requests cues through a [`SideEffectDispatcher`]; it reads
//! and writes no storage and owns no UI.

pub mod audio;
pub mod clock;
pub mod config;
pub mod effects;
pub mod error;
pub mod events;
pub mod models;
pub mod session;
pub mod timer;

pub use audio::AudioCueDispatcher;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use effects::{NoopDispatcher, SideEffectDispatcher};
pub use error::EngineError;
pub use events::EngineEvent;
pub use models::{Progress, SessionSummary, StepDisplay};
pub use session::SessionController;
pub use timer::{StepRegistry, StepStatus, StepTimer};
