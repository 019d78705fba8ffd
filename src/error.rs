use thiserror::Error;

/// Errors surfaced to the caller.
///
/// Operations that are merely illegal in the current timer state (pausing a
/// stopped timer, resuming a running one) are NOT errors: they originate
/// from presentation-layer races and are rejected silently. Everything here
/// indicates a genuine caller/engine desynchronization.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Operation referenced a step id the registry has never seen.
    #[error("unknown step: {0}")]
    UnknownStep(String),

    /// Timer operation on a step that was registered without a duration.
    #[error("step {0} has no timer")]
    StepNotTimed(String),

    /// Durations must be at least one second.
    #[error("invalid duration: {0}s")]
    InvalidDuration(u64),
}
