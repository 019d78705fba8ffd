use log::warn;

/// Presentation side effects the engine requests.
///
/// Implementations must be cheap and non-blocking. Failures are logged and
/// dropped at the call boundary; timing correctness never depends on a cue
/// being delivered, and the engine behaves identically with
/// [`NoopDispatcher`].
pub trait SideEffectDispatcher: Send + Sync {
    /// Audible cue when a step crosses its warning threshold.
    fn play_warning_cue(&self, step_id: &str) -> Result<(), String>;

    /// Audible cue when a step countdown reaches zero.
    fn play_finish_cue(&self, step_id: &str) -> Result<(), String>;

    /// Audible cue when every step in the session is complete.
    fn play_session_complete_cue(&self) -> Result<(), String>;

    /// Transient in-app message.
    fn show_message(&self, text: &str) -> Result<(), String>;

    /// Best-effort OS notification request. Missing permission or platform
    /// support is an ordinary failure, swallowed like any other.
    fn request_notification(&self, title: &str, body: &str) -> Result<(), String>;

    /// Bring the given step into view. The target is computed by the
    /// caller, not the engine.
    fn bring_into_view(&self, step_id: &str) -> Result<(), String>;
}

/// Dispatcher that does nothing. Used in tests and headless embeddings.
#[derive(Debug, Default)]
pub struct NoopDispatcher;

impl SideEffectDispatcher for NoopDispatcher {
    fn play_warning_cue(&self, _step_id: &str) -> Result<(), String> {
        Ok(())
    }

    fn play_finish_cue(&self, _step_id: &str) -> Result<(), String> {
        Ok(())
    }

    fn play_session_complete_cue(&self) -> Result<(), String> {
        Ok(())
    }

    fn show_message(&self, _text: &str) -> Result<(), String> {
        Ok(())
    }

    fn request_notification(&self, _title: &str, _body: &str) -> Result<(), String> {
        Ok(())
    }

    fn bring_into_view(&self, _step_id: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Side-effect call boundary: log the failure, never propagate it.
pub(crate) fn dispatch(label: &str, result: Result<(), String>) {
    if let Err(err) = result {
        warn!("side effect '{label}' failed: {err}");
    }
}
