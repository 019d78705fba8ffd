pub mod controller;
pub mod progress;
pub mod state;

pub use controller::SessionController;
pub use progress::ProgressTracker;
pub use state::SessionState;
