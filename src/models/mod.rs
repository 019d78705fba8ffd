pub mod session;
pub mod step;

pub use session::{Progress, SessionSummary};
pub use step::StepDisplay;
