pub mod registry;
pub mod state;

pub use registry::{StepEntry, StepRegistry};
pub use state::{StepStatus, StepTimer, TickOutcome};
