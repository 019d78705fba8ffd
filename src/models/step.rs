use serde::{Deserialize, Serialize};

use crate::timer::StepStatus;

/// Presentation snapshot of one step timer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepDisplay {
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub status: StepStatus,
}
