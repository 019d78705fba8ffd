use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate completion state for a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// `completed / total`, 0.0 for an empty session.
    pub ratio: f64,
}

/// Summary attached to the session-complete event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub total_steps: usize,
}
