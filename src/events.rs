use serde::Serialize;

use crate::models::{Progress, SessionSummary, StepDisplay};

/// Everything the engine reports to subscribers.
///
/// Payloads serialize with camelCase fields so a web presentation layer can
/// consume them untouched.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EngineEvent {
    /// A timer changed state through an explicit operation.
    #[serde(rename_all = "camelCase")]
    StepStateChanged { step_id: String, display: StepDisplay },

    /// Periodic display refresh for a running timer.
    #[serde(rename_all = "camelCase")]
    StepTick { step_id: String, display: StepDisplay },

    /// Remaining time crossed the warning threshold; at most once per run.
    #[serde(rename_all = "camelCase")]
    StepWarning { step_id: String, remaining_secs: u64 },

    /// Remaining time entered the critical window; at most once per run.
    #[serde(rename_all = "camelCase")]
    StepCritical { step_id: String, remaining_secs: u64 },

    /// A countdown reached zero; exactly once per run.
    #[serde(rename_all = "camelCase")]
    StepFinished { step_id: String },

    /// The completed-step set changed.
    ProgressChanged { progress: Progress },

    /// Every step is complete; once per reset cycle.
    SessionCompleted { summary: SessionSummary },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::StepStatus;

    #[test]
    fn events_serialize_camel_case() {
        let event = EngineEvent::StepWarning {
            step_id: "saute".into(),
            remaining_secs: 60,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "stepWarning");
        assert_eq!(json["stepId"], "saute");
        assert_eq!(json["remainingSecs"], 60);
    }

    #[test]
    fn tick_payload_nests_the_display() {
        let event = EngineEvent::StepTick {
            step_id: "boil".into(),
            display: StepDisplay {
                remaining_secs: 45,
                total_secs: 300,
                status: StepStatus::Running,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["display"]["remainingSecs"], 45);
        assert_eq!(json["display"]["status"], "running");
    }
}
