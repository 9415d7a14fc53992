use serde::Serialize;
use std::time::Duration;

use crate::RefinementState;

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The critic approved the latest draft
    Approved,
    /// The iteration cap was hit before approval
    IterationCapReached,
}

/// The final outcome of a refinement loop
#[derive(Debug, Clone, Serialize)]
pub struct LoopOutcome {
    pub reason: TerminationReason,
    pub state: RefinementState,
    pub total_duration_secs: f64,
}

impl LoopOutcome {
    pub fn new(state: RefinementState, duration: Duration) -> Self {
        let reason = if state.is_approved() {
            TerminationReason::Approved
        } else {
            TerminationReason::IterationCapReached
        };
        Self {
            reason,
            state,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    /// The post handed to the presentation layer
    pub fn final_draft(&self) -> &str {
        self.state.current_draft()
    }

    pub fn iterations(&self) -> usize {
        self.state.iteration()
    }

    pub fn is_approved(&self) -> bool {
        self.reason == TerminationReason::Approved
    }

    pub fn exit_code(&self) -> i32 {
        match self.reason {
            TerminationReason::Approved => 0,
            TerminationReason::IterationCapReached => 1,
        }
    }
}
