use crate::report::Report;
use crate::result::{AggregatedResult, ScenarioResult, StepResult};
use crate::scope::Scope;
use serde::{Deserialize, Serialize};

/// Lifecycle events delivered by the runner, one at a time, in order.
///
/// The set is closed on purpose: a reporter matches on every variant instead
/// of inspecting payload types at runtime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    Startup,
    ScenarioRun {
        scenario_result: ScenarioResult,
    },
    StepPassed {
        step_result: StepResult,
        /// Scenario scope as it stood when the step finished.
        #[serde(default)]
        scope: Option<Scope>,
    },
    StepFailed {
        step_result: StepResult,
        #[serde(default)]
        scope: Option<Scope>,
    },
    ScenarioReported {
        aggregated_result: AggregatedResult,
    },
    Cleanup {
        report: Report,
    },
}

impl RunEvent {
    /// Stable snake_case name, matching the wire tag.
    pub fn kind(&self) -> &'static str {
        match self {
            RunEvent::Startup => "startup",
            RunEvent::ScenarioRun { .. } => "scenario_run",
            RunEvent::StepPassed { .. } => "step_passed",
            RunEvent::StepFailed { .. } => "step_failed",
            RunEvent::ScenarioReported { .. } => "scenario_reported",
            RunEvent::Cleanup { .. } => "cleanup",
        }
    }

    pub fn step_passed(step_result: StepResult, scope: Option<Scope>) -> Self {
        RunEvent::StepPassed { step_result, scope }
    }

    pub fn step_failed(step_result: StepResult, scope: Option<Scope>) -> Self {
        RunEvent::StepFailed { step_result, scope }
    }
}
