use crate::scope::Scope;
use crate::status::{ScenarioStatus, StepStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity of a scenario as the runner discovered it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRef {
    pub unique_id: String,
    pub subject: String,
    pub namespace: String,
    /// Source file, relative to the project root when known.
    #[serde(default)]
    pub path: String,
}

/// One stack frame of a captured failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub filename: String,
    pub lineno: u32,
    pub name: String,
    #[serde(default)]
    pub line: Option<String>,
    /// Frame belongs to the runner itself rather than to scenario code.
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub locals: BTreeMap<String, String>,
}

/// Captured failure: exception type, message and stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcInfo {
    #[serde(rename = "type")]
    pub type_name: String,
    pub message: String,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub name: String,
    #[serde(default)]
    pub status: StepStatus,
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub started_at: Option<f64>,
    #[serde(default)]
    pub ended_at: Option<f64>,
    #[serde(default)]
    pub exc_info: Option<ExcInfo>,
}

impl StepResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Pending,
            started_at: None,
            ended_at: None,
            exc_info: None,
        }
    }

    pub fn mark_passed(mut self) -> Self {
        self.status = StepStatus::Passed;
        self
    }

    pub fn mark_failed(mut self) -> Self {
        self.status = StepStatus::Failed;
        self
    }

    pub fn with_started_at(mut self, ts: f64) -> Self {
        self.started_at = Some(ts);
        self
    }

    pub fn with_ended_at(mut self, ts: f64) -> Self {
        self.ended_at = Some(ts);
        self
    }

    pub fn with_exc_info(mut self, exc_info: ExcInfo) -> Self {
        self.exc_info = Some(exc_info);
        self
    }

    /// Wall time in seconds, when both timestamps are known.
    pub fn elapsed(&self) -> Option<f64> {
        elapsed_between(self.started_at, self.ended_at)
    }

    pub fn is_failed(&self) -> bool {
        self.status == StepStatus::Failed
    }
}

/// One attempt of a scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: ScenarioRef,
    #[serde(default)]
    pub status: ScenarioStatus,
    #[serde(default)]
    pub started_at: Option<f64>,
    #[serde(default)]
    pub ended_at: Option<f64>,
    #[serde(default)]
    pub step_results: Vec<StepResult>,
    #[serde(default)]
    pub scope: Option<Scope>,
}

impl ScenarioResult {
    pub fn new(scenario: ScenarioRef) -> Self {
        Self {
            scenario,
            status: ScenarioStatus::Pending,
            started_at: None,
            ended_at: None,
            step_results: Vec::new(),
            scope: None,
        }
    }

    pub fn mark_passed(mut self) -> Self {
        self.status = ScenarioStatus::Passed;
        self
    }

    pub fn mark_failed(mut self) -> Self {
        self.status = ScenarioStatus::Failed;
        self
    }

    pub fn mark_skipped(mut self) -> Self {
        self.status = ScenarioStatus::Skipped;
        self
    }

    pub fn with_times(mut self, started_at: f64, ended_at: f64) -> Self {
        self.started_at = Some(started_at);
        self.ended_at = Some(ended_at);
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_step(mut self, step_result: StepResult) -> Self {
        self.step_results.push(step_result);
        self
    }

    pub fn elapsed(&self) -> Option<f64> {
        elapsed_between(self.started_at, self.ended_at)
    }

    pub fn is_passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }

    pub fn is_failed(&self) -> bool {
        self.status == ScenarioStatus::Failed
    }
}

/// All attempts of one scenario, with one of them promoted to canonical.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub canonical: ScenarioResult,
    #[serde(default)]
    pub scenario_results: Vec<ScenarioResult>,
}

impl AggregatedResult {
    pub fn from_existing(canonical: ScenarioResult, scenario_results: Vec<ScenarioResult>) -> Self {
        Self {
            canonical,
            scenario_results,
        }
    }

    /// A scenario that ran exactly once.
    pub fn single(result: ScenarioResult) -> Self {
        Self {
            canonical: result.clone(),
            scenario_results: vec![result],
        }
    }

    /// Number of attempts, reruns included.
    pub fn rescheduled(&self) -> usize {
        self.scenario_results.len()
    }
}

fn elapsed_between(started_at: Option<f64>, ended_at: Option<f64>) -> Option<f64> {
    match (started_at, ended_at) {
        (Some(start), Some(end)) if end >= start => Some(end - start),
        _ => None,
    }
}
