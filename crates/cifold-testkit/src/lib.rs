//! Fixture builders and a recording printer.
//!
//! Keeping these in a microcrate avoids copy-paste across reporter, console
//! and CLI tests.

pub mod recording;

pub use recording::{PrinterCall, RecordingPrinter};

use cifold_schema::result::{
    AggregatedResult, ExcInfo, Frame, ScenarioRef, ScenarioResult, StepResult,
};
use std::collections::BTreeMap;

pub fn scenario_ref(subject: &str, namespace: &str) -> ScenarioRef {
    let slug = subject.replace(' ', "_");
    ScenarioRef {
        unique_id: format!("scenarios/{namespace}/{slug}.py::Scenario"),
        subject: subject.to_string(),
        namespace: namespace.to_string(),
        path: format!("scenarios/{namespace}/{slug}.py"),
    }
}

/// Pending scenario in namespace `scenarios`.
pub fn make_scenario_result(subject: &str) -> ScenarioResult {
    ScenarioResult::new(scenario_ref(subject, "scenarios"))
}

pub fn make_step_result(name: &str) -> StepResult {
    StepResult::new(name)
}

/// Aggregate of a single attempt.
pub fn make_aggregated_result(result: ScenarioResult) -> AggregatedResult {
    AggregatedResult::single(result)
}

/// Aggregate whose canonical result is the last attempt.
pub fn make_rerun_result(attempts: Vec<ScenarioResult>) -> AggregatedResult {
    let canonical = attempts
        .last()
        .cloned()
        .unwrap_or_else(|| make_scenario_result("empty"));
    AggregatedResult::from_existing(canonical, attempts)
}

pub fn make_frame(name: &str, internal: bool) -> Frame {
    Frame {
        filename: format!("scenarios/{name}.py"),
        lineno: 42,
        name: name.to_string(),
        line: Some(format!("{name}()")),
        internal,
        locals: BTreeMap::new(),
    }
}

pub fn make_exc_info(type_name: &str, message: &str) -> ExcInfo {
    ExcInfo {
        type_name: type_name.to_string(),
        message: message.to_string(),
        frames: vec![make_frame("runner", true), make_frame("then_it_works", false)],
    }
}
