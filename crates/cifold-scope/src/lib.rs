//! Attribution of scope variables to the step that introduced them.
//!
//! After each step the runner hands over the scenario scope as it currently
//! stands. A key belongs to the first step after which it was visible; later
//! steps never claim it again. Per-step key sets are therefore pairwise
//! disjoint, and once the scenario ends their union is the final key set
//! (keys are assumed never to disappear).
//!
//! Every completed step gets its own entry, so a step name that runs twice
//! is looked up by name and occurrence.

use cifold_schema::scope::Scope;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

/// Keys first seen after one step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepKeys {
    pub step_name: String,
    pub keys: BTreeSet<String>,
}

/// Completed steps of one scenario attempt, in order, with the keys each introduced.
#[derive(Clone, Debug, Default)]
pub struct ScopeDiffTable {
    steps: Vec<StepKeys>,
    attributed: HashSet<String>,
}

impl ScopeDiffTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute to `step_name` every key of `scope` not claimed by an
    /// earlier step, and return those keys.
    pub fn record_step(&mut self, step_name: &str, scope: &Scope) -> &BTreeSet<String> {
        let fresh: BTreeSet<String> = scope
            .keys()
            .filter(|key| !self.attributed.contains(*key))
            .map(str::to_string)
            .collect();
        self.attributed.extend(fresh.iter().cloned());

        self.steps.push(StepKeys {
            step_name: step_name.to_string(),
            keys: fresh,
        });
        &self.steps[self.steps.len() - 1].keys
    }

    /// Keys introduced by the `occurrence`-th (0-based) completion of
    /// `step_name`, if it was recorded.
    pub fn introduced(&self, step_name: &str, occurrence: usize) -> Option<&BTreeSet<String>> {
        self.steps
            .iter()
            .filter(|s| s.step_name == step_name)
            .nth(occurrence)
            .map(|s| &s.keys)
    }

    /// Entries of `scope` introduced by the `occurrence`-th completion of
    /// `step_name`, in scope order.
    ///
    /// Unrecorded steps introduce nothing.
    pub fn introduced_entries<'s>(
        &self,
        step_name: &str,
        occurrence: usize,
        scope: &'s Scope,
    ) -> Vec<(&'s str, &'s Value)> {
        let Some(keys) = self.introduced(step_name, occurrence) else {
            return Vec::new();
        };
        scope.iter().filter(|(key, _)| keys.contains(*key)).collect()
    }

    /// Recorded steps, in completion order.
    pub fn steps(&self) -> &[StepKeys] {
        &self.steps
    }

    /// Union of every step's keys.
    pub fn attributed_keys(&self) -> &HashSet<String> {
        &self.attributed
    }
}
