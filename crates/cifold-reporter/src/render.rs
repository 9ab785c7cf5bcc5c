//! Rendering of one reported attempt.
//!
//! Borrows the reporter's printer, id source and configuration for the
//! duration of a `ScenarioReported` event, so the per-attempt scope tables can
//! be read at the same time.

use anyhow::Result;
use cifold_config::{CollapsableMode, ReporterConfig};
use cifold_ids::{SectionId, SectionIdSource};
use cifold_ports::Printer;
use cifold_schema::result::{ScenarioResult, StepResult};
use cifold_schema::scope::Scope;
use cifold_schema::status::ScenarioStatus;
use cifold_scope::ScopeDiffTable;
use cifold_section::{section_end, section_start, unix_ts};
use serde_json::Value;
use std::collections::HashMap;

/// Prefix of step lines.
pub const STEP_PREFIX: &str = "   ";
/// Indent of scope keys printed under a step.
pub const SCOPE_KEY_INDENT: usize = 5;

/// Pairs each step with how many earlier steps share its name.
fn with_occurrence(steps: &[StepResult]) -> impl Iterator<Item = (&StepResult, usize)> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    steps.iter().map(move |step| {
        let count = seen.entry(step.name.as_str()).or_default();
        let occurrence = *count;
        *count += 1;
        (step, occurrence)
    })
}

pub(crate) struct AttemptRenderer<'a, P: Printer, S: SectionIdSource> {
    pub printer: &'a mut P,
    pub section_ids: &'a mut S,
    pub config: &'a ReporterConfig,
}

impl<P: Printer, S: SectionIdSource> AttemptRenderer<'_, P, S> {
    /// Print one attempt. Pending and skipped attempts print nothing.
    ///
    /// `with_path` is set for the top-level line of a scenario that ran once.
    pub fn attempt(
        &mut self,
        result: &ScenarioResult,
        table: &ScopeDiffTable,
        prefix: &str,
        with_path: bool,
    ) -> Result<()> {
        match result.status {
            ScenarioStatus::Passed | ScenarioStatus::Failed => {}
            ScenarioStatus::Pending | ScenarioStatus::Skipped => return Ok(()),
        }
        self.subject(result, result.elapsed(), prefix)?;
        if with_path {
            self.path(result, prefix)?;
        }
        if result.is_failed() {
            self.failed_steps(result, table)?;
        }
        Ok(())
    }

    pub fn subject(
        &mut self,
        result: &ScenarioResult,
        elapsed: Option<f64>,
        prefix: &str,
    ) -> Result<()> {
        self.printer.print_scenario_subject(
            &result.scenario.subject,
            result.status,
            elapsed,
            prefix,
        )
    }

    /// Path line, when the status is in the show-paths list.
    pub fn path(&mut self, result: &ScenarioResult, prefix: &str) -> Result<()> {
        if self.config.shows_path_for(result.status) {
            self.printer.print_scenario_path(&result.scenario.path, prefix)?;
        }
        Ok(())
    }

    fn failed_steps(&mut self, result: &ScenarioResult, table: &ScopeDiffTable) -> Result<()> {
        let empty = Scope::new();
        let scope = result.scope.as_ref().unwrap_or(&empty);

        match self.config.collapsable {
            Some(CollapsableMode::Steps) => self.fold_steps(result, table, scope),
            Some(CollapsableMode::Vars) => self.fold_vars(result, table, scope),
            Some(CollapsableMode::Scope) => self.fold_scope(result, scope),
            None => {
                for step in &result.step_results {
                    self.step(step)?;
                }
                Ok(())
            }
        }
    }

    fn fold_steps(
        &mut self,
        result: &ScenarioResult,
        table: &ScopeDiffTable,
        scope: &Scope,
    ) -> Result<()> {
        for (step, occurrence) in with_occurrence(&result.step_results) {
            let id = self.open_section(unix_ts(step.started_at))?;
            self.step(step)?;
            for (key, value) in table.introduced_entries(&step.name, occurrence, scope) {
                self.scope_entry(key, value)?;
            }
            self.close_section(&id, unix_ts(step.ended_at))?;
        }
        Ok(())
    }

    fn fold_vars(
        &mut self,
        result: &ScenarioResult,
        table: &ScopeDiffTable,
        scope: &Scope,
    ) -> Result<()> {
        for (step, occurrence) in with_occurrence(&result.step_results) {
            self.step(step)?;
            for (key, value) in table.introduced_entries(&step.name, occurrence, scope) {
                let id = self.open_section(0)?;
                self.scope_entry(key, value)?;
                self.close_section(&id, 0)?;
            }
        }
        Ok(())
    }

    fn fold_scope(&mut self, result: &ScenarioResult, scope: &Scope) -> Result<()> {
        for step in &result.step_results {
            self.step(step)?;
        }
        let id = self.open_section(0)?;
        self.printer.print_scope(scope)?;
        self.close_section(&id, 0)
    }

    fn step(&mut self, step: &StepResult) -> Result<()> {
        self.printer
            .print_step_name(&step.name, step.status, step.elapsed(), STEP_PREFIX)?;
        if let Some(exc_info) = &step.exc_info {
            self.printer
                .print_exception(exc_info, &self.config.traceback_options())?;
        }
        Ok(())
    }

    fn scope_entry(&mut self, key: &str, value: &Value) -> Result<()> {
        self.printer.print_scope_key(key, SCOPE_KEY_INDENT, true)?;
        let rendered = self.printer.pretty_format(value);
        self.printer.print_scope_val(&rendered)
    }

    fn open_section(&mut self, started_at: i64) -> Result<SectionId> {
        let id = self.section_ids.next_id();
        tracing::debug!(section = %id, started_at, "open section");
        self.printer.write_raw(&section_start(&id, started_at, true))?;
        Ok(id)
    }

    fn close_section(&mut self, id: &SectionId, ended_at: i64) -> Result<()> {
        tracing::debug!(section = %id, ended_at, "close section");
        self.printer.write_raw(&section_end(id, ended_at))
    }
}
