//! GitLab reporter.
//!
//! Consumes [`RunEvent`]s one at a time and drives a [`Printer`]. Failed
//! scenarios are written with GitLab `section_start`/`section_end` markers so
//! steps and the scope variables they introduced fold away in the job log.
//!
//! ```
//! use cifold_config::{CollapsableMode, ReporterConfig};
//! use cifold_ids::SequentialSectionIds;
//! use cifold_reporter::GitlabReporter;
//! use cifold_schema::event::RunEvent;
//! use cifold_testkit::RecordingPrinter;
//!
//! let config = ReporterConfig::default().with_collapsable(Some(CollapsableMode::Steps));
//! let mut reporter =
//!     GitlabReporter::with_section_ids(RecordingPrinter::new(), SequentialSectionIds::default())
//!         .with_config(config);
//! reporter.handle(&RunEvent::Startup).unwrap();
//! assert_eq!(reporter.printer().calls().len(), 1);
//! ```

mod render;

pub use render::{SCOPE_KEY_INDENT, STEP_PREFIX};

use anyhow::Result;
use cifold_config::ReporterConfig;
use cifold_ids::{SectionIdSource, UuidSectionIds};
use cifold_ports::Printer;
use cifold_schema::event::RunEvent;
use cifold_schema::report::Report;
use cifold_schema::result::{AggregatedResult, ScenarioResult, StepResult};
use cifold_schema::scope::Scope;
use cifold_scope::ScopeDiffTable;
use render::AttemptRenderer;

/// Prefix of a scenario's top-level line.
pub const SUBJECT_PREFIX: &str = " ";

/// Prefix of attempt `index` (1-based) out of `count` in a rerun tree.
pub fn rerun_prefix(index: usize, count: usize) -> String {
    format!(" │\n ├─[{index}/{count}] ")
}

/// Stateful reporter for one run.
pub struct GitlabReporter<P, S = UuidSectionIds> {
    printer: P,
    section_ids: S,
    config: ReporterConfig,
    /// Namespace of the last printed namespace header.
    namespace: Option<String>,
    /// Scenario whose attempts are in `attempts`.
    unique_id: Option<String>,
    /// One scope-diff table per attempt of the current scenario.
    attempts: Vec<ScopeDiffTable>,
}

impl<P: Printer> GitlabReporter<P, UuidSectionIds> {
    /// Reporter with random section ids and the default configuration.
    pub fn new(printer: P) -> Self {
        Self::with_section_ids(printer, UuidSectionIds)
    }
}

impl<P: Printer, S: SectionIdSource> GitlabReporter<P, S> {
    pub fn with_section_ids(printer: P, section_ids: S) -> Self {
        Self {
            printer,
            section_ids,
            config: ReporterConfig::default(),
            namespace: None,
            unique_id: None,
            attempts: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ReporterConfig) -> Self {
        self.on_arg_parsed(config);
        self
    }

    /// Adopt the resolved configuration. Called once, before the first event.
    pub fn on_arg_parsed(&mut self, config: ReporterConfig) {
        tracing::debug!(
            collapsable = ?config.collapsable,
            tb_max_frames = config.tb_max_frames,
            "reporter configured"
        );
        self.config = config;
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn printer(&self) -> &P {
        &self.printer
    }

    pub fn printer_mut(&mut self) -> &mut P {
        &mut self.printer
    }

    pub fn into_printer(self) -> P {
        self.printer
    }

    /// Handle one event to completion.
    pub fn handle(&mut self, event: &RunEvent) -> Result<()> {
        tracing::trace!(event = event.kind(), "handle");
        match event {
            RunEvent::Startup => self.printer.print_header(),
            RunEvent::ScenarioRun { scenario_result } => self.on_scenario_run(scenario_result),
            RunEvent::StepPassed { step_result, scope }
            | RunEvent::StepFailed { step_result, scope } => {
                self.on_step_end(step_result, scope.as_ref());
                Ok(())
            }
            RunEvent::ScenarioReported { aggregated_result } => {
                self.on_scenario_reported(aggregated_result)
            }
            RunEvent::Cleanup { report } => self.on_cleanup(report),
        }
    }

    /// Handle events in order, stopping at the first printer failure.
    pub fn replay<'e>(&mut self, events: impl IntoIterator<Item = &'e RunEvent>) -> Result<()> {
        for event in events {
            self.handle(event)?;
        }
        Ok(())
    }

    fn on_scenario_run(&mut self, scenario_result: &ScenarioResult) -> Result<()> {
        let scenario = &scenario_result.scenario;
        if self.namespace.as_deref() != Some(scenario.namespace.as_str()) {
            tracing::debug!(namespace = %scenario.namespace, "namespace changed");
            self.namespace = Some(scenario.namespace.clone());
            self.printer.print_namespace(&scenario.namespace)?;
        }

        if self.unique_id.as_deref() != Some(scenario.unique_id.as_str()) {
            self.unique_id = Some(scenario.unique_id.clone());
            self.attempts.clear();
        }
        self.attempts.push(ScopeDiffTable::new());
        Ok(())
    }

    fn on_step_end(&mut self, step_result: &StepResult, scope: Option<&Scope>) {
        if self.attempts.is_empty() {
            tracing::debug!(step = %step_result.name, "step finished outside a scenario run");
            self.attempts.push(ScopeDiffTable::new());
        }
        let empty = Scope::new();
        let scope = scope.unwrap_or(&empty);
        let Some(table) = self.attempts.last_mut() else {
            return;
        };
        let introduced = table.record_step(&step_result.name, scope);
        tracing::debug!(
            step = %step_result.name,
            introduced = introduced.len(),
            "scope keys attributed"
        );
    }

    fn on_scenario_reported(&mut self, aggregated: &AggregatedResult) -> Result<()> {
        let count = aggregated.rescheduled();
        let empty = ScopeDiffTable::new();
        let mut renderer = AttemptRenderer {
            printer: &mut self.printer,
            section_ids: &mut self.section_ids,
            config: &self.config,
        };

        if count <= 1 {
            let table = self.attempts.last().unwrap_or(&empty);
            return renderer.attempt(&aggregated.canonical, table, SUBJECT_PREFIX, true);
        }

        renderer.subject(&aggregated.canonical, None, SUBJECT_PREFIX)?;
        renderer.path(&aggregated.canonical, SUBJECT_PREFIX)?;
        for (i, attempt) in aggregated.scenario_results.iter().enumerate() {
            let table = self.attempts.get(i).unwrap_or(&empty);
            renderer.attempt(attempt, table, &rerun_prefix(i + 1, count), false)?;
        }
        self.printer.print_empty_line()
    }

    fn on_cleanup(&mut self, report: &Report) -> Result<()> {
        self.printer.print_empty_line()?;
        self.printer.print_report_summary(&report.summary)?;
        self.printer.print_report_stats(&report.stats())
    }
}
