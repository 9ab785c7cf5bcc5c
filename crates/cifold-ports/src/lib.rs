use anyhow::Result;
use cifold_schema::event::RunEvent;
use cifold_schema::report::ReportStats;
use cifold_schema::result::ExcInfo;
use cifold_schema::scope::Scope;
use cifold_schema::status::{ScenarioStatus, StepStatus};
use serde_json::Value;

/// Fewest frames a traceback may be cut down to.
pub const MIN_TB_FRAMES: usize = 4;

/// Default traceback frame budget.
pub const DEFAULT_TB_FRAMES: usize = 8;

/// How much of a captured failure to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TracebackOptions {
    /// Keep frames the runner marked as its own.
    pub show_internal_calls: bool,
    /// Print local variables under each frame.
    pub show_locals: bool,
    /// Upper bound on rendered frames; never below [`MIN_TB_FRAMES`].
    pub max_frames: usize,
}

impl TracebackOptions {
    pub fn new(show_internal_calls: bool, show_locals: bool, max_frames: usize) -> Self {
        Self {
            show_internal_calls,
            show_locals,
            max_frames: max_frames.max(MIN_TB_FRAMES),
        }
    }
}

impl Default for TracebackOptions {
    fn default() -> Self {
        Self::new(false, false, DEFAULT_TB_FRAMES)
    }
}

/// Anything that can hand over a recorded run, in delivery order.
pub trait EventSource {
    fn events(&self) -> Result<Vec<RunEvent>>;
}

/// Text rendering.
///
/// The reporter decides *what* goes out and in which order; a printer decides
/// how each piece looks. `write_raw` bypasses styling entirely and is how fold
/// markers reach the stream untouched.
pub trait Printer {
    fn print_header(&mut self) -> Result<()>;

    fn print_namespace(&mut self, namespace: &str) -> Result<()>;

    fn print_scenario_subject(
        &mut self,
        subject: &str,
        status: ScenarioStatus,
        elapsed: Option<f64>,
        prefix: &str,
    ) -> Result<()>;

    fn print_scenario_path(&mut self, path: &str, prefix: &str) -> Result<()>;

    fn print_step_name(
        &mut self,
        name: &str,
        status: StepStatus,
        elapsed: Option<f64>,
        prefix: &str,
    ) -> Result<()>;

    fn print_exception(&mut self, exc_info: &ExcInfo, options: &TracebackOptions) -> Result<()>;

    fn print_scope_key(&mut self, key: &str, indent: usize, line_break: bool) -> Result<()>;

    fn print_scope_val(&mut self, val: &str) -> Result<()>;

    /// Whole scope under a `Scope:` label.
    fn print_scope(&mut self, scope: &Scope) -> Result<()>;

    /// Human-readable rendering of one scope value.
    fn pretty_format(&self, value: &Value) -> String;

    fn print_empty_line(&mut self) -> Result<()>;

    fn print_report_summary(&mut self, summary: &[String]) -> Result<()>;

    fn print_report_stats(&mut self, stats: &ReportStats) -> Result<()>;

    fn write_raw(&mut self, raw: &str) -> Result<()>;
}

impl<P: Printer + ?Sized> Printer for &mut P {
    fn print_header(&mut self) -> Result<()> {
        (**self).print_header()
    }

    fn print_namespace(&mut self, namespace: &str) -> Result<()> {
        (**self).print_namespace(namespace)
    }

    fn print_scenario_subject(
        &mut self,
        subject: &str,
        status: ScenarioStatus,
        elapsed: Option<f64>,
        prefix: &str,
    ) -> Result<()> {
        (**self).print_scenario_subject(subject, status, elapsed, prefix)
    }

    fn print_scenario_path(&mut self, path: &str, prefix: &str) -> Result<()> {
        (**self).print_scenario_path(path, prefix)
    }

    fn print_step_name(
        &mut self,
        name: &str,
        status: StepStatus,
        elapsed: Option<f64>,
        prefix: &str,
    ) -> Result<()> {
        (**self).print_step_name(name, status, elapsed, prefix)
    }

    fn print_exception(&mut self, exc_info: &ExcInfo, options: &TracebackOptions) -> Result<()> {
        (**self).print_exception(exc_info, options)
    }

    fn print_scope_key(&mut self, key: &str, indent: usize, line_break: bool) -> Result<()> {
        (**self).print_scope_key(key, indent, line_break)
    }

    fn print_scope_val(&mut self, val: &str) -> Result<()> {
        (**self).print_scope_val(val)
    }

    fn print_scope(&mut self, scope: &Scope) -> Result<()> {
        (**self).print_scope(scope)
    }

    fn pretty_format(&self, value: &Value) -> String {
        (**self).pretty_format(value)
    }

    fn print_empty_line(&mut self) -> Result<()> {
        (**self).print_empty_line()
    }

    fn print_report_summary(&mut self, summary: &[String]) -> Result<()> {
        (**self).print_report_summary(summary)
    }

    fn print_report_stats(&mut self, stats: &ReportStats) -> Result<()> {
        (**self).print_report_stats(stats)
    }

    fn write_raw(&mut self, raw: &str) -> Result<()> {
        (**self).write_raw(raw)
    }
}
