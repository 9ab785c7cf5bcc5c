//! Terminal printer for cifold.
//!
//! Renders scenario and step lines, scope values, tracebacks and the final
//! report to any `io::Write`, optionally with ANSI colors. Fold markers pass
//! through [`Printer::write_raw`] unmodified.

pub mod traceback;

use anyhow::Result;
use cifold_ports::{Printer, TracebackOptions};
use cifold_schema::report::ReportStats;
use cifold_schema::result::ExcInfo;
use cifold_schema::scope::Scope;
use cifold_schema::status::{ScenarioStatus, StepStatus};
use itertools::Itertools;
use serde_json::Value;
use std::io::{self, Write};

/// Indent of the `Scope:` label printed by [`Printer::print_scope`].
const SCOPE_LABEL_INDENT: usize = 3;
/// Indent of keys under the `Scope:` label.
const SCOPE_KEY_INDENT: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Style {
    Bold,
    Red,
    BoldRed,
    Green,
    Grey,
    Blue,
    Yellow,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "\x1b[1m",
            Style::Red => "\x1b[31m",
            Style::BoldRed => "\x1b[1;31m",
            Style::Green => "\x1b[32m",
            Style::Grey => "\x1b[90m",
            Style::Blue => "\x1b[34m",
            Style::Yellow => "\x1b[33m",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// [`Printer`] over a byte stream.
pub struct ConsolePrinter<W: Write> {
    out: W,
    colors: bool,
    show_timings: bool,
}

impl ConsolePrinter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsolePrinter<W> {
    /// Colored output, no timings.
    pub fn new(out: W) -> Self {
        Self {
            out,
            colors: true,
            show_timings: false,
        }
    }

    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_timings(mut self, show_timings: bool) -> Self {
        self.show_timings = show_timings;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.colors && !text.is_empty() {
            format!("{}{text}{RESET}", style.code())
        } else {
            text.to_string()
        }
    }

    fn timing(&self, elapsed: Option<f64>) -> String {
        match elapsed {
            Some(secs) if self.show_timings => self.paint(Style::Grey, &format!(" ({secs:.2}s)")),
            _ => String::new(),
        }
    }

    fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }
}

fn scenario_mark(status: ScenarioStatus) -> (&'static str, Style) {
    match status {
        ScenarioStatus::Passed => ("✔", Style::Green),
        ScenarioStatus::Failed => ("✗", Style::Red),
        ScenarioStatus::Skipped => ("○", Style::Grey),
        ScenarioStatus::Pending => ("?", Style::Yellow),
    }
}

fn step_mark(status: StepStatus) -> (&'static str, Style) {
    match status {
        StepStatus::Passed => ("✔", Style::Green),
        StepStatus::Failed => ("✗", Style::Red),
        StepStatus::Pending => ("?", Style::Yellow),
    }
}

/// Namespaces are path-like (`users/auth_flow`); show them as words.
fn namespace_label(namespace: &str) -> String {
    namespace.replace('_', " ").split('/').join(" / ")
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

impl<W: Write> Printer for ConsolePrinter<W> {
    fn print_header(&mut self) -> Result<()> {
        let text = self.paint(Style::Bold, "Scenarios");
        self.line(&text)
    }

    fn print_namespace(&mut self, namespace: &str) -> Result<()> {
        let text = self.paint(Style::Bold, &format!("* {}", namespace_label(namespace)));
        self.line(&text)
    }

    fn print_scenario_subject(
        &mut self,
        subject: &str,
        status: ScenarioStatus,
        elapsed: Option<f64>,
        prefix: &str,
    ) -> Result<()> {
        let (mark, style) = scenario_mark(status);
        let text = format!(
            "{prefix}{}{}",
            self.paint(style, &format!("{mark} {subject}")),
            self.timing(elapsed)
        );
        self.line(&text)
    }

    fn print_scenario_path(&mut self, path: &str, prefix: &str) -> Result<()> {
        let text = format!("{prefix}{}", self.paint(Style::Grey, &format!("> {path}")));
        self.line(&text)
    }

    fn print_step_name(
        &mut self,
        name: &str,
        status: StepStatus,
        elapsed: Option<f64>,
        prefix: &str,
    ) -> Result<()> {
        let (mark, style) = step_mark(status);
        let text = format!(
            "{prefix}{}{}",
            self.paint(style, &format!("{mark} {name}")),
            self.timing(elapsed)
        );
        self.line(&text)
    }

    fn print_exception(&mut self, exc_info: &ExcInfo, options: &TracebackOptions) -> Result<()> {
        let lines = traceback::format_traceback(exc_info, options);
        let last = lines.len().saturating_sub(1);
        for (i, line) in lines.iter().enumerate() {
            let text = if i == last {
                self.paint(Style::BoldRed, line)
            } else {
                line.clone()
            };
            self.line(&text)?;
        }
        Ok(())
    }

    fn print_scope_key(&mut self, key: &str, indent: usize, line_break: bool) -> Result<()> {
        let text = self.paint(Style::Blue, &format!("{}{key}: ", " ".repeat(indent)));
        write!(self.out, "{text}")?;
        if line_break {
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn print_scope_val(&mut self, val: &str) -> Result<()> {
        self.line(val)
    }

    fn print_scope(&mut self, scope: &Scope) -> Result<()> {
        let label = self.paint(Style::Bold, &format!("{}Scope:", " ".repeat(SCOPE_LABEL_INDENT)));
        self.line(&label)?;
        for (key, value) in scope.iter() {
            self.print_scope_key(key, SCOPE_KEY_INDENT, false)?;
            let val = self.pretty_format(value);
            self.print_scope_val(&val)?;
        }
        Ok(())
    }

    fn pretty_format(&self, value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }

    fn print_empty_line(&mut self) -> Result<()> {
        self.line("")
    }

    fn print_report_summary(&mut self, summary: &[String]) -> Result<()> {
        for entry in summary {
            let text = self.paint(Style::Grey, &format!("# {entry}"));
            self.line(&text)?;
        }
        Ok(())
    }

    fn print_report_stats(&mut self, stats: &ReportStats) -> Result<()> {
        let style = if stats.has_failures() {
            Style::Red
        } else {
            Style::Green
        };
        let text = format!(
            "# {}, {} passed, {} failed, {} skipped ({:.2}s)",
            plural(stats.total, "scenario"),
            stats.passed,
            stats.failed,
            stats.skipped,
            stats.elapsed
        );
        let text = self.paint(style, &text);
        self.line(&text)?;
        self.out.flush()?;
        Ok(())
    }

    fn write_raw(&mut self, raw: &str) -> Result<()> {
        self.out.write_all(raw.as_bytes())?;
        Ok(())
    }
}
