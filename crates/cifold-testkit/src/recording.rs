use anyhow::Result;
use cifold_ports::{Printer, TracebackOptions};
use cifold_schema::report::ReportStats;
use cifold_schema::result::ExcInfo;
use cifold_schema::scope::Scope;
use cifold_schema::status::{ScenarioStatus, StepStatus};
use cifold_section::{Marker, scan_markers};
use serde_json::Value;

/// One call made against a [`RecordingPrinter`].
#[derive(Clone, Debug, PartialEq)]
pub enum PrinterCall {
    Header,
    Namespace(String),
    ScenarioSubject {
        subject: String,
        status: ScenarioStatus,
        elapsed: Option<f64>,
        prefix: String,
    },
    ScenarioPath {
        path: String,
        prefix: String,
    },
    StepName {
        name: String,
        status: StepStatus,
        elapsed: Option<f64>,
        prefix: String,
    },
    Exception {
        exc_info: ExcInfo,
        options: TracebackOptions,
    },
    ScopeKey {
        key: String,
        indent: usize,
        line_break: bool,
    },
    ScopeVal(String),
    Scope(Scope),
    EmptyLine,
    ReportSummary(Vec<String>),
    ReportStats(ReportStats),
    Raw(String),
}

impl PrinterCall {
    pub fn is_raw(&self) -> bool {
        matches!(self, PrinterCall::Raw(_))
    }
}

/// Printer that renders nothing and remembers every call, in order.
#[derive(Debug, Default)]
pub struct RecordingPrinter {
    calls: Vec<PrinterCall>,
}

impl RecordingPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[PrinterCall] {
        &self.calls
    }

    /// Drain recorded calls, like resetting a mock between phases.
    pub fn take_calls(&mut self) -> Vec<PrinterCall> {
        std::mem::take(&mut self.calls)
    }

    /// Fold markers written so far, in order.
    pub fn markers(&self) -> Vec<Marker> {
        let raw: String = self
            .calls
            .iter()
            .filter_map(|call| match call {
                PrinterCall::Raw(raw) => Some(raw.as_str()),
                _ => None,
            })
            .collect();
        scan_markers(&raw)
    }

    fn record(&mut self, call: PrinterCall) -> Result<()> {
        self.calls.push(call);
        Ok(())
    }
}

impl Printer for RecordingPrinter {
    fn print_header(&mut self) -> Result<()> {
        self.record(PrinterCall::Header)
    }

    fn print_namespace(&mut self, namespace: &str) -> Result<()> {
        self.record(PrinterCall::Namespace(namespace.to_string()))
    }

    fn print_scenario_subject(
        &mut self,
        subject: &str,
        status: ScenarioStatus,
        elapsed: Option<f64>,
        prefix: &str,
    ) -> Result<()> {
        self.record(PrinterCall::ScenarioSubject {
            subject: subject.to_string(),
            status,
            elapsed,
            prefix: prefix.to_string(),
        })
    }

    fn print_scenario_path(&mut self, path: &str, prefix: &str) -> Result<()> {
        self.record(PrinterCall::ScenarioPath {
            path: path.to_string(),
            prefix: prefix.to_string(),
        })
    }

    fn print_step_name(
        &mut self,
        name: &str,
        status: StepStatus,
        elapsed: Option<f64>,
        prefix: &str,
    ) -> Result<()> {
        self.record(PrinterCall::StepName {
            name: name.to_string(),
            status,
            elapsed,
            prefix: prefix.to_string(),
        })
    }

    fn print_exception(&mut self, exc_info: &ExcInfo, options: &TracebackOptions) -> Result<()> {
        self.record(PrinterCall::Exception {
            exc_info: exc_info.clone(),
            options: *options,
        })
    }

    fn print_scope_key(&mut self, key: &str, indent: usize, line_break: bool) -> Result<()> {
        self.record(PrinterCall::ScopeKey {
            key: key.to_string(),
            indent,
            line_break,
        })
    }

    fn print_scope_val(&mut self, val: &str) -> Result<()> {
        self.record(PrinterCall::ScopeVal(val.to_string()))
    }

    fn print_scope(&mut self, scope: &Scope) -> Result<()> {
        self.record(PrinterCall::Scope(scope.clone()))
    }

    fn pretty_format(&self, value: &Value) -> String {
        value.to_string()
    }

    fn print_empty_line(&mut self) -> Result<()> {
        self.record(PrinterCall::EmptyLine)
    }

    fn print_report_summary(&mut self, summary: &[String]) -> Result<()> {
        self.record(PrinterCall::ReportSummary(summary.to_vec()))
    }

    fn print_report_stats(&mut self, stats: &ReportStats) -> Result<()> {
        self.record(PrinterCall::ReportStats(*stats))
    }

    fn write_raw(&mut self, raw: &str) -> Result<()> {
        self.record(PrinterCall::Raw(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order_and_drains() {
        let mut printer = RecordingPrinter::new();
        printer.print_header().unwrap();
        printer.print_empty_line().unwrap();
        assert_eq!(printer.calls(), [PrinterCall::Header, PrinterCall::EmptyLine]);
        assert_eq!(printer.take_calls().len(), 2);
        assert!(printer.calls().is_empty());
    }

    #[test]
    fn markers_are_read_back_from_raw_writes() {
        let mut printer = RecordingPrinter::new();
        printer
            .write_raw("\x1b[0Ksection_start:1:a[collapsed=true]\r\x1b[0K")
            .unwrap();
        printer.print_empty_line().unwrap();
        printer.write_raw("\x1b[0Ksection_end:3:a\r\x1b[0K").unwrap();
        let markers = printer.markers();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].id(), "a");
    }
}
