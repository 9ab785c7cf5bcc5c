use serde::{Deserialize, Serialize};

/// End-of-run report handed over with the cleanup event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Free-form summary lines contributed by other plugins.
    #[serde(default)]
    pub summary: Vec<String>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub passed: usize,
    #[serde(default)]
    pub failed: usize,
    #[serde(default)]
    pub skipped: usize,
    /// Seconds.
    #[serde(default)]
    pub elapsed: f64,
}

/// The numeric part of a report.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReportStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub elapsed: f64,
}

impl Report {
    pub fn stats(&self) -> ReportStats {
        ReportStats {
            total: self.total,
            passed: self.passed,
            failed: self.failed,
            skipped: self.skipped,
            elapsed: self.elapsed,
        }
    }
}

impl ReportStats {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
