use anyhow::{Context, Result};
use cifold_ports::EventSource;
use cifold_schema::event::RunEvent;
use std::path::{Path, PathBuf};

/// Adapter that replays a run recorded as JSONL, one event per line.
///
/// Handy for:
/// - reproducing a CI log locally
/// - fixtures
pub struct JsonlEventSource {
    pub events_path: PathBuf,
}

impl JsonlEventSource {
    pub fn new(events_path: impl Into<PathBuf>) -> Self {
        Self {
            events_path: events_path.into(),
        }
    }
}

impl EventSource for JsonlEventSource {
    fn events(&self) -> Result<Vec<RunEvent>> {
        read_events(&self.events_path)
    }
}

pub fn read_events(path: &Path) -> Result<Vec<RunEvent>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {path:?}"))?;
    parse_events(&text).with_context(|| format!("parse events in {path:?}"))
}

/// Parse JSONL text. Blank lines are skipped; line numbers in errors are 1-based.
pub fn parse_events(text: &str) -> Result<Vec<RunEvent>> {
    let mut out = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let ev: RunEvent = serde_json::from_str(line)
            .with_context(|| format!("parse event json line {}", i + 1))?;
        out.push(ev);
    }
    Ok(out)
}

/// Inverse of [`parse_events`].
pub fn to_jsonl(events: &[RunEvent]) -> Result<String> {
    let mut out = String::new();
    for ev in events {
        out.push_str(&serde_json::to_string(ev).context("serialize event")?);
        out.push('\n');
    }
    Ok(out)
}
