//! Fuzz harness for rendering: any parseable event stream must produce
//! properly paired fold markers in every collapsing mode.
//!
//! Target: `cifold_reporter::GitlabReporter`

#![no_main]

use cifold_config::{CollapsableMode, ReporterConfig};
use cifold_console::ConsolePrinter;
use cifold_ids::SequentialSectionIds;
use cifold_ingest_jsonl::parse_events;
use cifold_reporter::GitlabReporter;
use cifold_schema::event::RunEvent;
use cifold_section::{markers_balanced, scan_markers};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    // Event text that spells out a marker itself would confuse the scan.
    if input.contains("section_") || input.contains("\\u") {
        return;
    }
    let Ok(events) = parse_events(input) else {
        return;
    };

    for mode in CollapsableMode::ALL {
        if let Some(log) = render(&events, Some(mode)) {
            assert!(markers_balanced(&scan_markers(&log)));
        }
    }
});

fn render(events: &[RunEvent], mode: Option<CollapsableMode>) -> Option<String> {
    let printer = ConsolePrinter::new(Vec::new()).with_colors(false);
    let mut reporter = GitlabReporter::with_section_ids(printer, SequentialSectionIds::default())
        .with_config(ReporterConfig::default().with_collapsable(mode));
    reporter.replay(events).ok()?;
    let out = reporter.into_printer().into_inner();
    Some(String::from_utf8_lossy(&out).into_owned())
}
