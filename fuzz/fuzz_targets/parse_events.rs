//! Fuzz harness for JSONL event streams (run.jsonl)
//!
//! Target: `cifold_ingest_jsonl::parse_events`

#![no_main]

use cifold_ingest_jsonl::parse_events;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let _ = parse_events(input);
});
