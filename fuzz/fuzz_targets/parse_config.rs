//! Fuzz harness for reporter configuration files (cifold.yaml / cifold.json)
//!
//! Target: `cifold_config::parse_config`

#![no_main]

use cifold_config::{ConfigFormat, parse_config};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    for format in [ConfigFormat::Yaml, ConfigFormat::Json] {
        if let Ok(config) = parse_config(input, format) {
            assert!(config.traceback_options().max_frames >= 4);
        }
    }
});
