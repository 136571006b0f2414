//! Fuzz target: `TelemetryDecoder::push`
//!
//! Drives arbitrary byte sequences into the height framer and asserts that
//! it never panics, only reports heights a three-digit display can show,
//! and keeps `last_height` in step with what it reported.
//!
//! cargo fuzz run fuzz_telemetry_decoder

#![no_main]

use deskpilot::desk::telemetry::TelemetryDecoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = TelemetryDecoder::new();
    let mut last = None;

    for &byte in data {
        if let Some(height) = decoder.push(byte) {
            assert!((0.0..=999.0).contains(&height), "height out of range");
            last = Some(height);
        }
        assert_eq!(decoder.last_height(), last);
    }

    // A reset drops any partial frame but keeps the last height.
    decoder.reset();
    assert_eq!(decoder.last_height(), last);
});
