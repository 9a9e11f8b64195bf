#![no_main]

use centerline_generator::csv::{parse_reference_table, parse_spline_table};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = parse_spline_table(content);
        let _ = parse_reference_table(content);
    }
});
