#![no_main]

use centerline_generator::{parse_raw_track, run_pipeline, PipelineOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(points) = parse_raw_track(content) else {
        return;
    };
    // Nur kleine Strecken durch die komplette Pipeline schicken
    let bounded = points
        .iter()
        .all(|p| p.position.abs().max_element() < 1e4 && p.total_width() < 1e3);
    if points.len() <= 64 && bounded {
        let _ = run_pipeline(&points, &PipelineOptions::default());
    }
});
