//! Bogenlängen der Spline-Segmente.

use super::spline::SplineSegment;

/// Länge jedes Segments (∫₀¹ √(x'² + y'²) dt), gleiche Reihenfolge wie `segments`.
pub fn calc_spline_lengths(segments: &[SplineSegment]) -> Vec<f64> {
    segments.iter().map(|seg| seg.length_to(1.0)).collect()
}

/// Kumulierte Segment-Endlängen; der letzte Eintrag ist die Gesamtlänge.
pub fn cumulative_lengths(lengths: &[f64]) -> Vec<f64> {
    lengths
        .iter()
        .scan(0.0, |acc, len| {
            *acc += len;
            Some(*acc)
        })
        .collect()
}
