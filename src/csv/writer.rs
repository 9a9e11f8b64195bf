//! Writer für die Export-Tabellen (Referenzlinie und Spline-Koeffizienten).
//!
//! Beide Tabellen nutzen `; ` als Trennzeichen und 7 Nachkommastellen.

use glam::DVec2;

use crate::core::{ReferenceTrack, SplineSegment};

/// Kopfzeile der Trajektorien-Tabelle.
pub const TRAJECTORY_HEADER: &str =
    "x_ref_m; y_ref_m; width_right_m; width_left_m; x_normvec_m; y_normvec_m";
/// Kopfzeile der Spline-Tabelle.
pub const SPLINE_HEADER: &str = "s_m; a0; a1; a2; a3; b0; b1; b2; b3";

fn push_row(output: &mut String, values: &[f64]) {
    let row: Vec<String> = values.iter().map(|v| format!("{:.7}", v)).collect();
    output.push_str(&row.join("; "));
    output.push('\n');
}

/// Schreibt eine Zeile je Referenzpunkt: Position, Breiten, Normale.
pub fn write_trajectory_table(reference: &ReferenceTrack, normals: &[DVec2]) -> String {
    let mut output = String::with_capacity(80 * (reference.len() + 1));
    output.push_str(TRAJECTORY_HEADER);
    output.push('\n');

    for (p, n) in reference.points.iter().zip(normals) {
        push_row(
            &mut output,
            &[
                p.position.x,
                p.position.y,
                p.width_right,
                p.width_left,
                n.x,
                n.y,
            ],
        );
    }
    output
}

/// Schreibt eine Zeile je Segment: Länge, a0..a3, b0..b3.
pub fn write_spline_table(lengths: &[f64], segments: &[SplineSegment]) -> String {
    let mut output = String::with_capacity(120 * (segments.len() + 1));
    output.push_str(SPLINE_HEADER);
    output.push('\n');

    for (len, seg) in lengths.iter().zip(segments) {
        let mut row = Vec::with_capacity(9);
        row.push(*len);
        row.extend_from_slice(&seg.x);
        row.extend_from_slice(&seg.y);
        push_row(&mut output, &row);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TrackPoint;

    #[test]
    fn test_trajectory_table_format() {
        let reference = ReferenceTrack::new(vec![TrackPoint::new(1.0, -2.5, 3.0, 3.25)]);
        let normals = [DVec2::new(0.6, -0.8)];
        let output = write_trajectory_table(&reference, &normals);

        let mut lines = output.lines();
        assert_eq!(lines.next(), Some(TRAJECTORY_HEADER));
        assert_eq!(
            lines.next(),
            Some("1.0000000; -2.5000000; 3.0000000; 3.2500000; 0.6000000; -0.8000000")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_spline_table_has_nine_columns() {
        let seg = SplineSegment {
            x: [1.0, 2.0, 3.0, 4.0],
            y: [5.0, 6.0, 7.0, 8.0],
        };
        let output = write_spline_table(&[12.5], &[seg]);
        let row = output.lines().nth(1).expect("Datenzeile");

        assert_eq!(row.split("; ").count(), 9);
        assert!(row.starts_with("12.5000000; 1.0000000"));
        assert!(row.ends_with("8.0000000"));
    }
}
