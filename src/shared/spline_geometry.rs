//! Reine Polyline-Funktionen für geschlossene Linienzüge.
//!
//! Layer-neutral: wird von der Streckenvorbereitung (Vor-Interpolation) und
//! vom Validator (feine Randabtastung) genutzt.

use glam::DVec2;

use crate::error::GeometryError;

/// Obergrenze für die Anzahl erzeugter Abtastpunkte je Linienzug oder Spline.
pub const MAX_SAMPLES: usize = 10_000_000;

/// Wandelt eine bereits gerundete Intervallanzahl (Länge / Schritt) in `usize`.
///
/// Nicht endliche Werte und Werte über [`MAX_SAMPLES`] werden abgelehnt, bevor
/// der Cast sättigen und eine Allokation sprengen kann.
pub fn sample_count(intervals: f64) -> Result<usize, GeometryError> {
    if intervals.is_finite() && intervals <= MAX_SAMPLES as f64 {
        Ok(intervals.max(0.0) as usize)
    } else {
        Err(GeometryError::TooManySamples {
            requested: intervals,
            limit: MAX_SAMPLES,
        })
    }
}

/// Länge eines geschlossenen Linienzugs inkl. Schlusssegment letzter → erster Punkt.
pub fn closed_polyline_length(points: &[DVec2]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let open: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    open + points[points.len() - 1].distance(points[0])
}

/// Position auf einem geschlossenen Linienzug: Segment `index` (von Punkt
/// `index` zu `index + 1`, zyklisch) und Anteil `fraction` ∈ [0, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolylineStation {
    pub index: usize,
    pub fraction: f64,
}

/// Verteilt Stationen gleichmäßig (Arc-Length) entlang eines geschlossenen Linienzugs.
///
/// Die Anzahl ergibt sich aus `ceil(länge / max_segment_length)`, der echte
/// Abstand ist damit ≤ `max_segment_length`. Der Schlusspunkt (= Start) wird
/// nicht wiederholt. Aufrufer interpolieren daraus Positionen und ggf. Breiten.
/// Es entstehen höchstens [`MAX_SAMPLES`] Stationen; darüber wächst der Abstand.
pub fn closed_stations_by_distance(
    polyline: &[DVec2],
    max_segment_length: f64,
) -> Vec<PolylineStation> {
    let n = polyline.len();
    if n < 2 {
        return (0..n)
            .map(|index| PolylineStation {
                index,
                fraction: 0.0,
            })
            .collect();
    }

    let total = closed_polyline_length(polyline);
    if total < f64::EPSILON || max_segment_length.is_nan() || max_segment_length <= 0.0 {
        return vec![PolylineStation {
            index: 0,
            fraction: 0.0,
        }];
    }

    let count = sample_count((total / max_segment_length).ceil().max(1.0)).unwrap_or(MAX_SAMPLES);
    let spacing = total / count as f64;

    let mut result = Vec::with_capacity(count);
    let mut poly_idx = 0;
    let mut seg_start = 0.0f64; // Bogenlänge am Anfang von Segment `poly_idx`

    for k in 0..count {
        let target = k as f64 * spacing;
        let mut seg_len = polyline[poly_idx].distance(polyline[(poly_idx + 1) % n]);

        // Letztes Segment nie verlassen, Rundungsfehler landen dort
        while poly_idx + 1 < n && seg_start + seg_len <= target {
            seg_start += seg_len;
            poly_idx += 1;
            seg_len = polyline[poly_idx].distance(polyline[(poly_idx + 1) % n]);
        }

        let fraction = if seg_len > 0.0 {
            ((target - seg_start) / seg_len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        result.push(PolylineStation {
            index: poly_idx,
            fraction,
        });
    }

    result
}

/// Interpoliert einen geschlossenen Linienzug linear auf maximal `stepsize` Abstand.
pub fn resample_closed_by_distance(polyline: &[DVec2], stepsize: f64) -> Vec<DVec2> {
    let n = polyline.len();
    closed_stations_by_distance(polyline, stepsize)
        .into_iter()
        .map(|st| polyline[st.index].lerp(polyline[(st.index + 1) % n], st.fraction))
        .collect()
}
