//! Gleichabständige Abtastung der Spline-Segmente über die inverse Bogenlänge.

use glam::DVec2;

use super::arc_length::cumulative_lengths;
use super::spline::SplineSegment;
use crate::error::{ConfigError, GeometryError, TrackError};
use crate::shared::spline_geometry::sample_count;

/// Maximale Newton-/Bisektionsschritte je Abtastpunkt.
const MAX_ITERATIONS: usize = 60;
/// Absolute Toleranz der Bogenlänge beim Auflösen nach t.
const LENGTH_TOLERANCE: f64 = 1e-10;

/// Abgetastete Punkte mit Segment-Zuordnung.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResampledPath {
    /// Punkte auf dem Spline
    pub points: Vec<DVec2>,
    /// Index des Segments, in dem der Punkt liegt
    pub segment_indices: Vec<usize>,
    /// Lokaler Parameter t ∈ [0, 1] im Segment
    pub t_values: Vec<f64>,
    /// Kumulierte Bogenlänge je Punkt
    pub s_values: Vec<f64>,
}

impl ResampledPath {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Tastet die Segmente in (näherungsweise) `stepsize` Abstand ab.
///
/// Anzahl der Intervalle: `round(gesamt / stepsize)`, mindestens 1; der echte
/// Abstand ist `gesamt / anzahl`. Mit `include_last = false` entfällt der
/// Punkt bei s = gesamt, der mit dem Startpunkt zusammenfällt. Ergäbe das
/// Verhältnis mehr als `MAX_SAMPLES` Punkte, folgt `GeometryError::TooManySamples`.
pub fn interp_splines(
    lengths: &[f64],
    segments: &[SplineSegment],
    stepsize: f64,
    include_last: bool,
) -> Result<ResampledPath, TrackError> {
    if !stepsize.is_finite() || stepsize <= 0.0 {
        return Err(ConfigError::InvalidValue(format!(
            "Abtastabstand muss positiv sein, ist {stepsize}"
        ))
        .into());
    }
    if segments.is_empty() || lengths.len() != segments.len() {
        return Err(GeometryError::EmptySpline(format!(
            "{} Längen zu {} Segmenten",
            lengths.len(),
            segments.len()
        ))
        .into());
    }

    let cum = cumulative_lengths(lengths);
    let total = cum[cum.len() - 1];
    if !total.is_finite() || total <= 0.0 {
        return Err(GeometryError::EmptySpline(format!("Gesamtlänge {total}")).into());
    }

    let intervals = sample_count((total / stepsize).round().max(1.0))?;
    let count = if include_last { intervals + 1 } else { intervals };
    let spacing = total / intervals as f64;

    let mut path = ResampledPath {
        points: Vec::with_capacity(count),
        segment_indices: Vec::with_capacity(count),
        t_values: Vec::with_capacity(count),
        s_values: Vec::with_capacity(count),
    };

    for k in 0..count {
        let s = if k == intervals {
            total
        } else {
            k as f64 * spacing
        };

        // Segment: erstes, dessen Ende hinter s liegt (letztes bei s = gesamt)
        let index = cum.partition_point(|&end| end <= s).min(segments.len() - 1);
        let start = if index == 0 { 0.0 } else { cum[index - 1] };
        let t = solve_t(&segments[index], lengths[index], s - start);

        path.points.push(segments[index].position(t));
        path.segment_indices.push(index);
        path.t_values.push(t);
        path.s_values.push(s);
    }

    log::debug!(
        "Spline abgetastet: {} Punkte, Abstand {:.4} (Ziel {:.4}), Gesamtlänge {:.3}",
        path.len(),
        spacing,
        stepsize,
        total
    );

    Ok(path)
}

/// Löst `length_to(t) = residual` nach t (Newton mit Bisektions-Absicherung).
fn solve_t(segment: &SplineSegment, length: f64, residual: f64) -> f64 {
    if length <= 0.0 || residual <= 0.0 {
        return 0.0;
    }
    if residual >= length {
        return 1.0;
    }

    let mut lo = 0.0;
    let mut hi = 1.0;
    let mut t = residual / length;

    for _ in 0..MAX_ITERATIONS {
        let f = segment.length_to(t) - residual;
        if f.abs() < LENGTH_TOLERANCE {
            break;
        }
        if f > 0.0 {
            hi = t;
        } else {
            lo = t;
        }

        let speed = segment.speed(t);
        let newton = t - f / speed;
        t = if speed > 0.0 && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
    }

    t
}
