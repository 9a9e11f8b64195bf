//! Analytischer Kurswinkel und Krümmung aus den Spline-Koeffizienten.

use std::f64::consts::PI;

use glam::DVec2;

use super::resample::ResampledPath;
use super::spline::SplineSegment;

/// Unterhalb dieses Werts von x'² + y'² gilt ein Punkt als stationär.
pub const SPEED_SQ_EPSILON: f64 = 1e-12;

/// Kurswinkel und Krümmung an einem Abtastpunkt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingCurvature {
    /// Kurswinkel in rad, (−π, π]
    pub heading: f64,
    /// Vorzeichenbehaftete Krümmung in rad/m; `None` an stationären Punkten
    pub curvature: Option<f64>,
}

/// Ein Punkt der finalen Trajektorie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    /// Bogenlänge ab Startpunkt
    pub s: f64,
    pub position: DVec2,
    /// Kurswinkel in rad, (−π, π]
    pub heading: f64,
    /// Krümmung in rad/m; `None` = undefiniert (stationärer Punkt)
    pub curvature: Option<f64>,
}

/// Faltet einen Winkel auf (−π, π].
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

/// Berechnet Kurswinkel und Krümmung je (Segment, t)-Paar.
///
/// `heading = atan2(y', x')`, `κ = (x'·y'' − y'·x'') / (x'² + y'²)^1.5`.
/// An stationären Punkten wird der vorherige Kurswinkel übernommen (beim
/// ersten Punkt der nächste gültige) und die Krümmung als undefiniert markiert.
pub fn calc_head_curv(
    segments: &[SplineSegment],
    segment_indices: &[usize],
    t_values: &[f64],
) -> Vec<HeadingCurvature> {
    let raw: Vec<Option<(f64, f64)>> = segment_indices
        .iter()
        .zip(t_values)
        .map(|(&index, &t)| {
            let seg = &segments[index];
            let d1 = seg.first_derivative(t);
            let d2 = seg.second_derivative(t);
            let speed_sq = d1.length_squared();
            if speed_sq < SPEED_SQ_EPSILON {
                return None;
            }
            let heading = normalize_angle(d1.y.atan2(d1.x));
            let curvature = d1.perp_dot(d2) / speed_sq.powf(1.5);
            Some((heading, curvature))
        })
        .collect();

    let degenerate = raw.iter().filter(|r| r.is_none()).count();
    if degenerate > 0 {
        log::warn!(
            "{} stationäre Abtastpunkte: Krümmung undefiniert, Kurswinkel übernommen",
            degenerate
        );
    }

    let mut last_heading = raw.iter().flatten().map(|(h, _)| *h).next().unwrap_or(0.0);
    raw.into_iter()
        .map(|entry| match entry {
            Some((heading, curvature)) => {
                last_heading = heading;
                HeadingCurvature {
                    heading,
                    curvature: Some(curvature),
                }
            }
            None => HeadingCurvature {
                heading: last_heading,
                curvature: None,
            },
        })
        .collect()
}

/// Fügt abgetastete Punkte und Kurs/Krümmung zur Trajektorie zusammen.
pub fn build_trajectory(path: &ResampledPath, segments: &[SplineSegment]) -> Vec<TrajectorySample> {
    let head_curv = calc_head_curv(segments, &path.segment_indices, &path.t_values);
    path.s_values
        .iter()
        .zip(&path.points)
        .zip(head_curv)
        .map(|((&s, &position), hc)| TrajectorySample {
            s,
            position,
            heading: hc.heading,
            curvature: hc.curvature,
        })
        .collect()
}
