//! Kubische Spline-Segmente einer geschlossenen Referenzlinie.
//!
//! Jedes Segment ist über t ∈ [0, 1] parametrisiert:
//! `x(t) = a0 + a1·t + a2·t² + a3·t³`, `y(t) = b0 + b1·t + b2·t² + b3·t³`.

use glam::DVec2;

use super::banded::{CyclicTridiagonal, ProfileMatrix};
use crate::error::GeometryError;

/// Stützstellen der 5-Punkt-Gauß-Legendre-Quadratur auf [-1, 1].
const GAUSS_NODES: [f64; 5] = [
    -0.906_179_845_938_664,
    -0.538_469_310_105_683_1,
    0.0,
    0.538_469_310_105_683_1,
    0.906_179_845_938_664,
];
/// Gewichte zu `GAUSS_NODES`.
const GAUSS_WEIGHTS: [f64; 5] = [
    0.236_926_885_056_189_1,
    0.478_628_670_499_366_5,
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
];
/// Teilintervalle der zusammengesetzten Quadratur.
const QUADRATURE_SUBINTERVALS: usize = 4;

/// Kubisches Segment mit Koeffizienten für x(t) und y(t).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineSegment {
    /// a0..a3
    pub x: [f64; 4],
    /// b0..b3
    pub y: [f64; 4],
}

impl SplineSegment {
    /// Position bei t.
    pub fn position(&self, t: f64) -> DVec2 {
        let eval = |c: &[f64; 4]| c[0] + t * (c[1] + t * (c[2] + t * c[3]));
        DVec2::new(eval(&self.x), eval(&self.y))
    }

    /// Erste Ableitung nach t.
    pub fn first_derivative(&self, t: f64) -> DVec2 {
        let eval = |c: &[f64; 4]| c[1] + t * (2.0 * c[2] + 3.0 * t * c[3]);
        DVec2::new(eval(&self.x), eval(&self.y))
    }

    /// Zweite Ableitung nach t.
    pub fn second_derivative(&self, t: f64) -> DVec2 {
        let eval = |c: &[f64; 4]| 2.0 * c[2] + 6.0 * t * c[3];
        DVec2::new(eval(&self.x), eval(&self.y))
    }

    /// Bahngeschwindigkeit |(x', y')| bei t.
    pub fn speed(&self, t: f64) -> f64 {
        self.first_derivative(t).length()
    }

    /// Bogenlänge von 0 bis t (zusammengesetzte Gauß-Legendre-Quadratur).
    ///
    /// `length_to(1.0)` ist exakt die Segmentlänge aus `calc_spline_lengths`.
    pub fn length_to(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        let h = t / QUADRATURE_SUBINTERVALS as f64;
        let mut total = 0.0;
        for k in 0..QUADRATURE_SUBINTERVALS {
            let mid = (k as f64 + 0.5) * h;
            let half = 0.5 * h;
            for (node, weight) in GAUSS_NODES.iter().zip(&GAUSS_WEIGHTS) {
                total += weight * self.speed(mid + half * node) * half;
            }
        }
        total
    }

    /// Rechtsseitige Einheitsnormale bei t (Tangente um −90° gedreht).
    pub fn normal(&self, t: f64) -> Option<DVec2> {
        let d = self.first_derivative(t);
        DVec2::new(d.y, -d.x).try_normalize()
    }
}

/// Geschlossener interpolierender Spline durch `points` (uniforme Parametrisierung je Segment).
///
/// Liefert `points.len()` Segmente; Segment i läuft von Punkt i zu Punkt i+1,
/// das letzte zurück zum ersten. Position, erste und zweite Ableitung sind an
/// allen Übergängen stetig.
pub fn calc_splines(points: &[DVec2]) -> Result<Vec<SplineSegment>, GeometryError> {
    let n = points.len();
    if n < 3 {
        return Err(GeometryError::TooFewPoints { found: n });
    }

    // M_{i-1} + 4·M_i + M_{i+1} = 6·(P_{i+1} − 2·P_i + P_{i-1})
    let system = CyclicTridiagonal {
        diag: vec![4.0; n],
        upper: vec![1.0; n],
    };
    let mut matrix = ProfileMatrix::cyclic_band(n, 1);
    matrix.add_tridiagonal(&system, 1.0);

    let rhs: Vec<DVec2> = (0..n)
        .map(|i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            6.0 * (next - 2.0 * points[i] + prev)
        })
        .collect();

    let second = matrix.factorize()?.solve_vec2(&rhs);

    let segments = (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            let p0 = points[i];
            let p1 = points[j];
            let m0 = second[i];
            let m1 = second[j];

            let c1 = (p1 - p0) - (2.0 * m0 + m1) / 6.0;
            let c2 = m0 / 2.0;
            let c3 = (m1 - m0) / 6.0;
            SplineSegment {
                x: [p0.x, c1.x, c2.x, c3.x],
                y: [p0.y, c1.y, c2.y, c3.y],
            }
        })
        .collect();

    Ok(segments)
}

/// Einheitsnormalen an den Segment-Anfängen (= Referenzpunkten).
pub fn calc_normals(segments: &[SplineSegment]) -> Result<Vec<DVec2>, GeometryError> {
    segments
        .iter()
        .enumerate()
        .map(|(index, seg)| {
            seg.normal(0.0)
                .ok_or(GeometryError::DegenerateTangent { index })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn circle(radius: f64, count: usize) -> Vec<DVec2> {
        (0..count)
            .map(|i| {
                let phi = std::f64::consts::TAU * i as f64 / count as f64;
                DVec2::new(radius * phi.cos(), radius * phi.sin())
            })
            .collect()
    }

    #[test]
    fn segments_interpolate_and_join_smoothly() {
        let points = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 1.0),
            DVec2::new(12.0, 8.0),
            DVec2::new(3.0, 11.0),
            DVec2::new(-2.0, 5.0),
        ];
        let segments = calc_splines(&points).expect("Spline");
        assert_eq!(segments.len(), points.len());

        for i in 0..segments.len() {
            let next = &segments[(i + 1) % segments.len()];
            assert!(segments[i].position(0.0).distance(points[i]) < 1e-12);
            assert!(segments[i].position(1.0).distance(next.position(0.0)) < 1e-9);
            assert!(
                segments[i]
                    .first_derivative(1.0)
                    .distance(next.first_derivative(0.0))
                    < 1e-9
            );
            assert!(
                segments[i]
                    .second_derivative(1.0)
                    .distance(next.second_derivative(0.0))
                    < 1e-9
            );
        }
    }

    #[test]
    fn straight_segment_length_is_exact() {
        let seg = SplineSegment {
            x: [0.0, 3.0, 0.0, 0.0],
            y: [0.0, 4.0, 0.0, 0.0],
        };
        assert_relative_eq!(seg.length_to(1.0), 5.0, epsilon = 1e-12);
        assert_relative_eq!(seg.length_to(0.5), 2.5, epsilon = 1e-12);
        assert_eq!(seg.length_to(0.0), 0.0);
    }

    #[test]
    fn normals_point_right_of_travel_direction() {
        // Gegen den Uhrzeigersinn → rechts ist außen
        let points = circle(10.0, 16);
        let segments = calc_splines(&points).expect("Spline");
        let normals = calc_normals(&segments).expect("Normalen");

        for (p, n) in points.iter().zip(&normals) {
            assert_relative_eq!(n.length(), 1.0, epsilon = 1e-12);
            let outward = p.normalize();
            assert!(n.dot(outward) > 0.99, "Normale {:?} bei {:?}", n, p);
        }
    }

    #[test]
    fn too_few_points_are_rejected() {
        let result = calc_splines(&[DVec2::ZERO, DVec2::X]);
        assert_eq!(result, Err(GeometryError::TooFewPoints { found: 2 }));
    }
}
