//! Periodischer kubischer Glättungsspline (Reinsch-Formulierung).
//!
//! Minimiert `Σ |P_i − f(τ_i)|² + λ·∫ |f''(τ)|² dτ` über alle geschlossenen
//! kubischen Splines mit Knoten an den Sehnenlängen-Parametern τ_i.
//! Mit den zyklisch-tridiagonalen Matrizen R (Krümmungsenergie) und Q
//! (zweite Differenzen) gilt für die zweiten Ableitungen γ und Knotenwerte g:
//!
//! ```text
//! (R + λ·Q·Q)·γ = Q·P,    g = P − λ·Q·γ
//! ```
//!
//! λ = 0 ergibt den exakt interpolierenden periodischen Spline.

use glam::DVec2;

use super::banded::{CyclicTridiagonal, ProfileMatrix};
use crate::error::GeometryError;

/// Geglätteter geschlossener Spline über dem Sehnenlängen-Parameter.
#[derive(Debug, Clone)]
pub struct SmoothingSpline {
    /// Knoten-Parameter τ_i, beginnend bei 0
    knots: Vec<f64>,
    /// Periodenlänge (Summe aller Sehnen inkl. Schlusssehne)
    period: f64,
    /// Geglättete Knotenwerte g_i
    values: Vec<DVec2>,
    /// Zweite Ableitungen γ_i nach τ
    second: Vec<DVec2>,
}

impl SmoothingSpline {
    /// Fittet den Glättungsspline durch die geschlossene Punktfolge.
    ///
    /// Aufeinanderfolgende Punkte (inkl. letzter → erster) müssen verschieden sein.
    pub fn fit(points: &[DVec2], lambda: f64) -> Result<Self, GeometryError> {
        let n = points.len();
        if n < 4 {
            return Err(GeometryError::TooFewPoints { found: n });
        }

        let h: Vec<f64> = (0..n)
            .map(|i| points[i].distance(points[(i + 1) % n]))
            .collect();
        if let Some(row) = h.iter().position(|&hi| hi <= 0.0 || !hi.is_finite()) {
            return Err(GeometryError::SingularSystem { row });
        }

        let prev = |i: usize| (i + n - 1) % n;

        // R: Krümmungsenergie zwischen den Knoten
        let r = CyclicTridiagonal {
            diag: (0..n).map(|i| (h[prev(i)] + h[i]) / 3.0).collect(),
            upper: h.iter().map(|hi| hi / 6.0).collect(),
        };
        // Q: zweite dividierte Differenzen (symmetrisch)
        let q = CyclicTridiagonal {
            diag: (0..n).map(|i| -(1.0 / h[prev(i)] + 1.0 / h[i])).collect(),
            upper: h.iter().map(|hi| 1.0 / hi).collect(),
        };

        let mut matrix = ProfileMatrix::cyclic_band(n, 2);
        matrix.add_tridiagonal(&r, 1.0);
        if lambda > 0.0 {
            matrix.add_tridiagonal_square(&q, lambda);
        }

        let rhs = q.mul_vec2(points);
        let second = matrix.factorize()?.solve_vec2(&rhs);

        let values = if lambda > 0.0 {
            let correction = q.mul_vec2(&second);
            points
                .iter()
                .zip(&correction)
                .map(|(p, c)| *p - *c * lambda)
                .collect()
        } else {
            points.to_vec()
        };

        let mut knots = Vec::with_capacity(n);
        let mut acc = 0.0;
        for hi in &h {
            knots.push(acc);
            acc += hi;
        }

        log::debug!(
            "Glättungsspline: {} Knoten, Periode {:.2}, λ = {}",
            n,
            acc,
            lambda
        );

        Ok(Self {
            knots,
            period: acc,
            values,
            second,
        })
    }

    /// Periodenlänge im Sehnenlängen-Parameter.
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Geglättete Knotenwerte.
    pub fn values(&self) -> &[DVec2] {
        &self.values
    }

    /// Wertet den Spline bei τ aus (τ wird periodisch auf [0, Periode) gefaltet).
    pub fn evaluate(&self, tau: f64) -> DVec2 {
        let n = self.knots.len();
        let tau = tau.rem_euclid(self.period);
        let i = self
            .knots
            .partition_point(|&k| k <= tau)
            .saturating_sub(1)
            .min(n - 1);
        let j = (i + 1) % n;

        let start = self.knots[i];
        let end = if j == 0 { self.period } else { self.knots[j] };
        let h = end - start;

        let a = (end - tau) / h;
        let b = 1.0 - a;
        self.values[i] * a
            + self.values[j] * b
            + (self.second[i] * (a * a * a - a) + self.second[j] * (b * b * b - b)) * (h * h / 6.0)
    }

    /// Tastet den Spline an `count` gleichabständigen Parameterwerten ab.
    pub fn sample_uniform(&self, count: usize) -> Vec<DVec2> {
        (0..count)
            .map(|k| self.evaluate(self.period * k as f64 / count as f64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn noisy_circle(radius: f64, count: usize, noise: f64) -> Vec<DVec2> {
        (0..count)
            .map(|i| {
                let phi = TAU * i as f64 / count as f64;
                // deterministisches "Rauschen" mit wechselndem Vorzeichen
                let r = radius + if i % 2 == 0 { noise } else { -noise };
                DVec2::new(r * phi.cos(), r * phi.sin())
            })
            .collect()
    }

    #[test]
    fn zero_lambda_interpolates() {
        let points = noisy_circle(20.0, 24, 0.3);
        let spline = SmoothingSpline::fit(&points, 0.0).expect("Fit");

        for (i, p) in points.iter().enumerate() {
            let tau = spline.knots[i];
            assert!(spline.evaluate(tau).distance(*p) < 1e-9);
        }
    }

    #[test]
    fn positive_lambda_reduces_alternating_noise() {
        let points = noisy_circle(20.0, 120, 0.3);
        let spline = SmoothingSpline::fit(&points, 10.0).expect("Fit");

        let max_dev = spline
            .values()
            .iter()
            .map(|v| (v.length() - 20.0).abs())
            .fold(0.0f64, f64::max);
        assert!(max_dev < 0.1, "maximale Radiusabweichung {}", max_dev);
    }

    #[test]
    fn evaluate_wraps_around_period() {
        let points = noisy_circle(10.0, 12, 0.0);
        let spline = SmoothingSpline::fit(&points, 1.0).expect("Fit");

        let a = spline.evaluate(0.25);
        let b = spline.evaluate(0.25 + spline.period());
        assert!(a.distance(b) < 1e-12);
        assert!(spline.evaluate(spline.period() - 1e-9).distance(spline.evaluate(0.0)) < 1e-6);
    }

    #[test]
    fn duplicate_points_make_system_singular() {
        let points = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(0.0, 0.0),
            DVec2::new(5.0, 0.0),
            DVec2::new(5.0, 5.0),
        ];
        assert!(matches!(
            SmoothingSpline::fit(&points, 1.0),
            Err(GeometryError::SingularSystem { row: 0 })
        ));
    }
}
