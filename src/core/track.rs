//! Streckenpunkte und Referenzlinie.

use glam::DVec2;

/// Punkt der Mittellinie mit fahrbarer Breite rechts und links (Meter).
///
/// Dient sowohl für die Rohdaten als auch für die geglättete Referenzlinie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    /// Position der Mittellinie
    pub position: DVec2,
    /// Breite bis zum rechten Rand
    pub width_right: f64,
    /// Breite bis zum linken Rand
    pub width_left: f64,
}

impl TrackPoint {
    /// Erstellt einen neuen Streckenpunkt.
    pub fn new(x: f64, y: f64, width_right: f64, width_left: f64) -> Self {
        Self {
            position: DVec2::new(x, y),
            width_right,
            width_left,
        }
    }

    /// Gesamtbreite der Strecke an diesem Punkt.
    pub fn total_width(&self) -> f64 {
        self.width_right + self.width_left
    }

    /// Lineare Interpolation von Position und Breiten.
    pub fn lerp(&self, other: &TrackPoint, t: f64) -> TrackPoint {
        TrackPoint {
            position: self.position.lerp(other.position, t),
            width_right: self.width_right + (other.width_right - self.width_right) * t,
            width_left: self.width_left + (other.width_left - self.width_left) * t,
        }
    }

    /// `true` wenn Position und Breiten endlich sind.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.width_right.is_finite() && self.width_left.is_finite()
    }
}

/// Geglättete, geschlossene Referenzlinie.
///
/// Der Schlusspunkt wird nicht wiederholt: das letzte Segment führt vom letzten
/// zurück zum ersten Punkt. Aufeinanderfolgende Punkte fallen nie zusammen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceTrack {
    pub points: Vec<TrackPoint>,
}

impl ReferenceTrack {
    pub fn new(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Positionen aller Referenzpunkte.
    pub fn positions(&self) -> Vec<DVec2> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Rechter Rand `p + n·w_right` zu den gegebenen Normalen.
    pub fn right_boundary(&self, normals: &[DVec2]) -> Vec<DVec2> {
        self.points
            .iter()
            .zip(normals)
            .map(|(p, n)| p.position + *n * p.width_right)
            .collect()
    }

    /// Linker Rand `p − n·w_left` zu den gegebenen Normalen.
    pub fn left_boundary(&self, normals: &[DVec2]) -> Vec<DVec2> {
        self.points
            .iter()
            .zip(normals)
            .map(|(p, n)| p.position - *n * p.width_left)
            .collect()
    }
}
