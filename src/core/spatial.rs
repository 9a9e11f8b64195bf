//! Spatial-Index (KD-Tree) für Nearest-Point-Abfragen auf Punktfolgen.

use glam::DVec2;
use kiddo::{ImmutableKdTree, SquaredEuclidean};

/// Ergebnis einer Distanzabfrage gegen den Spatial-Index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMatch {
    /// Index des gefundenen Punkts in der ursprünglichen Folge
    pub index: usize,
    /// Euklidische Distanz zum Suchpunkt
    pub distance: f64,
}

/// Read-only Spatial-Index über einer Punktfolge (Ränder, Rohdaten).
///
/// Unveränderlicher Baum: achsparallele Geraden liefern viele identische
/// Koordinaten, die Buckets des veränderlichen `KdTree` überlaufen lassen.
pub struct PointIndex {
    /// `None` bei leerer Punktfolge
    tree: Option<ImmutableKdTree<f64, 2>>,
    len: usize,
}

impl PointIndex {
    /// Baut einen neuen Index; die Item-Nummern entsprechen den Indizes in `points`.
    pub fn from_points(points: &[DVec2]) -> Self {
        let entries: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        let tree = (!entries.is_empty()).then(|| ImmutableKdTree::new_from_slice(&entries));

        Self {
            tree,
            len: points.len(),
        }
    }

    /// Gibt die Anzahl indexierter Punkte zurück.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Gibt `true` zurück, wenn keine Punkte im Index liegen.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Findet den nächsten Punkt zur gegebenen Position.
    pub fn nearest(&self, query: DVec2) -> Option<PointMatch> {
        let tree = self.tree.as_ref()?;
        let result = tree.nearest_one::<SquaredEuclidean>(&[query.x, query.y]);

        Some(PointMatch {
            index: result.item as usize,
            distance: result.distance.sqrt(),
        })
    }

    /// Kleinster Abstand von `query` zu irgendeinem Punkt; `f64::INFINITY` bei leerem Index.
    pub fn min_distance(&self, query: DVec2) -> f64 {
        self.nearest(query).map_or(f64::INFINITY, |m| m.distance)
    }
}
