//! Streckenvorbereitung: Rohdaten bereinigen, glätten und als geschlossenen
//! kubischen Spline mit Normalen und Breiten aufbereiten.
//!
//! Ablauf von `prepare_track`:
//! 1. Duplikate entfernen (inkl. Schlusspunkt = Startpunkt)
//! 2. optional linear auf gleichmäßigen Abstand vor-interpolieren
//! 3. periodischen Glättungsspline fitten (λ aus der Konfiguration)
//! 4. Glättungsspline gleichmäßig abtasten → Referenzpunkte
//! 5. interpolierenden Spline durch die Referenzpunkte legen → Segmente, Normalen
//! 6. Breiten über den nächsten Rohpunkt zuordnen, ggf. Mindestbreite erzwingen

use glam::DVec2;

use super::smoothing::SmoothingSpline;
use super::spatial::PointIndex;
use super::spline::{calc_normals, calc_splines, SplineSegment};
use super::track::{ReferenceTrack, TrackPoint};
use super::validate::ValidationWarning;
use crate::error::GeometryError;
use crate::shared::options::{ImportOptions, PipelineOptions};
use crate::shared::spline_geometry::{
    closed_polyline_length, closed_stations_by_distance, sample_count,
};

/// Punkte mit geringerem Abstand gelten als identisch.
pub const DUPLICATE_EPSILON: f64 = 1e-6;
/// Mindestanzahl unterschiedlicher Punkte für einen geschlossenen Spline-Fit.
pub const MIN_DISTINCT_POINTS: usize = 4;
/// Überabtastung bei der Längenschätzung des Glättungssplines.
const LENGTH_OVERSAMPLING: usize = 4;

/// Ergebnis der Streckenvorbereitung.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTrack {
    /// Geglättete Referenzlinie mit Breiten
    pub reference: ReferenceTrack,
    /// Rechtsseitige Einheitsnormalen je Referenzpunkt
    pub normals: Vec<DVec2>,
    /// Spline-Segmente; Segment i beginnt an Referenzpunkt i
    pub segments: Vec<SplineSegment>,
}

/// Wendet Import-Optionen an: Fahrtrichtung umkehren, neuen Startpunkt setzen.
///
/// Koordinaten bleiben unverändert, nur Reihenfolge und Seitenzuordnung der Breiten.
pub fn apply_import_options(raw: &[TrackPoint], import: &ImportOptions) -> Vec<TrackPoint> {
    let mut points = raw.to_vec();

    if import.flip {
        points.reverse();
        for p in &mut points {
            std::mem::swap(&mut p.width_right, &mut p.width_left);
        }
    }

    if let Some([x, y]) = import.new_start {
        let target = DVec2::new(x, y);
        let start = points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.position
                    .distance_squared(target)
                    .total_cmp(&b.position.distance_squared(target))
            })
            .map(|(i, _)| i);
        if let Some(start) = start {
            points.rotate_left(start);
        }
    }

    points
}

/// Entfernt aufeinanderfolgende Punkte mit Abstand < `epsilon`.
///
/// Der Linienzug ist geschlossen: liegt der letzte Punkt auf dem ersten, wird er entfernt.
pub fn remove_duplicates(points: &[TrackPoint], epsilon: f64) -> Vec<TrackPoint> {
    let mut result: Vec<TrackPoint> = Vec::with_capacity(points.len());
    for p in points {
        match result.last() {
            Some(last) if last.position.distance(p.position) < epsilon => {}
            _ => result.push(*p),
        }
    }
    while result.len() > 1
        && result[result.len() - 1].position.distance(result[0].position) < epsilon
    {
        result.pop();
    }
    result
}

/// Interpoliert die geschlossene Strecke linear (Positionen und Breiten) auf `stepsize`.
pub fn resample_closed_track(points: &[TrackPoint], stepsize: f64) -> Vec<TrackPoint> {
    let n = points.len();
    let positions: Vec<DVec2> = points.iter().map(|p| p.position).collect();
    closed_stations_by_distance(&positions, stepsize)
        .into_iter()
        .map(|st| points[st.index].lerp(&points[(st.index + 1) % n], st.fraction))
        .collect()
}

/// Bereitet die Rohstrecke zu Referenzlinie, Normalen und Spline-Segmenten auf.
pub fn prepare_track(
    raw: &[TrackPoint],
    options: &PipelineOptions,
) -> Result<PreparedTrack, GeometryError> {
    if let Some(index) = raw.iter().position(|p| !p.is_finite()) {
        return Err(GeometryError::NonFinite { index });
    }

    let cleaned = remove_duplicates(raw, DUPLICATE_EPSILON);
    if cleaned.len() < MIN_DISTINCT_POINTS {
        return Err(GeometryError::TooFewPoints {
            found: cleaned.len(),
        });
    }
    if cleaned.len() < raw.len() {
        log::debug!(
            "{} doppelte Streckenpunkte entfernt",
            raw.len() - cleaned.len()
        );
    }

    // Vor-Interpolation verbessert die Kondition des Fits
    let prefit = match options.stepsize.prep {
        Some(step) => {
            let positions: Vec<DVec2> = cleaned.iter().map(|p| p.position).collect();
            sample_count((closed_polyline_length(&positions) / step).ceil())?;
            remove_duplicates(&resample_closed_track(&cleaned, step), DUPLICATE_EPSILON)
        }
        None => cleaned,
    };
    if prefit.len() < MIN_DISTINCT_POINTS {
        return Err(GeometryError::TooFewPoints {
            found: prefit.len(),
        });
    }
    let prefit_positions: Vec<DVec2> = prefit.iter().map(|p| p.position).collect();

    let smoothing = SmoothingSpline::fit(&prefit_positions, options.regularization.lambda)?;

    let count = match options.regularization.knot_count {
        Some(count) => sample_count(count as f64)?,
        None => {
            let dense = smoothing.sample_uniform(prefit.len() * LENGTH_OVERSAMPLING);
            let length = closed_polyline_length(&dense);
            sample_count((length / options.stepsize.reg).round())?.max(MIN_DISTINCT_POINTS)
        }
    };

    let mut ref_positions = smoothing.sample_uniform(count);
    ref_positions.dedup_by(|b, a| a.distance(*b) < DUPLICATE_EPSILON);
    while ref_positions.len() > 1
        && ref_positions[ref_positions.len() - 1].distance(ref_positions[0]) < DUPLICATE_EPSILON
    {
        ref_positions.pop();
    }
    if ref_positions.len() < MIN_DISTINCT_POINTS {
        return Err(GeometryError::TooFewPoints {
            found: ref_positions.len(),
        });
    }

    let segments = calc_splines(&ref_positions)?;
    let normals = calc_normals(&segments)?;

    let points = recover_widths(&ref_positions, &normals, &prefit, options.import.min_track_width);

    log::info!(
        "Strecke vorbereitet: {} Rohpunkte → {} Stützpunkte → {} Referenzpunkte (λ = {})",
        raw.len(),
        prefit.len(),
        points.len(),
        options.regularization.lambda
    );

    Ok(PreparedTrack {
        reference: ReferenceTrack::new(points),
        normals,
        segments,
    })
}

/// Ordnet jedem Referenzpunkt die Breiten des nächsten Stützpunkts zu.
///
/// Der seitliche Versatz zwischen beiden Punkten (entlang der neuen Normale)
/// wird verrechnet, damit die Ränder an ihrer ursprünglichen Stelle bleiben.
fn recover_widths(
    positions: &[DVec2],
    normals: &[DVec2],
    prefit: &[TrackPoint],
    min_width: Option<f64>,
) -> Vec<TrackPoint> {
    let prefit_positions: Vec<DVec2> = prefit.iter().map(|p| p.position).collect();
    let index = PointIndex::from_points(&prefit_positions);

    positions
        .iter()
        .zip(normals)
        .map(|(&position, &normal)| {
            let (mut width_right, mut width_left) = match index.nearest(position) {
                Some(m) => {
                    let source = &prefit[m.index];
                    let shift = (source.position - position).dot(normal);
                    (
                        (source.width_right + shift).max(0.0),
                        (source.width_left - shift).max(0.0),
                    )
                }
                None => (0.0, 0.0),
            };
            if let Some(min) = min_width {
                width_right = width_right.max(min);
                width_left = width_left.max(min);
            }
            TrackPoint {
                position,
                width_right,
                width_left,
            }
        })
        .collect()
}

/// Warnt, wenn die schmalste Stelle der Strecke schmaler als das Fahrzeug ist.
pub fn check_track_width(points: &[TrackPoint], vehicle_width: f64) -> Option<ValidationWarning> {
    let min_width = points
        .iter()
        .map(TrackPoint::total_width)
        .fold(f64::INFINITY, f64::min);

    (min_width < vehicle_width).then_some(ValidationWarning::NarrowTrack {
        min_width,
        vehicle_width,
    })
}

/// Prüft, ob sich Normalen-Segmente (linker bis rechter Rand) innerhalb von
/// `horizon` Nachbarn schneiden. Schnitte entstehen, wenn die Breite auf der
/// Kurveninnenseite den Krümmungsradius übersteigt.
pub fn check_normal_crossings(
    prepared: &PreparedTrack,
    horizon: usize,
) -> Option<ValidationWarning> {
    let right = prepared.reference.right_boundary(&prepared.normals);
    let left = prepared.reference.left_boundary(&prepared.normals);
    let n = right.len();
    let horizon = horizon.min(n.saturating_sub(1) / 2);

    let mut first: Option<(usize, usize)> = None;
    let mut count = 0usize;
    for i in 0..n {
        for d in 1..=horizon {
            let j = (i + d) % n;
            if segments_intersect(left[i], right[i], left[j], right[j]) {
                count += 1;
                first.get_or_insert((i, j));
            }
        }
    }

    first.map(|(first_index, second_index)| ValidationWarning::NormalsCrossing {
        first_index,
        second_index,
        count,
    })
}

/// Echter Schnitt zweier Strecken (Berührung an Endpunkten zählt nicht).
fn segments_intersect(a0: DVec2, a1: DVec2, b0: DVec2, b1: DVec2) -> bool {
    let da = a1 - a0;
    let db = b1 - b0;
    let o1 = da.perp_dot(b0 - a0);
    let o2 = da.perp_dot(b1 - a0);
    let o3 = db.perp_dot(a0 - b0);
    let o4 = db.perp_dot(a1 - b0);
    o1 * o2 < 0.0 && o3 * o4 < 0.0
}
