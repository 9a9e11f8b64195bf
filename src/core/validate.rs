//! Prüfung der Trajektorie: Abstand der Fahrzeugecken zu den Rändern und
//! Krümmungsgrenze. Befunde sind Warnungen, die Prüfung bricht nie ab.

use std::fmt;

use glam::DVec2;

use super::heading::TrajectorySample;
use super::spatial::PointIndex;
use super::track::ReferenceTrack;
use crate::shared::options::{VehicleOptions, BOUNDARY_STEPSIZE, SAFETY_MARGIN};
use crate::shared::spline_geometry::resample_closed_by_distance;

/// Nicht-fatale Befunde eines Pipeline-Laufs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidationWarning {
    /// Eine Fahrzeugecke kommt einem Rand näher als der Sicherheitsabstand
    ClearanceBelowMargin { min_distance: f64, margin: f64 },
    /// |κ| überschreitet die Krümmungsgrenze des Fahrzeugs
    CurvatureLimitExceeded { max_abs_curvature: f64, limit: f64 },
    /// Abtastpunkte ohne definierte Krümmung (stationäre Stellen)
    DegenerateCurvature { count: usize },
    /// Normalen-Segmente schneiden sich (Breite > Krümmungsradius)
    NormalsCrossing {
        first_index: usize,
        second_index: usize,
        count: usize,
    },
    /// Strecke an der schmalsten Stelle schmaler als das Fahrzeug
    NarrowTrack { min_width: f64, vehicle_width: f64 },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClearanceBelowMargin {
                min_distance,
                margin,
            } => write!(
                f,
                "Minimaler Abstand zu den Rändern {:.2}m unterschreitet Sicherheitsabstand {:.2}m \
                 (der Abstand kann auch außerhalb der Strecke liegen)",
                min_distance, margin
            ),
            Self::CurvatureLimitExceeded {
                max_abs_curvature,
                limit,
            } => write!(
                f,
                "Krümmungsgrenze überschritten: {:.3}rad/m > {:.3}rad/m",
                max_abs_curvature, limit
            ),
            Self::DegenerateCurvature { count } => {
                write!(f, "{} Abtastpunkte ohne definierte Krümmung", count)
            }
            Self::NormalsCrossing {
                first_index,
                second_index,
                count,
            } => write!(
                f,
                "{} Normalen-Schnitte, erster zwischen Punkt {} und {}; \
                 Eingabe prüfen oder Glättung erhöhen",
                count, first_index, second_index
            ),
            Self::NarrowTrack {
                min_width,
                vehicle_width,
            } => write!(
                f,
                "Minimale Streckenbreite {:.2}m ist kleiner als die Fahrzeugbreite {:.2}m",
                min_width, vehicle_width
            ),
        }
    }
}

/// Ergebnis von `check_traj`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// Rechter Rand `p + n·w_right` (je Referenzpunkt)
    pub bound_right: Vec<DVec2>,
    /// Linker Rand `p − n·w_left` (je Referenzpunkt)
    pub bound_left: Vec<DVec2>,
    /// Kleinster Abstand einer Fahrzeugecke zu einem Rand
    pub min_boundary_distance: f64,
    /// Größte definierte |κ| der Trajektorie
    pub max_abs_curvature: Option<f64>,
    pub warnings: Vec<ValidationWarning>,
}

/// Die vier Ecken des Fahrzeugrechtecks bei Position und Kurswinkel.
pub fn vehicle_corners(position: DVec2, heading: f64, length: f64, width: f64) -> [DVec2; 4] {
    let direction = DVec2::from_angle(heading);
    let forward = direction * (0.5 * length);
    let left = direction.perp() * (0.5 * width);
    [
        position + forward + left,
        position + forward - left,
        position - forward + left,
        position - forward - left,
    ]
}

/// Prüft die Trajektorie gegen Ränder und Krümmungsgrenze.
///
/// Die Ränder werden linear auf `BOUNDARY_STEPSIZE` verdichtet und für die
/// Abstandssuche indexiert. Zurückgegeben werden immer beide Ränder.
pub fn check_traj(
    reference: &ReferenceTrack,
    normals: &[DVec2],
    vehicle: &VehicleOptions,
    trajectory: &[TrajectorySample],
) -> ValidationReport {
    let bound_right = reference.right_boundary(normals);
    let bound_left = reference.left_boundary(normals);

    let right_index = PointIndex::from_points(&resample_closed_by_distance(
        &bound_right,
        BOUNDARY_STEPSIZE,
    ));
    let left_index = PointIndex::from_points(&resample_closed_by_distance(
        &bound_left,
        BOUNDARY_STEPSIZE,
    ));

    let min_boundary_distance = trajectory
        .iter()
        .flat_map(|sample| {
            vehicle_corners(sample.position, sample.heading, vehicle.length, vehicle.width)
        })
        .map(|corner| {
            right_index
                .min_distance(corner)
                .min(left_index.min_distance(corner))
        })
        .fold(f64::INFINITY, f64::min);

    let max_abs_curvature = trajectory
        .iter()
        .filter_map(|sample| sample.curvature)
        .map(f64::abs)
        .reduce(f64::max);
    let degenerate = trajectory.iter().filter(|s| s.curvature.is_none()).count();

    let mut warnings = Vec::new();
    if min_boundary_distance < SAFETY_MARGIN {
        warnings.push(ValidationWarning::ClearanceBelowMargin {
            min_distance: min_boundary_distance,
            margin: SAFETY_MARGIN,
        });
    } else {
        log::info!(
            "Minimaler Abstand zu den Rändern: {:.2}m (kann auch außerhalb der Strecke liegen)",
            min_boundary_distance
        );
    }
    if let Some(max_curv) = max_abs_curvature {
        if max_curv > vehicle.curvlim {
            warnings.push(ValidationWarning::CurvatureLimitExceeded {
                max_abs_curvature: max_curv,
                limit: vehicle.curvlim,
            });
        }
    }
    if degenerate > 0 {
        warnings.push(ValidationWarning::DegenerateCurvature { count: degenerate });
    }

    for warning in &warnings {
        log::warn!("{}", warning);
    }

    ValidationReport {
        bound_right,
        bound_left,
        min_boundary_distance,
        max_abs_curvature,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::track::TrackPoint;
    use std::f64::consts::FRAC_PI_2;

    /// Gerade Strecke als langes Rechteck (geschlossen über die Rückseite).
    fn corridor(width: f64) -> (ReferenceTrack, Vec<DVec2>) {
        let mut points = Vec::new();
        let mut normals = Vec::new();
        for i in 0..=100 {
            points.push(TrackPoint::new(i as f64, 0.0, width, width));
            normals.push(DVec2::new(0.0, -1.0));
        }
        (ReferenceTrack::new(points), normals)
    }

    fn sample(x: f64, curvature: Option<f64>) -> TrajectorySample {
        TrajectorySample {
            s: x,
            position: DVec2::new(x, 0.0),
            heading: 0.0,
            curvature,
        }
    }

    fn vehicle(width: f64, length: f64, curvlim: f64) -> VehicleOptions {
        VehicleOptions {
            width,
            length,
            curvlim,
        }
    }

    #[test]
    fn corners_are_offset_along_heading() {
        let corners = vehicle_corners(DVec2::ZERO, FRAC_PI_2, 4.0, 2.0);
        // Fahrtrichtung +y: vorne bei y = 2, links bei x = −1
        assert!(corners[0].distance(DVec2::new(-1.0, 2.0)) < 1e-12);
        assert!(corners[3].distance(DVec2::new(1.0, -2.0)) < 1e-12);
    }

    #[test]
    fn wide_corridor_has_no_warnings() {
        let (reference, normals) = corridor(5.0);
        let trajectory: Vec<_> = (10..90).map(|x| sample(x as f64, Some(0.0))).collect();

        let report = check_traj(&reference, &normals, &vehicle(2.0, 4.0, 0.1), &trajectory);

        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        // Ecke bei y = ±1, Rand bei y = ±5
        assert!((report.min_boundary_distance - 4.0).abs() < 1e-9);
        assert_eq!(report.bound_right.len(), reference.len());
        assert_eq!(report.bound_left.len(), reference.len());
    }

    #[test]
    fn narrow_corridor_warns_about_clearance() {
        let (reference, normals) = corridor(1.5);
        let trajectory: Vec<_> = (10..90).map(|x| sample(x as f64, Some(0.0))).collect();

        let report = check_traj(&reference, &normals, &vehicle(2.0, 4.0, 0.1), &trajectory);

        match report.warnings.as_slice() {
            [ValidationWarning::ClearanceBelowMargin {
                min_distance,
                margin,
            }] => {
                assert!((min_distance - 0.5).abs() < 1e-9);
                assert_eq!(*margin, SAFETY_MARGIN);
            }
            other => panic!("unerwartete Warnungen: {:?}", other),
        }
    }

    #[test]
    fn curvature_limit_and_degenerate_samples_are_reported() {
        let (reference, normals) = corridor(5.0);
        let trajectory = vec![
            sample(20.0, Some(0.05)),
            sample(21.0, Some(-0.3)),
            sample(22.0, None),
        ];

        let report = check_traj(&reference, &normals, &vehicle(2.0, 4.0, 0.1), &trajectory);

        assert_eq!(report.max_abs_curvature, Some(0.3));
        assert!(report.warnings.contains(&ValidationWarning::CurvatureLimitExceeded {
            max_abs_curvature: 0.3,
            limit: 0.1,
        }));
        assert!(report
            .warnings
            .contains(&ValidationWarning::DegenerateCurvature { count: 1 }));
    }
}
