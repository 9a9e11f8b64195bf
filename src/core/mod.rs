//! Numerischer Kern: Streckenvorbereitung, Spline-Geometrie, Abtastung,
//! Kurs/Krümmung und Validierung. Frei von Datei-I/O.

pub mod arc_length;
pub mod banded;
pub mod heading;
pub mod prep;
pub mod resample;
pub mod smoothing;
pub mod spatial;
pub mod spline;
pub mod track;
pub mod validate;

pub use arc_length::{calc_spline_lengths, cumulative_lengths};
pub use heading::{build_trajectory, calc_head_curv, HeadingCurvature, TrajectorySample};
pub use prep::{
    apply_import_options, check_normal_crossings, check_track_width, prepare_track, PreparedTrack,
};
pub use resample::{interp_splines, ResampledPath};
pub use smoothing::SmoothingSpline;
pub use spatial::{PointIndex, PointMatch};
pub use spline::{calc_normals, calc_splines, SplineSegment};
pub use track::{ReferenceTrack, TrackPoint};
pub use validate::{check_traj, vehicle_corners, ValidationReport, ValidationWarning};
