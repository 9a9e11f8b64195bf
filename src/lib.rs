//! Centerline Generator Library.
//! Glättet geschlossene Strecken-Mittellinien und erzeugt daraus eine
//! gleichmäßig abgetastete Referenz-Trajektorie mit Spline-Koeffizienten.

pub mod app;
pub mod core;
pub mod csv;
pub mod error;
pub mod shared;

pub use app::{
    compute_trajectory, export_results, load_exported, load_raw_track, run_pipeline,
    validate_exported, ExportPaths, ExportedTrack, PipelineOutput,
};
pub use crate::core::{
    PreparedTrack, ReferenceTrack, SplineSegment, TrackPoint, TrajectorySample, ValidationReport,
    ValidationWarning,
};
pub use csv::{parse_raw_track, write_spline_table, write_trajectory_table};
pub use error::{ConfigError, GeometryError, TrackError};
pub use shared::PipelineOptions;
