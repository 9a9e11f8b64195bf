//! Anwendungsschicht: Pipeline-Komposition und Datei-Use-Cases.

pub mod file_io;
pub mod pipeline;

pub use file_io::{export_results, load_exported, load_raw_track, ExportPaths, ExportedTrack};
pub use pipeline::{compute_trajectory, run_pipeline, validate_exported, PipelineOutput};
