//! Geteilte Konfiguration und layer-neutrale Geometrie-Helfer.

pub mod options;
pub mod spline_geometry;

pub use options::{
    ImportOptions, PipelineOptions, RegularizationOptions, StepsizeOptions, VehicleOptions,
};
