//! Komposition der Pipeline-Stufen.
//!
//! Jede Stufe erhält unveränderliche Eingaben und liefert neue Daten; der Lauf
//! ist deterministisch und frei von Datei-I/O.

use std::time::Instant;

use glam::DVec2;

use crate::core::{
    apply_import_options, build_trajectory, calc_spline_lengths, check_normal_crossings,
    check_track_width, check_traj, interp_splines, prepare_track, PreparedTrack, ReferenceTrack,
    SplineSegment, TrackPoint, TrajectorySample, ValidationReport, ValidationWarning,
};
use crate::error::{GeometryError, TrackError};
use crate::shared::options::{PipelineOptions, NORMALS_CROSSING_HORIZON};

/// Ergebnis eines vollständigen Laufs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Referenzlinie, Normalen und Spline-Segmente
    pub prepared: PreparedTrack,
    /// Länge je Spline-Segment
    pub spline_lengths: Vec<f64>,
    /// Gleichabständige Trajektorie (ohne Schlusspunkt)
    pub trajectory: Vec<TrajectorySample>,
    /// Ränder und Prüfergebnis
    pub validation: ValidationReport,
    /// Alle Warnungen des Laufs (Import, Vorbereitung, Validierung)
    pub warnings: Vec<ValidationWarning>,
}

impl PipelineOutput {
    /// Gesamtlänge der geschlossenen Referenzlinie.
    pub fn total_length(&self) -> f64 {
        self.spline_lengths.iter().sum()
    }
}

/// Segmentlängen und Trajektorie aus Spline-Segmenten.
pub fn compute_trajectory(
    segments: &[SplineSegment],
    stepsize: f64,
) -> Result<(Vec<f64>, Vec<TrajectorySample>), TrackError> {
    let lengths = calc_spline_lengths(segments);
    let trajectory = trajectory_from_lengths(&lengths, segments, stepsize)?;
    Ok((lengths, trajectory))
}

fn trajectory_from_lengths(
    lengths: &[f64],
    segments: &[SplineSegment],
    stepsize: f64,
) -> Result<Vec<TrajectorySample>, TrackError> {
    let path = interp_splines(lengths, segments, stepsize, false)?;
    Ok(build_trajectory(&path, segments))
}

/// Führt alle Stufen von den Rohdaten bis zur Validierung aus.
pub fn run_pipeline(
    raw: &[TrackPoint],
    options: &PipelineOptions,
) -> Result<PipelineOutput, TrackError> {
    options.validate()?;
    let t_start = Instant::now();

    let imported = apply_import_options(raw, &options.import);

    let mut warnings = Vec::new();
    if let Some(warning) = check_track_width(&imported, options.vehicle.width) {
        log::warn!("{}", warning);
        warnings.push(warning);
    }

    let prepared = prepare_track(&imported, options)?;
    if let Some(warning) = check_normal_crossings(&prepared, NORMALS_CROSSING_HORIZON) {
        log::warn!("{}", warning);
        warnings.push(warning);
    }

    let (spline_lengths, trajectory) =
        compute_trajectory(&prepared.segments, options.stepsize.interp_after_opt)?;

    log::info!(
        "Laufzeit vom Import bis zur Trajektorie: {:.2}s ({} Punkte, Länge {:.2}m)",
        t_start.elapsed().as_secs_f64(),
        trajectory.len(),
        spline_lengths.iter().sum::<f64>()
    );

    let validation = check_traj(
        &prepared.reference,
        &prepared.normals,
        &options.vehicle,
        &trajectory,
    );
    warnings.extend(validation.warnings.iter().copied());

    Ok(PipelineOutput {
        prepared,
        spline_lengths,
        trajectory,
        validation,
        warnings,
    })
}

/// Prüft bereits exportierte Tabellen erneut (gleiche Fahrzeugparameter → gleiche Warnungen).
pub fn validate_exported(
    reference: &ReferenceTrack,
    normals: &[DVec2],
    lengths: &[f64],
    segments: &[SplineSegment],
    options: &PipelineOptions,
) -> Result<ValidationReport, TrackError> {
    options.validate()?;
    if reference.len() != normals.len() {
        return Err(GeometryError::EmptySpline(format!(
            "{} Referenzpunkte zu {} Normalen",
            reference.len(),
            normals.len()
        ))
        .into());
    }

    let trajectory = trajectory_from_lengths(lengths, segments, options.stepsize.interp_after_opt)?;
    Ok(check_traj(reference, normals, &options.vehicle, &trajectory))
}
