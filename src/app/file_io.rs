//! Use-Case-Funktionen für Dateiaktionen.
//! Alle Dateisystem-Operationen (I/O) sind hier zentralisiert.

use std::path::{Path, PathBuf};

use glam::DVec2;

use super::pipeline::PipelineOutput;
use crate::core::{ReferenceTrack, SplineSegment, TrackPoint};
use crate::csv::{
    parse_raw_track, parse_reference_table, parse_spline_table, write_spline_table,
    write_trajectory_table,
};
use crate::error::TrackError;

/// Zieldateien eines Exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    /// Referenzlinie mit Breiten und Normalen
    pub trajectory: PathBuf,
    /// Spline-Längen und -Koeffizienten
    pub splines: PathBuf,
}

impl ExportPaths {
    /// `<dir>/<map>_centerline.csv` und `<dir>/<map>_splines.csv`.
    pub fn for_map(dir: &Path, map_name: &str) -> Self {
        Self {
            trajectory: dir.join(format!("{map_name}_centerline.csv")),
            splines: dir.join(format!("{map_name}_splines.csv")),
        }
    }
}

/// Wieder eingelesene Export-Tabellen.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedTrack {
    pub reference: ReferenceTrack,
    pub normals: Vec<DVec2>,
    pub lengths: Vec<f64>,
    pub segments: Vec<SplineSegment>,
}

fn read(path: &Path) -> Result<String, TrackError> {
    std::fs::read_to_string(path).map_err(|source| TrackError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, content: &str) -> Result<(), TrackError> {
    std::fs::write(path, content).map_err(|source| TrackError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn rename(from: &Path, to: &Path) -> Result<(), TrackError> {
    std::fs::rename(from, to).map_err(|source| TrackError::Io {
        path: to.to_path_buf(),
        source,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Lädt Rohdaten einer Strecke.
pub fn load_raw_track(path: &Path) -> Result<Vec<TrackPoint>, TrackError> {
    let content = read(path)?;
    let points = parse_raw_track(&content)?;
    log::info!("Strecke geladen: {} Rohpunkte aus {}", points.len(), path.display());
    Ok(points)
}

/// Exportiert Trajektorien- und Spline-Tabelle.
///
/// Beide Inhalte werden vollständig erzeugt und in temporäre Dateien
/// geschrieben; erst danach werden sie umbenannt. Schlägt ein Schreibvorgang
/// fehl, bleiben vorhandene Zieldateien unverändert.
pub fn export_results(output: &PipelineOutput, paths: &ExportPaths) -> Result<(), TrackError> {
    let trajectory = write_trajectory_table(&output.prepared.reference, &output.prepared.normals);
    let splines = write_spline_table(&output.spline_lengths, &output.prepared.segments);

    for target in [&paths.trajectory, &paths.splines] {
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| TrackError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let tmp_trajectory = temp_path(&paths.trajectory);
    let tmp_splines = temp_path(&paths.splines);

    let written = write(&tmp_trajectory, &trajectory).and_then(|_| write(&tmp_splines, &splines));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp_trajectory);
        let _ = std::fs::remove_file(&tmp_splines);
        return Err(e);
    }

    rename(&tmp_trajectory, &paths.trajectory)?;
    rename(&tmp_splines, &paths.splines)?;

    log::info!(
        "Export abgeschlossen: {} und {}",
        paths.trajectory.display(),
        paths.splines.display()
    );
    Ok(())
}

/// Liest beide Export-Tabellen wieder ein.
pub fn load_exported(paths: &ExportPaths) -> Result<ExportedTrack, TrackError> {
    let (reference, normals) = parse_reference_table(&read(&paths.trajectory)?)?;
    let (lengths, segments) = parse_spline_table(&read(&paths.splines)?)?;
    Ok(ExportedTrack {
        reference,
        normals,
        lengths,
        segments,
    })
}
