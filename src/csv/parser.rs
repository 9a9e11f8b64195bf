//! Parser für Streckentabellen (Rohdaten und exportierte Tabellen).
//!
//! Trennzeichen ist `;` oder `,` (je Zeile erkannt). Eine Kopfzeile ist
//! optional und darf mit `#` beginnen; sie wird daran erkannt, dass nicht alle
//! Felder Zahlen sind. Zeilennummern in Fehlern sind 1-basiert.

use glam::DVec2;

use crate::core::{ReferenceTrack, SplineSegment, TrackPoint};
use crate::error::TrackError;

/// Spaltennamen der Rohdaten.
pub const RAW_TRACK_COLUMNS: [&str; 4] = ["x_m", "y_m", "w_tr_right_m", "w_tr_left_m"];

/// Zerlegter Tabelleninhalt.
struct Table {
    header: Option<Vec<String>>,
    /// (Zeilennummer, Werte)
    rows: Vec<(usize, Vec<f64>)>,
}

fn split_fields(line: &str) -> Vec<&str> {
    let delimiter = if line.contains(';') { ';' } else { ',' };
    line.split(delimiter).map(str::trim).collect()
}

fn parse_table(content: &str) -> Result<Table, TrackError> {
    let mut header = None;
    let mut rows = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let is_first = header.is_none() && rows.is_empty();
        let body = trimmed.trim_start_matches('#').trim();
        let fields = split_fields(body);
        let numbers: Result<Vec<f64>, _> = fields.iter().map(|f| f.parse::<f64>()).collect();

        match numbers {
            Ok(values) => rows.push((line_no, values)),
            Err(_) if is_first => {
                header = Some(fields.iter().map(|f| f.to_string()).collect());
            }
            Err(_) if trimmed.starts_with('#') => {}
            Err(e) => {
                return Err(TrackError::parse(
                    line_no,
                    format!("ungültige Zahl in \"{}\": {}", truncate_for_error(trimmed), e),
                ))
            }
        }
    }

    Ok(Table { header, rows })
}

fn truncate_for_error(s: &str) -> &str {
    match s.char_indices().nth(60) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Spaltenindizes zu `names`; ohne Kopfzeile die ersten `names.len()` Spalten.
fn column_indices(header: Option<&[String]>, names: &[&str]) -> Result<Vec<usize>, TrackError> {
    let Some(header) = header else {
        return Ok((0..names.len()).collect());
    };
    names
        .iter()
        .map(|name| {
            header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| {
                    TrackError::parse(1, format!("Spalte {name} fehlt in der Kopfzeile"))
                })
        })
        .collect()
}

fn pick(values: &[f64], indices: &[usize], line: usize) -> Result<Vec<f64>, TrackError> {
    indices
        .iter()
        .map(|&i| {
            values.get(i).copied().ok_or_else(|| {
                TrackError::parse(
                    line,
                    format!("{} Spalten, mindestens {} erwartet", values.len(), i + 1),
                )
            })
        })
        .collect()
}

fn ensure_finite(values: &[f64], line: usize) -> Result<(), TrackError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(TrackError::parse(line, "nicht-endlicher Wert"))
    }
}

/// Parst Rohdaten `x_m, y_m, w_tr_right_m, w_tr_left_m`.
pub fn parse_raw_track(content: &str) -> Result<Vec<TrackPoint>, TrackError> {
    let table = parse_table(content)?;
    let indices = column_indices(table.header.as_deref(), &RAW_TRACK_COLUMNS)?;

    table
        .rows
        .iter()
        .map(|(line, values)| {
            let v = pick(values, &indices, *line)?;
            ensure_finite(&v, *line)?;
            if v[2] < 0.0 || v[3] < 0.0 {
                return Err(TrackError::parse(*line, "negative Streckenbreite"));
            }
            Ok(TrackPoint::new(v[0], v[1], v[2], v[3]))
        })
        .collect()
}

/// Parst die exportierte Trajektorien-Tabelle (Referenzpunkte, Breiten, Normalen).
pub fn parse_reference_table(content: &str) -> Result<(ReferenceTrack, Vec<DVec2>), TrackError> {
    let table = parse_table(content)?;
    let indices: Vec<usize> = (0..6).collect();

    let mut points = Vec::with_capacity(table.rows.len());
    let mut normals = Vec::with_capacity(table.rows.len());
    for (line, values) in &table.rows {
        let v = pick(values, &indices, *line)?;
        ensure_finite(&v, *line)?;
        points.push(TrackPoint::new(v[0], v[1], v[2], v[3]));
        normals.push(DVec2::new(v[4], v[5]));
    }

    Ok((ReferenceTrack::new(points), normals))
}

/// Parst die exportierte Spline-Tabelle (Segmentlänge + 8 Koeffizienten).
pub fn parse_spline_table(content: &str) -> Result<(Vec<f64>, Vec<SplineSegment>), TrackError> {
    let table = parse_table(content)?;
    let indices: Vec<usize> = (0..9).collect();

    let mut lengths = Vec::with_capacity(table.rows.len());
    let mut segments = Vec::with_capacity(table.rows.len());
    for (line, values) in &table.rows {
        let v = pick(values, &indices, *line)?;
        ensure_finite(&v, *line)?;
        lengths.push(v[0]);
        segments.push(SplineSegment {
            x: [v[1], v[2], v[3], v[4]],
            y: [v[5], v[6], v[7], v[8]],
        });
    }

    Ok((lengths, segments))
}
