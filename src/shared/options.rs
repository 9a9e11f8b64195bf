//! Zentrale Konfiguration der Mittellinien-Pipeline.
//!
//! `PipelineOptions` wird einmal geladen und unverändert an alle Stufen gereicht.
//! Die `const`-Werte sind die Defaults fehlender Felder.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::shared::spline_geometry::MAX_SAMPLES;

// ── Fahrzeug ────────────────────────────────────────────────────────

/// Fahrzeugbreite in Metern.
pub const VEHICLE_WIDTH: f64 = 2.0;
/// Fahrzeuglänge in Metern.
pub const VEHICLE_LENGTH: f64 = 4.7;
/// Maximal fahrbare Krümmung in rad/m.
pub const VEHICLE_CURVLIM: f64 = 0.12;

// ── Schrittweiten ──────────────────────────────────────────────────

/// Abstand der linearen Vor-Interpolation vor dem Spline-Fit.
pub const STEPSIZE_PREP: f64 = 1.0;
/// Punktabstand der geglätteten Referenzlinie.
pub const STEPSIZE_REG: f64 = 3.0;
/// Abstand der gleichmäßig abgetasteten Trajektorie.
pub const STEPSIZE_INTERP_AFTER_OPT: f64 = 2.0;

// ── Glättung ───────────────────────────────────────────────────────

/// Standard-Regularisierungsgewicht λ (Einheit: m³ bei Parametrisierung in Metern).
pub const REG_LAMBDA: f64 = 10.0;

// ── Validierung ────────────────────────────────────────────────────

/// Mindestabstand der Fahrzeugecken zu den Rändern, darunter wird gewarnt.
pub const SAFETY_MARGIN: f64 = 1.0;
/// Schrittweite der linear interpolierten Ränder für die Abstandssuche.
pub const BOUNDARY_STEPSIZE: f64 = 1.0;
/// Anzahl folgender Normalen, die auf Überschneidung geprüft werden.
pub const NORMALS_CROSSING_HORIZON: usize = 10;

/// Fahrzeugparameter für die Validierung.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleOptions {
    /// Breite in Metern
    pub width: f64,
    /// Länge in Metern
    pub length: f64,
    /// Krümmungsgrenze in rad/m
    pub curvlim: f64,
}

impl Default for VehicleOptions {
    fn default() -> Self {
        Self {
            width: VEHICLE_WIDTH,
            length: VEHICLE_LENGTH,
            curvlim: VEHICLE_CURVLIM,
        }
    }
}

/// Schrittweiten der einzelnen Stufen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepsizeOptions {
    /// Lineare Vor-Interpolation der Rohdaten (`None` = aus)
    pub prep: Option<f64>,
    /// Punktabstand der Referenzlinie nach der Glättung
    pub reg: f64,
    /// Abstand der finalen Trajektorie
    pub interp_after_opt: f64,
}

impl Default for StepsizeOptions {
    fn default() -> Self {
        Self {
            prep: Some(STEPSIZE_PREP),
            reg: STEPSIZE_REG,
            interp_after_opt: STEPSIZE_INTERP_AFTER_OPT,
        }
    }
}

/// Parameter des regularisierten Spline-Fits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegularizationOptions {
    /// Gewicht des Krümmungsterms (0 = exakte Interpolation)
    pub lambda: f64,
    /// Feste Anzahl Referenzpunkte; überschreibt `stepsize.reg`
    pub knot_count: Option<usize>,
}

impl Default for RegularizationOptions {
    fn default() -> Self {
        Self {
            lambda: REG_LAMBDA,
            knot_count: None,
        }
    }
}

/// Import-Optionen für die Rohdaten.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Fahrtrichtung umkehren
    pub flip: bool,
    /// Neuer Startpunkt (nächster Rohpunkt wird zum ersten Punkt)
    pub new_start: Option<[f64; 2]>,
    /// Mindestbreite je Seite in Metern
    pub min_track_width: Option<f64>,
}

/// Alle Parameter eines Pipeline-Laufs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub vehicle: VehicleOptions,
    pub stepsize: StepsizeOptions,
    pub regularization: RegularizationOptions,
    pub import: ImportOptions,
}

impl PipelineOptions {
    /// Lädt Optionen aus einer TOML-Datei.
    ///
    /// Fehlende oder leere Dateien sind ein Fehler; fehlende Felder werden mit
    /// Standardwerten belegt.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::Missing {
            path: path.to_path_buf(),
        })?;
        let options = Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Empty { .. } => ConfigError::Empty {
                path: path.to_path_buf(),
            },
            ConfigError::Invalid { source, .. } => ConfigError::Invalid {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        log::info!("Optionen geladen aus: {}", path.display());
        Ok(options)
    }

    /// Parst und prüft Optionen aus einem TOML-String.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Err(ConfigError::Empty {
                path: Default::default(),
            });
        }
        let options: Self = toml::from_str(content).map_err(|source| ConfigError::Invalid {
            path: Default::default(),
            source,
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Prüft Wertebereiche, bevor irgendeine Geometrie berechnet wird.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidValue(format!(
                    "{name} muss positiv sein, ist {value}"
                )))
            }
        };

        positive("vehicle.width", self.vehicle.width)?;
        positive("vehicle.length", self.vehicle.length)?;
        positive("vehicle.curvlim", self.vehicle.curvlim)?;
        if let Some(prep) = self.stepsize.prep {
            positive("stepsize.prep", prep)?;
        }
        positive("stepsize.reg", self.stepsize.reg)?;
        positive("stepsize.interp_after_opt", self.stepsize.interp_after_opt)?;

        if !self.regularization.lambda.is_finite() || self.regularization.lambda < 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "regularization.lambda darf nicht negativ sein, ist {}",
                self.regularization.lambda
            )));
        }
        if let Some(count) = self.regularization.knot_count {
            if !(4..=MAX_SAMPLES).contains(&count) {
                return Err(ConfigError::InvalidValue(format!(
                    "regularization.knot_count außerhalb von 4..={MAX_SAMPLES}: {count}"
                )));
            }
        }
        if let Some(min_width) = self.import.min_track_width {
            if !min_width.is_finite() || min_width < 0.0 {
                return Err(ConfigError::InvalidValue(format!(
                    "import.min_track_width darf nicht negativ sein, ist {min_width}"
                )));
            }
        }
        Ok(())
    }
}
