//! Fehlertypen der Pipeline.
//!
//! Fatale Fehler (`ConfigError`, `GeometryError`) brechen einen Lauf ab, bevor
//! etwas exportiert wird. Nicht-fatale Befunde sind `ValidationWarning`s
//! (siehe `core::validate`).

use std::path::PathBuf;

/// Fehler beim Laden oder Prüfen der Konfiguration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Konfigurationsdatei existiert nicht oder ist nicht lesbar
    #[error("Konfigurationsdatei {path} existiert nicht oder ist nicht lesbar")]
    Missing {
        /// Pfad der erwarteten Datei
        path: PathBuf,
    },

    /// Konfigurationsdatei ist leer
    #[error("Konfigurationsdatei {path} ist leer")]
    Empty {
        /// Pfad der leeren Datei
        path: PathBuf,
    },

    /// TOML-Syntax- oder Typfehler
    #[error("Konfigurationsdatei {path} fehlerhaft: {source}")]
    Invalid {
        /// Pfad der fehlerhaften Datei
        path: PathBuf,
        /// Ursprünglicher TOML-Fehler
        source: toml::de::Error,
    },

    /// Wert außerhalb des gültigen Bereichs
    #[error("Ungültiger Parameter: {0}")]
    InvalidValue(String),
}

/// Degenerierte Geometrie oder nicht lösbares Gleichungssystem.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// Nach der Duplikat-Bereinigung bleiben weniger als 4 Punkte
    #[error("Zu wenige unterschiedliche Streckenpunkte: {found} (mindestens 4 benötigt)")]
    TooFewPoints {
        /// Anzahl verbleibender Punkte
        found: usize,
    },

    /// NaN oder Unendlich in den Eingabedaten
    #[error("Nicht-endlicher Wert in Streckenpunkt {index}")]
    NonFinite {
        /// Index des betroffenen Punkts
        index: usize,
    },

    /// Cholesky-Pivot nicht positiv
    #[error("Spline-Gleichungssystem singulär (Zeile {row}), Duplikate oder Kollinearität?")]
    SingularSystem {
        /// Zeile, in der die Zerlegung abbrach
        row: usize,
    },

    /// Tangente verschwindet an einem Referenzpunkt, keine Normale bestimmbar
    #[error("Tangente am Referenzpunkt {index} ist null")]
    DegenerateTangent {
        /// Index des Referenzpunkts
        index: usize,
    },

    /// Keine oder inkonsistente Spline-Daten
    #[error("Spline-Daten leer oder inkonsistent: {0}")]
    EmptySpline(String),

    /// Verhältnis Länge zu Schrittweite ergibt zu viele Abtastpunkte
    #[error("{requested:.3e} Abtastpunkte angefordert, höchstens {limit} zulässig")]
    TooManySamples {
        /// Angeforderte Anzahl (vor der Umwandlung in eine Ganzzahl)
        requested: f64,
        /// Obergrenze
        limit: usize,
    },
}

/// Umbrella-Fehler für Import, Pipeline und Export.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Formatfehler in einer Tabellen-Datei (Zeilennummer 1-basiert)
    #[error("Zeile {line}: {message}")]
    Parse {
        /// Zeilennummer
        line: usize,
        /// Beschreibung des Fehlers
        message: String,
    },

    /// Dateisystem-Fehler
    #[error("I/O-Fehler bei {path}: {source}")]
    Io {
        /// Betroffener Pfad
        path: PathBuf,
        /// Ursprünglicher Fehler
        source: std::io::Error,
    },
}

impl TrackError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
