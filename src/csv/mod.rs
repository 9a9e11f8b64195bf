//! CSV Import/Export für Streckendaten.
//!
//! Rohdaten werden mit `parser` gelesen, Ergebnisse mit `writer` als Strings
//! erzeugt. Dateisystem-Zugriffe liegen in `app::file_io`.

pub mod parser;
pub mod writer;

pub use parser::{parse_raw_track, parse_reference_table, parse_spline_table};
pub use writer::{write_spline_table, write_trajectory_table};
