//! Centerline Generator.
//!
//! Liest eine Strecke, glättet die Mittellinie und exportiert Referenzlinie
//! und Spline-Koeffizienten.

use std::path::PathBuf;

use anyhow::Context;
use centerline_generator::{
    export_results, load_raw_track, run_pipeline, ExportPaths, PipelineOptions,
};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "centerline-generator",
    about = "Glättet geschlossene Strecken-Mittellinien und exportiert Spline-Koeffizienten"
)]
struct Cli {
    /// Streckenname (bestimmt Eingabe- und Ausgabedateien)
    #[arg(short = 'm', long)]
    map_name: String,

    /// Eingabedatei (Standard: tracks/<map-name>.csv)
    #[arg(long)]
    map_path: Option<PathBuf>,

    /// Ausgabeverzeichnis
    #[arg(short = 'o', long, default_value = "outputs")]
    export_path: PathBuf,

    /// Fahrzeug- und Pipeline-Parameter (TOML)
    #[arg(short = 'c', long, default_value = "config/racecar.toml")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Centerline Generator v{} startet...", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();

    let options = PipelineOptions::load_from_file(&cli.config)
        .with_context(|| format!("Konfiguration {} unbrauchbar", cli.config.display()))?;

    let map_path = cli
        .map_path
        .unwrap_or_else(|| PathBuf::from("tracks").join(format!("{}.csv", cli.map_name)));
    let raw = load_raw_track(&map_path)
        .with_context(|| format!("Strecke {} konnte nicht geladen werden", map_path.display()))?;

    let output = run_pipeline(&raw, &options)
        .with_context(|| format!("Pipeline für '{}' fehlgeschlagen", cli.map_name))?;

    let paths = ExportPaths::for_map(&cli.export_path, &cli.map_name);
    export_results(&output, &paths).context("Export fehlgeschlagen")?;

    log::info!(
        "Fertig: {} Referenzpunkte, {} Trajektorienpunkte, Länge {:.2}m, {} Warnung(en)",
        output.prepared.reference.len(),
        output.trajectory.len(),
        output.total_length(),
        output.warnings.len()
    );
    Ok(())
}
