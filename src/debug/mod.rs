//! Debug bundle writer for inspecting the on-disk artifact state.
//!
//! Produces a single timestamped markdown file: which artifacts exist, their
//! row counts, and the headline scatter numbers when a RAR table is present.
//! One stop for referee-style inspection of a pipeline run.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::analysis::scatter::{ResidualKind, overall_scatter};
use crate::domain::RelationConfig;
use crate::error::AppError;
use crate::io::curve::discover_curves;
use crate::io::tables::{read_btfr_mass_table, read_btfr_table, read_fleet, read_rar_table};
use crate::plot::btfr::fit_btfr;

pub fn write_debug_bundle(config: &RelationConfig) -> Result<PathBuf, AppError> {
    let dir = config.data_dir.join("debug");
    create_dir_all(&dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("rcrel_debug_{ts}.md"));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;

    writeln!(file, "# rcrel debug bundle").map_err(debug_err)?;
    writeln!(file, "- generated: {}", Local::now().to_rfc3339()).map_err(debug_err)?;
    writeln!(file, "- data_dir: {}", config.data_dir.display()).map_err(debug_err)?;

    writeln!(file, "\n## Artifacts").map_err(debug_err)?;
    writeln!(file, "| artifact | present | rows |").map_err(debug_err)?;
    writeln!(file, "| - | - | - |").map_err(debug_err)?;

    write_artifact_row(&mut file, "fleet summary", &config.fleet_summary_path(), |p| {
        read_fleet(p).map(|rows| rows.len()).ok()
    })?;
    write_artifact_row(&mut file, "mass table", &config.mass_table_path(), |p| {
        crate::io::tables::read_mass_table(p).map(|rows| rows.len()).ok()
    })?;
    write_artifact_row(&mut file, "BTFR table", &config.btfr_table_path(), |p| {
        read_btfr_table(p).map(|rows| rows.len()).ok()
    })?;
    write_artifact_row(
        &mut file,
        "BTFR with mass",
        &config.btfr_mass_table_path(),
        |p| read_btfr_mass_table(p).map(|rows| rows.len()).ok(),
    )?;
    write_artifact_row(&mut file, "RAR points", &config.rar_points_path(), |p| {
        read_rar_table(p).map(|rows| rows.len()).ok()
    })?;

    let per_galaxy_dir = config.per_galaxy_dir();
    let artifact_count = if per_galaxy_dir.exists() {
        discover_curves(&per_galaxy_dir)?.len()
    } else {
        0
    };
    writeln!(file, "\n- per-galaxy artifacts: {artifact_count}").map_err(debug_err)?;

    if let Ok(joined) = read_btfr_mass_table(&config.btfr_mass_table_path()) {
        if let Ok(fit) = fit_btfr(&joined) {
            writeln!(file, "\n## BTFR fit").map_err(debug_err)?;
            writeln!(file, "- slope: {:.4}", fit.slope).map_err(debug_err)?;
            writeln!(file, "- intercept: {:.4}", fit.intercept).map_err(debug_err)?;
            writeln!(file, "- n: {}", fit.n).map_err(debug_err)?;
        }
    }

    if let Ok(points) = read_rar_table(&config.rar_points_path()) {
        writeln!(file, "\n## RAR scatter").map_err(debug_err)?;
        for kind in [ResidualKind::Empirical, ResidualKind::Raw] {
            if let Some(stats) = overall_scatter(&points, kind, config) {
                writeln!(
                    file,
                    "- {kind:?}: n={} rms={:.3} dex median={:.3} dex",
                    stats.n, stats.rms, stats.median_abs
                )
                .map_err(debug_err)?;
            }
        }
    }

    Ok(path)
}

fn write_artifact_row(
    file: &mut File,
    label: &str,
    path: &Path,
    row_count: impl Fn(&Path) -> Option<usize>,
) -> Result<(), AppError> {
    let present = path.exists();
    let rows = if present {
        row_count(path).map_or_else(|| "?".to_string(), |n| n.to_string())
    } else {
        "-".to_string()
    };
    writeln!(file, "| {label} | {present} | {rows} |").map_err(debug_err)
}

fn debug_err(e: std::io::Error) -> AppError {
    AppError::new(4, format!("Failed to write debug bundle: {e}"))
}
