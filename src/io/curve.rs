//! Per-galaxy rotation-curve artifacts.
//!
//! Frozen model outputs live under `per_galaxy/` with the canonical naming
//! scheme `rc_decomp_{name}_best.csv` (or `.dat`; both encodings are plain
//! CSV). Two access paths exist and are deliberately kept distinct:
//!
//! - `resolve_curve_path`: fleet-driven lookup by galaxy name (BTFR stage)
//! - `discover_curves`: file-driven scan of the directory (RAR stage)
//!
//! The divergence is inherited behavior: unifying it would silently change
//! which galaxies appear in each output table.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::domain::{RcSample, RotationCurve, SkipReason};
use crate::error::AppError;

const CURVE_PREFIX: &str = "rc_decomp_";
const CURVE_SUFFIXES: [&str; 2] = ["_best.csv", "_best.dat"];

/// Resolve the artifact for a named galaxy, preferring `.csv` over `.dat`.
pub fn resolve_curve_path(per_galaxy_dir: &Path, name: &str) -> Option<PathBuf> {
    for suffix in CURVE_SUFFIXES {
        let candidate = per_galaxy_dir.join(format!("{CURVE_PREFIX}{name}{suffix}"));
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// Scan the per-galaxy directory for every recognized artifact.
///
/// Returns `(galaxy_name, path)` pairs in lexicographic filename order. A
/// galaxy present under both encodings yields two entries, as the historical
/// glob did.
pub fn discover_curves(per_galaxy_dir: &Path) -> Result<Vec<(String, PathBuf)>, AppError> {
    let entries = std::fs::read_dir(per_galaxy_dir).map_err(|e| {
        AppError::new(
            2,
            format!(
                "Failed to read per-galaxy directory '{}': {e}",
                per_galaxy_dir.display()
            ),
        )
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| AppError::new(2, format!("Failed to list per-galaxy directory: {e}")))?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if let Some(name) = galaxy_name_from_file(file_name) {
            found.push((file_name.to_string(), name, entry.path()));
        }
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(found.into_iter().map(|(_, name, path)| (name, path)).collect())
}

/// Extract the galaxy name from a canonical artifact filename.
pub fn galaxy_name_from_file(file_name: &str) -> Option<String> {
    let rest = file_name.strip_prefix(CURVE_PREFIX)?;
    for suffix in CURVE_SUFFIXES {
        if let Some(name) = rest.strip_suffix(suffix) {
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Parse a rotation-curve artifact.
///
/// Required columns: `radius_kpc` (alias `R_kpc`), `V_baryon`, `V_total`;
/// header matching is case-insensitive and BOM-tolerant. A missing column is
/// a `SkipReason`, not an error; the caller decides whether to abort (the
/// verification script does) or to continue with the next galaxy. Rows whose
/// values fail to parse as finite floats are dropped.
pub fn read_rotation_curve(path: &Path, name: &str) -> Result<RotationCurve, SkipReason> {
    let file = File::open(path)
        .map_err(|e| SkipReason::UnreadableCurve(format!("{}: {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| SkipReason::UnreadableCurve(format!("{}: {e}", path.display())))?
        .clone();
    let header_map = build_header_map(&headers);

    let radius_idx = header_map
        .get("radius_kpc")
        .or_else(|| header_map.get("r_kpc"))
        .copied()
        .ok_or(SkipReason::MissingColumns)?;
    let v_baryon_idx = header_map
        .get("v_baryon")
        .copied()
        .ok_or(SkipReason::MissingColumns)?;
    let v_total_idx = header_map
        .get("v_total")
        .copied()
        .ok_or(SkipReason::MissingColumns)?;

    let mut samples = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(_) => continue,
        };
        let Some(sample) = parse_sample(&record, radius_idx, v_baryon_idx, v_total_idx) else {
            continue;
        };
        samples.push(sample);
    }

    Ok(RotationCurve {
        name: name.to_string(),
        samples,
    })
}

pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

pub(crate) fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes emit a BOM prefix on the first header.
    // Strip it before matching, or column validation reports false misses.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_sample(
    record: &StringRecord,
    radius_idx: usize,
    v_baryon_idx: usize,
    v_total_idx: usize,
) -> Option<RcSample> {
    Some(RcSample {
        radius_kpc: parse_f64(record.get(radius_idx)?)?,
        v_baryon: parse_f64(record.get(v_baryon_idx)?)?,
        v_total: parse_f64(record.get(v_total_idx)?)?,
    })
}

pub(crate) fn parse_f64(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
