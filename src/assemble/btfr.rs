//! BTFR assembly: one flat-velocity estimate per galaxy.
//!
//! This stage is fleet-driven: the fleet summary decides which galaxies are
//! even attempted, and the completeness count is reported against the full
//! fleet size, not against the artifacts that happened to resolve.

use std::path::Path;

use crate::domain::{BtfrRecord, RelationConfig, RotationCurve, SkipReason, StageSummary};
use crate::error::AppError;
use crate::io::curve::{read_rotation_curve, resolve_curve_path};
use crate::io::tables::read_fleet;
use crate::math::stats::median;

/// Assembled BTFR table plus completeness accounting.
#[derive(Debug, Clone)]
pub struct BtfrOutput {
    pub records: Vec<BtfrRecord>,
    pub summary: StageSummary,
}

/// Flat velocity: median of `V_total` over the trailing outer slice.
///
/// The slice starts at `ceil(outer_fraction * n)` by position; rows are taken
/// as stored, without sorting. Returns `None` when the slice is empty or the
/// median is undefined (NaN in the slice).
pub fn flat_velocity(curve: &RotationCurve, outer_fraction: f64) -> Option<f64> {
    let n = curve.len();
    let start = (outer_fraction * n as f64).ceil() as usize;
    if start >= n {
        return None;
    }
    let outer: Vec<f64> = curve.samples[start..].iter().map(|s| s.v_total).collect();
    median(&outer)
}

/// Reduce one galaxy's curve to a BTFR record.
///
/// `m_b` is left as a NaN placeholder; the mass-attach stage fills it in.
pub fn btfr_record(curve: &RotationCurve, config: &RelationConfig) -> Result<BtfrRecord, SkipReason> {
    if curve.len() < config.min_samples {
        return Err(SkipReason::TooFewSamples(curve.len()));
    }
    let v_flat = flat_velocity(curve, config.outer_fraction)
        .ok_or(SkipReason::TooFewSamples(curve.len()))?;

    Ok(BtfrRecord {
        name: curve.name.clone(),
        m_b: f64::NAN,
        v_flat,
    })
}

/// Assemble the BTFR table for a fleet, resolving each galaxy's artifact on
/// disk. Output rows keep fleet iteration order.
pub fn assemble_btfr(
    fleet: &[String],
    per_galaxy_dir: &Path,
    config: &RelationConfig,
) -> BtfrOutput {
    let mut records = Vec::new();
    let mut summary = StageSummary {
        total: fleet.len(),
        ..StageSummary::default()
    };

    for name in fleet {
        let Some(path) = resolve_curve_path(per_galaxy_dir, name) else {
            summary.record_skip(name, SkipReason::MissingCurve);
            continue;
        };

        let curve = match read_rotation_curve(&path, name) {
            Ok(curve) => curve,
            Err(reason) => {
                summary.record_skip(name, reason);
                continue;
            }
        };

        match btfr_record(&curve, config) {
            Ok(record) => records.push(record),
            Err(reason) => summary.record_skip(name, reason),
        }
    }

    summary.processed = records.len();
    BtfrOutput { records, summary }
}

/// Read the fleet summary and assemble the BTFR table from disk artifacts.
pub fn assemble_btfr_from_dir(config: &RelationConfig) -> Result<BtfrOutput, AppError> {
    let per_galaxy_dir = config.per_galaxy_dir();
    if !per_galaxy_dir.exists() {
        return Err(AppError::new(
            2,
            format!(
                "Per-galaxy directory not found at '{}'.",
                per_galaxy_dir.display()
            ),
        ));
    }

    let fleet = read_fleet(&config.fleet_summary_path())?;
    Ok(assemble_btfr(&fleet, &per_galaxy_dir, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RcSample;

    fn constant_curve(name: &str, n: usize, v_total: f64) -> RotationCurve {
        RotationCurve {
            name: name.to_string(),
            samples: (1..=n)
                .map(|i| RcSample {
                    radius_kpc: i as f64,
                    v_baryon: 50.0,
                    v_total,
                })
                .collect(),
        }
    }

    #[test]
    fn constant_curve_yields_exact_flat_velocity() {
        for n in [5, 6, 10, 17, 100] {
            let curve = constant_curve("G", n, 123.5);
            assert_eq!(flat_velocity(&curve, 0.8), Some(123.5), "n={n}");
        }
    }

    #[test]
    fn flat_velocity_uses_trailing_slice_only() {
        // 10 rows: outer slice is positions 8..10.
        let mut curve = constant_curve("G", 10, 100.0);
        curve.samples[8].v_total = 102.0;
        curve.samples[9].v_total = 104.0;
        // Inner rows should not matter at all.
        for sample in curve.samples[..8].iter_mut() {
            sample.v_total = 1e6;
        }
        assert_eq!(flat_velocity(&curve, 0.8), Some(103.0));
    }

    #[test]
    fn too_few_samples_is_excluded() {
        let curve = constant_curve("G", 4, 100.0);
        let config = RelationConfig::default();
        assert_eq!(
            btfr_record(&curve, &config).unwrap_err(),
            SkipReason::TooFewSamples(4)
        );
    }

    #[test]
    fn record_carries_nan_placeholder() {
        let curve = constant_curve("G1", 10, 100.0);
        let config = RelationConfig::default();
        let record = btfr_record(&curve, &config).unwrap();
        assert_eq!(record.name, "G1");
        assert_eq!(record.v_flat, 100.0);
        assert!(record.m_b.is_nan());
    }

    #[test]
    fn fleet_order_and_completeness_counts() {
        let dir = std::env::temp_dir().join(format!("rcrel-btfr-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        // G2 resolves with enough samples, G3 resolves but is too short,
        // G1 has no artifact at all.
        for (name, rows) in [("G2", 6), ("G3", 3)] {
            let path = dir.join(format!("rc_decomp_{name}_best.csv"));
            let mut body = String::from("radius_kpc,V_baryon,V_total\n");
            for i in 1..=rows {
                body.push_str(&format!("{i}.0,50.0,100.0\n"));
            }
            std::fs::write(&path, body).unwrap();
        }

        let fleet = vec!["G1".to_string(), "G2".to_string(), "G3".to_string()];
        let config = RelationConfig::default();
        let output = assemble_btfr(&fleet, &dir, &config);

        assert_eq!(output.records.len(), 1);
        assert_eq!(output.records[0].name, "G2");
        assert_eq!(output.summary.processed, 1);
        assert_eq!(output.summary.total, 3);
        assert_eq!(output.summary.skipped.len(), 2);
        assert_eq!(output.summary.skipped[0].1, SkipReason::MissingCurve);
        assert_eq!(output.summary.skipped[1].1, SkipReason::TooFewSamples(3));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
