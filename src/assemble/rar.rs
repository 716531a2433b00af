//! RAR assembly: expand rotation curves into (g_bar, g_obs, r_frac) triples.
//!
//! Unlike the BTFR stage this one is file-driven: every recognized artifact
//! in the per-galaxy directory is processed, whether or not the fleet summary
//! mentions it. Per-artifact work is independent, so it runs on rayon with an
//! order-preserving collect; output order stays glob order then radius order.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::domain::{RarPoint, RotationCurve, SkipReason, StageSummary};
use crate::error::AppError;
use crate::io::curve::{discover_curves, read_rotation_curve};

/// Assembled RAR points plus per-artifact skip accounting.
#[derive(Debug, Clone)]
pub struct RarOutput {
    pub points: Vec<RarPoint>,
    pub summary: StageSummary,
}

/// Convert one curve into RAR points.
///
/// `r_frac` is normalized by the maximum of the *unfiltered* radius array,
/// then the positivity mask `(R>0) & (Vb>0) & (Vt>0)` is applied elementwise
/// so each surviving `r_frac` still corresponds to its `(g_bar, g_obs)` pair.
/// A final `g_bar > 0 && g_obs > 0` filter guards the log-space consumers.
pub fn rar_points(curve: &RotationCurve) -> Result<Vec<RarPoint>, SkipReason> {
    let r_max = curve.max_radius();
    if !(r_max > 0.0) {
        return Err(SkipReason::NonPositiveMaxRadius);
    }

    let points = curve
        .samples
        .iter()
        .filter(|s| s.radius_kpc > 0.0 && s.v_baryon > 0.0 && s.v_total > 0.0)
        .map(|s| RarPoint {
            name: curve.name.clone(),
            g_bar: (s.v_baryon * s.v_baryon) / s.radius_kpc,
            g_obs: (s.v_total * s.v_total) / s.radius_kpc,
            r_frac: s.radius_kpc / r_max,
        })
        .filter(|p| p.g_bar > 0.0 && p.g_obs > 0.0)
        .collect();

    Ok(points)
}

/// Assemble RAR points for every artifact discovered in the directory.
pub fn assemble_rar(per_galaxy_dir: &Path) -> Result<RarOutput, AppError> {
    let artifacts = discover_curves(per_galaxy_dir)?;
    let total = artifacts.len();

    let per_artifact: Vec<Result<Vec<RarPoint>, (String, SkipReason)>> = artifacts
        .par_iter()
        .map(|(name, path)| process_artifact(name, path))
        .collect();

    let mut points = Vec::new();
    let mut summary = StageSummary {
        total,
        ..StageSummary::default()
    };
    let mut processed = 0usize;

    for result in per_artifact {
        match result {
            Ok(mut galaxy_points) => {
                processed += 1;
                points.append(&mut galaxy_points);
            }
            Err((name, reason)) => summary.record_skip(name, reason),
        }
    }

    summary.processed = processed;
    Ok(RarOutput { points, summary })
}

fn process_artifact(name: &str, path: &PathBuf) -> Result<Vec<RarPoint>, (String, SkipReason)> {
    let curve =
        read_rotation_curve(path, name).map_err(|reason| (name.to_string(), reason))?;
    rar_points(&curve).map_err(|reason| (name.to_string(), reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RcSample;

    fn sample(radius_kpc: f64, v_baryon: f64, v_total: f64) -> RcSample {
        RcSample { radius_kpc, v_baryon, v_total }
    }

    #[test]
    fn accelerations_match_definition() {
        let curve = RotationCurve {
            name: "G1".to_string(),
            samples: (1..=10)
                .map(|i| sample(i as f64, 50.0, 100.0))
                .collect(),
        };
        let points = rar_points(&curve).unwrap();
        assert_eq!(points.len(), 10);
        for (i, p) in points.iter().enumerate() {
            let r = (i + 1) as f64;
            assert_eq!(p.g_bar, 2500.0 / r);
            assert_eq!(p.g_obs, 10000.0 / r);
            assert_eq!(p.r_frac, r / 10.0);
        }
    }

    #[test]
    fn positivity_mask_drops_bad_rows() {
        let curve = RotationCurve {
            name: "G1".to_string(),
            samples: vec![
                sample(1.0, 50.0, 100.0),
                sample(-2.0, 50.0, 100.0),
                sample(3.0, 0.0, 100.0),
                sample(4.0, 50.0, -1.0),
                sample(5.0, 50.0, 100.0),
            ],
        };
        let points = rar_points(&curve).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].r_frac, 1.0 / 5.0);
        assert_eq!(points[1].r_frac, 1.0);
    }

    #[test]
    fn r_frac_uses_unfiltered_max_radius() {
        // The max-radius row fails the mask; no surviving row reaches 1.0.
        let curve = RotationCurve {
            name: "G1".to_string(),
            samples: vec![
                sample(2.0, 50.0, 100.0),
                sample(8.0, 0.0, 100.0),
                sample(4.0, 50.0, 100.0),
            ],
        };
        let points = rar_points(&curve).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].r_frac, 0.25);
        assert_eq!(points[1].r_frac, 0.5);
        assert!(points.iter().all(|p| p.r_frac > 0.0 && p.r_frac <= 1.0));
    }

    #[test]
    fn non_positive_max_radius_skips_the_galaxy() {
        let curve = RotationCurve {
            name: "G1".to_string(),
            samples: vec![sample(-1.0, 50.0, 100.0), sample(-3.0, 40.0, 90.0)],
        };
        assert_eq!(
            rar_points(&curve).unwrap_err(),
            SkipReason::NonPositiveMaxRadius
        );
    }

    #[test]
    fn directory_assembly_is_glob_ordered_and_fail_soft() {
        let dir = std::env::temp_dir().join(format!("rcrel-rar-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        std::fs::write(
            dir.join("rc_decomp_B_best.csv"),
            "radius_kpc,V_baryon,V_total\n1.0,50.0,100.0\n2.0,45.0,101.0\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("rc_decomp_A_best.csv"),
            "R_kpc,V_baryon,V_total\n1.0,30.0,60.0\n",
        )
        .unwrap();
        // Missing V_baryon: skipped, not fatal.
        std::fs::write(
            dir.join("rc_decomp_C_best.csv"),
            "radius_kpc,V_total\n1.0,100.0\n",
        )
        .unwrap();

        let output = assemble_rar(&dir).unwrap();

        assert_eq!(output.summary.total, 3);
        assert_eq!(output.summary.processed, 2);
        assert_eq!(output.summary.skipped.len(), 1);
        assert_eq!(output.summary.skipped[0].0, "C");

        let names: Vec<&str> = output.points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "B"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
