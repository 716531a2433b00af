//! Single-galaxy consistency verification.
//!
//! Recomputes `g_bar` / `g_obs` for one galaxy directly from its frozen
//! rotation-curve artifact and compares, row by row, against the rows already
//! present in the assembled RAR table. The two derivations mask their inputs
//! independently; alignment is positional over the shorter of the two, which
//! is conservative but catches any drift in the assembly formulas.
//!
//! This is a diagnostic for referee-style reproducibility checks; it writes
//! no artifact.

use serde::Serialize;

use crate::domain::{RarPoint, RotationCurve};
use crate::error::AppError;

/// One independently recomputed acceleration row.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RecomputedRow {
    pub radius_kpc: f64,
    pub g_bar: f64,
    pub g_obs: f64,
}

/// Outcome of the verification.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub galaxy: String,
    /// Rows compared (min of the two derivations' lengths).
    pub compared: usize,
    pub max_delta_g_bar: f64,
    pub max_delta_g_obs: f64,
    pub tolerance: f64,
    pub passed: bool,
    #[serde(skip)]
    pub assembled: Vec<RarPoint>,
    #[serde(skip)]
    pub recomputed: Vec<RecomputedRow>,
}

/// Recompute accelerations from a curve with an independent positivity mask.
pub fn recompute_accelerations(curve: &RotationCurve) -> Vec<RecomputedRow> {
    curve
        .samples
        .iter()
        .filter(|s| s.radius_kpc > 0.0 && s.v_baryon > 0.0 && s.v_total > 0.0)
        .map(|s| RecomputedRow {
            radius_kpc: s.radius_kpc,
            g_bar: (s.v_baryon * s.v_baryon) / s.radius_kpc,
            g_obs: (s.v_total * s.v_total) / s.radius_kpc,
        })
        .collect()
}

/// Compare the assembled RAR rows for one galaxy against an independent
/// recomputation from its artifact.
///
/// Fatal when the galaxy has no rows in the assembled table: that means the
/// pipeline never produced anything to verify against.
pub fn verify_galaxy(
    rar_table: &[RarPoint],
    curve: &RotationCurve,
    tolerance: f64,
) -> Result<VerifyReport, AppError> {
    let assembled: Vec<RarPoint> = rar_table
        .iter()
        .filter(|p| p.name == curve.name)
        .cloned()
        .collect();

    if assembled.is_empty() {
        return Err(AppError::new(
            3,
            format!("No RAR points found for galaxy: {}", curve.name),
        ));
    }

    let recomputed = recompute_accelerations(curve);
    let compared = assembled.len().min(recomputed.len());

    let mut max_delta_g_bar = 0.0f64;
    let mut max_delta_g_obs = 0.0f64;
    for i in 0..compared {
        max_delta_g_bar = max_delta_g_bar.max((assembled[i].g_bar - recomputed[i].g_bar).abs());
        max_delta_g_obs = max_delta_g_obs.max((assembled[i].g_obs - recomputed[i].g_obs).abs());
    }

    let passed = compared > 0 && max_delta_g_bar < tolerance && max_delta_g_obs < tolerance;

    Ok(VerifyReport {
        galaxy: curve.name.clone(),
        compared,
        max_delta_g_bar,
        max_delta_g_obs,
        tolerance,
        passed,
        assembled,
        recomputed,
    })
}
