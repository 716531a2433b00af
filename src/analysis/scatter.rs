//! RAR scatter diagnostics.
//!
//! Two residual definitions are supported, matching the two historical
//! diagnostics:
//!
//! - **empirical**: `log10(g_obs) - log10(g_rar)` where
//!   `g_rar = g_bar / (1 - exp(-sqrt(g_bar / a0)))` with fixed `a0`
//! - **raw**: `log10(g_obs) - log10(g_bar)`, used for the per-regime split
//!
//! Both report RMS and median-absolute residual in dex. Regimes with zero
//! points are omitted from the report, not reported as zero.

use serde::Serialize;

use crate::domain::{RarPoint, Regime, RelationConfig};
use crate::math::stats::{median_abs, rms};

/// Scatter metrics over one set of log residuals.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScatterStats {
    pub n: usize,
    /// RMS of the log residuals (dex).
    pub rms: f64,
    /// Median absolute log residual (dex).
    pub median_abs: f64,
}

/// Which curve the residuals are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidualKind {
    /// Against the fitted empirical RAR curve.
    Empirical,
    /// Against `g_bar` directly (Newtonian 1:1 expectation).
    Raw,
}

/// The empirical RAR prediction for a baryonic acceleration.
pub fn empirical_rar(g_bar: f64, a0: f64) -> f64 {
    g_bar / (1.0 - (-(g_bar / a0).sqrt()).exp())
}

/// Log residuals for positive-acceleration points; non-positive rows are
/// dropped first (safety filter, mirrors the assembler's final filter).
pub fn log_residuals(points: &[RarPoint], kind: ResidualKind, a0: f64) -> Vec<f64> {
    points
        .iter()
        .filter(|p| p.g_bar > 0.0 && p.g_obs > 0.0)
        .map(|p| {
            let reference = match kind {
                ResidualKind::Empirical => empirical_rar(p.g_bar, a0),
                ResidualKind::Raw => p.g_bar,
            };
            p.g_obs.log10() - reference.log10()
        })
        .collect()
}

/// Summarize a residual vector. `None` when it is empty.
pub fn scatter_stats(residuals: &[f64]) -> Option<ScatterStats> {
    Some(ScatterStats {
        n: residuals.len(),
        rms: rms(residuals)?,
        median_abs: median_abs(residuals)?,
    })
}

/// Overall scatter for the whole table.
pub fn overall_scatter(
    points: &[RarPoint],
    kind: ResidualKind,
    config: &RelationConfig,
) -> Option<ScatterStats> {
    scatter_stats(&log_residuals(points, kind, config.a0))
}

/// Scatter per radial regime. Empty regimes are absent from the result.
pub fn regime_scatter(
    points: &[RarPoint],
    kind: ResidualKind,
    config: &RelationConfig,
) -> Vec<(Regime, ScatterStats)> {
    Regime::ALL
        .into_iter()
        .filter_map(|regime| {
            let subset: Vec<RarPoint> = points
                .iter()
                .filter(|p| Regime::classify(p.r_frac, config) == regime)
                .cloned()
                .collect();
            let stats = scatter_stats(&log_residuals(&subset, kind, config.a0))?;
            Some((regime, stats))
        })
        .collect()
}

/// Machine-readable scatter report for the optional JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterReport {
    pub kind: ResidualKind,
    pub a0: f64,
    pub overall: Option<ScatterStats>,
    pub regimes: Vec<RegimeEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegimeEntry {
    pub regime: String,
    #[serde(flatten)]
    pub stats: ScatterStats,
}

/// Build the full report (overall + regimes) for one residual kind.
pub fn scatter_report(
    points: &[RarPoint],
    kind: ResidualKind,
    config: &RelationConfig,
) -> ScatterReport {
    ScatterReport {
        kind,
        a0: config.a0,
        overall: overall_scatter(points, kind, config),
        regimes: regime_scatter(points, kind, config)
            .into_iter()
            .map(|(regime, stats)| RegimeEntry {
                regime: regime.label(config),
                stats,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(g_bar: f64, g_obs: f64, r_frac: f64) -> RarPoint {
        RarPoint {
            name: "G".to_string(),
            g_bar,
            g_obs,
            r_frac,
        }
    }

    #[test]
    fn raw_residual_is_log_ratio() {
        let points = vec![point(10.0, 100.0, 0.5)];
        let residuals = log_residuals(&points, ResidualKind::Raw, 1.2e-10);
        assert_eq!(residuals.len(), 1);
        assert!((residuals[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empirical_curve_limits() {
        let a0 = 1.2e-10;
        // Deep Newtonian regime: g_rar -> g_bar.
        let high = empirical_rar(1e-6, a0);
        assert!((high / 1e-6 - 1.0).abs() < 1e-6);
        // Deep low-acceleration regime: g_rar -> sqrt(g_bar * a0).
        let g = 1e-16;
        let low = empirical_rar(g, a0);
        assert!((low / (g * a0).sqrt() - 1.0).abs() < 1e-2);
    }

    #[test]
    fn zero_residual_on_the_empirical_curve() {
        let a0 = 1.2e-10;
        let g_bar = 3.0e-11;
        let points = vec![point(g_bar, empirical_rar(g_bar, a0), 0.5)];
        let residuals = log_residuals(&points, ResidualKind::Empirical, a0);
        assert!(residuals[0].abs() < 1e-12);
    }

    #[test]
    fn non_positive_points_are_filtered() {
        let points = vec![point(0.0, 10.0, 0.5), point(10.0, -1.0, 0.5)];
        assert!(log_residuals(&points, ResidualKind::Raw, 1.2e-10).is_empty());
        assert!(scatter_stats(&[]).is_none());
    }

    #[test]
    fn empty_regimes_are_omitted() {
        let config = RelationConfig::default();
        // Only outer points.
        let points = vec![point(10.0, 20.0, 0.8), point(10.0, 20.0, 0.95)];
        let by_regime = regime_scatter(&points, ResidualKind::Raw, &config);
        assert_eq!(by_regime.len(), 1);
        assert_eq!(by_regime[0].0, Regime::Outer);
        assert_eq!(by_regime[0].1.n, 2);
    }

    #[test]
    fn regime_split_covers_every_point_once() {
        let config = RelationConfig::default();
        let points: Vec<RarPoint> = (1..=10)
            .map(|i| point(10.0, 20.0, i as f64 / 10.0))
            .collect();
        let by_regime = regime_scatter(&points, ResidualKind::Raw, &config);
        let total: usize = by_regime.iter().map(|(_, s)| s.n).sum();
        assert_eq!(total, points.len());
    }
}
