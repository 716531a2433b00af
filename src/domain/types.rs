//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during assembly and analysis
//! - exported to CSV/JSON
//! - reloaded later for plotting or verification

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Gas mass multiplier accounting for primordial helium (SPARC convention).
///
/// `M_b = Mstar + 1.33 * Mgas`. A domain constant, not a tunable.
pub const DEFAULT_GAS_HELIUM_FACTOR: f64 = 1.33;

/// Fraction of a curve's rows (by position) *excluded* from the flat-velocity
/// slice; the trailing `1 - outer_fraction` share is used.
pub const DEFAULT_OUTER_FRACTION: f64 = 0.8;

/// Minimum sample count for a galaxy to enter the BTFR table at all.
pub const DEFAULT_MIN_SAMPLES: usize = 5;

/// Characteristic acceleration scale of the empirical RAR, in m/s².
pub const DEFAULT_A0: f64 = 1.2e-10;

/// Inner/mid regime cut on normalized radius.
pub const DEFAULT_REGIME_INNER_MAX: f64 = 0.3;

/// Mid/outer regime cut on normalized radius.
pub const DEFAULT_REGIME_MID_MAX: f64 = 0.7;

/// 1 (km/s)²/kpc expressed in m/s².
pub const ACCEL_SI_PER_NATURAL: f64 = 3.24078e-14;

/// Maximum absolute discrepancy tolerated by the single-galaxy verification.
pub const DEFAULT_VERIFY_TOLERANCE: f64 = 1e-10;

/// Rows displayed by the single-galaxy verification.
pub const DEFAULT_VERIFY_ROWS: usize = 10;

/// Default verification target.
pub const DEFAULT_VERIFY_GALAXY: &str = "NGC3198";

/// Canonical slope of the standard BTFR, drawn as a reference line.
pub const REFERENCE_BTFR_SLOPE: f64 = 4.0;

/// One radius/velocity sample of a galaxy's rotation-curve decomposition.
///
/// Velocities are model outputs in km/s; the radius is in kpc. Rows are kept
/// in file order; nothing downstream assumes they are sorted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RcSample {
    pub radius_kpc: f64,
    pub v_baryon: f64,
    pub v_total: f64,
}

/// A full per-galaxy rotation curve as read from a frozen artifact.
#[derive(Debug, Clone)]
pub struct RotationCurve {
    pub name: String,
    pub samples: Vec<RcSample>,
}

impl RotationCurve {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum sampled radius over the *unfiltered* curve.
    pub fn max_radius(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.radius_kpc)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// One row of the galaxy mass table (`galaxies.csv`).
#[derive(Debug, Clone)]
pub struct MassRecord {
    pub name: String,
    pub mstar: f64,
    pub mgas: f64,
}

impl MassRecord {
    /// Baryonic mass including the helium correction on the gas term.
    pub fn baryonic_mass(&self, gas_helium_factor: f64) -> f64 {
        self.mstar + gas_helium_factor * self.mgas
    }
}

/// A BTFR row as written by the assembler (`btfr_table.csv`).
///
/// `m_b` is a NaN placeholder until the mass-attach stage fills it in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BtfrRecord {
    pub name: String,
    #[serde(rename = "M_b")]
    pub m_b: f64,
    #[serde(rename = "V_flat")]
    pub v_flat: f64,
}

/// A BTFR row after the baryonic-mass inner join (`btfr_table_with_mass.csv`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BtfrMassRecord {
    pub name: String,
    #[serde(rename = "V_flat")]
    pub v_flat: f64,
    #[serde(rename = "M_b")]
    pub m_b: f64,
}

/// One Radial Acceleration Relation point (`rar_points.csv`).
///
/// Accelerations are in natural units, (km/s)²/kpc. `r_frac` is the sample's
/// radius normalized by the galaxy's maximum *unfiltered* radius, so it lies
/// in (0, 1] for every surviving row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RarPoint {
    pub name: String,
    pub g_bar: f64,
    pub g_obs: f64,
    pub r_frac: f64,
}

/// Why a galaxy (or artifact) was excluded from a stage's output.
///
/// Skips are never fatal; they are collected into the stage summary so the
/// final completeness count reflects them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No `rc_decomp_{name}_best.csv` / `.dat` artifact on disk.
    MissingCurve,
    /// Fewer rows than the BTFR minimum.
    TooFewSamples(usize),
    /// Artifact lacks one of `radius_kpc`/`R_kpc`, `V_baryon`, `V_total`.
    MissingColumns,
    /// Maximum sampled radius is zero or negative.
    NonPositiveMaxRadius,
    /// Artifact exists but could not be read as CSV.
    UnreadableCurve(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingCurve => write!(f, "no rotation-curve artifact"),
            SkipReason::TooFewSamples(n) => write!(f, "only {n} samples"),
            SkipReason::MissingColumns => write!(f, "missing required columns"),
            SkipReason::NonPositiveMaxRadius => write!(f, "non-positive maximum radius"),
            SkipReason::UnreadableCurve(msg) => write!(f, "unreadable artifact: {msg}"),
        }
    }
}

/// Per-stage completeness accounting.
#[derive(Debug, Clone, Default)]
pub struct StageSummary {
    /// Records that made it into the output.
    pub processed: usize,
    /// Denominator reported to the user (full fleet size for BTFR, artifact
    /// count for RAR).
    pub total: usize,
    /// Excluded records with their reasons, in encounter order.
    pub skipped: Vec<(String, SkipReason)>,
}

impl StageSummary {
    pub fn record_skip(&mut self, name: impl Into<String>, reason: SkipReason) {
        self.skipped.push((name.into(), reason));
    }
}

/// Radius-based regime of a RAR point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Inner,
    Mid,
    Outer,
}

impl Regime {
    pub const ALL: [Regime; 3] = [Regime::Inner, Regime::Mid, Regime::Outer];

    /// Classify a normalized radius. The partition is exhaustive and disjoint:
    /// inner `< inner_max`, mid `[inner_max, mid_max)`, outer `>= mid_max`.
    pub fn classify(r_frac: f64, config: &RelationConfig) -> Regime {
        if r_frac < config.regime_inner_max {
            Regime::Inner
        } else if r_frac < config.regime_mid_max {
            Regime::Mid
        } else {
            Regime::Outer
        }
    }

    pub fn label(self, config: &RelationConfig) -> String {
        match self {
            Regime::Inner => format!("Inner (r < {})", config.regime_inner_max),
            Regime::Mid => format!(
                "Mid ({}-{})",
                config.regime_inner_max, config.regime_mid_max
            ),
            Regime::Outer => format!("Outer (r >= {})", config.regime_mid_max),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// Every former hardcoded constant lives here as a named field; the CLI layer
/// fills it from flags whose defaults match the historical literals.
#[derive(Debug, Clone)]
pub struct RelationConfig {
    /// Root of the frozen model outputs (fleet summary, mass table, tables,
    /// and the `per_galaxy/` artifact directory).
    pub data_dir: PathBuf,

    pub outer_fraction: f64,
    pub min_samples: usize,
    pub gas_helium_factor: f64,

    pub a0: f64,
    pub regime_inner_max: f64,
    pub regime_mid_max: f64,

    pub verify_galaxy: String,
    pub verify_rows: usize,
    pub verify_tolerance: f64,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/h1_frozen_results"),
            outer_fraction: DEFAULT_OUTER_FRACTION,
            min_samples: DEFAULT_MIN_SAMPLES,
            gas_helium_factor: DEFAULT_GAS_HELIUM_FACTOR,
            a0: DEFAULT_A0,
            regime_inner_max: DEFAULT_REGIME_INNER_MAX,
            regime_mid_max: DEFAULT_REGIME_MID_MAX,
            verify_galaxy: DEFAULT_VERIFY_GALAXY.to_string(),
            verify_rows: DEFAULT_VERIFY_ROWS,
            verify_tolerance: DEFAULT_VERIFY_TOLERANCE,
        }
    }
}

impl RelationConfig {
    /// Directory holding the per-galaxy rotation-curve artifacts.
    pub fn per_galaxy_dir(&self) -> PathBuf {
        self.data_dir.join("per_galaxy")
    }

    pub fn fleet_summary_path(&self) -> PathBuf {
        self.data_dir.join("fleet_summary_compact.csv")
    }

    pub fn mass_table_path(&self) -> PathBuf {
        self.data_dir.join("galaxies.csv")
    }

    pub fn btfr_table_path(&self) -> PathBuf {
        self.data_dir.join("btfr_table.csv")
    }

    pub fn btfr_mass_table_path(&self) -> PathBuf {
        self.data_dir.join("btfr_table_with_mass.csv")
    }

    pub fn rar_points_path(&self) -> PathBuf {
        self.data_dir.join("rar_points.csv")
    }

    pub fn btfr_plot_path(&self) -> PathBuf {
        self.data_dir.join("btfr_signature.png")
    }

    pub fn rar_plot_path(&self) -> PathBuf {
        self.data_dir.join("rar_diagnostic.png")
    }

    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regime_partition_is_exhaustive_and_disjoint() {
        let config = RelationConfig::default();
        for &r in &[0.0, 0.1, 0.29999, 0.3, 0.5, 0.69999, 0.7, 0.9, 1.0] {
            let hits = Regime::ALL
                .into_iter()
                .filter(|regime| Regime::classify(r, &config) == *regime)
                .count();
            assert_eq!(hits, 1, "r_frac={r} fell into {hits} regimes");
        }
        assert_eq!(Regime::classify(0.3, &config), Regime::Mid);
        assert_eq!(Regime::classify(0.7, &config), Regime::Outer);
    }

    #[test]
    fn baryonic_mass_formula() {
        let record = MassRecord {
            name: "G1".to_string(),
            mstar: 1.0e9,
            mgas: 2.0e8,
        };
        let m_b = record.baryonic_mass(DEFAULT_GAS_HELIUM_FACTOR);
        assert!((m_b - (1.0e9 + 1.33 * 2.0e8)).abs() < 1e-3);
    }

    #[test]
    fn max_radius_over_unfiltered_samples() {
        let curve = RotationCurve {
            name: "G1".to_string(),
            samples: vec![
                RcSample { radius_kpc: 2.0, v_baryon: 10.0, v_total: 20.0 },
                RcSample { radius_kpc: 5.0, v_baryon: -1.0, v_total: 20.0 },
                RcSample { radius_kpc: 3.0, v_baryon: 10.0, v_total: 20.0 },
            ],
        };
        assert_eq!(curve.max_radius(), 5.0);
    }
}
