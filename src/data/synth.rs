//! Seeded synthetic fleet generation.
//!
//! Writes the same artifact layout the real pipeline consumes: a fleet
//! summary, a galaxy mass table, and one rotation-curve artifact per galaxy.
//! Curves follow a saturating profile `v(r) = v_flat * (1 - exp(-r/r_d))`
//! with mild Gaussian noise; masses follow a slope-4 BTFR with scatter, so
//! downstream fits land near familiar values. Fully deterministic for a
//! given seed.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{MassRecord, RcSample, RotationCurve};
use crate::error::AppError;

/// Log-space scatter (dex) applied to the synthetic baryonic masses.
const MASS_SCATTER_DEX: f64 = 0.08;

/// Relative velocity noise on each rotation-curve sample.
const VELOCITY_NOISE_REL: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub galaxies: usize,
    pub samples_per_galaxy: usize,
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub struct SynthGalaxy {
    pub mass: MassRecord,
    pub curve: RotationCurve,
}

/// Generate a deterministic synthetic fleet.
pub fn generate_fleet(config: &SynthConfig) -> Result<Vec<SynthGalaxy>, AppError> {
    if config.galaxies == 0 {
        return Err(AppError::new(2, "Synthetic galaxy count must be > 0."));
    }
    if config.samples_per_galaxy < 5 {
        return Err(AppError::new(
            2,
            "Synthetic curves need at least 5 samples per galaxy.",
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut fleet = Vec::with_capacity(config.galaxies);
    for i in 0..config.galaxies {
        let name = format!("SYN{:04}", i + 1);

        // Flat velocity between ~50 and ~250 km/s, log-uniform.
        let log_v = rng.gen_range(1.7..2.4);
        let v_flat = 10f64.powf(log_v);

        // Slope-4 BTFR with scatter: log M_b = 4 log V + 2.
        let log_m = 4.0 * log_v + 2.0 + MASS_SCATTER_DEX * noise.sample(&mut rng);
        let m_b = 10f64.powf(log_m);

        // Split M_b into stellar and helium-corrected gas shares.
        let gas_share = rng.gen_range(0.1..0.5);
        let mgas = gas_share * m_b / 1.33;
        let mstar = (1.0 - gas_share) * m_b;

        let r_d = rng.gen_range(1.5..4.0);
        let r_max = rng.gen_range(12.0..30.0);

        let samples = (1..=config.samples_per_galaxy)
            .map(|j| {
                let r = r_max * j as f64 / config.samples_per_galaxy as f64;
                let profile = 1.0 - (-r / r_d).exp();
                let jitter = 1.0 + VELOCITY_NOISE_REL * noise.sample(&mut rng);
                let v_total = (v_flat * profile * jitter).max(1.0);
                // Baryons dominate inside the disk scale length and fall off
                // outward.
                let v_baryon = (v_total * (r_d / (r_d + r)).sqrt()).max(0.5);
                RcSample {
                    radius_kpc: r,
                    v_baryon,
                    v_total,
                }
            })
            .collect();

        fleet.push(SynthGalaxy {
            mass: MassRecord {
                name: name.clone(),
                mstar,
                mgas,
            },
            curve: RotationCurve { name, samples },
        });
    }

    Ok(fleet)
}

/// Write a synthetic fleet in the layout the pipeline consumes.
pub fn write_fleet(data_dir: &Path, fleet: &[SynthGalaxy]) -> Result<(), AppError> {
    let per_galaxy_dir = data_dir.join("per_galaxy");
    create_dir_all(&per_galaxy_dir).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create '{}': {e}", per_galaxy_dir.display()),
        )
    })?;

    let summary_path = data_dir.join("fleet_summary_compact.csv");
    let mut summary = File::create(&summary_path)
        .map_err(|e| AppError::new(2, format!("Failed to create fleet summary: {e}")))?;
    writeln!(summary, "name")
        .map_err(|e| AppError::new(2, format!("Failed to write fleet summary: {e}")))?;

    let mass_path = data_dir.join("galaxies.csv");
    let mut masses = File::create(&mass_path)
        .map_err(|e| AppError::new(2, format!("Failed to create mass table: {e}")))?;
    writeln!(masses, "name,Mstar,Mgas")
        .map_err(|e| AppError::new(2, format!("Failed to write mass table: {e}")))?;

    for galaxy in fleet {
        let name = &galaxy.curve.name;
        writeln!(summary, "{name}")
            .map_err(|e| AppError::new(2, format!("Failed to write fleet summary: {e}")))?;
        writeln!(
            masses,
            "{name},{:.6e},{:.6e}",
            galaxy.mass.mstar, galaxy.mass.mgas
        )
        .map_err(|e| AppError::new(2, format!("Failed to write mass table: {e}")))?;

        let curve_path = per_galaxy_dir.join(format!("rc_decomp_{name}_best.csv"));
        let mut curve = File::create(&curve_path).map_err(|e| {
            AppError::new(2, format!("Failed to create '{}': {e}", curve_path.display()))
        })?;
        writeln!(curve, "radius_kpc,V_baryon,V_total")
            .map_err(|e| AppError::new(2, format!("Failed to write curve: {e}")))?;
        for s in &galaxy.curve.samples {
            writeln!(curve, "{:.6},{:.6},{:.6}", s.radius_kpc, s.v_baryon, s.v_total)
                .map_err(|e| AppError::new(2, format!("Failed to write curve: {e}")))?;
        }
    }

    Ok(())
}
