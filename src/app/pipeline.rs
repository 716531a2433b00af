//! Shared stage orchestration used by the CLI front-end.
//!
//! Each stage reads its inputs, computes, and fully overwrites its output
//! table, so re-running a stage on unchanged inputs is idempotent. Keeping
//! the stage functions here lets the CLI focus on presentation (printing the
//! formatted summaries).

use crate::assemble::btfr::{BtfrOutput, assemble_btfr_from_dir};
use crate::assemble::mass::attach_baryonic_mass;
use crate::assemble::rar::{RarOutput, assemble_rar};
use crate::domain::{BtfrMassRecord, RelationConfig};
use crate::error::AppError;
use crate::io::tables::{
    read_btfr_table, read_mass_table, write_btfr_mass_table, write_btfr_table, write_rar_table,
};

/// Output of the mass-attach stage.
#[derive(Debug, Clone)]
pub struct MassStageOutput {
    pub joined: Vec<BtfrMassRecord>,
    /// Row count of the BTFR table the join started from.
    pub input_rows: usize,
}

/// Assemble the BTFR table and write it.
pub fn run_btfr_stage(config: &RelationConfig) -> Result<BtfrOutput, AppError> {
    let output = assemble_btfr_from_dir(config)?;
    write_btfr_table(&config.btfr_table_path(), &output.records)?;
    Ok(output)
}

/// Join baryonic masses onto the BTFR table and write the result.
pub fn run_mass_stage(config: &RelationConfig) -> Result<MassStageOutput, AppError> {
    let btfr = read_btfr_table(&config.btfr_table_path())?;
    let masses = read_mass_table(&config.mass_table_path())?;
    let joined = attach_baryonic_mass(&btfr, &masses, config.gas_helium_factor);
    write_btfr_mass_table(&config.btfr_mass_table_path(), &joined)?;
    Ok(MassStageOutput {
        input_rows: btfr.len(),
        joined,
    })
}

/// Assemble the RAR points table and write it.
pub fn run_rar_stage(config: &RelationConfig) -> Result<RarOutput, AppError> {
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
    let output = assemble_rar(&per_galaxy_dir)?;
    write_rar_table(&config.rar_points_path(), &output.points)?;
    Ok(output)
}

/// Run the three assembly stages in dependency order.
pub fn run_all(
    config: &RelationConfig,
) -> Result<(BtfrOutput, MassStageOutput, RarOutput), AppError> {
    let btfr = run_btfr_stage(config)?;
    let mass = run_mass_stage(config)?;
    let rar = run_rar_stage(config)?;
    Ok((btfr, mass, rar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synth::{SynthConfig, generate_fleet, write_fleet};
    use std::path::PathBuf;

    fn temp_data_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rcrel-pipe-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn end_to_end_example_matches_hand_computation() {
        // Fleet of one galaxy: radius 1..10, V_baryon=50, V_total=100.
        let dir = temp_data_dir("example");
        let per_galaxy = dir.join("per_galaxy");
        std::fs::create_dir_all(&per_galaxy).unwrap();
        std::fs::write(dir.join("fleet_summary_compact.csv"), "name\nG1\n").unwrap();
        std::fs::write(dir.join("galaxies.csv"), "name,Mstar,Mgas\nG1,1e9,1e8\n").unwrap();
        let mut body = String::from("radius_kpc,V_baryon,V_total\n");
        for r in 1..=10 {
            body.push_str(&format!("{r}.0,50.0,100.0\n"));
        }
        std::fs::write(per_galaxy.join("rc_decomp_G1_best.csv"), body).unwrap();

        let config = RelationConfig::default().with_data_dir(&dir);
        let (btfr, mass, rar) = run_all(&config).unwrap();

        assert_eq!(btfr.records.len(), 1);
        assert_eq!(btfr.records[0].name, "G1");
        assert_eq!(btfr.records[0].v_flat, 100.0);

        assert_eq!(mass.joined.len(), 1);
        assert_eq!(mass.joined[0].m_b, 1e9 + 1.33 * 1e8);

        assert_eq!(rar.points.len(), 10);
        for (i, p) in rar.points.iter().enumerate() {
            let r = (i + 1) as f64;
            assert_eq!(p.g_bar, 2500.0 / r);
            assert_eq!(p.g_obs, 10000.0 / r);
            assert_eq!(p.r_frac, r / 10.0);
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rerunning_stages_is_byte_identical() {
        let dir = temp_data_dir("idem");
        let fleet = generate_fleet(&SynthConfig {
            galaxies: 5,
            samples_per_galaxy: 12,
            seed: 9,
        })
        .unwrap();
        write_fleet(&dir, &fleet).unwrap();

        let config = RelationConfig::default().with_data_dir(&dir);
        run_all(&config).unwrap();
        let btfr_first = std::fs::read_to_string(config.btfr_table_path()).unwrap();
        let rar_first = std::fs::read_to_string(config.rar_points_path()).unwrap();

        run_all(&config).unwrap();
        let btfr_second = std::fs::read_to_string(config.btfr_table_path()).unwrap();
        let rar_second = std::fs::read_to_string(config.rar_points_path()).unwrap();

        assert_eq!(btfr_first, btfr_second);
        assert_eq!(rar_first, rar_second);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn synthetic_fleet_flows_through_every_stage() {
        let dir = temp_data_dir("synth");
        let fleet = generate_fleet(&SynthConfig {
            galaxies: 8,
            samples_per_galaxy: 20,
            seed: 1234,
        })
        .unwrap();
        write_fleet(&dir, &fleet).unwrap();

        let config = RelationConfig::default().with_data_dir(&dir);
        let (btfr, mass, rar) = run_all(&config).unwrap();

        assert_eq!(btfr.summary.total, 8);
        assert_eq!(btfr.records.len(), 8);
        assert_eq!(mass.joined.len(), 8);
        assert_eq!(rar.summary.processed, 8);
        assert_eq!(rar.points.len(), 8 * 20);
        assert!(rar.points.iter().all(|p| p.r_frac > 0.0 && p.r_frac <= 1.0));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_fleet_summary_aborts_the_btfr_stage() {
        let dir = temp_data_dir("missing");
        std::fs::create_dir_all(dir.join("per_galaxy")).unwrap();
        let config = RelationConfig::default().with_data_dir(&dir);
        let err = run_btfr_stage(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        // No partial output.
        assert!(!config.btfr_table_path().exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
