//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the requested assembly/analysis stage
//! - prints reports
//! - writes optional exports

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;

use crate::analysis::scatter::{ResidualKind, regime_scatter, scatter_report};
use crate::analysis::verify::verify_galaxy;
use crate::cli::{Command, PlotArgs, ScatterArgs, StageArgs, SynthArgs, VerifyArgs};
use crate::domain::RelationConfig;
use crate::error::AppError;
use crate::io::curve::{read_rotation_curve, resolve_curve_path};
use crate::io::tables::{read_btfr_mass_table, read_rar_table};

pub mod pipeline;

/// Entry point for the `rcrel` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Btfr(args) => handle_btfr(&config_from_stage(&args)),
        Command::Mass(args) => handle_mass(&config_from_stage(&args)),
        Command::Rar(args) => handle_rar(&config_from_stage(&args)),
        Command::All(args) => handle_all(&config_from_stage(&args)),
        Command::Scatter(args) => handle_scatter(&args, ResidualKind::Empirical),
        Command::Regimes(args) => handle_regimes(&args),
        Command::Verify(args) => handle_verify(&args),
        Command::PlotBtfr(args) => handle_plot_btfr(&args),
        Command::PlotRar(args) => handle_plot_rar(&args),
        Command::Synth(args) => handle_synth(&args),
        Command::Debug(args) => handle_debug(&config_from_stage(&args)),
    }
}

fn config_from_stage(args: &StageArgs) -> RelationConfig {
    RelationConfig {
        data_dir: args.data_dir.clone(),
        outer_fraction: args.outer_fraction,
        min_samples: args.min_samples,
        gas_helium_factor: args.helium_factor,
        ..RelationConfig::default()
    }
}

fn config_from_scatter(args: &ScatterArgs) -> RelationConfig {
    RelationConfig {
        a0: args.a0,
        regime_inner_max: args.inner_max,
        regime_mid_max: args.mid_max,
        ..config_from_stage(&args.stage)
    }
}

fn handle_btfr(config: &RelationConfig) -> Result<(), AppError> {
    let output = pipeline::run_btfr_stage(config)?;
    println!(
        "{}",
        crate::report::format_btfr_summary(&output, &config.btfr_table_path())
    );
    Ok(())
}

fn handle_mass(config: &RelationConfig) -> Result<(), AppError> {
    let output = pipeline::run_mass_stage(config)?;
    println!(
        "{}",
        crate::report::format_mass_summary(
            output.joined.len(),
            output.input_rows,
            &config.btfr_mass_table_path()
        )
    );
    Ok(())
}

fn handle_rar(config: &RelationConfig) -> Result<(), AppError> {
    let output = pipeline::run_rar_stage(config)?;
    println!(
        "{}",
        crate::report::format_rar_summary(&output, &config.rar_points_path())
    );
    Ok(())
}

fn handle_all(config: &RelationConfig) -> Result<(), AppError> {
    let (btfr, mass, rar) = pipeline::run_all(config)?;
    println!(
        "{}",
        crate::report::format_btfr_summary(&btfr, &config.btfr_table_path())
    );
    println!(
        "{}",
        crate::report::format_mass_summary(
            mass.joined.len(),
            mass.input_rows,
            &config.btfr_mass_table_path()
        )
    );
    println!(
        "{}",
        crate::report::format_rar_summary(&rar, &config.rar_points_path())
    );
    Ok(())
}

fn handle_scatter(args: &ScatterArgs, kind: ResidualKind) -> Result<(), AppError> {
    let config = config_from_scatter(args);
    let points = read_rar_table(&config.rar_points_path())?;

    let report = scatter_report(&points, kind, &config);
    println!(
        "{}",
        crate::report::format_scatter(kind, report.overall.as_ref())
    );

    if let Some(path) = &args.export_summary {
        write_summary_json(path, &report)?;
    }
    Ok(())
}

fn handle_regimes(args: &ScatterArgs) -> Result<(), AppError> {
    let config = config_from_scatter(args);
    let points = read_rar_table(&config.rar_points_path())?;

    let by_regime = regime_scatter(&points, ResidualKind::Raw, &config);
    println!("{}", crate::report::format_regimes(&by_regime, &config));

    if let Some(path) = &args.export_summary {
        let report = scatter_report(&points, ResidualKind::Raw, &config);
        write_summary_json(path, &report)?;
    }
    Ok(())
}

fn handle_verify(args: &VerifyArgs) -> Result<(), AppError> {
    let config = RelationConfig {
        verify_galaxy: args.galaxy.clone(),
        verify_rows: args.rows,
        verify_tolerance: args.tolerance,
        ..config_from_stage(&args.stage)
    };

    let rar_table = read_rar_table(&config.rar_points_path())?;

    // For the verification target, a missing or malformed artifact is fatal:
    // there is nothing meaningful to verify without it.
    let per_galaxy_dir = config.per_galaxy_dir();
    let path = resolve_curve_path(&per_galaxy_dir, &config.verify_galaxy).ok_or_else(|| {
        AppError::new(
            2,
            format!(
                "Missing rotation-curve artifact for {} under '{}'.",
                config.verify_galaxy,
                per_galaxy_dir.display()
            ),
        )
    })?;
    let curve = read_rotation_curve(&path, &config.verify_galaxy).map_err(|reason| {
        AppError::new(
            2,
            format!("Cannot verify {}: {reason}", config.verify_galaxy),
        )
    })?;

    let report = verify_galaxy(&rar_table, &curve, config.verify_tolerance)?;
    println!("{}", crate::report::format_verify(&report, config.verify_rows));
    Ok(())
}

fn handle_plot_btfr(args: &PlotArgs) -> Result<(), AppError> {
    let config = config_from_stage(&args.stage);
    let records = read_btfr_mass_table(&config.btfr_mass_table_path())?;
    let out = args.out.clone().unwrap_or_else(|| config.btfr_plot_path());

    let fit = crate::plot::btfr::render_btfr_plot(&out, &records)?;
    println!("BTFR plot saved to: {}", out.display());
    println!("Fitted slope: {:.4} (n={})", fit.slope, fit.n);
    Ok(())
}

fn handle_plot_rar(args: &PlotArgs) -> Result<(), AppError> {
    let config = config_from_stage(&args.stage);
    let points = read_rar_table(&config.rar_points_path())?;
    let out = args.out.clone().unwrap_or_else(|| config.rar_plot_path());

    let plotted = crate::plot::rar::render_rar_plot(&out, &points, args.a0)?;
    println!("RAR plot saved to: {}", out.display());
    println!("Points plotted: {plotted}");
    Ok(())
}

fn handle_synth(args: &SynthArgs) -> Result<(), AppError> {
    let config = config_from_stage(&args.stage);
    let synth = crate::data::synth::SynthConfig {
        galaxies: args.galaxies,
        samples_per_galaxy: args.samples,
        seed: args.seed,
    };
    let fleet = crate::data::synth::generate_fleet(&synth)?;
    crate::data::synth::write_fleet(&config.data_dir, &fleet)?;
    println!(
        "Synthetic fleet written to {}: {} galaxies x {} samples (seed {})",
        config.data_dir.display(),
        args.galaxies,
        args.samples,
        args.seed
    );
    Ok(())
}

fn handle_debug(config: &RelationConfig) -> Result<(), AppError> {
    let path = crate::debug::write_debug_bundle(config)?;
    println!("Debug bundle written to: {}", path.display());
    Ok(())
}

fn write_summary_json<T: serde::Serialize>(path: &PathBuf, report: &T) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create summary JSON '{}': {e}", path.display()),
        )
    })?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::new(2, format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}
