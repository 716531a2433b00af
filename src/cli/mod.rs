//! Command-line parsing for the scaling-relations post-processor.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the assembly/analysis code. Every historical
//! hardcoded constant is a flag here, with the old literal as its default.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    DEFAULT_A0, DEFAULT_GAS_HELIUM_FACTOR, DEFAULT_MIN_SAMPLES, DEFAULT_OUTER_FRACTION,
    DEFAULT_REGIME_INNER_MAX, DEFAULT_REGIME_MID_MAX, DEFAULT_VERIFY_GALAXY,
    DEFAULT_VERIFY_ROWS, DEFAULT_VERIFY_TOLERANCE,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "rcrel",
    version,
    about = "Rotation-curve scaling relations (BTFR / RAR) post-processor"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands, one per pipeline stage.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assemble the BTFR table from frozen per-galaxy rotation curves.
    Btfr(StageArgs),
    /// Attach baryonic masses to the BTFR table (inner join on `name`).
    Mass(StageArgs),
    /// Assemble the RAR points table from every artifact on disk.
    Rar(StageArgs),
    /// Run btfr -> mass -> rar in order.
    All(StageArgs),
    /// Scatter of RAR residuals against the empirical curve.
    Scatter(ScatterArgs),
    /// Raw RAR residual scatter split by radial regime.
    Regimes(ScatterArgs),
    /// Re-derive one galaxy's accelerations and compare with the RAR table.
    Verify(VerifyArgs),
    /// Render the BTFR signature plot (PNG).
    PlotBtfr(PlotArgs),
    /// Render the RAR diagnostic plot (PNG).
    PlotRar(PlotArgs),
    /// Generate a synthetic fleet for end-to-end smoke testing.
    Synth(SynthArgs),
    /// Write a markdown bundle describing the on-disk artifact state.
    Debug(StageArgs),
}

/// Options shared by the assembly stages.
#[derive(Debug, Args, Clone)]
pub struct StageArgs {
    /// Root of the frozen model outputs.
    #[arg(long, default_value = "data/h1_frozen_results")]
    pub data_dir: PathBuf,

    /// Leading fraction of rows excluded from the flat-velocity slice.
    #[arg(long, default_value_t = DEFAULT_OUTER_FRACTION)]
    pub outer_fraction: f64,

    /// Minimum rotation-curve samples for a galaxy to enter the BTFR table.
    #[arg(long, default_value_t = DEFAULT_MIN_SAMPLES)]
    pub min_samples: usize,

    /// Gas mass multiplier for primordial helium.
    #[arg(long, default_value_t = DEFAULT_GAS_HELIUM_FACTOR)]
    pub helium_factor: f64,
}

/// Options for the scatter diagnostics.
#[derive(Debug, Args, Clone)]
pub struct ScatterArgs {
    #[command(flatten)]
    pub stage: StageArgs,

    /// Characteristic acceleration of the empirical RAR (m/s^2).
    #[arg(long, default_value_t = DEFAULT_A0)]
    pub a0: f64,

    /// Inner/mid regime cut on normalized radius.
    #[arg(long, default_value_t = DEFAULT_REGIME_INNER_MAX)]
    pub inner_max: f64,

    /// Mid/outer regime cut on normalized radius.
    #[arg(long, default_value_t = DEFAULT_REGIME_MID_MAX)]
    pub mid_max: f64,

    /// Also write the scatter report as JSON.
    #[arg(long, value_name = "JSON")]
    pub export_summary: Option<PathBuf>,
}

/// Options for the single-galaxy verification.
#[derive(Debug, Args, Clone)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub stage: StageArgs,

    /// Galaxy to verify.
    #[arg(long, default_value = DEFAULT_VERIFY_GALAXY)]
    pub galaxy: String,

    /// Number of rows to display from each derivation.
    #[arg(long, default_value_t = DEFAULT_VERIFY_ROWS)]
    pub rows: usize,

    /// Maximum absolute discrepancy for a PASS.
    #[arg(long, default_value_t = DEFAULT_VERIFY_TOLERANCE)]
    pub tolerance: f64,
}

/// Options for plot rendering.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub stage: StageArgs,

    /// Output PNG path (defaults to a canonical name inside the data dir).
    #[arg(long, value_name = "PNG")]
    pub out: Option<PathBuf>,

    /// Characteristic acceleration of the empirical RAR overlay (m/s^2).
    #[arg(long, default_value_t = DEFAULT_A0)]
    pub a0: f64,
}

/// Options for synthetic fleet generation.
#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    #[command(flatten)]
    pub stage: StageArgs,

    /// Number of synthetic galaxies.
    #[arg(short = 'n', long, default_value_t = 12)]
    pub galaxies: usize,

    /// Rotation-curve samples per galaxy.
    #[arg(long, default_value_t = 24)]
    pub samples: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
