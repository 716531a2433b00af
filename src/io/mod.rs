//! Input/output helpers.
//!
//! - per-galaxy rotation-curve artifacts: resolution, discovery, parsing (`curve`)
//! - flat tables: fleet summary, mass table, BTFR/RAR tables (`tables`)

pub mod curve;
pub mod tables;

pub use curve::*;
pub use tables::*;
