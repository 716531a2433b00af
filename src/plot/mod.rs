//! Diagnostic figure rendering (PNG via the plotters bitmap backend).
//!
//! - BTFR log-log scatter with fitted and reference slopes (`btfr`)
//! - RAR log-log scatter with Newtonian and empirical overlays (`rar`)

pub mod btfr;
pub mod rar;

pub use btfr::*;
pub use rar::*;

use crate::error::AppError;

pub(crate) fn plot_err(e: impl std::fmt::Display) -> AppError {
    AppError::new(4, format!("Plot rendering failed: {e}"))
}
