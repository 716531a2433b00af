//! Small numeric helpers.
//!
//! - robust summary statistics (`stats`)
//! - least-squares line fitting (`ols`)

pub mod ols;
pub mod stats;

pub use ols::*;
pub use stats::*;
