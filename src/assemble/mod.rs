//! Scaling-relation assembly.
//!
//! Responsibilities:
//!
//! - reduce each galaxy's outer rotation curve to one flat velocity (`btfr`)
//! - join baryonic masses onto the BTFR table (`mass`)
//! - expand rotation curves into acceleration pairs (`rar`)

pub mod btfr;
pub mod mass;
pub mod rar;

pub use btfr::*;
pub use mass::*;
pub use rar::*;
