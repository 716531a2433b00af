//! Read-only analyses over the assembled RAR table.
//!
//! - scatter diagnostics, overall and by radial regime (`scatter`)
//! - single-galaxy consistency verification (`verify`)

pub mod scatter;
pub mod verify;

pub use scatter::*;
pub use verify::*;
