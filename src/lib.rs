//! `rc-relations` library crate.
//!
//! The binary (`rcrel`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (e.g., future notebooks, batch drivers)
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod assemble;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
