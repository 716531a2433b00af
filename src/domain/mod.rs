//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - rotation-curve samples and per-galaxy curves (`RcSample`, `RotationCurve`)
//! - derived scaling-relation records (`BtfrRecord`, `BtfrMassRecord`, `RarPoint`)
//! - per-record skip accounting (`SkipReason`, `StageSummary`)
//! - the run configuration (`RelationConfig`)

pub mod types;

pub use types::*;
