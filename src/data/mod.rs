//! Synthetic input generation for end-to-end smoke tests.

pub mod synth;

pub use synth::*;
