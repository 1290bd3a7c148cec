//! presence: trace replay and report formatting shared by the CLI and its tests

pub mod format;
pub mod simulate;
pub mod trace;
