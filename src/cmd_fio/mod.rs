//! Subcommand modules for the `featureio` binary.

pub mod fa;
pub mod gene;
