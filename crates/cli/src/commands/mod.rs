//! CLI subcommand implementations.

pub mod jobs;
pub mod migrate;
