//! CLI module
//!
//! Command-line interface for downloading World Bank indicators.
//! Records are printed as JSON lines, or stored in DuckDB with `--database`.

mod commands;
mod runner;

pub use commands::{Cli, OutputFormat};
pub use runner::Runner;

#[cfg(test)]
mod tests;
