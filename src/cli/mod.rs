//! CLI module
//!
//! Command-line interface for running sources.
//!
//! # Commands
//!
//! - `spec` - Show the configuration schema
//! - `check` - Test connection to the API
//! - `discover` - List available streams with schemas
//! - `streams` - List stream names (lightweight)
//! - `read` - Extract data from streams
//! - `list` - List registered sources

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
