//! CLI module for storedq
//!
//! Provides command-line interface for:
//! - query: One-shot stored query execution
//! - list: Registered stored queries
//! - ensure: Collection index check

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_registry, ensure, list, query, run, run_command};
pub use config::ServiceConfig;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
