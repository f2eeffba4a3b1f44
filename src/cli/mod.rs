//! CLI module for OTFC
//!
//! Provides command-line interface for:
//! - serve: Register predicates and serve the REST API
//! - predicates: Print registered predicate descriptors
//! - compute: One-shot batch computation from stdin

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{compute, compute_with, predicates, predicates_with, run, run_command, serve, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_json};
