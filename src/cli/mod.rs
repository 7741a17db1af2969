//! Command-line interface
//!
//! - check: load and cross-check the registry and dataset
//! - translate: print the plan (or explain text) for a query string
//! - fetch: execute a query string against the dataset and print the document

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{run, run_command, Config, Session};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_json, write_response, write_text};
