//! CLI argument definitions using clap
//!
//! Commands:
//! - jsonapi-query check --config <path>
//! - jsonapi-query translate --config <path> --type <schema> [--explain] <query>
//! - jsonapi-query fetch --config <path> --type <schema> <query>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Translate JSON:API query parameters into relational query plans
#[derive(Parser, Debug)]
#[command(name = "jsonapi-query")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate the registry (and dataset, when configured)
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./jsonapi-query.json")]
        config: PathBuf,
    },

    /// Print the query plan for a query string
    Translate {
        /// Path to configuration file
        #[arg(long, default_value = "./jsonapi-query.json")]
        config: PathBuf,

        /// Root schema name or resource type
        #[arg(long = "type")]
        resource: String,

        /// Print a readable plan instead of JSON
        #[arg(long)]
        explain: bool,

        /// Query string, e.g. 'filter[age]=gte:10&sort=-age'
        #[arg(default_value = "")]
        query: String,
    },

    /// Execute a query string against the configured dataset
    Fetch {
        /// Path to configuration file
        #[arg(long, default_value = "./jsonapi-query.json")]
        config: PathBuf,

        /// Root schema name or resource type
        #[arg(long = "type")]
        resource: String,

        /// Query string
        #[arg(default_value = "")]
        query: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
