//! # Git Distributor CLI
//!
//! This is the binary entry point for the `git-distributor` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging.
//! - Sourcing credentials from the environment, the only place this happens.
//! - Handling top-level errors and translating them into a non-zero exit.
//!
//! The distribution engine lives in the `git_distributor` library crate; the
//! binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
