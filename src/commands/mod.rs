//! # CLI Command Implementations
//!
//! Each subcommand of the `git-distributor` command-line tool lives in its
//! own file and contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and calls into the
//!   `git_distributor` library.

pub mod completions;
pub mod publish;
pub mod validate;
