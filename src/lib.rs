//! # Git Distributor Library
//!
//! This library publishes generated configuration artifacts to one or more
//! git repositories. It is designed to be used by the `git-distributor`
//! command-line tool but can also be embedded in any generator that needs to
//! push its output somewhere.
//!
//! A publish only creates a commit when the artifact actually changed, so
//! running it repeatedly with identical output leaves the remote untouched.
//!
//! ## Quick Example
//!
//! ```
//! use git_distributor::config;
//! use git_distributor::credentials::{self, Credential};
//! use git_distributor::distributor::Registry;
//!
//! let config = config::parse(r#"
//! metadata:
//!   time: true
//! distributors:
//!   - type: git
//!     alias: example-alias
//!     url: https://example.com/org/configs.git
//!     path: out
//! "#).unwrap();
//! config.validate(&Registry::with_defaults()).unwrap();
//!
//! let credential = Credential::new("example-alias", None, "TOKEN");
//! let url = credentials::resolve(&config.distributors[0], &[credential]).unwrap();
//! assert_eq!(url.expose(), "https://TOKEN@example.com/org/configs.git");
//! assert!(!url.to_string().contains("TOKEN"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Command execution (`command`)**: Runs `git` as a child process behind
//!   the [`command::CommandExecutor`] trait so tests can script it.
//! - **Credentials (`credentials`)**: Turns a target plus run-time credentials
//!   into an authenticated URL that redacts itself everywhere except in the
//!   clone and push argument lists.
//! - **Working copies (`working_copy`)**: A temporary clone per attempt that
//!   is removed however the attempt ends.
//! - **Publishing (`publish`, `artifact`)**: Finalises an artifact with
//!   optional date/time annotations, compares it with the cloned file and
//!   commits and pushes only on change.
//! - **Distribution (`distributor`, `orchestrator`)**: Builds one distributor
//!   per configured target and aggregates per-target failures.
//!
//! Credentials are never read from the environment or from disk by this
//! library; callers pass them in explicitly.

pub mod artifact;
pub mod command;
pub mod config;
pub mod credentials;
pub mod distributor;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod publish;
pub mod working_copy;

pub use error::{Error, Result};
pub use orchestrator::distribute;

#[cfg(test)]
mod credentials_proptest;
#[cfg(test)]
mod test_support;
