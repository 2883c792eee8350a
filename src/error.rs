//! # Error Handling
//!
//! This module defines the centralized error type for the `git-distributor`
//! library. It uses the `thiserror` library to describe every anticipated
//! failure mode of a distribution run with enough context (target alias,
//! captured stderr) to diagnose a failure without leaking secrets.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the library.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Errors raised while talking to a remote carry text that has already been
//! scrubbed of credentials by [`crate::credentials::AuthenticatedUrl::redact`].
//! Nothing in this module ever formats a plaintext secret.

use thiserror::Error;

/// A single failed distribution target, as collected by the orchestrator.
#[derive(Debug)]
pub struct TargetFailure {
    /// Alias of the distribution target that failed.
    pub alias: String,
    /// The error that aborted the target.
    pub error: Error,
}

impl std::fmt::Display for TargetFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.alias, self.error)
    }
}

/// Main error type for git-distributor operations
#[derive(Error, Debug)]
pub enum Error {
    /// No usable secret exists for a target that requires authentication.
    #[error("Missing credential for distribution target '{alias}'\n  hint: supply a credential with alias '{alias}' or set `auth: false` for public remotes")]
    MissingCredential { alias: String },

    /// The remote URL of a target cannot carry credentials.
    #[error("Invalid remote URL for distribution target '{alias}': {message}")]
    InvalidRemoteUrl { alias: String, message: String },

    /// Cloning the destination repository exited with a non-zero code.
    ///
    /// `url` is always the redacted form of the remote URL.
    #[error("Git clone failed for '{alias}' ({url}): {stderr}")]
    CloneFailed {
        alias: String,
        url: String,
        stderr: String,
    },

    /// Staging, committing or pushing exited with a non-zero code.
    #[error("Publishing to '{alias}' failed during `git {command}`: {stderr}")]
    PublishFailed {
        alias: String,
        command: String,
        stderr: String,
    },

    /// The ephemeral working copy or the destination file could not be
    /// created or written.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An error occurred while parsing or validating the distribution
    /// configuration.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// No distributor is registered for the configured discriminator.
    #[error("Unknown distributor type '{kind}'")]
    UnknownDistributor { kind: String },

    /// One or more targets failed after every target had been attempted.
    #[error("Distribution failed for {} target(s):\n{}", failures.len(), failures.iter().map(|f| format!("  - {}", f)).collect::<Vec<_>>().join("\n"))]
    DistributionFailed { failures: Vec<TargetFailure> },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
