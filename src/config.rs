//! # Distribution Configuration
//!
//! This module defines the typed configuration consumed by the distribution
//! engine, as well as the logic for parsing and validating it.
//!
//! ## Key Components
//!
//! - **`DistributorConfig`**: The whole configuration file: generation
//!   metadata flags, commit settings and the list of distribution targets.
//!
//! - **`DistributionTarget`**: One destination repository. The `type` key is
//!   the registry discriminator used to pick a distributor implementation.
//!
//! - **`CommitSettings`**: Message, optional author identity and signing
//!   policy for the commits created by a publish.
//!
//! ## Validation
//!
//! Parsing rejects unknown keys outright. [`DistributorConfig::validate`]
//! then rejects malformed targets (empty or duplicate aliases, empty URLs,
//! destination paths escaping the repository, option-like values) and
//! discriminators unknown to the registry. Validation happens before any
//! side effect of a distribution run.
//!
//! ```yaml
//! metadata:
//!   date: false
//!   time: true
//! distributors:
//!   - type: git
//!     alias: example-alias
//!     url: https://example.com/org/configs.git
//!     path: out
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::artifact::GenerationMetadata;
use crate::distributor::Registry;
use crate::error::{Error, Result};

/// Commit message used when the configuration does not set one.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update generated configuration";

fn default_true() -> bool {
    true
}

fn default_commit_message() -> String {
    DEFAULT_COMMIT_MESSAGE.to_string()
}

/// A configured destination repository.
///
/// `password` is accepted for completeness, but secrets are better supplied
/// at run time as [`crate::credentials::Credential`]s. The `Debug`
/// implementation never prints it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistributionTarget {
    /// Registry discriminator, e.g. `git`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Unique key used for credential matching.
    pub alias: String,
    /// The remote repository URL, without credentials.
    #[serde(rename = "url")]
    pub remote_url: String,
    /// Directory inside the repository where artifacts are written.
    #[serde(rename = "path", default)]
    pub destination_path: String,
    /// Branch to publish to. The remote's default branch when unset.
    #[serde(default)]
    pub branch: Option<String>,
    /// Username for URL authentication.
    #[serde(default)]
    pub user: Option<String>,
    /// Password or token for URL authentication.
    #[serde(default)]
    pub password: Option<String>,
    /// Whether publishing requires a secret.
    #[serde(default = "default_true")]
    pub auth: bool,
}

impl fmt::Debug for DistributionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributionTarget")
            .field("kind", &self.kind)
            .field("alias", &self.alias)
            .field("remote_url", &self.remote_url)
            .field("destination_path", &self.destination_path)
            .field("branch", &self.branch)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("auth", &self.auth)
            .finish()
    }
}

impl DistributionTarget {
    /// Creates a `git` target with no credentials of its own.
    pub fn git(alias: &str, remote_url: &str, destination_path: &str) -> Self {
        Self {
            kind: "git".to_string(),
            alias: alias.to_string(),
            remote_url: remote_url.to_string(),
            destination_path: destination_path.to_string(),
            branch: None,
            user: None,
            password: None,
            auth: true,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.alias.trim().is_empty() {
            return Err(Error::ConfigParse {
                message: "Distribution target has an empty alias".to_string(),
                hint: Some("Every target needs a unique `alias:`".to_string()),
            });
        }
        if self.remote_url.trim().is_empty() {
            return Err(Error::ConfigParse {
                message: format!("Target '{}' has an empty url", self.alias),
                hint: None,
            });
        }
        if self.remote_url.starts_with('-') {
            return Err(Error::ConfigParse {
                message: format!("Target '{}' has a url starting with '-'", self.alias),
                hint: None,
            });
        }
        if let Some(branch) = &self.branch {
            if branch.trim().is_empty() || branch.starts_with('-') {
                return Err(Error::ConfigParse {
                    message: format!("Target '{}' has an invalid branch '{}'", self.alias, branch),
                    hint: Some("Omit `branch:` to publish to the default branch".to_string()),
                });
            }
        }

        let path = Path::new(&self.destination_path);
        let escapes = path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(Error::ConfigParse {
                message: format!(
                    "Target '{}' has destination path '{}' outside the repository",
                    self.alias, self.destination_path
                ),
                hint: Some("Use a relative path without `..`".to_string()),
            });
        }
        let in_git_dir = path
            .components()
            .any(|c| matches!(c, Component::Normal(part) if part.eq_ignore_ascii_case(".git")));
        if in_git_dir {
            return Err(Error::ConfigParse {
                message: format!(
                    "Target '{}' has destination path '{}' inside the git directory",
                    self.alias, self.destination_path
                ),
                hint: Some("Publish into the working tree, not under `.git`".to_string()),
            });
        }

        Ok(())
    }
}

/// Identity recorded on published commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

/// How published commits are created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitSettings {
    /// The commit message.
    #[serde(default = "default_commit_message")]
    pub message: String,
    /// Author identity. Git's own configuration is used when unset.
    #[serde(default)]
    pub author: Option<CommitAuthor>,
    /// Whether commits should be signed according to git's configuration.
    #[serde(default)]
    pub sign: bool,
}

impl Default for CommitSettings {
    fn default() -> Self {
        Self {
            message: default_commit_message(),
            author: None,
            sign: false,
        }
    }
}

impl CommitSettings {
    /// The `-c key=value` arguments git needs for a commit with these
    /// settings, placed before the `commit` subcommand.
    pub fn git_config_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(author) = &self.author {
            args.push("-c".to_string());
            args.push(format!("user.name={}", author.name));
            args.push("-c".to_string());
            args.push(format!("user.email={}", author.email));
        }
        if !self.sign {
            args.push("-c".to_string());
            args.push("commit.gpgsign=false".to_string());
        }
        args
    }
}

/// The complete distribution configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistributorConfig {
    /// Which generation metadata annotations to append.
    #[serde(default)]
    pub metadata: GenerationMetadata,
    /// How published commits are created.
    #[serde(default)]
    pub commit: CommitSettings,
    /// Publish to all targets concurrently.
    #[serde(default)]
    pub parallel: bool,
    /// Configured distribution targets.
    pub distributors: Vec<DistributionTarget>,
}

impl DistributorConfig {
    /// Validates the configuration against the distributor `registry`.
    pub fn validate(&self, registry: &Registry) -> Result<()> {
        if self.distributors.is_empty() {
            return Err(Error::ConfigParse {
                message: "No distributors configured".to_string(),
                hint: Some("Add at least one entry under `distributors:`".to_string()),
            });
        }
        if self.commit.message.trim().is_empty() {
            return Err(Error::ConfigParse {
                message: "Commit message must not be empty".to_string(),
                hint: None,
            });
        }

        let mut seen = HashSet::new();
        for target in &self.distributors {
            target.validate()?;
            if !seen.insert(target.alias.as_str()) {
                return Err(Error::ConfigParse {
                    message: format!("Duplicate distributor alias '{}'", target.alias),
                    hint: Some("Aliases are used to match credentials and must be unique".to_string()),
                });
            }
            if !registry.contains(&target.kind) {
                return Err(Error::UnknownDistributor {
                    kind: target.kind.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Parses a configuration from a YAML string.
///
/// This only checks the shape of the document; call
/// [`DistributorConfig::validate`] before using the result.
pub fn parse(yaml: &str) -> Result<DistributorConfig> {
    serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: None,
    })
}

/// Reads and parses a configuration file.
pub fn from_file(path: &Path) -> Result<DistributorConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
        message: format!("Cannot read {}: {}", path.display(), e),
        hint: None,
    })?;
    parse(&content)
}
