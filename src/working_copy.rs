//! # Working Copies
//!
//! A [`WorkingCopy`] is a fresh clone of a destination repository inside a
//! private temporary directory. It belongs to exactly one publish attempt and
//! is removed, together with everything inside it, when it is dropped. That
//! covers success, the no-change path, every error and unwinding alike.
//!
//! The clone uses the authenticated URL. Right after cloning, `origin` is
//! reset to the credential-free URL so the secret does not sit in
//! `.git/config` while the attempt runs; pushes pass the authenticated URL
//! explicitly instead.

use std::path::Path;

use log::debug;
use tempfile::TempDir;

use crate::command::{CommandExecutor, CommandResult};
use crate::credentials::AuthenticatedUrl;
use crate::error::{Error, Result};

/// Prefix of the temporary directories holding working copies.
const TEMP_PREFIX: &str = "git-distributor-";

/// An ephemeral clone of a destination repository.
#[derive(Debug)]
pub struct WorkingCopy {
    dir: TempDir,
    alias: String,
}

impl WorkingCopy {
    /// Clones `url` (optionally only `branch`) into a new temporary
    /// directory.
    ///
    /// A non-zero exit from `git clone` becomes [`Error::CloneFailed`] with
    /// the captured stderr, scrubbed of the secret. The temporary directory
    /// is already gone when this returns an error.
    pub fn clone_remote(
        executor: &dyn CommandExecutor,
        alias: &str,
        url: &AuthenticatedUrl,
        branch: Option<&str>,
    ) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir()
            .map_err(|e| Error::Filesystem {
                message: format!("Cannot create working copy for '{}': {}", alias, e),
            })?;
        let root = dir.path().to_string_lossy().into_owned();

        let mut args = url.git_config_args().to_vec();
        args.extend(["clone", "--single-branch"]);
        if let Some(branch) = branch {
            args.extend(["--branch", branch]);
        }
        args.extend(["--", url.expose(), root.as_str()]);

        debug!("Cloning {} for '{}' into {}", url, alias, root);
        let result = executor.execute("git", &args, None)?;
        if !result.success() {
            return Err(Error::CloneFailed {
                alias: alias.to_string(),
                url: url.to_string(),
                stderr: url.redact(result.stderr.trim()),
            });
        }

        let copy = Self {
            dir,
            alias: alias.to_string(),
        };

        if url.is_authenticated() {
            let result = copy.git(executor, &["remote", "set-url", "origin", url.public_url()])?;
            if !result.success() {
                return Err(Error::CloneFailed {
                    alias: alias.to_string(),
                    url: url.to_string(),
                    stderr: url.redact(result.stderr.trim()),
                });
            }
        }

        Ok(copy)
    }

    /// The root directory of the clone.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Alias of the target this working copy was cloned for.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Runs a git subcommand inside the working copy.
    pub fn git(&self, executor: &dyn CommandExecutor, args: &[&str]) -> Result<CommandResult> {
        executor.execute("git", args, Some(self.root()))
    }
}

/// Clones `url`, hands the working copy to `f` and removes it afterwards,
/// whatever `f` returns.
pub fn with_clone<T, F>(
    executor: &dyn CommandExecutor,
    alias: &str,
    url: &AuthenticatedUrl,
    branch: Option<&str>,
    f: F,
) -> Result<T>
where
    F: FnOnce(&WorkingCopy) -> Result<T>,
{
    let copy = WorkingCopy::clone_remote(executor, alias, url, branch)?;
    let root = copy.root().to_path_buf();
    let result = f(&copy);
    drop(copy);
    debug!("Removed working copy {}", root.display());
    result
}
