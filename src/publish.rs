//! # Change Detection and Publishing
//!
//! The [`Committer`] writes a finalised artifact into a working copy and,
//! only when the bytes differ from what the cloned branch tip already holds,
//! stages, commits and pushes it.
//!
//! ## Process
//!
//! 1. Finalise the artifact bytes (metadata annotations sampled once).
//! 2. Compute `root / destination_path / name.extension`, creating
//!    intermediate directories. The path must stay inside the clone and
//!    must not pass through a symbolic link checked out from the remote.
//! 3. Compare with the current file byte for byte; a missing file always
//!    differs.
//! 4. Identical: report [`PublishOutcome::NoChange`] without touching git.
//! 5. Different: overwrite, `git add`, check that something is actually
//!    staged, `git commit`, `git push`.
//!
//! Each git step runs exactly once. A failed commit or push is reported as
//! [`Error::PublishFailed`]; the working copy is discarded by its owner, so
//! no staged state outlives the attempt.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use log::{debug, info};
use serde::Serialize;

use crate::artifact::{GeneratedArtifact, GenerationMetadata};
use crate::command::CommandExecutor;
use crate::config::{CommitSettings, DistributionTarget};
use crate::credentials::AuthenticatedUrl;
use crate::error::{Error, Result};
use crate::working_copy::WorkingCopy;

/// Result of publishing one artifact to one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishOutcome {
    /// A new commit was pushed.
    Committed,
    /// The destination already held identical content.
    NoChange,
}

impl std::fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishOutcome::Committed => f.write_str("committed"),
            PublishOutcome::NoChange => f.write_str("no change"),
        }
    }
}

/// Path of `file_name` relative to the repository root.
pub fn relative_destination(target: &DistributionTarget, file_name: &str) -> PathBuf {
    Path::new(&target.destination_path).join(file_name)
}

/// Fails unless `relative` names a location inside `root` reached without
/// following a symbolic link.
///
/// Checks every existing component, the file itself included. Components
/// that do not exist yet are created as plain directories by the caller.
pub fn check_destination(root: &Path, relative: &Path) -> Result<()> {
    let mut current = root.to_path_buf();
    let mut exists = true;
    for component in relative.components() {
        match component {
            Component::Normal(part) => current.push(part),
            Component::CurDir => continue,
            _ => {
                return Err(Error::Filesystem {
                    message: format!("Destination {} leaves the working copy", relative.display()),
                })
            }
        }
        if !exists {
            continue;
        }
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(Error::Filesystem {
                    message: format!(
                        "Cannot write {} through symbolic link {}",
                        relative.display(),
                        current.strip_prefix(root).unwrap_or(&current).display()
                    ),
                });
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => exists = false,
            Err(e) => {
                return Err(Error::Filesystem {
                    message: format!("Cannot inspect {}: {}", current.display(), e),
                })
            }
        }
    }
    Ok(())
}

/// Stages, commits and pushes artifacts inside working copies.
pub struct Committer<'a> {
    executor: &'a dyn CommandExecutor,
    url: &'a AuthenticatedUrl,
    settings: &'a CommitSettings,
}

impl<'a> Committer<'a> {
    pub fn new(
        executor: &'a dyn CommandExecutor,
        url: &'a AuthenticatedUrl,
        settings: &'a CommitSettings,
    ) -> Self {
        Self {
            executor,
            url,
            settings,
        }
    }

    /// Finalises `artifact` with the current local time and publishes it.
    pub fn publish(
        &self,
        copy: &WorkingCopy,
        target: &DistributionTarget,
        artifact: &GeneratedArtifact,
        metadata: &GenerationMetadata,
    ) -> Result<PublishOutcome> {
        self.publish_at(copy, target, artifact, metadata, Local::now().naive_local())
    }

    /// Like [`Committer::publish`], with the annotation instant given.
    pub fn publish_at(
        &self,
        copy: &WorkingCopy,
        target: &DistributionTarget,
        artifact: &GeneratedArtifact,
        metadata: &GenerationMetadata,
        now: NaiveDateTime,
    ) -> Result<PublishOutcome> {
        let relative = relative_destination(target, &artifact.checked_file_name()?);
        let bytes = artifact.finalize(metadata, now);
        self.publish_bytes(copy, target, &relative, &bytes)
    }

    fn publish_bytes(
        &self,
        copy: &WorkingCopy,
        target: &DistributionTarget,
        relative: &Path,
        bytes: &[u8],
    ) -> Result<PublishOutcome> {
        let destination = copy.root().join(relative);
        let fs_error = |action: &str, e: std::io::Error| Error::Filesystem {
            message: format!("Cannot {} {}: {}", action, relative.display(), e),
        };

        check_destination(copy.root(), relative)?;
        match fs::read(&destination) {
            Ok(existing) if existing == bytes => {
                info!(
                    "'{}': {} is unchanged, nothing to publish",
                    target.alias,
                    relative.display()
                );
                return Ok(PublishOutcome::NoChange);
            }
            Ok(_) => debug!("'{}': {} differs", target.alias, relative.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("'{}': {} does not exist yet", target.alias, relative.display())
            }
            Err(e) => return Err(fs_error("read", e)),
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| fs_error("create the directory of", e))?;
        }
        fs::write(&destination, bytes).map_err(|e| fs_error("write", e))?;

        let relative_str = relative.to_string_lossy().into_owned();
        self.run(copy, target, "add", &["add", "--", relative_str.as_str()])?;

        // Git's own normalisation (e.g. line endings) may leave nothing staged.
        let staged = copy.git(
            self.executor,
            &["diff", "--cached", "--quiet", "--", relative_str.as_str()],
        )?;
        match staged.exit_code {
            0 => {
                info!(
                    "'{}': {} is unchanged after staging, nothing to publish",
                    target.alias,
                    relative.display()
                );
                return Ok(PublishOutcome::NoChange);
            }
            1 => {}
            _ => return Err(self.failure(target, "diff", &staged.stderr)),
        }

        let config_args = self.settings.git_config_args();
        let mut commit_args: Vec<&str> = config_args.iter().map(String::as_str).collect();
        commit_args.extend(["commit", "--quiet", "-m", self.settings.message.as_str()]);
        self.run(copy, target, "commit", &commit_args)?;

        let refspec = target
            .branch
            .as_ref()
            .map_or_else(|| "HEAD".to_string(), |b| format!("HEAD:refs/heads/{}", b));
        debug!("'{}': pushing {} to {}", target.alias, refspec, self.url);
        let mut push_args = self.url.git_config_args().to_vec();
        push_args.extend(["push", "--quiet", self.url.expose(), refspec.as_str()]);
        self.run(copy, target, "push", &push_args)?;

        info!(
            "'{}': published {} to {}",
            target.alias,
            relative.display(),
            self.url
        );
        Ok(PublishOutcome::Committed)
    }

    fn run(&self, copy: &WorkingCopy, target: &DistributionTarget, command: &str, args: &[&str]) -> Result<()> {
        let result = copy.git(self.executor, args)?;
        if result.success() {
            Ok(())
        } else {
            Err(self.failure(target, command, &result.stderr))
        }
    }

    fn failure(&self, target: &DistributionTarget, command: &str, stderr: &str) -> Error {
        Error::PublishFailed {
            alias: target.alias.clone(),
            command: command.to_string(),
            stderr: self.url.redact(stderr.trim()),
        }
    }
}
