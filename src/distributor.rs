//! # Distributors and the Distributor Registry
//!
//! A [`Distributor`] publishes generated artifacts to one configured target.
//! The [`Registry`] maps the `type` discriminator of a configured target to a
//! factory building the matching implementation; configuration validation
//! consults it so unknown types are rejected before anything runs.
//!
//! [`GitDistributor`] is the built-in implementation registered as `git`.
//! For every artifact it performs one complete, isolated attempt:
//!
//! 1. resolve credentials into an authenticated URL,
//! 2. clone into a fresh working copy,
//! 3. publish through the [`Committer`],
//! 4. discard the working copy.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::artifact::{GeneratedArtifact, GenerationMetadata};
use crate::command::CommandExecutor;
use crate::config::{CommitSettings, DistributionTarget};
use crate::credentials::{self, Credential};
use crate::error::{Error, Result};
use crate::publish::{Committer, PublishOutcome};
use crate::working_copy::with_clone;

/// Publishes artifacts to a single distribution target.
pub trait Distributor: Send + Sync {
    /// Alias of the target this distributor publishes to.
    fn alias(&self) -> &str;

    /// Publishes one artifact in a single attempt.
    fn publish(
        &self,
        artifact: &GeneratedArtifact,
        metadata: &GenerationMetadata,
        credentials: &[Credential],
    ) -> Result<PublishOutcome>;
}

/// Shared collaborators handed to every distributor factory.
#[derive(Clone)]
pub struct DistributorContext {
    pub executor: Arc<dyn CommandExecutor>,
    pub commit: CommitSettings,
}

/// Builds a distributor for a validated target.
pub type Factory = fn(DistributionTarget, &DistributorContext) -> Box<dyn Distributor>;

/// Maps `type` discriminators to distributor factories.
#[derive(Clone, Default)]
pub struct Registry {
    factories: BTreeMap<String, Factory>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `git` distributor.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(GitDistributor::KIND, GitDistributor::factory);
        registry
    }

    /// Registers `factory` for `kind`, replacing any previous entry.
    pub fn register(&mut self, kind: &str, factory: Factory) {
        self.factories.insert(kind.to_string(), factory);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered discriminators in sorted order.
    pub fn kinds(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Builds the distributor for `target`.
    pub fn create(&self, target: DistributionTarget, context: &DistributorContext) -> Result<Box<dyn Distributor>> {
        let factory = self
            .factories
            .get(&target.kind)
            .ok_or_else(|| Error::UnknownDistributor {
                kind: target.kind.clone(),
            })?;
        Ok(factory(target, context))
    }
}

/// Publishes to a git repository through the system `git` client.
pub struct GitDistributor {
    target: DistributionTarget,
    commit: CommitSettings,
    executor: Arc<dyn CommandExecutor>,
}

impl GitDistributor {
    /// Registry discriminator of this distributor.
    pub const KIND: &'static str = "git";

    pub fn new(target: DistributionTarget, commit: CommitSettings, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            target,
            commit,
            executor,
        }
    }

    fn factory(target: DistributionTarget, context: &DistributorContext) -> Box<dyn Distributor> {
        Box::new(Self::new(target, context.commit.clone(), context.executor.clone()))
    }
}

impl Distributor for GitDistributor {
    fn alias(&self) -> &str {
        &self.target.alias
    }

    fn publish(
        &self,
        artifact: &GeneratedArtifact,
        metadata: &GenerationMetadata,
        credentials: &[Credential],
    ) -> Result<PublishOutcome> {
        let url = credentials::resolve(&self.target, credentials)?;
        let executor = self.executor.as_ref();
        debug!(
            "'{}': publishing {} to {}",
            self.target.alias,
            artifact.file_name(),
            url
        );

        with_clone(
            executor,
            &self.target.alias,
            &url,
            self.target.branch.as_deref(),
            |copy| Committer::new(executor, &url, &self.commit).publish(copy, &self.target, artifact, metadata),
        )
    }
}
