//! # Distribution Orchestrator
//!
//! Drives a complete distribution run: validates the configuration, builds
//! one distributor per target through the [`Registry`], publishes every
//! artifact to every target and aggregates the outcome.
//!
//! ## Failure isolation
//!
//! A failure aborts only the target it happened on. All remaining targets
//! are still attempted; once every target has run, the failures are returned
//! together as [`Error::DistributionFailed`]. Nothing is retried here.
//!
//! Artifacts a failed target published before its failure stay in the
//! report, since their commits are already on the remote.
//!
//! ## Parallelism
//!
//! With `parallel: true` targets are attempted concurrently using rayon.
//! Each attempt owns its working copy, so nothing is shared between them
//! except the remote repositories themselves.

use std::sync::Arc;

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::artifact::{GeneratedArtifact, GenerationMetadata};
use crate::command::{CommandExecutor, SystemExecutor};
use crate::config::DistributorConfig;
use crate::credentials::Credential;
use crate::distributor::{Distributor, DistributorContext, Registry};
use crate::error::{Error, Result, TargetFailure};
use crate::publish::PublishOutcome;

/// Outcome of one artifact on one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    /// `name.extension` of the artifact.
    pub artifact: String,
    pub outcome: PublishOutcome,
}

/// Outcomes of all artifacts on one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    pub alias: String,
    pub artifacts: Vec<ArtifactReport>,
}

/// Outcomes of every artifact that was published, per target.
///
/// A failed target appears only if it published something before failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DistributionReport {
    pub targets: Vec<TargetReport>,
}

impl DistributionReport {
    /// Number of artifacts that produced a new commit.
    pub fn committed(&self) -> usize {
        self.count(PublishOutcome::Committed)
    }

    /// Number of artifacts whose destination was already up to date.
    pub fn unchanged(&self) -> usize {
        self.count(PublishOutcome::NoChange)
    }

    fn count(&self, outcome: PublishOutcome) -> usize {
        self.targets
            .iter()
            .flat_map(|t| &t.artifacts)
            .filter(|a| a.outcome == outcome)
            .count()
    }
}

/// Successes and failures of a run in which every target was attempted.
#[derive(Debug, Default)]
pub struct DistributionRun {
    pub report: DistributionReport,
    pub failures: Vec<TargetFailure>,
}

impl DistributionRun {
    /// The report, or [`Error::DistributionFailed`] if any target failed.
    pub fn into_result(self) -> Result<DistributionReport> {
        if self.failures.is_empty() {
            Ok(self.report)
        } else {
            Err(Error::DistributionFailed {
                failures: self.failures,
            })
        }
    }
}

/// Publishes generated artifacts to every configured target.
pub struct Orchestrator<'a> {
    config: &'a DistributorConfig,
    registry: &'a Registry,
    executor: Arc<dyn CommandExecutor>,
}

impl<'a> Orchestrator<'a> {
    /// An orchestrator running the system `git` client.
    pub fn new(config: &'a DistributorConfig, registry: &'a Registry) -> Self {
        Self::with_executor(config, registry, Arc::new(SystemExecutor))
    }

    /// An orchestrator using a custom executor.
    pub fn with_executor(
        config: &'a DistributorConfig,
        registry: &'a Registry,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            config,
            registry,
            executor,
        }
    }

    /// Attempts every target and collects successes and failures.
    ///
    /// Only an invalid configuration is reported as an immediate error,
    /// before any target is touched.
    pub fn run(&self, artifacts: &[GeneratedArtifact], credentials: &[Credential]) -> Result<DistributionRun> {
        self.config.validate(self.registry)?;

        let context = DistributorContext {
            executor: self.executor.clone(),
            commit: self.config.commit.clone(),
        };
        let distributors = self
            .config
            .distributors
            .iter()
            .map(|target| self.registry.create(target.clone(), &context))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Distributing {} artifact(s) to {} target(s)",
            artifacts.len(),
            distributors.len()
        );

        let metadata = &self.config.metadata;
        let attempt = |distributor: &Box<dyn Distributor>| {
            distribute_target(distributor.as_ref(), artifacts, metadata, credentials)
        };
        let results: Vec<(String, (TargetReport, Option<Error>))> = if self.config.parallel {
            distributors
                .par_iter()
                .map(|d| (d.alias().to_string(), attempt(d)))
                .collect()
        } else {
            distributors
                .iter()
                .map(|d| (d.alias().to_string(), attempt(d)))
                .collect()
        };

        let mut run = DistributionRun::default();
        for (alias, (report, failure)) in results {
            match failure {
                None => run.report.targets.push(report),
                Some(error) => {
                    warn!("Distribution to '{}' failed: {}", alias, error);
                    if !report.artifacts.is_empty() {
                        run.report.targets.push(report);
                    }
                    run.failures.push(TargetFailure { alias, error });
                }
            }
        }
        Ok(run)
    }

    /// Like [`Orchestrator::run`], failing if any target failed.
    pub fn distribute(&self, artifacts: &[GeneratedArtifact], credentials: &[Credential]) -> Result<DistributionReport> {
        self.run(artifacts, credentials)?.into_result()
    }
}

/// Publishes every artifact to one target, stopping at its first failure.
///
/// Returns the outcomes of the artifacts published so far together with
/// the failure, if any.
fn distribute_target(
    distributor: &dyn Distributor,
    artifacts: &[GeneratedArtifact],
    metadata: &GenerationMetadata,
    credentials: &[Credential],
) -> (TargetReport, Option<Error>) {
    let mut report = TargetReport {
        alias: distributor.alias().to_string(),
        artifacts: Vec::with_capacity(artifacts.len()),
    };
    for artifact in artifacts {
        let outcome = match distributor.publish(artifact, metadata, credentials) {
            Ok(outcome) => outcome,
            Err(error) => return (report, Some(error)),
        };
        info!("'{}': {} {}", report.alias, artifact.file_name(), outcome);
        report.artifacts.push(ArtifactReport {
            artifact: artifact.file_name(),
            outcome,
        });
    }
    (report, None)
}

/// Publishes `artifacts` to every target of `config` with the built-in
/// distributors and the system `git` client.
pub fn distribute(
    config: &DistributorConfig,
    artifacts: &[GeneratedArtifact],
    credentials: &[Credential],
) -> Result<DistributionReport> {
    let registry = Registry::with_defaults();
    Orchestrator::new(config, &registry).distribute(artifacts, credentials)
}
