//! # Publish Command Implementation
//!
//! This module implements the `publish` subcommand, the main entry point of
//! the tool. It loads the distribution configuration, reads the generated
//! artifacts from disk, sources credentials from environment variables and
//! hands everything to the distribution engine.
//!
//! ## Credentials
//!
//! Secrets are never passed on the command line. `--credential ALIAS=ENV_VAR`
//! names the environment variable holding the secret for a target, and
//! `--user ALIAS=USER` optionally supplies the user name to pair with it.
//!
//! ## Exit status
//!
//! Every target is attempted. The command fails if any target failed, after
//! reporting the outcome of all of them.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use serde_json::json;

use git_distributor::artifact::{CommentSyntax, GeneratedArtifact};
use git_distributor::config;
use git_distributor::credentials::Credential;
use git_distributor::distributor::Registry;
use git_distributor::orchestrator::{DistributionRun, Orchestrator};
use git_distributor::output::{marker, outcome, Marker, OutputConfig};

/// Publish generated artifacts to the configured git repositories
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Path to the distribution configuration file.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "distributors.yaml",
        env = "GIT_DISTRIBUTOR_CONFIG"
    )]
    pub config: PathBuf,

    /// Generated artifact to publish. The file name provides the artifact
    /// name and extension. Can be repeated.
    #[arg(short, long = "artifact", value_name = "PATH", required = true)]
    pub artifacts: Vec<PathBuf>,

    /// Line comment prefix used for metadata annotations.
    #[arg(long, value_name = "PREFIX", default_value = "//")]
    pub comment_prefix: String,

    /// Comment suffix appended to metadata annotations (e.g. ` */`).
    #[arg(long, value_name = "SUFFIX", default_value = "")]
    pub comment_suffix: String,

    /// Read the secret for a target from an environment variable. Can be repeated.
    #[arg(long = "credential", value_name = "ALIAS=ENV_VAR")]
    pub credentials: Vec<String>,

    /// User name to pair with a target's secret. Can be repeated.
    #[arg(long = "user", value_name = "ALIAS=USER")]
    pub users: Vec<String>,

    /// Append a generation date annotation (in addition to the configuration).
    #[arg(long)]
    pub date: bool,

    /// Append a generation time annotation (in addition to the configuration).
    #[arg(long)]
    pub time: bool,

    /// Publish to all targets concurrently.
    #[arg(long)]
    pub parallel: bool,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Splits `ALIAS=VALUE`.
fn split_pair<'a>(flag: &str, spec: &'a str) -> Result<(&'a str, &'a str)> {
    match spec.split_once('=') {
        Some((alias, value)) if !alias.is_empty() && !value.is_empty() => Ok((alias, value)),
        _ => bail!("Invalid {} '{}': expected ALIAS=VALUE", flag, spec),
    }
}

/// Builds credentials from `ALIAS=ENV_VAR` and `ALIAS=USER` specs.
///
/// `lookup` resolves environment variable names; a variable that is not set
/// is an error here rather than a missing credential later.
pub fn parse_credentials<F>(specs: &[String], users: &[String], lookup: F) -> Result<Vec<Credential>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut user_by_alias = HashMap::new();
    for spec in users {
        let (alias, user) = split_pair("--user", spec)?;
        user_by_alias.insert(alias, user);
    }

    let mut credentials = Vec::with_capacity(specs.len());
    for spec in specs {
        let (alias, variable) = split_pair("--credential", spec)?;
        if credentials.iter().any(|c: &Credential| c.alias == alias) {
            bail!("Duplicate --credential for '{}'", alias);
        }
        let secret = lookup(variable).ok_or_else(|| {
            anyhow!(
                "Environment variable '{}' for credential '{}' is not set",
                variable,
                alias
            )
        })?;
        credentials.push(Credential::new(alias, user_by_alias.remove(alias), &secret));
    }

    if let Some(alias) = user_by_alias.keys().next() {
        bail!("--user given for '{}' without a matching --credential", alias);
    }
    Ok(credentials)
}

/// Reads an artifact file, taking its name and extension from the file name.
fn read_artifact(path: &Path, comment: &CommentSyntax) -> Result<GeneratedArtifact> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("Artifact path has no file name: {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("Artifact has no extension: {}", path.display()))?;
    let content = fs::read(path).with_context(|| format!("Failed to read artifact {}", path.display()))?;
    Ok(GeneratedArtifact::new(name, extension, content, comment.clone()))
}

fn print_report(out: &OutputConfig, run: &DistributionRun) {
    for target in &run.report.targets {
        println!("{} {}", marker(out, Marker::Target), target.alias);
        for artifact in &target.artifacts {
            println!("   {} {}", artifact.artifact, outcome(out, artifact.outcome));
        }
    }
    for failure in &run.failures {
        println!(
            "{} {}: {}",
            marker(out, Marker::Error),
            failure.alias,
            failure.error
        );
    }
    println!(
        "\n{} {} committed, {} unchanged, {} target(s) failed",
        marker(out, Marker::Info),
        run.report.committed(),
        run.report.unchanged(),
        run.failures.len()
    );
}

fn print_json(run: &DistributionRun) -> Result<()> {
    let failures: Vec<_> = run
        .failures
        .iter()
        .map(|f| json!({ "alias": f.alias, "error": f.error.to_string() }))
        .collect();
    let document = json!({
        "targets": run.report.targets,
        "failures": failures,
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

/// Execute the `publish` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: PublishArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let mut config = config::from_file(&args.config)?;
    config.metadata.include_date |= args.date;
    config.metadata.include_time |= args.time;
    config.parallel |= args.parallel;

    let comment = CommentSyntax::new(&args.comment_prefix, &args.comment_suffix);
    let artifacts = args
        .artifacts
        .iter()
        .map(|path| read_artifact(path, &comment))
        .collect::<Result<Vec<_>>>()?;
    let credentials = parse_credentials(&args.credentials, &args.users, |name| env::var(name).ok())?;

    if !args.json {
        println!(
            "{} Publishing {} artifact(s) to {} target(s)",
            marker(&out, Marker::Run),
            artifacts.len(),
            config.distributors.len()
        );
    }

    let registry = Registry::with_defaults();
    let run = Orchestrator::new(&config, &registry).run(&artifacts, &credentials)?;

    if args.json {
        print_json(&run)?;
    } else {
        print_report(&out, &run);
    }

    let failed = run.failures.len();
    run.into_result()
        .map(|_| ())
        .with_context(|| format!("{} target(s) failed to publish", failed))
}
