//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which parses and
//! validates a distribution configuration file without contacting any
//! remote. It reports every target it would publish to.
//!
//! Secrets configured inline are never printed; the summary only says
//! whether one is present.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use git_distributor::config::{self, DistributorConfig};
use git_distributor::distributor::Registry;
use git_distributor::output::{marker, Marker, OutputConfig};

/// Validate a distribution configuration file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the distribution configuration file to validate.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "distributors.yaml",
        env = "GIT_DISTRIBUTOR_CONFIG"
    )]
    pub config: PathBuf,
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn print_summary(out: &OutputConfig, config: &DistributorConfig) {
    println!("\n{} Configuration Summary:", marker(out, Marker::Info));
    println!("   Distributors: {}", config.distributors.len());
    println!("   Date annotation: {}", yes_no(config.metadata.include_date));
    println!("   Time annotation: {}", yes_no(config.metadata.include_time));
    println!("   Parallel: {}", yes_no(config.parallel));
    println!("   Commit message: {}", config.commit.message);

    for target in &config.distributors {
        println!(
            "\n   {} {} ({})",
            marker(out, Marker::Target),
            target.alias,
            target.kind
        );
        println!("      url: {}", target.remote_url);
        println!("      path: {}", target.destination_path);
        if let Some(branch) = &target.branch {
            println!("      branch: {}", branch);
        }
        if let Some(user) = &target.user {
            println!("      user: {}", user);
        }
        println!("      auth: {}", yes_no(target.auth));
        if target.password.is_some() {
            println!("      password: configured");
        }
    }
}

/// Execute the `validate` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config_path = &args.config;
    println!(
        "{} Validating configuration: {}",
        marker(&out, Marker::Scan),
        config_path.display()
    );

    let config = match config::from_file(config_path) {
        Ok(config) => {
            println!(
                "{} Configuration file parsed successfully",
                marker(&out, Marker::Ok)
            );
            config
        }
        Err(e) => {
            println!(
                "{} Configuration parsing failed: {}",
                marker(&out, Marker::Error),
                e
            );
            return Err(anyhow::anyhow!("Configuration parsing failed: {}", e));
        }
    };

    let registry = Registry::with_defaults();
    if let Err(e) = config.validate(&registry) {
        println!(
            "{} Configuration is invalid: {}",
            marker(&out, Marker::Error),
            e
        );
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    print_summary(&out, &config);
    println!(
        "\n{} Configuration is valid",
        marker(&out, Marker::Ok)
    );
    Ok(())
}
