//! # Output Configuration
//!
//! Controls how the CLI renders its report: emoji markers and colored
//! outcomes when the terminal supports them, plain bracketed markers
//! otherwise.
//!
//! The following environment variables and flags are respected:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

use console::style;

use crate::publish::PublishOutcome;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `always` and `never` win over the environment; anything else
    /// detects support from the environment and the terminal.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of NO_COLOR, even empty, disables colors.
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Line markers used by the CLI report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Scan,
    Run,
    Target,
    Ok,
    Error,
    Info,
}

impl Marker {
    fn symbols(self) -> (&'static str, &'static str) {
        match self {
            Marker::Scan => ("🔍", "[SCAN]"),
            Marker::Run => ("🚀", "[RUN]"),
            Marker::Target => ("📦", "[TARGET]"),
            Marker::Ok => ("✅", "[OK]"),
            Marker::Error => ("❌", "[ERR]"),
            Marker::Info => ("📊", "[INFO]"),
        }
    }
}

/// The emoji for `marker` when colors are enabled, its plain text otherwise.
pub fn marker(config: &OutputConfig, marker: Marker) -> &'static str {
    let (emoji, plain) = marker.symbols();
    if config.use_color {
        emoji
    } else {
        plain
    }
}

/// A publish outcome, green when it produced a commit and dimmed otherwise.
pub fn outcome(config: &OutputConfig, outcome: PublishOutcome) -> String {
    let text = outcome.to_string();
    if !config.use_color {
        return text;
    }
    match outcome {
        PublishOutcome::Committed => style(text).green().force_styling(true).to_string(),
        PublishOutcome::NoChange => style(text).dim().force_styling(true).to_string(),
    }
}
