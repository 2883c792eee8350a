//! # Command Execution
//!
//! Every interaction with the version-control client goes through the
//! [`CommandExecutor`] trait. The default implementation, [`SystemExecutor`],
//! spawns a child process, blocks until it exits and captures both output
//! streams.
//!
//! A non-zero exit code is *not* an error at this layer: callers inspect
//! [`CommandResult::exit_code`] and decide what a failure means for them.
//! Only a failure to spawn the process at all is reported as an error. There
//! is no retry logic and no timeout here.
//!
//! The trait exists so the higher layers can be exercised with a scripted
//! executor in tests, without running real `git` processes.

use std::path::Path;
use std::process::Command;

use crate::error::Result;

/// Exit code reported when a process was terminated by a signal.
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// The captured outcome of a single process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Process exit code, or [`SIGNAL_EXIT_CODE`] if it was killed.
    pub exit_code: i32,
    /// Captured standard output, lossily decoded as UTF-8.
    pub stdout: String,
    /// Captured standard error, lossily decoded as UTF-8.
    pub stderr: String,
}

impl CommandResult {
    /// Returns `true` when the process exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait for running external processes - allows mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Runs `program` with `args`, optionally inside `cwd`, and waits for it
    /// to finish.
    fn execute(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandResult>;
}

/// The default implementation of `CommandExecutor`, which spawns real
/// processes on the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandResult> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        // Never let git block on an interactive credential prompt.
        command.env("GIT_TERMINAL_PROMPT", "0");
        command.env("GCM_INTERACTIVE", "never");

        let output = command.output()?;

        Ok(CommandResult {
            exit_code: output.status.code().unwrap_or(SIGNAL_EXIT_CODE),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
