//! Scripted command execution for unit tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::command::{CommandExecutor, CommandResult};
use crate::config::DistributionTarget;
use crate::credentials::{resolve, AuthenticatedUrl, Credential};
use crate::error::Result;

type Responder = Box<dyn Fn(&str, &[&str]) -> CommandResult + Send + Sync>;

/// A `CommandExecutor` that records invocations instead of spawning
/// processes and answers according to a responder closure.
pub(crate) struct ScriptedExecutor {
    calls: Mutex<Vec<(Vec<String>, Option<PathBuf>)>>,
    respond: Responder,
}

pub(crate) fn exit(exit_code: i32, stderr: &str) -> CommandResult {
    CommandResult {
        exit_code,
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// The git subcommand of an argument list, skipping `-c key=value` pairs.
pub(crate) fn subcommand<'a>(args: &[&'a str]) -> &'a str {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if *arg == "-c" {
            iter.next();
            continue;
        }
        return *arg;
    }
    ""
}

impl ScriptedExecutor {
    pub(crate) fn new(respond: impl Fn(&str, &[&str]) -> CommandResult + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    /// Every command succeeds and `git diff --cached --quiet` reports staged
    /// changes.
    pub(crate) fn succeeding() -> Self {
        Self::failing_on("", 0, "")
    }

    /// Like [`ScriptedExecutor::succeeding`], except `sub` exits with
    /// `exit_code` and `stderr`.
    pub(crate) fn failing_on(sub: &'static str, exit_code: i32, stderr: &'static str) -> Self {
        Self::new(move |current, _| {
            if current == sub {
                exit(exit_code, stderr)
            } else if current == "diff" {
                exit(1, "")
            } else {
                exit(0, "")
            }
        })
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(args, _)| args.clone())
            .collect()
    }

    pub(crate) fn subcommands(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|args| {
                let borrowed: Vec<&str> = args.iter().map(String::as_str).collect();
                subcommand(&borrowed).to_string()
            })
            .collect()
    }

    pub(crate) fn working_dirs(&self) -> Vec<Option<PathBuf>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, cwd)| cwd.clone())
            .collect()
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn execute(&self, _program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandResult> {
        self.calls.lock().unwrap().push((
            args.iter().map(|a| a.to_string()).collect(),
            cwd.map(Path::to_path_buf),
        ));
        Ok((self.respond)(subcommand(args), args))
    }
}

/// `proto://TOKEN@host/repo`, resolved for a target with alias `A`.
pub(crate) fn authenticated_url() -> AuthenticatedUrl {
    let target = DistributionTarget::git("A", "proto://host/repo", "out");
    resolve(&target, &[Credential::new("A", None, "TOKEN")]).unwrap()
}
