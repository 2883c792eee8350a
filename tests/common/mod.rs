//! Shared test utilities for integration and E2E tests.
//!
//! Tests publish into local bare repositories created in a temporary
//! directory, so they need a `git` binary but no network access.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! #[cfg_attr(not(feature = "integration-tests"), ignore)]
//! fn test_example() {
//!     if !git_available() {
//!         return;
//!     }
//!     let fixture = RemoteFixture::new();
//!     // ... test code
//! }
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use super::{configs, git_available, RemoteFixture};
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;
}

/// Configuration YAML snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// A valid configuration with one authenticated target.
    pub const SINGLE_TARGET: &str = r#"
metadata:
  time: true
distributors:
  - type: git
    alias: example-alias
    url: https://example.com/org/configs.git
    path: out
    password: inline-secret
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "distributors: [unclosed";

    /// Two targets sharing an alias.
    pub const DUPLICATE_ALIAS: &str = r#"
distributors:
  - type: git
    alias: same
    url: https://example.com/a.git
  - type: git
    alias: same
    url: https://example.com/b.git
"#;
}

/// Whether a usable `git` binary is on the `PATH`.
///
/// Tests that need real repositories return early when it is not.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

/// Runs git in `dir` with a fixed test identity and returns stdout.
///
/// Panics if git exits with a non-zero code.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) -> Vec<u8> {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Test User",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output.stdout
}

/// A bare "remote" repository with one initial commit on `main`.
pub struct RemoteFixture {
    temp_dir: assert_fs::TempDir,
    remote: PathBuf,
}

#[allow(dead_code)]
impl RemoteFixture {
    /// Creates the bare remote, seeded with a `README.md`.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let seed = temp_dir.path().join("seed");
        std::fs::create_dir(&seed).unwrap();
        git(&seed, &["init", "-b", "main"]);
        std::fs::write(seed.join("README.md"), "# Configs\n").unwrap();
        git(&seed, &["add", "README.md"]);
        git(&seed, &["commit", "-m", "Initial commit"]);

        let remote = temp_dir.path().join("remote.git");
        git(
            temp_dir.path(),
            &["clone", "--bare", "seed", remote.to_str().unwrap()],
        );

        Self { temp_dir, remote }
    }

    /// The scratch directory holding the remote.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Clone URL of the remote.
    pub fn url(&self) -> String {
        self.remote.to_string_lossy().into_owned()
    }

    /// Number of commits on the remote's `main` branch.
    pub fn commit_count(&self) -> usize {
        let out = git(&self.remote, &["rev-list", "--count", "main"]);
        String::from_utf8_lossy(&out).trim().parse().unwrap()
    }

    /// Content of `path` at the tip of `main`, if it exists.
    pub fn read(&self, path: &str) -> Option<Vec<u8>> {
        let output = Command::new("git")
            .args(["show", &format!("main:{}", path)])
            .current_dir(&self.remote)
            .output()
            .unwrap();
        output.status.success().then_some(output.stdout)
    }

    /// Subject line of the latest commit on `main`.
    pub fn last_subject(&self) -> String {
        let out = git(&self.remote, &["log", "-1", "--format=%s", "main"]);
        String::from_utf8_lossy(&out).trim().to_string()
    }

    /// Installs a `pre-receive` hook rejecting every push.
    #[cfg(unix)]
    pub fn reject_pushes(&self) {
        use std::os::unix::fs::PermissionsExt;

        let hook = self.remote.join("hooks").join("pre-receive");
        std::fs::write(&hook, "#!/bin/sh\necho 'pushes are frozen' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Commits a symbolic link `link` pointing at `target` onto `main`.
    #[cfg(unix)]
    pub fn commit_symlink(&self, link: &str, target: &Path) {
        let checkout = self.temp_dir.path().join("symlink-checkout");
        git(
            self.temp_dir.path(),
            &["clone", self.remote.to_str().unwrap(), checkout.to_str().unwrap()],
        );
        std::os::unix::fs::symlink(target, checkout.join(link)).unwrap();
        git(&checkout, &["add", link]);
        git(&checkout, &["commit", "-m", "Add symbolic link"]);
        git(&checkout, &["push", "origin", "HEAD:main"]);
        std::fs::remove_dir_all(&checkout).unwrap();
    }

    /// A configuration publishing to this remote without credentials.
    pub fn config(&self, metadata: &str) -> String {
        format!(
            r#"
metadata: {metadata}
commit:
  message: "Publish generated configuration"
  author:
    name: Config Bot
    email: bot@example.com
distributors:
  - type: git
    alias: local
    url: "{url}"
    path: out
    auth: false
"#,
            metadata = metadata,
            url = self.url()
        )
    }
}
