//! Thin wrapper around the external `git` binary.
//!
//! Providers only shell out to git when the CI environment leaves a gap
//! (merge-commit parents, short SHA expansion, remote URL, local HEAD).

use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{BundleError, Result};

static MERGE_PARENTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]{40} [a-z0-9]{40}$").unwrap());

/// Runs `git` with the given arguments and returns trimmed stdout.
pub trait GitRunner {
    fn run(&self, args: &[&str]) -> Result<String>;
}

/// Invokes the `git` found on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGit;

impl GitRunner for SystemGit {
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .output()
            .map_err(|e| BundleError::Git(format!("failed to run git {}: {e}", args.join(" "))))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BundleError::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        let stdout = String::from_utf8(output.stdout)
            .map_err(|_| BundleError::Git("git output not valid UTF-8".to_string()))?;
        Ok(stdout.trim().to_string())
    }
}

/// Parents of HEAD when it is a two-parent merge commit, as `(first, second)`.
///
/// Octopus merges and ordinary commits yield `None`.
pub fn merge_commit_parents(git: &dyn GitRunner) -> Option<(String, String)> {
    let out = git.run(&["show", "--no-patch", "--format=%P"]).ok()?;
    parse_merge_parents(&out)
}

pub(crate) fn parse_merge_parents(out: &str) -> Option<(String, String)> {
    let out = out.trim();
    if !MERGE_PARENTS_RE.is_match(out) {
        return None;
    }
    let (first, second) = out.split_once(' ')?;
    Some((first.to_string(), second.to_string()))
}

/// Remote URL of `origin`, if any.
pub fn remote_origin_url(git: &dyn GitRunner) -> Option<String> {
    git.run(&["config", "--get", "remote.origin.url"])
        .ok()
        .filter(|s| !s.is_empty())
}

/// True when `sha` is exactly `len` hex digits.
pub fn is_hex_sha(sha: &str, len: usize) -> bool {
    sha.len() == len && sha.bytes().all(|b| b.is_ascii_hexdigit())
}
