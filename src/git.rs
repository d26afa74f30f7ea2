//! Git command wrappers.
//!
//! This module provides a thin wrapper around the git CLI, handling command
//! execution, error formatting and optional command echoing. Every operation
//! the sync engine performs goes through [`Git::run`] or [`Git::query`].

use anyhow::Context;
use colored::Colorize;
use std::path::Path;
use std::process::Command;

/// Callback invoked before each git command is spawned.
/// Used to echo commands in verbose mode without coupling this module
/// to the presentation layer.
pub type GitLogger = fn(dir: &Path, args: &[&str]);

/// Logger that echoes every git invocation to stderr.
pub fn verbose_logger(dir: &Path, args: &[&str]) {
    eprintln!(
        "{}",
        format!("[{}] > git {}", dir.display(), args.join(" ")).dimmed()
    );
}

/// Logger that discards everything.
pub fn no_op_logger(_dir: &Path, _args: &[&str]) {}

/// Handle to the external git binary.
///
/// Carries the binary path from the manifest and the active logger, so the
/// rest of the crate only ever passes `&Git` around.
#[derive(Debug, Clone)]
pub struct Git {
    binary: String,
    logger: GitLogger,
}

impl Git {
    pub fn new(binary: impl Into<String>, logger: GitLogger) -> Self {
        Self {
            binary: binary.into(),
            logger,
        }
    }

    /// Runs a git command in `dir` and returns its stdout with trailing
    /// whitespace trimmed. A non-zero exit is an error carrying the trimmed
    /// stderr text.
    pub fn run(&self, dir: &Path, args: &[&str]) -> anyhow::Result<String> {
        (self.logger)(dir, args);

        let output = Command::new(&self.binary)
            .current_dir(dir)
            .args(args)
            .output()
            .with_context(|| format!("Failed to spawn git command in {}", dir.display()))?;

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            Ok(stdout.trim_end().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("git {} failed: {}", args.join(" "), stderr.trim())
        }
    }

    /// Like [`Git::run`], but a non-zero exit means "nothing there" rather
    /// than failure. Used for lookups where absence is a normal outcome:
    /// `config --get` on an unset key, `symbolic-ref` on a detached HEAD.
    /// Empty output is also treated as absent.
    pub fn query(&self, dir: &Path, args: &[&str]) -> anyhow::Result<Option<String>> {
        (self.logger)(dir, args);

        let output = Command::new(&self.binary)
            .current_dir(dir)
            .args(args)
            .output()
            .with_context(|| format!("Failed to spawn git command in {}", dir.display()))?;

        if !output.status.success() {
            return Ok(None);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let value = stdout.trim_end().to_string();
        Ok(if value.is_empty() { None } else { Some(value) })
    }
}

fn validate_branch_name(branch: &str) -> anyhow::Result<()> {
    if branch.is_empty() || branch.starts_with('-') || branch.contains(['\0', '\n']) {
        anyhow::bail!("Invalid branch name: {:?}", branch);
    }
    Ok(())
}

/// Name of the branch HEAD points at, or `None` when HEAD is detached.
pub fn head_branch(git: &Git, dir: &Path) -> anyhow::Result<Option<String>> {
    git.query(dir, &["symbolic-ref", "HEAD", "--short"])
        .context("Failed to read HEAD")
}

/// Commit hash of the given revision.
pub fn rev_parse(git: &Git, dir: &Path, rev: &str) -> anyhow::Result<String> {
    git.run(dir, &["rev-parse", rev])
        .with_context(|| format!("Failed to resolve '{}'", rev))
}

/// Raw `git branch` listing, one branch per line.
pub fn list_branches(git: &Git, dir: &Path) -> anyhow::Result<String> {
    git.run(dir, &["branch"]).context("Failed to list branches")
}

/// Raw porcelain status text.
pub fn status_porcelain(git: &Git, dir: &Path) -> anyhow::Result<String> {
    git.run(dir, &["status", "--porcelain"])
        .context("Failed to read status")
}

/// Value of a local config key, `None` when unset.
pub fn local_config(git: &Git, dir: &Path, key: &str) -> anyhow::Result<Option<String>> {
    git.query(dir, &["config", "--local", "--get", key])
        .with_context(|| format!("Failed to read config key '{}'", key))
}

pub fn set_remote_url(git: &Git, dir: &Path, remote: &str, url: &str) -> anyhow::Result<()> {
    git.run(dir, &["remote", "set-url", remote, url])
        .with_context(|| format!("Failed to update url of remote '{}'", remote))?;
    Ok(())
}

pub fn fetch(git: &Git, dir: &Path, remote: &str) -> anyhow::Result<()> {
    git.run(dir, &["fetch", remote])
        .with_context(|| format!("Failed to fetch remote '{}'", remote))?;
    Ok(())
}

pub fn checkout(git: &Git, dir: &Path, branch: &str) -> anyhow::Result<()> {
    validate_branch_name(branch)?;
    git.run(dir, &["checkout", branch])
        .with_context(|| format!("Failed to checkout branch '{}'", branch))?;
    Ok(())
}

pub fn pull(git: &Git, dir: &Path) -> anyhow::Result<()> {
    git.run(dir, &["pull"]).context("Failed to pull")?;
    Ok(())
}

/// Clones `url` into `target`. Invoked from the parent directory so cloning
/// works both for a missing target and for an existing empty one.
pub fn clone(git: &Git, parent: &Path, url: &str, target: &Path) -> anyhow::Result<()> {
    let target = target
        .to_str()
        .with_context(|| format!("Non-UTF-8 repository path: {}", target.display()))?;
    git.run(parent, &["clone", url, target])
        .with_context(|| format!("Failed to clone '{}'", url))?;
    Ok(())
}

pub fn submodule_init(git: &Git, dir: &Path) -> anyhow::Result<()> {
    git.run(dir, &["submodule", "init"])
        .context("Failed to init submodules")?;
    Ok(())
}

pub fn submodule_update(git: &Git, dir: &Path) -> anyhow::Result<()> {
    git.run(dir, &["submodule", "update"])
        .context("Failed to update submodules")?;
    Ok(())
}

pub fn submodule_sync(git: &Git, dir: &Path) -> anyhow::Result<()> {
    git.run(dir, &["submodule", "sync"])
        .context("Failed to sync submodules")?;
    Ok(())
}

/// Number of commits in `from..to`. A non-numeric answer is an error, never
/// silently zero.
pub fn rev_list_count(git: &Git, dir: &Path, from: &str, to: &str) -> anyhow::Result<u32> {
    let range = format!("{}..{}", from, to);
    let raw = git
        .run(dir, &["rev-list", "--count", &range])
        .with_context(|| format!("Failed to count commits in '{}'", range))?;
    raw.parse::<u32>()
        .with_context(|| format!("Unexpected rev-list count output: {:?}", raw))
}
