//! Manifest loading and runtime verbosity configuration.

use crate::constants::DEFAULT_GIT_BINARY;
use crate::git::{self, GitLogger};
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One repository the fleet manages. Immutable input for a whole run.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Unique display name.
    pub name: String,
    /// Canonical remote URL; the lifecycle manager reconciles the clone's
    /// origin URL against this.
    pub url: String,
    /// Working copy location.
    pub directory: PathBuf,
}

/// Parsed manifest file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Git binary to invoke; defaults to plain `git` on PATH.
    #[serde(default = "default_git_binary", rename = "git-binary")]
    pub git_binary: String,
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
}

fn default_git_binary() -> String {
    DEFAULT_GIT_BINARY.to_string()
}

impl Manifest {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest '{}'", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Failed to parse manifest '{}'", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let manifest: Manifest = toml::from_str(raw)?;
        Ok(manifest)
    }

    /// Longest repository name, used to pad the report columns.
    #[must_use]
    pub fn name_pad(&self) -> usize {
        self.repositories
            .iter()
            .map(|repo| repo.name.len())
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// Runtime configuration derived from CLI arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// Controls the verbosity level of CLI output.
    pub verbosity: Verbosity,
}

impl Config {
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Returns the appropriate git logger based on verbosity settings.
    ///
    /// This is a presentation-layer concern: config controls which logger
    /// function to use, but doesn't implement logging itself.
    #[must_use]
    pub fn git_logger(&self) -> GitLogger {
        if self.is_verbose() {
            git::verbose_logger
        } else {
            git::no_op_logger
        }
    }
}

/// Verbosity level for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}
