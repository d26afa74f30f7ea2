//! Application-wide constants.
//!
//! Centralized configuration values to avoid magic strings throughout the codebase.

/// Ref namespace that marks a configured merge ref as a real branch.
/// Anything outside this namespace (tags etc.) means "no valid upstream".
pub const HEADS_PREFIX: &str = "refs/heads/";

/// Git directory name used to detect repositories.
pub const GIT_DIR: &str = ".git";

/// Remote name the lifecycle manager reconciles URLs against.
pub const ORIGIN_REMOTE: &str = "origin";

/// Git binary used when the manifest does not name one.
pub const DEFAULT_GIT_BINARY: &str = "git";

/// Manifest path used when no --config flag is given.
pub const DEFAULT_MANIFEST: &str = "fleet.toml";

/// Progress spinner tick interval in milliseconds.
pub const PROGRESS_TICK_MS: u64 = 80;
