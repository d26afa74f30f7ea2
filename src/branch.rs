//! Branch listing, upstream resolution and divergence measurement.

use crate::constants::HEADS_PREFIX;
use crate::git::{self, Git};
use std::path::Path;

/// Parses `git branch` output into branch names in listing order.
///
/// The current-branch marker is stripped and whitespace trimmed; empty lines
/// are dropped. The listing order is preserved, not sorted.
#[must_use]
pub fn parse_branches(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| line.strip_prefix('*').unwrap_or(line).trim())
        .filter(|branch| !branch.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolved tracking information for one local branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    /// Remote name, e.g. `origin`.
    pub remote: String,
    /// Remote branch name with the `refs/heads/` prefix already stripped.
    pub branch: String,
}

impl Upstream {
    /// Fully-qualified ref used for divergence queries, e.g. `origin/main`.
    #[must_use]
    pub fn qualified(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }
}

/// Resolves the configured upstream of `branch`, if any.
///
/// Returns `Ok(None)` when the branch has no remote or merge ref configured,
/// or when the merge ref lives outside the `refs/heads/` namespace (a branch
/// tracking a tag is treated as untracked). This is a normal outcome for
/// local-only branches, not an error.
pub fn resolve_upstream(
    git: &Git,
    dir: &Path,
    branch: &str,
) -> anyhow::Result<Option<Upstream>> {
    let remote = git::local_config(git, dir, &format!("branch.{}.remote", branch))?;
    let merge_ref = git::local_config(git, dir, &format!("branch.{}.merge", branch))?;

    let (Some(remote), Some(merge_ref)) = (remote, merge_ref) else {
        return Ok(None);
    };
    let Some(remote_branch) = merge_ref.strip_prefix(HEADS_PREFIX) else {
        return Ok(None);
    };

    Ok(Some(Upstream {
        remote,
        branch: remote_branch.to_string(),
    }))
}

/// Commit counts between a local branch tip and its upstream tip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Divergence {
    /// Commits reachable from local but not upstream.
    pub ahead: u32,
    /// Commits reachable from upstream but not local.
    pub behind: u32,
}

/// Measures how far `branch` has diverged from `upstream_ref`.
///
/// Both tips are resolved to hashes first, then counted with two independent
/// range queries. A non-numeric count is fatal for this branch's report.
pub fn divergence(
    git: &Git,
    dir: &Path,
    branch: &str,
    upstream_ref: &str,
) -> anyhow::Result<Divergence> {
    let local = git::rev_parse(git, dir, branch)?;
    let remote = git::rev_parse(git, dir, upstream_ref)?;

    let behind = git::rev_list_count(git, dir, &local, &remote)?;
    let ahead = git::rev_list_count(git, dir, &remote, &local)?;

    Ok(Divergence { ahead, behind })
}
