//! Repository lifecycle and the per-repository synchronization pass.
//!
//! The lifecycle manager decides whether a working copy must be cloned,
//! reconciled or skipped. The orchestrator then walks the local branches in
//! listing order, resolves their upstreams, fetches each remote at most once
//! per pass, measures divergence and optionally fast-forwards, restoring the
//! originally checked-out HEAD at the end.

use crate::branch::{self, Divergence};
use crate::config::RepositoryConfig;
use crate::constants::{GIT_DIR, ORIGIN_REMOTE};
use crate::git::{self, Git};
use crate::status::{self, RepoStatus};
use std::collections::HashSet;
use std::path::Path;

/// What work a pass performs per tracked branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Enumerate and fetch only.
    #[default]
    Visit,
    /// Compute divergence and working-tree state, no mutation.
    Report,
    /// Fast-forward tracked branches, then report.
    Update,
}

impl Mode {
    #[must_use]
    pub fn wants_update(self) -> bool {
        self == Mode::Update
    }

    #[must_use]
    pub fn wants_report(self) -> bool {
        matches!(self, Mode::Report | Mode::Update)
    }
}

/// Classification of a working-copy directory, evaluated once per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryState {
    Missing,
    NotADirectory,
    Repository,
    EmptyDirectory,
    OccupiedDirectory,
    Unlistable,
}

/// Probes the directory without touching git.
#[must_use]
pub fn inspect_directory(dir: &Path) -> DirectoryState {
    if !dir.exists() {
        return DirectoryState::Missing;
    }
    if !dir.is_dir() {
        return DirectoryState::NotADirectory;
    }
    if dir.join(GIT_DIR).is_dir() {
        return DirectoryState::Repository;
    }
    match std::fs::read_dir(dir) {
        Err(_) => DirectoryState::Unlistable,
        Ok(mut entries) => {
            if entries.next().is_some() {
                DirectoryState::OccupiedDirectory
            } else {
                DirectoryState::EmptyDirectory
            }
        }
    }
}

/// Why the lifecycle manager refused to touch a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    NotADirectory,
    Unlistable,
    NotEmpty,
}

impl Refusal {
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Refusal::NotADirectory => "is not a directory",
            Refusal::Unlistable => "the directory could not be listed",
            Refusal::NotEmpty => "the directory is not empty",
        }
    }
}

/// Outcome of [`ensure_ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Ready,
    Refused(Refusal),
}

/// Why a repository-level update was blocked before any branch was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Conflicts,
    Changes,
}

impl BlockReason {
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            BlockReason::Conflicts => "cannot update, has conflicts",
            BlockReason::Changes => "cannot update, has changes",
        }
    }
}

/// Divergence and dirtiness figures for one tracked branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BranchReport {
    pub behind: u32,
    pub ahead: u32,
    pub conflicts: u32,
    pub index: u32,
    pub working_tree: u32,
}

impl BranchReport {
    fn new(divergence: Divergence, status: &RepoStatus) -> Self {
        Self {
            behind: divergence.behind,
            ahead: divergence.ahead,
            conflicts: status.conflicts(),
            index: status.index.total(),
            working_tree: status.working_tree.total(),
        }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Per-branch result of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Enumerated and fetched only (visit mode).
    Visited,
    /// No valid upstream; excluded from fetch, update and report.
    Skipped,
    /// Dirty or conflicted, no update was attempted.
    Blocked(BranchReport),
    /// Pulled from upstream.
    Updated(BranchReport),
    /// Measured, nothing to do.
    Reported(BranchReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchOutcome {
    pub branch: String,
    pub kind: OutcomeKind,
}

/// Result of one repository pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    Synced(Vec<BranchOutcome>),
    SkippedNotReady(Refusal),
    /// Update refused for the whole repository because the working copy was
    /// dirty when the pass began. `branch` is whatever was checked out.
    BlockedDirty { branch: String, reason: BlockReason },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoResult {
    pub name: String,
    pub outcome: RepoOutcome,
}

impl RepoResult {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, RepoOutcome::Failed(_))
    }
}

/// HEAD as recorded before any branch is checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginalHead {
    Branch(String),
    DetachedAt(String),
}

impl OriginalHead {
    #[must_use]
    pub fn is_detached(&self) -> bool {
        matches!(self, OriginalHead::DetachedAt(_))
    }
}

/// Mutable state scoped to one repository pass: the recorded original HEAD
/// and the set of remotes already fetched. Never shared across repositories.
#[derive(Debug)]
pub struct SyncContext {
    original_head: OriginalHead,
    fetched_remotes: HashSet<String>,
}

impl SyncContext {
    #[must_use]
    pub fn new(original_head: OriginalHead) -> Self {
        Self {
            original_head,
            fetched_remotes: HashSet::new(),
        }
    }

    #[must_use]
    pub fn original_head(&self) -> &OriginalHead {
        &self.original_head
    }

    /// Fetches `remote` unless it was already fetched in this pass.
    /// Returns whether a fetch was actually issued.
    pub fn ensure_fetched(&mut self, git: &Git, dir: &Path, remote: &str) -> anyhow::Result<bool> {
        if self.fetched_remotes.contains(remote) {
            return Ok(false);
        }
        git::fetch(git, dir, remote)?;
        self.fetched_remotes.insert(remote.to_string());
        Ok(true)
    }
}

/// Semantic sync events, consumed by the presentation layer.
/// Default implementations make every event optional for consumers.
pub trait SyncCallbacks {
    fn on_repository(&self, _repo: &RepositoryConfig) {}
    fn on_clone_start(&self, _repo: &RepositoryConfig) {}
    fn on_clone_done(&self, _repo: &RepositoryConfig) {}
    fn on_remote_url_updated(&self, _repo: &RepositoryConfig) {}
    fn on_skipped_not_ready(&self, _repo: &RepositoryConfig, _refusal: &Refusal) {}
    fn on_update_blocked(&self, _repo: &RepositoryConfig, _branch: &str, _reason: BlockReason) {}
    fn on_branch(&self, _repo: &RepositoryConfig, _outcome: &BranchOutcome) {}
    fn on_failed(&self, _repo: &RepositoryConfig, _error: &str) {}
}

/// Ensures a valid working copy exists for `cfg`, cloning or reconciling the
/// remote URL as needed. Refusals are warnings, not errors; command failures
/// propagate.
pub fn ensure_ready(
    git: &Git,
    cfg: &RepositoryConfig,
    callbacks: &impl SyncCallbacks,
) -> anyhow::Result<ReadyState> {
    match inspect_directory(&cfg.directory) {
        DirectoryState::Repository => {
            let actual = git::local_config(
                git,
                &cfg.directory,
                &format!("remote.{}.url", ORIGIN_REMOTE),
            )?;
            if actual.as_deref() != Some(cfg.url.as_str()) {
                git::set_remote_url(git, &cfg.directory, ORIGIN_REMOTE, &cfg.url)?;
                callbacks.on_remote_url_updated(cfg);
            }
            Ok(ReadyState::Ready)
        }
        DirectoryState::Missing | DirectoryState::EmptyDirectory => {
            clone_into(git, cfg, callbacks)?;
            Ok(ReadyState::Ready)
        }
        DirectoryState::NotADirectory => Ok(ReadyState::Refused(Refusal::NotADirectory)),
        DirectoryState::Unlistable => Ok(ReadyState::Refused(Refusal::Unlistable)),
        DirectoryState::OccupiedDirectory => Ok(ReadyState::Refused(Refusal::NotEmpty)),
    }
}

fn clone_into(git: &Git, cfg: &RepositoryConfig, callbacks: &impl SyncCallbacks) -> anyhow::Result<()> {
    // Clone from the parent so the same invocation covers a missing target
    // and an existing empty one.
    let parent = cfg
        .directory
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    callbacks.on_clone_start(cfg);
    git::clone(git, parent, &cfg.url, &cfg.directory)?;
    git::submodule_init(git, &cfg.directory)?;
    git::submodule_update(git, &cfg.directory)?;
    callbacks.on_clone_done(cfg);
    Ok(())
}

/// Runs one sequential pass over all configured repositories.
/// A failure aborts only the repository it occurred in.
pub fn sync_all(
    git: &Git,
    repositories: &[RepositoryConfig],
    mode: Mode,
    callbacks: &impl SyncCallbacks,
) -> Vec<RepoResult> {
    repositories
        .iter()
        .map(|cfg| sync_repository(git, cfg, mode, callbacks))
        .collect()
}

/// Runs one pass over a single repository.
pub fn sync_repository(
    git: &Git,
    cfg: &RepositoryConfig,
    mode: Mode,
    callbacks: &impl SyncCallbacks,
) -> RepoResult {
    callbacks.on_repository(cfg);

    let outcome = match sync_inner(git, cfg, mode, callbacks) {
        Ok(outcome) => outcome,
        Err(error) => {
            let detail = format!("{:#}", error);
            callbacks.on_failed(cfg, &detail);
            RepoOutcome::Failed(detail)
        }
    };

    RepoResult {
        name: cfg.name.clone(),
        outcome,
    }
}

fn sync_inner(
    git: &Git,
    cfg: &RepositoryConfig,
    mode: Mode,
    callbacks: &impl SyncCallbacks,
) -> anyhow::Result<RepoOutcome> {
    match ensure_ready(git, cfg, callbacks)? {
        ReadyState::Refused(refusal) => {
            callbacks.on_skipped_not_ready(cfg, &refusal);
            return Ok(RepoOutcome::SkippedNotReady(refusal));
        }
        ReadyState::Ready => {}
    }

    let dir = cfg.directory.as_path();

    // Repository-wide gate: updating over a dirty working copy is refused
    // outright, whatever branch happens to be checked out.
    if mode.wants_update() {
        let gate = status::parse_status(&git::status_porcelain(git, dir)?);
        if let Some(reason) = block_reason(&gate) {
            let branch = git::head_branch(git, dir)?.unwrap_or_else(|| "HEAD".to_string());
            callbacks.on_update_blocked(cfg, &branch, reason);
            return Ok(RepoOutcome::BlockedDirty { branch, reason });
        }
    }

    let branches = branch::parse_branches(&git::list_branches(git, dir)?);

    let original_head = match git::head_branch(git, dir)? {
        Some(name) => OriginalHead::Branch(name),
        None => OriginalHead::DetachedAt(git::rev_parse(git, dir, "HEAD")?),
    };
    let mut ctx = SyncContext::new(original_head);

    let outcomes = process_branches(git, cfg, mode, &branches, &mut ctx, callbacks);

    // Restore the user's original working state even when the pass failed;
    // the pass failure wins over a restore failure.
    let restored = restore_head(git, dir, ctx.original_head(), &branches);
    let outcomes = outcomes?;
    restored?;

    Ok(RepoOutcome::Synced(outcomes))
}

fn process_branches(
    git: &Git,
    cfg: &RepositoryConfig,
    mode: Mode,
    branches: &[String],
    ctx: &mut SyncContext,
    callbacks: &impl SyncCallbacks,
) -> anyhow::Result<Vec<BranchOutcome>> {
    let mut outcomes = Vec::with_capacity(branches.len());

    for name in branches {
        let kind = process_branch(git, cfg, mode, name, ctx)?;
        let outcome = BranchOutcome {
            branch: name.clone(),
            kind,
        };
        callbacks.on_branch(cfg, &outcome);
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

fn process_branch(
    git: &Git,
    cfg: &RepositoryConfig,
    mode: Mode,
    name: &str,
    ctx: &mut SyncContext,
) -> anyhow::Result<OutcomeKind> {
    let dir = cfg.directory.as_path();

    let Some(upstream) = branch::resolve_upstream(git, dir, name)? else {
        return Ok(OutcomeKind::Skipped);
    };

    ctx.ensure_fetched(git, dir, &upstream.remote)?;

    let mut updated = false;
    if mode.wants_update() {
        // Defensive re-resolution: the fetch may have invalidated the
        // tracking configuration.
        if branch::resolve_upstream(git, dir, name)?.is_none() {
            return Ok(OutcomeKind::Skipped);
        }
        git::checkout(git, dir, name)?;
        git::submodule_sync(git, dir)?;
        git::submodule_update(git, dir)?;
        git::pull(git, dir)?;
        updated = true;
    }

    if !mode.wants_report() {
        return Ok(OutcomeKind::Visited);
    }

    let status = status::parse_status(&git::status_porcelain(git, dir)?);
    let divergence = branch::divergence(git, dir, name, &upstream.qualified())?;
    let report = BranchReport::new(divergence, &status);

    Ok(if updated {
        OutcomeKind::Updated(report)
    } else if report.conflicts > 0 || report.index > 0 || report.working_tree > 0 {
        OutcomeKind::Blocked(report)
    } else {
        OutcomeKind::Reported(report)
    })
}

fn block_reason(status: &RepoStatus) -> Option<BlockReason> {
    if status.conflicts() > 0 {
        Some(BlockReason::Conflicts)
    } else if !status.is_clean() {
        Some(BlockReason::Changes)
    } else {
        None
    }
}

fn restore_head(
    git: &Git,
    dir: &Path,
    head: &OriginalHead,
    branches: &[String],
) -> anyhow::Result<()> {
    match head {
        OriginalHead::Branch(name) => {
            // A branch deleted during the pass is silently not restored.
            if branches.iter().any(|branch| branch == name) {
                git::checkout(git, dir, name)?;
            }
        }
        OriginalHead::DetachedAt(commit) => {
            git::checkout(git, dir, commit)?;
        }
    }
    Ok(())
}
