//! Test infrastructure for git-fleet integration tests.
#![allow(dead_code)]

use anyhow::Result;
use git_fleet_rust::config::RepositoryConfig;
use git_fleet_rust::git::{self, Git};
use git_fleet_rust::repo::{BlockReason, BranchOutcome, Refusal, SyncCallbacks};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Git handle used by all tests (plain `git` on PATH, no command echoing).
pub fn test_git() -> Git {
    Git::new("git", git::no_op_logger)
}

pub fn run(dir: &Path, args: &[&str]) -> Result<String> {
    test_git().run(dir, args)
}

/// Initializes a repository with one commit on the given branch.
pub fn init_repo(path: &Path, branch: &str) -> Result<()> {
    run(path, &["init", "-b", branch])?;
    run(path, &["config", "user.email", "test@example.com"])?;
    run(path, &["config", "user.name", "Test User"])?;
    std::fs::write(path.join("README.md"), "# Test Repo\n")?;
    run(path, &["add", "README.md"])?;
    run(path, &["commit", "-m", "Initial commit"])?;
    Ok(())
}

/// A temporary git repository for testing, optionally backed by a bare
/// remote. Automatically cleaned up when dropped.
pub struct TestRepo {
    _temp_dir: TempDir,
    path: PathBuf,
    remote: Option<TempDir>,
}

impl TestRepo {
    /// Creates a test repository with an initial commit on the master branch.
    pub fn new() -> Result<Self> {
        Self::on_branch("master")
    }

    pub fn on_branch(branch: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        init_repo(&path, branch)?;
        Ok(Self {
            _temp_dir: temp_dir,
            path,
            remote: None,
        })
    }

    /// Creates a test repository tracking a bare remote. The remote lives
    /// inside the fixture and stays alive with it.
    pub fn with_remote(branch: Option<&str>) -> Result<Self> {
        let branch = branch.unwrap_or("master");

        let remote_dir = TempDir::new()?;
        run(remote_dir.path(), &["init", "--bare", "-b", branch])?;

        let mut repo = Self::on_branch(branch)?;
        let url = remote_dir.path().to_str().unwrap().to_string();
        run(&repo.path, &["remote", "add", "origin", &url])?;
        run(&repo.path, &["push", "-u", "origin", branch])?;

        repo.remote = Some(remote_dir);
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn remote_url(&self) -> String {
        self.remote
            .as_ref()
            .expect("fixture has no remote")
            .path()
            .to_str()
            .unwrap()
            .to_string()
    }

    /// Repository config pointing at this fixture's clone and remote.
    pub fn config(&self, name: &str) -> RepositoryConfig {
        RepositoryConfig {
            name: name.to_string(),
            url: self.remote_url(),
            directory: self.path.clone(),
        }
    }

    pub fn current_branch(&self) -> Result<String> {
        run(&self.path, &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    pub fn current_commit(&self) -> Result<String> {
        run(&self.path, &["rev-parse", "HEAD"])
    }

    /// Creates a local branch without switching to it.
    pub fn create_branch(&self, name: &str) -> Result<()> {
        run(&self.path, &["branch", name])?;
        Ok(())
    }

    /// Creates a branch, pushes it and configures it to track the remote,
    /// then returns to the original branch.
    pub fn create_tracked_branch(&self, name: &str) -> Result<()> {
        let original = self.current_branch()?;
        run(&self.path, &["checkout", "-b", name])?;
        run(&self.path, &["push", "-u", "origin", name])?;
        run(&self.path, &["checkout", &original])?;
        Ok(())
    }

    pub fn make_dirty(&self) -> Result<()> {
        std::fs::write(self.path.join("README.md"), "# Modified\n")?;
        Ok(())
    }

    pub fn make_untracked(&self) -> Result<()> {
        std::fs::write(self.path.join("untracked.txt"), "untracked content\n")?;
        Ok(())
    }

    /// Stages a new file without committing it.
    pub fn stage_file(&self, name: &str) -> Result<()> {
        std::fs::write(self.path.join(name), "staged content\n")?;
        run(&self.path, &["add", name])?;
        Ok(())
    }

    pub fn commit_all(&self, message: &str) -> Result<()> {
        run(&self.path, &["add", "-A"])?;
        run(&self.path, &["commit", "-m", message])?;
        Ok(())
    }

    pub fn file_exists(&self, name: &str) -> bool {
        self.path.join(name).exists()
    }

    /// Pushes `count` commits to the bare remote through a scratch clone,
    /// leaving the local working copy behind its upstream.
    pub fn advance_remote(&self, branch: &str, count: usize) -> Result<()> {
        let writer = TempDir::new()?;
        run(writer.path(), &["clone", &self.remote_url(), "."])?;
        run(writer.path(), &["config", "user.email", "test@example.com"])?;
        run(writer.path(), &["config", "user.name", "Test User"])?;
        run(writer.path(), &["checkout", branch])?;

        for i in 0..count {
            std::fs::write(
                writer.path().join(format!("remote-change-{i}.txt")),
                format!("change {i}\n"),
            )?;
            run(writer.path(), &["add", "-A"])?;
            run(writer.path(), &["commit", "-m", &format!("Remote change {i}")])?;
        }
        run(writer.path(), &["push", "origin", branch])?;
        Ok(())
    }
}

/// Callbacks that count semantic events, for asserting what a pass did.
#[derive(Clone, Default)]
pub struct CountingCallbacks {
    pub clones: Arc<AtomicUsize>,
    pub url_updates: Arc<AtomicUsize>,
    pub refusals: Arc<AtomicUsize>,
    pub blocks: Arc<AtomicUsize>,
    pub branches: Arc<AtomicUsize>,
}

impl CountingCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clone_count(&self) -> usize {
        self.clones.load(Ordering::SeqCst)
    }

    pub fn url_update_count(&self) -> usize {
        self.url_updates.load(Ordering::SeqCst)
    }

    pub fn refusal_count(&self) -> usize {
        self.refusals.load(Ordering::SeqCst)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.load(Ordering::SeqCst)
    }

    pub fn branch_count(&self) -> usize {
        self.branches.load(Ordering::SeqCst)
    }
}

impl SyncCallbacks for CountingCallbacks {
    fn on_clone_done(&self, _repo: &RepositoryConfig) {
        self.clones.fetch_add(1, Ordering::SeqCst);
    }

    fn on_remote_url_updated(&self, _repo: &RepositoryConfig) {
        self.url_updates.fetch_add(1, Ordering::SeqCst);
    }

    fn on_skipped_not_ready(&self, _repo: &RepositoryConfig, _refusal: &Refusal) {
        self.refusals.fetch_add(1, Ordering::SeqCst);
    }

    fn on_update_blocked(&self, _repo: &RepositoryConfig, _branch: &str, _reason: BlockReason) {
        self.blocks.fetch_add(1, Ordering::SeqCst);
    }

    fn on_branch(&self, _repo: &RepositoryConfig, _outcome: &BranchOutcome) {
        self.branches.fetch_add(1, Ordering::SeqCst);
    }
}
