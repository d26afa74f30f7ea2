mod common;

use common::{TestRepo, run, test_git};
use git_fleet_rust::git;
use std::path::PathBuf;

#[test]
fn test_run_trims_trailing_whitespace() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;
    let git = test_git();

    let head = git.run(repo.path(), &["symbolic-ref", "HEAD", "--short"])?;
    assert_eq!(head, "master");
    Ok(())
}

#[test]
fn test_run_reports_failure_with_stderr_detail() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;
    let git = test_git();

    let result = git.run(repo.path(), &["rev-parse", "does-not-exist"]);
    let message = result.unwrap_err().to_string();
    assert!(message.contains("git rev-parse does-not-exist failed"));
    Ok(())
}

#[test]
fn test_run_reports_spawn_failure_for_missing_repo_path() {
    let git = test_git();
    let missing_path = PathBuf::from("/no/such/repo/for/test");

    let result = git.run(&missing_path, &["status"]);
    assert!(result.is_err());
    let message = result.unwrap_err().to_string();
    assert!(message.contains("Failed to spawn git command"));
}

#[test]
fn test_query_returns_none_for_unset_config_key() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;
    let git = test_git();

    let value = git.query(
        repo.path(),
        &["config", "--local", "--get", "branch.master.remote"],
    )?;
    assert_eq!(value, None);
    Ok(())
}

#[test]
fn test_query_returns_value_when_present() -> anyhow::Result<()> {
    let repo = TestRepo::with_remote(None)?;
    let git = test_git();

    let value = git.query(
        repo.path(),
        &["config", "--local", "--get", "branch.master.remote"],
    )?;
    assert_eq!(value.as_deref(), Some("origin"));
    Ok(())
}

#[test]
fn test_head_branch_on_branch_and_detached() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;
    let git = test_git();

    assert_eq!(
        git::head_branch(&git, repo.path())?.as_deref(),
        Some("master")
    );

    run(repo.path(), &["checkout", "--detach", "HEAD"])?;
    assert_eq!(git::head_branch(&git, repo.path())?, None);
    Ok(())
}

#[test]
fn test_rev_list_count_between_refs() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;
    let git = test_git();
    let base = repo.current_commit()?;

    repo.make_dirty()?;
    repo.commit_all("Second commit")?;
    let tip = repo.current_commit()?;

    assert_eq!(git::rev_list_count(&git, repo.path(), &base, &tip)?, 1);
    assert_eq!(git::rev_list_count(&git, repo.path(), &tip, &base)?, 0);
    Ok(())
}

#[test]
fn test_checkout_rejects_invalid_branch_name() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;
    let git = test_git();

    assert!(git::checkout(&git, repo.path(), "-bad").is_err());
    assert!(git::checkout(&git, repo.path(), "").is_err());
    Ok(())
}

#[test]
fn test_fetch_fails_for_unreachable_remote() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;
    let git = test_git();
    run(repo.path(), &["remote", "add", "origin", "/nonexistent/remote"])?;

    let result = git::fetch(&git, repo.path(), "origin");
    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_clone_into_missing_target() -> anyhow::Result<()> {
    let source = TestRepo::with_remote(None)?;
    let git = test_git();
    let workspace = tempfile::TempDir::new()?;
    let target = workspace.path().join("fresh-clone");

    git::clone(&git, workspace.path(), &source.remote_url(), &target)?;
    assert!(target.join(".git").is_dir());
    Ok(())
}

#[test]
fn test_status_porcelain_reflects_working_tree() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;
    let git = test_git();

    assert_eq!(git::status_porcelain(&git, repo.path())?, "");

    repo.make_untracked()?;
    let raw = git::status_porcelain(&git, repo.path())?;
    assert!(raw.lines().any(|line| line.starts_with("??")));
    Ok(())
}
