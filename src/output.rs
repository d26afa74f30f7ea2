//! Colored terminal rendering of sync events.
//!
//! This module is a pure consumer of the semantic events produced by the
//! sync engine: branch outcomes become padded, glyph-annotated report lines,
//! cloning gets a spinner, and a run summary is printed at the end.

use crate::config::{Config, Manifest, RepositoryConfig};
use crate::constants::PROGRESS_TICK_MS;
use crate::repo::{
    BlockReason, BranchOutcome, BranchReport, OutcomeKind, Refusal, RepoOutcome, RepoResult,
    SyncCallbacks,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// No-op callbacks for when no output is wanted.
/// This is the null object pattern for SyncCallbacks - use it when
/// you don't need any output or progress tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOpCallbacks;

impl SyncCallbacks for NoOpCallbacks {}

/// Renders sync events to the terminal, one padded line per branch.
pub struct TerminalRenderer {
    config: Config,
    pad: usize,
    /// Spinner shown while a clone is in flight. Created lazily because most
    /// repositories never clone.
    clone_spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalRenderer {
    #[must_use]
    pub fn new(config: Config, pad: usize) -> Self {
        Self {
            config,
            pad,
            clone_spinner: Mutex::new(None),
        }
    }

    fn prefix(&self, repo: &RepositoryConfig) -> String {
        format!("{:<pad$}", repo.name, pad = self.pad)
    }
}

impl SyncCallbacks for TerminalRenderer {
    fn on_clone_start(&self, repo: &RepositoryConfig) {
        if self.config.is_quiet() {
            return;
        }
        if self.config.is_verbose() {
            eprintln!("{} cloning {}", self.prefix(repo), repo.url);
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        spinner.set_message(format!("Cloning {}...", repo.name));
        spinner.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
        *self
            .clone_spinner
            .lock()
            .expect("clone spinner mutex poisoned") = Some(spinner);
    }

    fn on_clone_done(&self, repo: &RepositoryConfig) {
        let spinner = self
            .clone_spinner
            .lock()
            .expect("clone spinner mutex poisoned")
            .take();
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        if !self.config.is_quiet() {
            println!("{} {} cloned", self.prefix(repo), "✓".green());
        }
    }

    fn on_remote_url_updated(&self, repo: &RepositoryConfig) {
        if !self.config.is_quiet() {
            println!("{} update remote url", self.prefix(repo));
        }
    }

    fn on_skipped_not_ready(&self, repo: &RepositoryConfig, refusal: &Refusal) {
        eprintln!(
            "{} {}",
            self.prefix(repo),
            format!(
                "ignoring, \"{}\" {}",
                repo.directory.display(),
                refusal.describe()
            )
            .yellow()
        );
    }

    fn on_update_blocked(&self, repo: &RepositoryConfig, branch: &str, reason: BlockReason) {
        println!(
            "{} {} {}",
            self.prefix(repo),
            branch.cyan(),
            reason.describe().red()
        );
    }

    fn on_branch(&self, repo: &RepositoryConfig, outcome: &BranchOutcome) {
        if self.config.is_quiet() {
            return;
        }
        let prefix = self.prefix(repo);
        let branch = outcome.branch.cyan();
        match &outcome.kind {
            // Untracked branches are not part of the report.
            OutcomeKind::Skipped => {}
            OutcomeKind::Visited => println!("{} {}", prefix, branch),
            OutcomeKind::Updated(report) => {
                println!("{} {} {}{}", prefix, branch, "updated".green(), format_report(report));
            }
            OutcomeKind::Blocked(report) | OutcomeKind::Reported(report) => {
                println!("{} {}{}", prefix, branch, format_report(report));
            }
        }
    }

    fn on_failed(&self, repo: &RepositoryConfig, error: &str) {
        eprintln!("{} {}", self.prefix(repo), format!("error: {}", error).red());
    }
}

/// Renders one branch report with the classic glyph vocabulary.
fn format_report(report: &BranchReport) -> String {
    if report.is_clean() {
        return format!("  {}", "✔".green());
    }

    let mut out = String::new();
    if report.behind > 0 {
        out.push_str(&format!("  {}", format!("↓{}", report.behind).cyan()));
    }
    if report.ahead > 0 {
        out.push_str(&format!("  {}", format!("↑{}", report.ahead).cyan()));
    }
    if report.conflicts > 0 {
        out.push_str(&format!("  {}", format!("☠{}", report.conflicts).red()));
    }
    if report.index > 0 {
        out.push_str(&format!("  {}", format!("★{}", report.index).yellow()));
    }
    if report.working_tree > 0 {
        out.push_str(&format!("  {}", format!("+{}", report.working_tree).magenta()));
    }
    out
}

/// Prints each repository's url and directory (the --list surface).
pub fn print_listing(manifest: &Manifest, config: &Config) {
    if config.is_quiet() {
        return;
    }
    let pad = manifest.name_pad();
    for repo in &manifest.repositories {
        println!("{:<pad$} {}", repo.name, repo.url, pad = pad);
        println!("{:<pad$} {}", repo.name, repo.directory.display(), pad = pad);
    }
}

pub fn print_summary(results: &[RepoResult], duration: Duration, config: &Config) {
    if config.is_quiet() {
        print_quiet_summary(results);
    } else {
        print_normal_summary(results, duration);
    }
}

fn print_quiet_summary(results: &[RepoResult]) {
    let synced = results
        .iter()
        .filter(|r| matches!(r.outcome, RepoOutcome::Synced(_)))
        .count();
    println!("{}/{} repositories synced", synced, results.len());

    for result in results {
        if let RepoOutcome::Failed(error) = &result.outcome {
            eprintln!("error: {}: {}", result.name, error);
        }
    }
}

fn print_normal_summary(results: &[RepoResult], duration: Duration) {
    let (failures, rest): (Vec<_>, Vec<_>) = results.iter().partition(|r| r.is_failed());
    let synced = rest
        .iter()
        .filter(|r| matches!(r.outcome, RepoOutcome::Synced(_)))
        .count();

    if !failures.is_empty() {
        println!("{}", format!("Failed ({}):", failures.len()).red().bold());
        for result in &failures {
            if let RepoOutcome::Failed(error) = &result.outcome {
                println!("  {} {} {}", "FAIL".red().bold(), result.name.white(), error.red());
            }
        }
    }

    println!(
        "{}: {}/{} repos in {}",
        "Total".white().bold(),
        synced,
        results.len(),
        format_duration(duration)
    );
}

fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f32())
}
