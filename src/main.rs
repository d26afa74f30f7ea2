use clap::Parser;
use git_fleet_rust::config::{Config, Manifest, Verbosity};
use git_fleet_rust::constants::DEFAULT_MANIFEST;
use git_fleet_rust::git::Git;
use git_fleet_rust::output::{self, TerminalRenderer};
use git_fleet_rust::repo::{self, Mode, RepoResult};
use std::path::PathBuf;
use std::time::Instant;

/// Keep a fleet of local git clones in sync with their upstreams.
#[derive(Debug, Parser)]
#[command(name = "git-fleet", version)]
struct Cli {
    /// Manifest file listing the repositories to manage
    #[arg(short, long, default_value = DEFAULT_MANIFEST)]
    config: PathBuf,

    /// Print each repository's url and directory
    #[arg(short, long)]
    list: bool,

    /// Report divergence and working-tree state per tracked branch
    #[arg(short, long)]
    stat: bool,

    /// Fast-forward tracked branches from their upstreams
    #[arg(short, long)]
    update: bool,

    /// Only print the final counts and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Echo every git command as it runs
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    fn mode(&self) -> Mode {
        if self.update {
            Mode::Update
        } else if self.stat {
            Mode::Report
        } else {
            Mode::Visit
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config {
        verbosity: cli.verbosity(),
    };

    let manifest = Manifest::load(&cli.config)?;
    let git = Git::new(&manifest.git_binary, config.git_logger());

    if cli.list {
        output::print_listing(&manifest, &config);
    }

    let renderer = TerminalRenderer::new(config, manifest.name_pad());
    let start = Instant::now();
    let results = repo::sync_all(&git, &manifest.repositories, cli.mode(), &renderer);
    output::print_summary(&results, start.elapsed(), &config);

    if results.iter().any(RepoResult::is_failed) {
        std::process::exit(1);
    }
    Ok(())
}
