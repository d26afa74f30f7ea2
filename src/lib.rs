//! Fleet manager for local git clones.
//!
//! This crate keeps a configured set of repositories in sync with their
//! upstream branches by:
//! - Cloning missing working copies and reconciling remote URLs
//! - Enumerating local branches and resolving their configured upstreams
//! - Fetching each remote at most once per repository pass
//! - Measuring ahead/behind divergence and working-tree changes
//! - Fast-forwarding clean tracked branches and restoring the original HEAD

pub mod branch;
pub mod config;
pub mod constants;
pub mod git;
pub mod output;
pub mod repo;
pub mod status;
