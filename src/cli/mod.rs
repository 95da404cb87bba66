//! cli
//!
//! Command-line interface layer.
//!
//! # Architecture
//!
//! Commands are thin shells: parse arguments, load configuration, build
//! the git adapter and Trello client, then hand off to [`crate::hook`].
//! Anything async is bridged with a per-command tokio runtime so the
//! binary itself stays a plain synchronous hook process.

pub mod args;
pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// Shared context built from global flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Directory to operate in (defaults to the process cwd).
    pub cwd: Option<PathBuf>,
    /// Force progress output on, regardless of config.
    pub verbose: bool,
}

/// Parse arguments and dispatch to a command.
pub fn run() -> Result<()> {
    let cli = args::Cli::parse();
    let ctx = Context {
        cwd: cli.cwd.clone(),
        verbose: cli.verbose,
    };
    commands::dispatch(cli.command, &ctx)
}
