//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

const PRE_PUSH_AFTER_HELP: &str = "\
Git invokes the hook with the remote name and URL as arguments and
writes one '<local_ref> <local_sha> <remote_ref> <remote_sha>' line per
pushed ref to its stdin.

Install into a repository:
  printf '#!/bin/sh\\nexec git-trello pre-push \"$@\"\\n' > .git/hooks/pre-push
  chmod +x .git/hooks/pre-push";

/// Link pushed commits to Trello cards.
#[derive(Debug, Parser)]
#[command(
    name = "git-trello",
    version,
    about = "Link pushed commits to Trello cards",
    long_about = "Link pushed commits to Trello cards.\n\n\
        Commits that reference a card by number (#42) get a comment with\n\
        a commit link posted to that card; the card can also be moved to\n\
        a configured list, and release-branch pushes migrate the whole\n\
        working list to a dated release list.\n\n\
        Configuration lives in .git/trello/config.toml."
)]
pub struct Cli {
    /// Run as if started in this directory
    #[arg(long, global = true, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// Print progress notes regardless of the config setting
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the pre-push hook (git calls this, not you)
    #[command(after_help = PRE_PUSH_AFTER_HELP)]
    PrePush {
        /// Remote name, as git provides it
        remote: String,

        /// Remote URL, as git provides it
        url: String,
    },

    /// Look up a list id by name on the configured board
    #[command(after_help = "Prints 'List ID: <id>' for pasting into list_id.")]
    FindList {
        /// List name to search for
        name: String,
    },
}
