//! git
//!
//! Single interface for all Git queries the hook performs.
//!
//! # Architecture
//!
//! This module is the **only doorway** to the repository. Every operation
//! shells out to the `git` binary and parses its output; the hook always
//! runs where git itself just ran, so a working `git` on PATH is a given.
//!
//! # Responsibilities
//!
//! - Repository discovery (work dir and git dir)
//! - Branch and remote queries (current branch, remotes, push remote)
//! - Commit range listing and message bodies
//! - Branch-containment and ancestry queries
//! - Force-push detection heuristic
//!
//! # Invariants
//!
//! - All operations are read-only queries; nothing here mutates the repo
//! - An unexpected nonzero exit is fatal for the invocation (no retries)
//!
//! # Example
//!
//! ```ignore
//! use git_trello::git::GitQuery;
//! use std::path::Path;
//!
//! let git = GitQuery::open(Path::new("."))?;
//! let branch = git.current_branch()?;
//! let remotes = git.remotes()?;
//! ```

mod query;

pub use query::{BranchScope, Commit, CommitRange, GitError, GitQuery};
