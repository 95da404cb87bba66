//! git-trello - a git pre-push hook that links commits to Trello cards
//!
//! Commits that reference a card by number (`#42`) in their message get
//! a comment with a commit link posted to that card during `git push`;
//! the card can also be moved to a configured list. Force pushes prune
//! comments whose commits the push stranded, and pushes of a release
//! branch migrate the working list's cards to a dated release list.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the hook)
//! - [`hook`] - Commit selection, card sync, cleanup, and release trigger
//! - [`core`] - Domain types and configuration
//! - [`git`] - Single interface for all Git queries
//! - [`trello`] - Minimal Trello REST client behind a trait
//! - [`ui`] - Output utilities
//!
//! # Behavior Invariants
//!
//! 1. A card is modified at most once per referencing commit per push
//! 2. Stale-comment cleanup runs at most once per card per push
//! 3. The engine performs no argv or stdin inspection; the CLI feeds it
//! 4. Trello API refusals degrade to skips; only transport failures and
//!    git failures abort the push

pub mod cli;
pub mod core;
pub mod git;
pub mod hook;
pub mod trello;
pub mod ui;
