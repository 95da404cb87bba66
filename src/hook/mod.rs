//! hook
//!
//! The pre-push hook itself.
//!
//! # Architecture
//!
//! The engine is deliberately free of process concerns: stdin parsing
//! and argv handling happen in [`refs`] (driven by the CLI), and the
//! engine receives plain values plus borrowed collaborators. That keeps
//! the whole state machine runnable against a temp repository and a mock
//! Trello board.
//!
//! # Modules
//!
//! - [`refs`] - pre-push protocol input (`RefUpdate`, `PushRemote`)
//! - [`comment`] - card references, commit links, comment provenance
//! - `engine` - [`PrePushHook`]: guards, selection, sync, cleanup,
//!   release trigger

pub mod comment;
mod engine;
pub mod refs;

pub use engine::{HookError, PrePushHook};
pub use refs::{parse_ref_updates, ProtocolError, PushRemote, RefUpdate};
