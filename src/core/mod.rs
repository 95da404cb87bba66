//! core
//!
//! Core domain types and configuration for git-trello.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, CardNumber
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Configuration is strict: unknown keys are rejected and required
//!   values are checked before any git or network work happens

pub mod config;
pub mod types;
