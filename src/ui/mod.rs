//! ui
//!
//! User-facing output utilities.
//!
//! # Modules
//!
//! - [`output`] - Verbosity handling and `Trello:`-prefixed printing
//!
//! # Design
//!
//! The hook has no interactive surface and no logging framework. All
//! progress goes to stdout behind a verbosity gate, all fatal messages
//! go to stderr, and every line carries the `Trello:` prefix so hook
//! output is attributable amid git's own push chatter.

pub mod output;
