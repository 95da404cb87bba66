//! Output formatting for hook diagnostics.
//!
//! Progress notes are printed to stdout only when verbose; fatal messages
//! go to stderr unconditionally. Every line is prefixed with `Trello:` so
//! the hook's output stands out in the middle of a `git push`.

use std::fmt::Display;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Print nothing except fatal messages.
    Quiet,
    /// Print progress notes and warnings as the hook works.
    Verbose,
}

impl Verbosity {
    /// Derive verbosity from the config setting and the CLI override.
    pub fn from_flags(config_verbose: bool, cli_verbose: bool) -> Self {
        if config_verbose || cli_verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Quiet
        }
    }

    /// Whether progress notes should be printed.
    pub fn is_verbose(self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Print a progress note or warning to stdout, if verbose.
pub fn note(message: impl Display, verbosity: Verbosity) {
    if verbosity.is_verbose() {
        println!("Trello: {message}");
    }
}

/// Print a fatal message to stderr. Always printed; a nonzero exit after
/// this is what makes git abort the push.
pub fn error(message: impl Display) {
    eprintln!("Trello: {message}");
}
