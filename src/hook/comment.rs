//! Card-comment text conventions.
//!
//! A hook comment looks like:
//!
//! ```text
//! https://github.com/owner/repo/commit/<full sha>
//!
//! Fix the frobnicator [#42]
//! ```
//!
//! This module owns everything about that shape: finding the `#42` card
//! reference in a commit body, deriving the commit base URL from a
//! GitHub-style remote, composing new comment text, and recognizing the
//! hook's own earlier comments (with their embedded SHA) so force-push
//! cleanup can judge them.

use crate::core::types::{CardNumber, Oid};

/// First `#<digits>` reference in a commit body.
pub fn extract_card_number(body: &str) -> Option<CardNumber> {
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'#' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                // all-ASCII slice, boundaries are safe
                return CardNumber::new(&body[start..end]).ok();
            }
        }
        i += 1;
    }
    None
}

/// Extract `(owner, repo)` from a GitHub remote URL.
///
/// Handles the ssh form (`git@github.com:owner/repo.git`), https, and
/// `ssh://` URLs. Anything else is not a GitHub remote.
pub fn parse_github_remote(url: &str) -> Option<(String, String)> {
    let rest = if let Some(rest) = url.strip_prefix("git@github.com:") {
        rest
    } else if let Some(rest) = url.strip_prefix("https://github.com/") {
        rest
    } else if let Some(rest) = url.strip_prefix("ssh://git@github.com/") {
        rest
    } else {
        return None;
    };

    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let rest = rest.strip_suffix('/').unwrap_or(rest);

    let (owner, repo) = rest.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

/// Commit link prefix for a remote, when it is a GitHub-style URL.
///
/// The full link is this base followed by the forty-char SHA, so the
/// base ends with `/commit/`.
pub fn commit_base_url(remote_url: &str) -> Option<String> {
    let (owner, repo) = parse_github_remote(remote_url)?;
    Some(format!("https://github.com/{owner}/{repo}/commit/"))
}

/// Comment text for a commit: link line, blank line, body. Without a
/// recognized remote there is no link, just the body.
pub fn compose(base_url: Option<&str>, sha: &Oid, body: &str) -> String {
    match base_url {
        Some(base) => format!("{base}{sha}\n\n{body}"),
        None => body.to_string(),
    }
}

/// If `text` is one of the hook's own comments for this card, the commit
/// it links to.
///
/// Provenance requires the text to start with the base URL and to carry
/// the `[#<number>]` marker somewhere in the body. The SHA is the last
/// `/`-separated token of the first line; a token that does not parse as
/// an object id disqualifies the comment rather than aborting the push.
pub fn linked_commit(text: &str, base_url: &str, number: &CardNumber) -> Option<Oid> {
    if !text.starts_with(base_url) {
        return None;
    }
    let marker = format!("[#{number}]");
    if !text.contains(&marker) {
        return None;
    }
    let first_line = text.lines().next()?;
    let token = first_line.rsplit('/').next()?;
    Oid::new(token.trim()).ok()
}
