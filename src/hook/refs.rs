//! Pre-push protocol input.
//!
//! git feeds the pre-push hook one line per ref being pushed:
//!
//! ```text
//! <local ref> SP <local sha1> SP <remote ref> SP <remote sha1> LF
//! ```
//!
//! plus the remote name and URL as arguments. Both are parsed here into
//! explicit values the engine receives; the engine itself never looks at
//! process arguments or stdin.

use thiserror::Error;

use crate::core::types::Oid;

/// Errors from parsing hook input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// A line did not have the four expected fields.
    #[error("malformed ref update line: '{0}'")]
    MalformedLine(String),

    /// A SHA field was not a valid object id.
    #[error("invalid object id in ref update: {0}")]
    InvalidSha(String),
}

/// The remote a push is going to, as git passed it to the hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRemote {
    /// Remote name (or the URL again, for URL-only pushes).
    pub name: String,
    /// Remote URL.
    pub url: String,
}

impl PushRemote {
    /// Bundle the two hook arguments.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// One parsed ref-update line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefUpdate {
    /// Local ref being pushed (`refs/heads/...`).
    pub local_ref: String,
    /// Local tip; all-zero when deleting the remote ref.
    pub local_sha: Oid,
    /// Destination ref on the remote.
    pub remote_ref: String,
    /// Current remote tip; all-zero when the remote ref does not exist.
    pub remote_sha: Oid,
}

impl RefUpdate {
    /// Parse one protocol line.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` for a line without four fields or with a
    /// malformed SHA.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [local_ref, local_sha, remote_ref, remote_sha] = fields.as_slice() else {
            return Err(ProtocolError::MalformedLine(line.to_string()));
        };
        Ok(Self {
            local_ref: (*local_ref).to_string(),
            local_sha: Oid::new(*local_sha)
                .map_err(|e| ProtocolError::InvalidSha(e.to_string()))?,
            remote_ref: (*remote_ref).to_string(),
            remote_sha: Oid::new(*remote_sha)
                .map_err(|e| ProtocolError::InvalidSha(e.to_string()))?,
        })
    }

    /// The push deletes the remote ref.
    pub fn is_deletion(&self) -> bool {
        self.local_sha.is_zero()
    }

    /// The remote already has this exact tip.
    pub fn is_noop(&self) -> bool {
        self.local_sha == self.remote_sha
    }

    /// The remote ref does not exist yet.
    pub fn creates_branch(&self) -> bool {
        self.remote_sha.is_zero()
    }
}

/// Parse everything the hook read from stdin, skipping blank lines.
///
/// # Errors
///
/// Returns the first `ProtocolError` encountered.
pub fn parse_ref_updates(input: &str) -> Result<Vec<RefUpdate>, ProtocolError> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(RefUpdate::parse)
        .collect()
}
