//! Git query adapter.
//!
//! Wraps the handful of git commands the hook needs as typed query
//! functions. Each call spawns a `git` process, waits for it, and parses
//! stdout; a nonzero exit (other than the documented tri-state queries)
//! means the environment is broken and aborts the invocation.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::core::types::Oid;

// =============================================================================
// Errors
// =============================================================================

/// Errors from git queries.
#[derive(Debug, Error)]
pub enum GitError {
    /// The path is not inside a git work tree.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// Path that was probed.
        path: PathBuf,
    },

    /// The git binary could not be spawned at all.
    #[error("failed to run git: {message}")]
    Spawn {
        /// Underlying IO error text.
        message: String,
    },

    /// A git command exited nonzero.
    #[error("{command} failed: {stderr}")]
    CommandFailed {
        /// The command line that failed.
        command: String,
        /// Trimmed stderr from the process.
        stderr: String,
    },

    /// Git produced output we could not parse.
    #[error("unexpected git output: {message}")]
    UnexpectedOutput {
        /// What was wrong with the output.
        message: String,
    },
}

// =============================================================================
// Types
// =============================================================================

/// One commit from a range listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full object id.
    pub sha: Oid,
    /// Abbreviated object id as git printed it.
    pub short_sha: String,
}

/// Which refs a containment query inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchScope {
    /// `refs/heads/*`
    Local,
    /// `refs/remotes/*`
    Remote,
}

/// A commit range for `git log`.
///
/// `ReachableFrom` covers a brand-new branch (everything below the pushed
/// tip); `Between` covers an update (`old..new`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitRange {
    /// All ancestors of the given commit.
    ReachableFrom(Oid),
    /// Ancestors of `new` that are not ancestors of `old`.
    Between {
        /// Previous tip of the remote ref.
        old: Oid,
        /// Tip being pushed.
        new: Oid,
    },
}

impl std::fmt::Display for CommitRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitRange::ReachableFrom(sha) => write!(f, "{sha}"),
            CommitRange::Between { old, new } => write!(f, "{old}..{new}"),
        }
    }
}

// =============================================================================
// GitQuery
// =============================================================================

/// Read-only query interface to one repository.
#[derive(Debug, Clone)]
pub struct GitQuery {
    work_dir: PathBuf,
    git_dir: PathBuf,
}

impl GitQuery {
    /// Open the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns `GitError::NotARepo` if `path` is not inside a git work
    /// tree (or does not exist).
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let output = Command::new("git")
            .current_dir(path)
            .args(["rev-parse", "--show-toplevel", "--absolute-git-dir"])
            .output()
            .map_err(|_| GitError::NotARepo {
                path: path.to_path_buf(),
            })?;

        if !output.status.success() {
            return Err(GitError::NotARepo {
                path: path.to_path_buf(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut lines = stdout.lines();
        let work_dir = lines.next().map(PathBuf::from);
        let git_dir = lines.next().map(PathBuf::from);
        match (work_dir, git_dir) {
            (Some(work_dir), Some(git_dir)) => Ok(Self { work_dir, git_dir }),
            _ => Err(GitError::UnexpectedOutput {
                message: "rev-parse did not report both work dir and git dir".into(),
            }),
        }
    }

    /// Root of the work tree.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// The `.git` directory (where the hook's config file lives).
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    // -------------------------------------------------------------------------
    // Branch and remote queries
    // -------------------------------------------------------------------------

    /// Name of the currently checked-out branch.
    ///
    /// A detached HEAD reports as `HEAD`, which never matches a configured
    /// branch name.
    pub fn current_branch(&self) -> Result<String, GitError> {
        let stdout = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(stdout.trim().to_string())
    }

    /// Names of all configured remotes.
    pub fn remotes(&self) -> Result<Vec<String>, GitError> {
        let stdout = self.run(&["remote"])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// The remote a push of `branch` would go to, if configured.
    ///
    /// Follows git's own resolution order: `branch.<name>.pushRemote`,
    /// then `remote.pushDefault`, then `branch.<name>.remote`.
    pub fn push_remote(&self, branch: &str) -> Result<Option<String>, GitError> {
        let keys = [
            format!("branch.{branch}.pushRemote"),
            "remote.pushDefault".to_string(),
            format!("branch.{branch}.remote"),
        ];
        for key in &keys {
            if let Some(remote) = self.try_config(key)? {
                return Ok(Some(remote));
            }
        }
        Ok(None)
    }

    // -------------------------------------------------------------------------
    // Commit queries
    // -------------------------------------------------------------------------

    /// Commits in a range, newest first (git log's natural order).
    pub fn commits_in_range(&self, range: &CommitRange) -> Result<Vec<Commit>, GitError> {
        let spec = range.to_string();
        let stdout = self.run(&["log", "--format=%H%x09%h", spec.as_str(), "--"])?;
        parse_commit_lines(&stdout)
    }

    /// Full message body of one commit, trailing whitespace trimmed.
    pub fn commit_body(&self, sha: &Oid) -> Result<String, GitError> {
        let stdout = self.run(&["log", "-1", "--format=%B", sha.as_str(), "--"])?;
        Ok(stdout.trim_end().to_string())
    }

    /// Branch names (local or remote-tracking) that contain the commit.
    ///
    /// Remote names come back in `<remote>/<branch>` form. Symbolic
    /// entries such as `origin/HEAD` are excluded.
    pub fn branches_with_commit(
        &self,
        sha: &Oid,
        scope: BranchScope,
    ) -> Result<Vec<String>, GitError> {
        let stdout = match scope {
            BranchScope::Local => self.run(&[
                "branch",
                "--contains",
                sha.as_str(),
                "--format=%(refname)",
            ])?,
            BranchScope::Remote => self.run(&[
                "branch",
                "-r",
                "--contains",
                sha.as_str(),
                "--format=%(refname)",
            ])?,
        };
        let prefix = match scope {
            BranchScope::Local => "refs/heads/",
            BranchScope::Remote => "refs/remotes/",
        };
        Ok(branch_names(&stdout, prefix))
    }

    /// Whether the object exists locally (as a commit).
    pub fn object_exists(&self, sha: &Oid) -> Result<bool, GitError> {
        let spec = format!("{sha}^{{commit}}");
        self.run_tristate(&["rev-parse", "--verify", "--quiet", spec.as_str()])
    }

    /// Whether `ancestor` is an ancestor of (or equal to) `descendant`.
    pub fn is_ancestor(&self, ancestor: &Oid, descendant: &Oid) -> Result<bool, GitError> {
        self.run_tristate(&[
            "merge-base",
            "--is-ancestor",
            ancestor.as_str(),
            descendant.as_str(),
        ])
    }

    // -------------------------------------------------------------------------
    // Force-push heuristic
    // -------------------------------------------------------------------------

    /// Best-effort check for a force flag on the parent `git push` command.
    ///
    /// Only used when the pushed-over commit is not available locally, so
    /// ancestry cannot answer. Reads the parent process argv via `ps`;
    /// any failure reads as "not forced".
    #[cfg(unix)]
    pub fn push_forced(&self) -> bool {
        let ppid = std::os::unix::process::parent_id().to_string();
        let Ok(output) = Command::new("ps")
            .args(["-ocommand=", "-p", ppid.as_str()])
            .output()
        else {
            return false;
        };
        if !output.status.success() {
            return false;
        }
        let cmdline = String::from_utf8_lossy(&output.stdout);
        command_has_force_flag(&cmdline)
    }

    /// Best-effort check for a force flag on the parent `git push` command.
    ///
    /// No portable parent-argv source off unix; reads as "not forced".
    #[cfg(not(unix))]
    pub fn push_forced(&self) -> bool {
        false
    }

    // -------------------------------------------------------------------------
    // Process plumbing
    // -------------------------------------------------------------------------

    /// Run git, requiring success; returns stdout.
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = Command::new("git")
            .current_dir(&self.work_dir)
            .args(args)
            .output()
            .map_err(|e| GitError::Spawn {
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run git where exit 0 means yes and exit 1 means no; anything else
    /// is an error.
    fn run_tristate(&self, args: &[&str]) -> Result<bool, GitError> {
        let output = Command::new("git")
            .current_dir(&self.work_dir)
            .args(args)
            .output()
            .map_err(|e| GitError::Spawn {
                message: e.to_string(),
            })?;

        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    /// Read one git config value; `None` when the key is unset.
    fn try_config(&self, key: &str) -> Result<Option<String>, GitError> {
        let output = Command::new("git")
            .current_dir(&self.work_dir)
            .args(["config", "--get", key])
            .output()
            .map_err(|e| GitError::Spawn {
                message: e.to_string(),
            })?;

        match output.status.code() {
            Some(0) => {
                let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if value.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(value))
                }
            }
            Some(1) => Ok(None),
            _ => Err(GitError::CommandFailed {
                command: format!("git config --get {key}"),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

// =============================================================================
// Output parsing
// =============================================================================

/// Parse `git log --format=%H%x09%h` output.
fn parse_commit_lines(stdout: &str) -> Result<Vec<Commit>, GitError> {
    let mut commits = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (long, short) = line.split_once('\t').ok_or_else(|| GitError::UnexpectedOutput {
            message: format!("malformed log line: '{line}'"),
        })?;
        let sha = Oid::new(long).map_err(|e| GitError::UnexpectedOutput {
            message: e.to_string(),
        })?;
        commits.push(Commit {
            sha,
            short_sha: short.trim().to_string(),
        });
    }
    Ok(commits)
}

/// Extract branch names from `--format=%(refname)` output, keeping only
/// refs under `prefix` (this drops detached-HEAD pseudo entries and
/// `origin/HEAD` symrefs).
fn branch_names(stdout: &str, prefix: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix(prefix))
        .filter(|name| !name.is_empty() && !name.ends_with("/HEAD") && *name != "HEAD")
        .map(String::from)
        .collect()
}

/// Whether a `git push` command line carries a force flag.
fn command_has_force_flag(cmdline: &str) -> bool {
    cmdline.split_whitespace().any(|arg| {
        arg == "-f"
            || arg == "--force"
            || arg == "--force-with-lease"
            || arg.starts_with("--force-with-lease=")
    })
}
