//! Commit selection and card sync.
//!
//! [`PrePushHook::run`] is the whole pre-push state machine: guards,
//! per-ref commit ranges, the cross-branch novelty filter, per-commit
//! card commentary and moves, stale-comment cleanup on force pushes, and
//! the release trigger. It borrows its collaborators and returns the
//! cards it touched, so it can be driven unchanged from the CLI or from
//! tests.

use std::collections::HashSet;

use thiserror::Error;

use crate::core::config::HookSettings;
use crate::core::types::{CardNumber, Oid};
use crate::git::{BranchScope, Commit, CommitRange, GitError, GitQuery};
use crate::hook::comment;
use crate::hook::refs::{PushRemote, RefUpdate};
use crate::trello::{Card, CardPosition, TrelloApi, TrelloError};
use crate::ui::output::{self, Verbosity};

/// Errors that abort a hook invocation (and with it, the push).
#[derive(Debug, Error)]
pub enum HookError {
    /// Strict mode turned an unresolved card reference into a stop.
    #[error("{0}")]
    Strict(String),

    /// A git query failed; the environment is broken.
    #[error(transparent)]
    Git(#[from] GitError),

    /// The Trello service was unreachable.
    #[error(transparent)]
    Trello(#[from] TrelloError),
}

/// The pre-push hook engine.
pub struct PrePushHook<'a> {
    settings: &'a HookSettings,
    git: &'a GitQuery,
    trello: &'a dyn TrelloApi,
    remote: Option<PushRemote>,
    /// Commit link prefix, when the remote looks like GitHub.
    base_url: Option<String>,
    verbosity: Verbosity,
}

impl<'a> PrePushHook<'a> {
    /// Wire up an engine for one invocation.
    ///
    /// `remote` is what git passed on the hook command line; `None` is
    /// for embedded use, where commit links are skipped and the release
    /// guard falls back to the branch's configured push remote.
    pub fn new(
        settings: &'a HookSettings,
        git: &'a GitQuery,
        trello: &'a dyn TrelloApi,
        remote: Option<PushRemote>,
        verbosity: Verbosity,
    ) -> Self {
        let base_url = remote
            .as_ref()
            .and_then(|remote| comment::commit_base_url(&remote.url));
        Self {
            settings,
            git,
            trello,
            remote,
            base_url,
            verbosity,
        }
    }

    /// Process one push: every ref-update line git wrote to stdin.
    ///
    /// Returns the cards touched (commented, moved, or bulk-moved by a
    /// release).
    ///
    /// # Errors
    ///
    /// Git failures and network-level Trello failures abort; in strict
    /// mode an unresolved card reference aborts too.
    pub async fn run(&self, updates: &[RefUpdate]) -> Result<Vec<Card>, HookError> {
        let current_branch = self.git.current_branch()?;

        if let Some(branch) = &self.settings.branch {
            if branch != &current_branch {
                self.note("pushing unspecified branch skips modifying cards");
                return Ok(Vec::new());
            }
        }

        let forced = self.push_is_forced(updates)?;
        if forced && !self.settings.force_override {
            self.note("force pushing skips modifying cards");
            return Ok(Vec::new());
        }

        let mut touched: Vec<Card> = Vec::new();
        let mut cleaned: HashSet<CardNumber> = HashSet::new();

        for update in updates {
            // An up-to-date or deleted ref means there is nothing new on
            // the wire; the whole invocation stops here, release included.
            if update.is_deletion() || update.is_noop() {
                return Ok(touched);
            }

            let range = if update.creates_branch() {
                CommitRange::ReachableFrom(update.local_sha.clone())
            } else {
                CommitRange::Between {
                    old: update.remote_sha.clone(),
                    new: update.local_sha.clone(),
                }
            };
            let listed = self.git.commits_in_range(&range)?;

            // With a branch restriction there is no cross-branch history
            // to dedupe against; everything in the range is fair game.
            let commits = if self.settings.branch.is_some() {
                listed
            } else {
                self.novel_commits(listed)?
            };

            // git lists newest first; card history reads oldest first
            for commit in commits.iter().rev() {
                self.sync_commit(commit, &current_branch, forced, &mut cleaned, &mut touched)
                    .await?;
            }
        }

        if let Some(moved) = self.run_release(&current_branch).await? {
            touched = moved;
        }

        Ok(touched)
    }

    // -------------------------------------------------------------------------
    // Guards and filters
    // -------------------------------------------------------------------------

    /// Whether this push rewrites history.
    ///
    /// Forced ⇔ some updated ref does not fast-forward its old tip. When
    /// the old tip's object is not available locally, ancestry cannot
    /// answer and the parent-argv heuristic decides.
    fn push_is_forced(&self, updates: &[RefUpdate]) -> Result<bool, HookError> {
        let mut needs_heuristic = false;
        for update in updates {
            if update.is_deletion() || update.is_noop() || update.creates_branch() {
                continue;
            }
            if !self.git.object_exists(&update.remote_sha)? {
                needs_heuristic = true;
                continue;
            }
            if !self.git.is_ancestor(&update.remote_sha, &update.local_sha)? {
                return Ok(true);
            }
        }
        if needs_heuristic {
            return Ok(self.git.push_forced());
        }
        Ok(false)
    }

    /// Drop commits already visible on some remote branch.
    ///
    /// Scans newest first. In exhaustive mode every known commit is
    /// skipped individually; otherwise the first known commit is the
    /// boundary and everything older is assumed already processed.
    fn novel_commits(&self, listed: Vec<Commit>) -> Result<Vec<Commit>, HookError> {
        let mut fresh = Vec::new();
        for commit in listed {
            let known = !self
                .git
                .branches_with_commit(&commit.sha, BranchScope::Remote)?
                .is_empty();
            if !known {
                fresh.push(commit);
                continue;
            }
            if self.settings.exhaustive {
                self.note(format!(
                    "{} has already been pushed on another branch",
                    commit.short_sha
                ));
            } else {
                self.note(format!(
                    "{} marks beginning of pushed commits, stopping there",
                    commit.short_sha
                ));
                break;
            }
        }
        Ok(fresh)
    }

    // -------------------------------------------------------------------------
    // Per-commit sync
    // -------------------------------------------------------------------------

    async fn sync_commit(
        &self,
        commit: &Commit,
        current_branch: &str,
        forced: bool,
        cleaned: &mut HashSet<CardNumber>,
        touched: &mut Vec<Card>,
    ) -> Result<(), HookError> {
        let body = self.git.commit_body(&commit.sha)?;

        let Some(number) = comment::extract_card_number(&body) else {
            return self.skip_or_stop(format!("{} no card number", commit.short_sha));
        };

        let Some(card) = self.trello.get_card(&number).await? else {
            return self.skip_or_stop(format!(
                "{} cannot find card #{}",
                commit.short_sha, number
            ));
        };

        // The guard above only lets a forced push through with
        // force_override set, so cleanup is wanted here.
        if forced && !cleaned.contains(&number) {
            self.prune_stale_comments(&card, &number, current_branch, &commit.short_sha)
                .await?;
            cleaned.insert(number.clone());
        }

        self.note(format!(
            "{} commenting on card #{}",
            commit.short_sha, number
        ));
        let text = comment::compose(self.base_url.as_deref(), &commit.sha, &body);
        self.trello.add_comment(&card.id, &text).await?;

        if let Some(list_id) = &self.settings.list_id {
            if &card.id_list != list_id {
                self.note(format!(
                    "{} moving card #{} to list {}",
                    commit.short_sha, number, list_id
                ));
                self.trello
                    .move_card(&card.id, list_id, CardPosition::Bottom)
                    .await?;
            }
        }

        touched.push(card);
        Ok(())
    }

    /// Warning policy for an unresolved card reference.
    fn skip_or_stop(&self, warning: String) -> Result<(), HookError> {
        if self.settings.strict {
            return Err(HookError::Strict(warning));
        }
        self.note(warning);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Force-push cleanup
    // -------------------------------------------------------------------------

    /// Delete this card's comments that link commits this push is about
    /// to strand. Runs at most once per card per invocation.
    async fn prune_stale_comments(
        &self,
        card: &Card,
        number: &CardNumber,
        current_branch: &str,
        short_sha: &str,
    ) -> Result<(), HookError> {
        // Without a recognized remote the hook never posted links, so
        // there is nothing of ours to recognize.
        let Some(base_url) = self.base_url.as_deref() else {
            return Ok(());
        };
        let Some(comments) = self.trello.get_comments(&card.id).await? else {
            return Ok(());
        };

        let mut stale = Vec::new();
        for candidate in comments {
            let Some(old_sha) = comment::linked_commit(&candidate.text, base_url, number)
            else {
                continue;
            };
            if self.commit_is_stranded(&old_sha, current_branch)? {
                stale.push(candidate);
            }
        }

        if !stale.is_empty() {
            self.note(format!(
                "{short_sha} deleting {} previous comment(s) on card #{number}",
                stale.len()
            ));
            self.trello.delete_comments(&stale).await?;
        }
        Ok(())
    }

    /// A linked commit is stranded when no local branch has it and no
    /// remote branch will keep it: either no remote branch contains it,
    /// or only the one this push is rewriting does.
    fn commit_is_stranded(&self, sha: &Oid, current_branch: &str) -> Result<bool, HookError> {
        if !self
            .git
            .branches_with_commit(sha, BranchScope::Local)?
            .is_empty()
        {
            return Ok(false);
        }

        let remote_branches = self.git.branches_with_commit(sha, BranchScope::Remote)?;
        if remote_branches.is_empty() {
            return Ok(true);
        }
        if remote_branches.len() != 1 {
            return Ok(false);
        }
        for remote in self.git.remotes()? {
            if remote_branches[0] == format!("{remote}/{current_branch}") {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // -------------------------------------------------------------------------
    // Release trigger
    // -------------------------------------------------------------------------

    /// On a release-branch push, create the dated list and drain the
    /// working list into it.
    async fn run_release(&self, current_branch: &str) -> Result<Option<Vec<Card>>, HookError> {
        let Some(release) = &self.settings.release else {
            return Ok(None);
        };
        if release.branch != current_branch {
            return Ok(None);
        }
        if let Some(want) = &release.remote {
            let push_remote = match &self.remote {
                Some(remote) => Some(remote.name.clone()),
                None => self.git.push_remote(current_branch)?,
            };
            if push_remote.as_deref() != Some(want.as_str()) {
                return Ok(None);
            }
        }
        // Config resolution guarantees list_id whenever [release] is set
        let Some(list_id) = self.settings.list_id.as_deref() else {
            return Ok(None);
        };

        self.note("moving cards to new release list");

        use std::fmt::Write as _;
        let mut name = String::new();
        if write!(name, "{}", chrono::Local::now().format(&release.name)).is_err() {
            self.note("cannot format release list name, leaving cards in place");
            return Ok(None);
        }
        let Some(release_list) = self.trello.create_list(&name).await? else {
            self.note("cannot create release list, leaving cards in place");
            return Ok(None);
        };
        self.trello
            .move_all_cards(list_id, &release_list.id)
            .await
            .map_err(HookError::from)
    }

    fn note(&self, message: impl std::fmt::Display) {
        output::note(message, self.verbosity);
    }
}
