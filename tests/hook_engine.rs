//! Integration tests for the pre-push engine.
//!
//! Each test builds a real git repository via tempfile, seeds an
//! in-memory Trello board, and drives [`PrePushHook::run`] with
//! hand-assembled ref updates, asserting on the exact API calls the
//! engine made (and did not make).

use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicU32, Ordering};

use tempfile::TempDir;

use git_trello::core::config::{HookSettings, ReleaseSettings};
use git_trello::core::types::Oid;
use git_trello::git::GitQuery;
use git_trello::hook::{HookError, PrePushHook, PushRemote, RefUpdate};
use git_trello::trello::mock::{FailOn, MockOperation, MockTrello};
use git_trello::trello::{Card, CardComment, CardPosition, Credentials, TrelloError};
use git_trello::ui::output::Verbosity;

/// Comment link prefix matching the fixture's GitHub remote.
const BASE_URL: &str = "https://github.com/octo/widgets/commit/";

// =============================================================================
// Test Fixtures
// =============================================================================

/// Test fixture that creates a real git repository.
///
/// Commits are stamped with strictly increasing dates so `git log` order
/// is deterministic even when a test creates several within one second.
struct TestRepo {
    dir: TempDir,
    ticks: AtomicU32,
}

impl TestRepo {
    /// Create a new test repository with an initial commit on `main`.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "-b", "main"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);

        let repo = Self {
            dir,
            ticks: AtomicU32::new(0),
        };
        repo.commit("README.md", "Initial commit");
        repo
    }

    /// Get the path to the repository.
    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Open a query adapter for this repository.
    fn git(&self) -> GitQuery {
        GitQuery::open(self.path()).expect("failed to open test repo")
    }

    fn next_date(&self) -> String {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed);
        format!("2024-03-01T00:{:02}:{:02}+00:00", tick / 60, tick % 60)
    }

    /// Create a file and commit it, returning the new commit id.
    fn commit(&self, path: &str, message: &str) -> Oid {
        std::fs::write(self.dir.path().join(path), format!("{message}\n")).unwrap();
        run_git(self.path(), &["add", path]);
        self.run_dated(&["commit", "-m", message]);
        self.head_oid()
    }

    /// Rewrite the current tip's message, returning the replacement id.
    fn amend(&self, message: &str) -> Oid {
        self.run_dated(&["commit", "--amend", "-m", message]);
        self.head_oid()
    }

    /// Merge a branch with a merge commit, returning its id.
    fn merge_no_ff(&self, branch: &str, message: &str) -> Oid {
        self.run_dated(&["merge", "--no-ff", "-m", message, branch]);
        self.head_oid()
    }

    /// Run a git command with this repo's deterministic clock applied.
    fn run_dated(&self, args: &[&str]) {
        let date = self.next_date();
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .env("GIT_AUTHOR_DATE", &date)
            .env("GIT_COMMITTER_DATE", &date)
            .output()
            .expect("git command failed");
        if !output.status.success() {
            panic!(
                "git {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }

    /// Get HEAD as a validated id, using git directly.
    fn head_oid(&self) -> Oid {
        let output = Command::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(self.path())
            .output()
            .expect("git rev-parse failed");
        let raw = String::from_utf8(output.stdout).unwrap().trim().to_string();
        Oid::new(raw).unwrap()
    }

    /// Create a bare repository and register it as a remote.
    fn add_bare_remote(&self, name: &str) -> TempDir {
        let remote = TempDir::new().expect("failed to create remote dir");
        run_git(remote.path(), &["init", "--bare"]);
        run_git(
            self.path(),
            &["remote", "add", name, remote.path().to_str().unwrap()],
        );
        remote
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn settings() -> HookSettings {
    HookSettings {
        credentials: Credentials::new("key", "token"),
        board_id: "board".to_string(),
        list_id: None,
        branch: None,
        verbose: false,
        strict: false,
        force_override: false,
        exhaustive: false,
        release: None,
    }
}

fn github_remote() -> PushRemote {
    PushRemote::new("origin", "git@github.com:octo/widgets.git")
}

fn card(id: &str, list: &str) -> Card {
    Card {
        id: id.to_string(),
        id_list: list.to_string(),
    }
}

/// Ref update for `refs/heads/main`, from raw ids.
fn update(local: &Oid, remote: &Oid) -> RefUpdate {
    RefUpdate {
        local_ref: "refs/heads/main".to_string(),
        local_sha: local.clone(),
        remote_ref: "refs/heads/main".to_string(),
        remote_sha: remote.clone(),
    }
}

fn creation(local: &Oid) -> RefUpdate {
    update(local, &Oid::zero())
}

async fn run_hook(
    repo: &TestRepo,
    settings: &HookSettings,
    trello: &MockTrello,
    updates: &[RefUpdate],
) -> Result<Vec<Card>, HookError> {
    let git = repo.git();
    let hook = PrePushHook::new(settings, &git, trello, Some(github_remote()), Verbosity::Quiet);
    hook.run(updates).await
}

fn linked_comment(sha: &Oid, body: &str) -> String {
    format!("{BASE_URL}{sha}\n\n{body}")
}

// =============================================================================
// Commenting and Moving
// =============================================================================

#[tokio::test]
async fn new_branch_push_comments_oldest_first() {
    let repo = TestRepo::new();
    let first = repo.commit("a.txt", "add widgets [#11]");
    let second = repo.commit("b.txt", "wire widgets up [#22]");

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "doing"));
    trello.insert_card("22", card("c22", "doing"));

    let touched = run_hook(&repo, &settings(), &trello, &[creation(&second)])
        .await
        .unwrap();

    assert_eq!(
        trello.operations(),
        vec![
            MockOperation::GetCard {
                number: "11".into()
            },
            MockOperation::AddComment {
                card_id: "c11".into(),
                text: linked_comment(&first, "add widgets [#11]"),
            },
            MockOperation::GetCard {
                number: "22".into()
            },
            MockOperation::AddComment {
                card_id: "c22".into(),
                text: linked_comment(&second, "wire widgets up [#22]"),
            },
        ]
    );
    let ids: Vec<&str> = touched.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c11", "c22"]);
}

#[tokio::test]
async fn branch_update_only_covers_the_pushed_range() {
    let repo = TestRepo::new();
    let old_tip = repo.commit("a.txt", "already upstream [#11]");
    let new_tip = repo.commit("b.txt", "fresh work [#22]");

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "doing"));
    trello.insert_card("22", card("c22", "doing"));

    run_hook(&repo, &settings(), &trello, &[update(&new_tip, &old_tip)])
        .await
        .unwrap();

    assert_eq!(
        trello.operations(),
        vec![
            MockOperation::GetCard {
                number: "22".into()
            },
            MockOperation::AddComment {
                card_id: "c22".into(),
                text: linked_comment(&new_tip, "fresh work [#22]"),
            },
        ]
    );
}

#[tokio::test]
async fn card_moved_only_when_list_differs() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "start work [#11]");
    let tip = repo.commit("b.txt", "more work [#22]");

    let mut settings = settings();
    settings.list_id = Some("doing".to_string());

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "todo"));
    trello.insert_card("22", card("c22", "doing"));

    run_hook(&repo, &settings, &trello, &[creation(&tip)])
        .await
        .unwrap();

    let moves: Vec<MockOperation> = trello
        .operations()
        .into_iter()
        .filter(|op| matches!(op, MockOperation::MoveCard { .. }))
        .collect();
    assert_eq!(
        moves,
        vec![MockOperation::MoveCard {
            card_id: "c11".into(),
            list_id: "doing".into(),
            position: CardPosition::Bottom,
        }]
    );
    assert_eq!(trello.card("11").unwrap().id_list, "doing");
}

#[tokio::test]
async fn commit_without_card_number_is_skipped() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "tidy whitespace");
    let tip = repo.commit("b.txt", "real work [#22]");

    let trello = MockTrello::new();
    trello.insert_card("22", card("c22", "doing"));

    let touched = run_hook(&repo, &settings(), &trello, &[creation(&tip)])
        .await
        .unwrap();

    assert_eq!(touched.len(), 1);
    assert_eq!(
        trello.operations(),
        vec![
            MockOperation::GetCard {
                number: "22".into()
            },
            MockOperation::AddComment {
                card_id: "c22".into(),
                text: linked_comment(&tip, "real work [#22]"),
            },
        ]
    );
}

#[tokio::test]
async fn unknown_card_is_skipped_without_commenting() {
    let repo = TestRepo::new();
    let tip = repo.commit("a.txt", "work on a ghost [#99]");

    let trello = MockTrello::new();
    let touched = run_hook(&repo, &settings(), &trello, &[creation(&tip)])
        .await
        .unwrap();

    assert!(touched.is_empty());
    assert_eq!(
        trello.operations(),
        vec![MockOperation::GetCard {
            number: "99".into()
        }]
    );
}

// =============================================================================
// Strict Mode
// =============================================================================

#[tokio::test]
async fn strict_mode_aborts_on_missing_card_number() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "no reference here");
    let tip = repo.commit("b.txt", "later work [#22]");

    let mut settings = settings();
    settings.strict = true;

    let trello = MockTrello::new();
    trello.insert_card("22", card("c22", "doing"));

    let err = run_hook(&repo, &settings, &trello, &[creation(&tip)])
        .await
        .unwrap_err();

    // The offending commit is the oldest, so nothing was synced first
    assert!(matches!(err, HookError::Strict(_)));
    assert!(err.to_string().contains("no card number"));
    assert!(trello.operations().is_empty());
}

#[tokio::test]
async fn strict_mode_aborts_on_unknown_card() {
    let repo = TestRepo::new();
    let tip = repo.commit("a.txt", "work on a ghost [#99]");

    let mut settings = settings();
    settings.strict = true;

    let trello = MockTrello::new();
    let err = run_hook(&repo, &settings, &trello, &[creation(&tip)])
        .await
        .unwrap_err();

    assert!(matches!(err, HookError::Strict(_)));
    assert!(err.to_string().contains("cannot find card #99"));
}

// =============================================================================
// Branch Restriction and Cross-Branch Dedupe
// =============================================================================

#[tokio::test]
async fn pushes_from_other_branches_are_ignored() {
    let repo = TestRepo::new();
    let tip = repo.commit("a.txt", "work [#11]");

    let mut settings = settings();
    settings.branch = Some("deploy".to_string());

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "doing"));

    let touched = run_hook(&repo, &settings, &trello, &[creation(&tip)])
        .await
        .unwrap();

    assert!(touched.is_empty());
    assert!(trello.operations().is_empty());
}

#[tokio::test]
async fn configured_branch_processes_commits_known_elsewhere() {
    let repo = TestRepo::new();
    let base = repo.head_oid();
    let tip = repo.commit("a.txt", "work [#11]");

    // The commit is already on a remote branch; a branch restriction
    // means the whole range is still processed.
    let _remote = repo.add_bare_remote("origin");
    run_git(repo.path(), &["push", "origin", "main"]);

    let mut settings = settings();
    settings.branch = Some("main".to_string());

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "doing"));

    run_hook(&repo, &settings, &trello, &[update(&tip, &base)])
        .await
        .unwrap();

    assert_eq!(
        trello.operations(),
        vec![
            MockOperation::GetCard {
                number: "11".into()
            },
            MockOperation::AddComment {
                card_id: "c11".into(),
                text: linked_comment(&tip, "work [#11]"),
            },
        ]
    );
}

/// History where a commit from another (already pushed) branch sits
/// between novel commits:
///
/// ```text
/// base -- B [#22] ------ M (merge of side)
///     \-- K (on origin/side) --/
/// ```
///
/// Returns `(tip, trello)` with card 22 seeded.
fn merged_history() -> (TestRepo, Oid, MockTrello) {
    let repo = TestRepo::new();
    // Only the remote-tracking refs matter afterwards, so the bare
    // remote does not need to outlive this setup.
    let _remote = repo.add_bare_remote("origin");

    repo.commit("b.txt", "own work [#22]");
    run_git(repo.path(), &["checkout", "-b", "side", "main~1"]);
    repo.commit("k.txt", "side work [#33]");
    run_git(repo.path(), &["push", "origin", "side"]);
    run_git(repo.path(), &["checkout", "main"]);
    let tip = repo.merge_no_ff("side", "Merge branch 'side'");

    let trello = MockTrello::new();
    trello.insert_card("22", card("c22", "doing"));
    trello.insert_card("33", card("c33", "doing"));
    (repo, tip, trello)
}

#[tokio::test]
async fn first_known_commit_ends_the_default_scan() {
    let (repo, tip, trello) = merged_history();

    run_hook(&repo, &settings(), &trello, &[creation(&tip)])
        .await
        .unwrap();

    // Newest-first scan: the merge commit is novel, the side commit is
    // already pushed, and everything older is assumed handled, so the
    // [#22] commit behind it is never synced. The merge commit itself
    // has no card number.
    assert!(trello.operations().is_empty());
}

#[tokio::test]
async fn exhaustive_scan_rescues_older_novel_commits() {
    let (repo, tip, trello) = merged_history();

    let mut settings = settings();
    settings.exhaustive = true;

    run_hook(&repo, &settings, &trello, &[creation(&tip)])
        .await
        .unwrap();

    let ops = trello.operations();
    assert_eq!(ops.len(), 2);
    assert!(matches!(
        &ops[0],
        MockOperation::GetCard { number } if number == "22"
    ));
    assert!(matches!(
        &ops[1],
        MockOperation::AddComment { card_id, .. } if card_id == "c22"
    ));
}

// =============================================================================
// Noop and Deletion Lines
// =============================================================================

#[tokio::test]
async fn up_to_date_ref_stops_the_invocation() {
    let repo = TestRepo::new();
    let tip = repo.commit("a.txt", "work [#11]");

    let mut settings = settings();
    settings.list_id = Some("doing".to_string());
    settings.release = Some(ReleaseSettings {
        branch: "main".to_string(),
        remote: None,
        name: "%Y-%m-%d Release".to_string(),
    });

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "doing"));

    let noop = update(&tip, &tip);
    let touched = run_hook(&repo, &settings, &trello, &[noop, creation(&tip)])
        .await
        .unwrap();

    // Everything after the up-to-date line is skipped, release included
    assert!(touched.is_empty());
    assert!(trello.operations().is_empty());
}

#[tokio::test]
async fn branch_deletion_stops_the_invocation() {
    let repo = TestRepo::new();
    let tip = repo.commit("a.txt", "work [#11]");

    let mut settings = settings();
    settings.list_id = Some("doing".to_string());
    settings.release = Some(ReleaseSettings {
        branch: "main".to_string(),
        remote: None,
        name: "%Y-%m-%d Release".to_string(),
    });

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "doing"));

    let deletion = update(&Oid::zero(), &tip);
    let touched = run_hook(&repo, &settings, &trello, &[deletion, creation(&tip)])
        .await
        .unwrap();

    assert!(touched.is_empty());
    assert!(trello.operations().is_empty());
}

// =============================================================================
// Force Pushes
// =============================================================================

#[tokio::test]
async fn non_fast_forward_push_is_skipped_by_default() {
    let repo = TestRepo::new();
    let original = repo.commit("a.txt", "first wording [#11]");
    let amended = repo.amend("second wording [#11]");

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "doing"));

    let touched = run_hook(
        &repo,
        &settings(),
        &trello,
        &[update(&amended, &original)],
    )
    .await
    .unwrap();

    assert!(touched.is_empty());
    assert!(trello.operations().is_empty());
}

#[tokio::test]
async fn force_override_prunes_stale_comments_once_per_card() {
    let repo = TestRepo::new();
    let base = repo.head_oid();
    let original = repo.commit("a.txt", "first cut [#11]");
    run_git(repo.path(), &["reset", "--hard", base.as_str()]);
    let rework_one = repo.commit("b1.txt", "rework part one [#11]");
    let rework_two = repo.commit("b2.txt", "rework part two [#11]");

    let mut settings = settings();
    settings.force_override = true;

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "doing"));
    // A comment for the commit this push strands
    trello.insert_comment(
        "c11",
        CardComment {
            id: "stale-1".to_string(),
            text: linked_comment(&original, "first cut [#11]"),
        },
    );
    // A human comment, and a hook comment whose commit is still on main
    trello.insert_comment(
        "c11",
        CardComment {
            id: "human-1".to_string(),
            text: "ship it".to_string(),
        },
    );
    trello.insert_comment(
        "c11",
        CardComment {
            id: "base-1".to_string(),
            text: linked_comment(&base, "groundwork [#11]"),
        },
    );

    run_hook(
        &repo,
        &settings,
        &trello,
        &[update(&rework_two, &original)],
    )
    .await
    .unwrap();

    let ops = trello.operations();
    let comment_reads = ops
        .iter()
        .filter(|op| matches!(op, MockOperation::GetComments { .. }))
        .count();
    assert_eq!(comment_reads, 1, "cleanup must run once per card");

    let deletions: Vec<&MockOperation> = ops
        .iter()
        .filter(|op| matches!(op, MockOperation::DeleteComments { .. }))
        .collect();
    assert_eq!(
        deletions,
        vec![&MockOperation::DeleteComments {
            comment_ids: vec!["stale-1".to_string()],
        }]
    );

    // Both rework commits were commented, oldest first
    let comment_texts: Vec<String> = ops
        .iter()
        .filter_map(|op| match op {
            MockOperation::AddComment { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        comment_texts,
        vec![
            linked_comment(&rework_one, "rework part one [#11]"),
            linked_comment(&rework_two, "rework part two [#11]"),
        ]
    );

    let remaining: Vec<String> = trello
        .comments_on("c11")
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert!(!remaining.contains(&"stale-1".to_string()));
    assert!(remaining.contains(&"human-1".to_string()));
    assert!(remaining.contains(&"base-1".to_string()));
}

#[tokio::test]
async fn upstream_copy_of_the_rewritten_branch_is_still_stale() {
    let repo = TestRepo::new();
    let base = repo.head_oid();
    let original = repo.commit("a.txt", "first cut [#11]");

    // The linked commit made it upstream, but only to the branch this
    // push is rewriting, so that copy is about to vanish too.
    let _remote = repo.add_bare_remote("origin");
    run_git(repo.path(), &["push", "origin", "main"]);
    run_git(repo.path(), &["reset", "--hard", base.as_str()]);
    let rework = repo.commit("b.txt", "second cut [#11]");

    let mut settings = settings();
    settings.force_override = true;

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "doing"));
    trello.insert_comment(
        "c11",
        CardComment {
            id: "stale-1".to_string(),
            text: linked_comment(&original, "first cut [#11]"),
        },
    );

    run_hook(&repo, &settings, &trello, &[update(&rework, &original)])
        .await
        .unwrap();

    assert_eq!(
        trello.operations(),
        vec![
            MockOperation::GetCard {
                number: "11".into()
            },
            MockOperation::GetComments {
                card_id: "c11".into()
            },
            MockOperation::DeleteComments {
                comment_ids: vec!["stale-1".to_string()],
            },
            MockOperation::AddComment {
                card_id: "c11".into(),
                text: linked_comment(&rework, "second cut [#11]"),
            },
        ]
    );
    assert!(trello.comments_on("c11").iter().all(|c| c.id != "stale-1"));
}

#[tokio::test]
async fn comment_held_by_another_remote_branch_survives() {
    let repo = TestRepo::new();
    let base = repo.head_oid();
    let original = repo.commit("a.txt", "first cut [#11]");

    // The linked commit leaves main, but a differently named remote
    // branch still carries it.
    let _remote = repo.add_bare_remote("origin");
    run_git(repo.path(), &["push", "origin", "main:archive"]);
    run_git(repo.path(), &["reset", "--hard", base.as_str()]);
    let rework = repo.commit("b.txt", "second cut [#11]");

    let mut settings = settings();
    settings.force_override = true;

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "doing"));
    trello.insert_comment(
        "c11",
        CardComment {
            id: "kept-1".to_string(),
            text: linked_comment(&original, "first cut [#11]"),
        },
    );

    run_hook(&repo, &settings, &trello, &[update(&rework, &original)])
        .await
        .unwrap();

    assert_eq!(
        trello.operations(),
        vec![
            MockOperation::GetCard {
                number: "11".into()
            },
            MockOperation::GetComments {
                card_id: "c11".into()
            },
            MockOperation::AddComment {
                card_id: "c11".into(),
                text: linked_comment(&rework, "second cut [#11]"),
            },
        ]
    );
    assert!(trello.comments_on("c11").iter().any(|c| c.id == "kept-1"));
}

#[tokio::test]
async fn comment_held_by_two_remote_branches_survives() {
    let repo = TestRepo::new();
    let base = repo.head_oid();
    let original = repo.commit("a.txt", "first cut [#11]");

    // Upstream main is being rewritten, but a second remote branch also
    // has the commit.
    let _remote = repo.add_bare_remote("origin");
    run_git(repo.path(), &["push", "origin", "main", "main:archive"]);
    run_git(repo.path(), &["reset", "--hard", base.as_str()]);
    let rework = repo.commit("b.txt", "second cut [#11]");

    let mut settings = settings();
    settings.force_override = true;

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "doing"));
    trello.insert_comment(
        "c11",
        CardComment {
            id: "kept-1".to_string(),
            text: linked_comment(&original, "first cut [#11]"),
        },
    );

    run_hook(&repo, &settings, &trello, &[update(&rework, &original)])
        .await
        .unwrap();

    let ops = trello.operations();
    assert!(ops
        .iter()
        .all(|op| !matches!(op, MockOperation::DeleteComments { .. })));
    assert!(trello.comments_on("c11").iter().any(|c| c.id == "kept-1"));
}

#[tokio::test]
async fn cleanup_needs_a_recognized_remote() {
    let repo = TestRepo::new();
    let original = repo.commit("a.txt", "first wording [#11]");
    let amended = repo.amend("second wording [#11]");

    let mut settings = settings();
    settings.force_override = true;

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "doing"));
    trello.insert_comment(
        "c11",
        CardComment {
            id: "stale-1".to_string(),
            text: linked_comment(&original, "first wording [#11]"),
        },
    );

    let git = repo.git();
    let hook = PrePushHook::new(
        &settings,
        &git,
        &trello,
        Some(PushRemote::new(
            "origin",
            "git@git.example.com:octo/widgets.git",
        )),
        Verbosity::Quiet,
    );
    hook.run(&[update(&amended, &original)]).await.unwrap();

    // No commit links were ever posted for this remote, so nothing is
    // recognized as ours and nothing is read or deleted
    let ops = trello.operations();
    assert!(ops
        .iter()
        .all(|op| !matches!(op, MockOperation::GetComments { .. })));
    assert!(trello
        .comments_on("c11")
        .iter()
        .any(|c| c.id == "stale-1"));

    // And without a base URL the new comment is the bare commit message
    assert!(ops.iter().any(|op| matches!(
        op,
        MockOperation::AddComment { text, .. } if text == "second wording [#11]"
    )));
}

// =============================================================================
// Release Trigger
// =============================================================================

fn release_settings(remote: Option<&str>) -> HookSettings {
    let mut settings = settings();
    settings.list_id = Some("doing".to_string());
    settings.release = Some(ReleaseSettings {
        branch: "main".to_string(),
        remote: remote.map(String::from),
        name: "%Y-%m-%d Release".to_string(),
    });
    settings
}

#[tokio::test]
async fn release_branch_push_drains_the_working_list() {
    let repo = TestRepo::new();
    let tip = repo.commit("a.txt", "final touches [#11]");

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "todo"));

    let touched = run_hook(&repo, &release_settings(None), &trello, &[creation(&tip)])
        .await
        .unwrap();

    let ops = trello.operations();
    let created_name = ops
        .iter()
        .find_map(|op| match op {
            MockOperation::CreateList { name } => Some(name.clone()),
            _ => None,
        })
        .expect("release list was created");
    assert!(created_name.ends_with(" Release"));

    let (from, to) = ops
        .iter()
        .find_map(|op| match op {
            MockOperation::MoveAllCards {
                from_list_id,
                to_list_id,
            } => Some((from_list_id.clone(), to_list_id.clone())),
            _ => None,
        })
        .expect("cards were bulk-moved");
    assert_eq!(from, "doing");

    // The card was commented, moved into the working list, then drained
    // into the new release list; the hook reports the drained cards.
    assert_eq!(trello.card("11").unwrap().id_list, to);
    assert_eq!(touched.len(), 1);
    assert_eq!(touched[0].id, "c11");
    assert!(trello
        .board_lists()
        .iter()
        .any(|l| l.id == to && l.name == created_name));
}

#[tokio::test]
async fn release_respects_the_remote_filter() {
    let repo = TestRepo::new();
    let tip = repo.commit("a.txt", "final touches [#11]");

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "todo"));

    // Configured for pushes to "deploy"; this push goes to "origin"
    let touched = run_hook(
        &repo,
        &release_settings(Some("deploy")),
        &trello,
        &[creation(&tip)],
    )
    .await
    .unwrap();

    assert!(trello
        .operations()
        .iter()
        .all(|op| !matches!(op, MockOperation::CreateList { .. })));
    assert_eq!(touched.len(), 1, "synced cards are still reported");
}

#[tokio::test]
async fn release_remote_fallback_reads_branch_config() {
    let repo = TestRepo::new();
    let tip = repo.commit("a.txt", "final touches [#11]");
    run_git(repo.path(), &["config", "branch.main.remote", "origin"]);

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "todo"));

    // No remote was passed (embedded use); the branch's configured push
    // remote decides whether the filter matches.
    let settings = release_settings(Some("origin"));
    let git = repo.git();
    let hook = PrePushHook::new(&settings, &git, &trello, None, Verbosity::Quiet);
    hook.run(&[creation(&tip)]).await.unwrap();

    assert!(trello
        .operations()
        .iter()
        .any(|op| matches!(op, MockOperation::CreateList { .. })));
}

#[tokio::test]
async fn failed_list_creation_leaves_cards_in_place() {
    let repo = TestRepo::new();
    let tip = repo.commit("a.txt", "final touches [#11]");

    let trello = MockTrello::with_failure(FailOn::CreateList);
    trello.insert_card("11", card("c11", "todo"));

    let touched = run_hook(&repo, &release_settings(None), &trello, &[creation(&tip)])
        .await
        .unwrap();

    assert!(trello
        .operations()
        .iter()
        .all(|op| !matches!(op, MockOperation::MoveAllCards { .. })));
    assert_eq!(trello.card("11").unwrap().id_list, "doing");
    assert_eq!(touched.len(), 1);
}

#[tokio::test]
async fn unrenderable_list_name_leaves_cards_in_place() {
    let repo = TestRepo::new();
    let tip = repo.commit("a.txt", "final touches [#11]");

    // Settings assembled by hand can carry a template that resolution
    // would have rejected.
    let mut settings = release_settings(None);
    settings.release.as_mut().unwrap().name = "%Q bogus".to_string();

    let trello = MockTrello::new();
    trello.insert_card("11", card("c11", "todo"));

    let touched = run_hook(&repo, &settings, &trello, &[creation(&tip)])
        .await
        .unwrap();

    assert!(trello.operations().iter().all(|op| !matches!(
        op,
        MockOperation::CreateList { .. } | MockOperation::MoveAllCards { .. }
    )));
    assert_eq!(trello.card("11").unwrap().id_list, "doing");
    assert_eq!(touched.len(), 1);
}

// =============================================================================
// Failure Modes
// =============================================================================

#[tokio::test]
async fn network_outage_aborts_the_push() {
    let repo = TestRepo::new();
    let tip = repo.commit("a.txt", "work [#11]");

    let trello = MockTrello::with_network_failure();
    let err = run_hook(&repo, &settings(), &trello, &[creation(&tip)])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HookError::Trello(TrelloError::Network(_))
    ));
}

#[tokio::test]
async fn no_updates_is_a_clean_noop() {
    let repo = TestRepo::new();
    let trello = MockTrello::new();

    let touched = run_hook(&repo, &settings(), &trello, &[]).await.unwrap();

    assert!(touched.is_empty());
    assert!(trello.operations().is_empty());
}
