//! The pre-push hook command.

use std::io::Read;

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::core::config::Config;
use crate::git::GitQuery;
use crate::hook::{parse_ref_updates, PrePushHook, PushRemote};
use crate::trello::TrelloClient;
use crate::ui::output::Verbosity;

/// Entry point for `git-trello pre-push <remote> <url>`.
///
/// Reads the ref-update lines git wrote to stdin and runs the engine.
/// A nonzero exit (any error bubbling out of here) makes git abort the
/// push.
pub fn pre_push(ctx: &Context, remote: String, url: String) -> Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read ref updates from stdin")?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(pre_push_async(ctx, remote, url, &input))
}

async fn pre_push_async(ctx: &Context, remote: String, url: String, input: &str) -> Result<()> {
    let cwd = super::working_dir(ctx)?;
    let git = GitQuery::open(&cwd)?;
    let config = Config::load(git.git_dir())?;
    let settings = config.resolve()?;
    let verbosity = Verbosity::from_flags(settings.verbose, ctx.verbose);

    let updates = parse_ref_updates(input).context("invalid pre-push input")?;
    let trello = TrelloClient::new(settings.credentials.clone(), settings.board_id.clone());
    let hook = PrePushHook::new(
        &settings,
        &git,
        &trello,
        Some(PushRemote::new(remote, url)),
        verbosity,
    );
    hook.run(&updates).await?;
    Ok(())
}
