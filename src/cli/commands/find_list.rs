//! Board list lookup utility.

use anyhow::{bail, Result};

use crate::cli::Context;
use crate::core::config::Config;
use crate::git::GitQuery;
use crate::trello::{TrelloApi, TrelloClient};

/// Entry point for `git-trello find-list <name>`.
///
/// Resolves the first list with the given name on the configured board
/// and prints its id, ready to paste into `list_id`.
pub fn find_list(ctx: &Context, name: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(find_list_async(ctx, name))
}

async fn find_list_async(ctx: &Context, name: &str) -> Result<()> {
    let cwd = super::working_dir(ctx)?;
    let git = GitQuery::open(&cwd)?;
    let config = Config::load(git.git_dir())?;
    let settings = config.resolve()?;

    let trello = TrelloClient::new(settings.credentials.clone(), settings.board_id.clone());
    match trello.find_list(name).await? {
        Some(list) => {
            println!("List ID: {}", list.id);
            Ok(())
        }
        None => bail!("list not found: {name}"),
    }
}
