//! Command implementations.

mod find_list;
mod pre_push;

pub use find_list::find_list;
pub use pre_push::pre_push;

use anyhow::{Context as _, Result};

use super::args::Commands;
use super::Context;

/// Route a parsed command to its implementation.
pub fn dispatch(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::PrePush { remote, url } => pre_push(ctx, remote, url),
        Commands::FindList { name } => find_list(ctx, &name),
    }
}

/// Directory commands operate in.
fn working_dir(ctx: &Context) -> Result<std::path::PathBuf> {
    match &ctx.cwd {
        Some(cwd) => Ok(cwd.clone()),
        None => std::env::current_dir().context("failed to determine current directory"),
    }
}
