//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! The hook reads one repo-scoped file, `.git/trello/config.toml`
//! (overridable via `$GIT_TRELLO_CONFIG`). Credentials may instead come
//! from the environment; see [`super::Config::load`].
//!
//! # Validation
//!
//! Everything is optional in the file. Requiredness and consistency are
//! checked when the parsed config is resolved into [`HookSettings`],
//! before any git or network work happens.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::trello::Credentials;

/// Default strftime template for release list names.
pub const DEFAULT_RELEASE_NAME: &str = "%Y-%m-%d Release";

/// Hook configuration as written in the file.
///
/// # Example
///
/// ```toml
/// api_key = "0123abcd"
/// oauth_token = "fedc4321"
/// board_id = "W0qlLClO"
/// list_id = "5f2a1b3c4d5e6f7a8b9c0d1e"
/// branch = "main"
/// verbose = true
///
/// [release]
/// branch = "release"
/// remote = "origin"
/// name = "%Y-%m-%d Release"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HookConfig {
    /// Trello API key (required, here or via `TRELLO_API_KEY`)
    pub api_key: Option<String>,

    /// Trello OAuth token (required, here or via `TRELLO_OAUTH_TOKEN`)
    pub oauth_token: Option<String>,

    /// Board holding the cards (required, here or via `TRELLO_BOARD_ID`)
    pub board_id: Option<String>,

    /// List commented cards are moved to; also the source list drained
    /// by a release
    pub list_id: Option<String>,

    /// Restrict hook activity to this branch
    pub branch: Option<String>,

    /// Print progress notes while the hook works
    pub verbose: Option<bool>,

    /// Escalate unresolved card references to a hard stop
    pub strict: Option<bool>,

    /// Process force-pushes (and prune stale comments) instead of
    /// skipping them
    pub force_override: Option<bool>,

    /// Scan the full commit range for cross-branch duplicates instead of
    /// stopping at the first known-pushed commit
    pub exhaustive: Option<bool>,

    /// Release push handling
    pub release: Option<ReleaseConfig>,
}

/// `[release]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseConfig {
    /// Branch whose pushes trigger a release (required inside `[release]`)
    pub branch: Option<String>,

    /// Only trigger when pushing to this remote
    pub remote: Option<String>,

    /// strftime template for the new list's name
    pub name: Option<String>,
}

impl HookConfig {
    /// Resolve the parsed file into settings the engine can run on.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` if a credential or the
    /// board id is absent, and `ConfigError::InvalidValue` for an
    /// inconsistent `[release]` table.
    pub fn resolve(&self) -> Result<HookSettings, ConfigError> {
        let api_key = required(&self.api_key, "api_key")?;
        let oauth_token = required(&self.oauth_token, "oauth_token")?;
        let board_id = required(&self.board_id, "board_id")?;

        let release = match &self.release {
            Some(release) => Some(release.resolve(self.list_id.as_deref())?),
            None => None,
        };

        Ok(HookSettings {
            credentials: Credentials::new(api_key, oauth_token),
            board_id,
            list_id: self.list_id.clone(),
            branch: self.branch.clone(),
            verbose: self.verbose.unwrap_or(false),
            strict: self.strict.unwrap_or(false),
            force_override: self.force_override.unwrap_or(false),
            exhaustive: self.exhaustive.unwrap_or(false),
            release,
        })
    }
}

impl ReleaseConfig {
    fn resolve(&self, list_id: Option<&str>) -> Result<ReleaseSettings, ConfigError> {
        let branch = match &self.branch {
            Some(branch) if !branch.trim().is_empty() => branch.clone(),
            _ => {
                return Err(ConfigError::InvalidValue(
                    "release.branch is required when [release] is configured".to_string(),
                ))
            }
        };

        // The bulk move drains list_id; a release without it has no
        // source list and would silently do nothing at push time.
        if list_id.is_none() {
            return Err(ConfigError::InvalidValue(
                "[release] requires list_id to be configured".to_string(),
            ));
        }

        let name = self
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_RELEASE_NAME.to_string());
        validate_name_template(&name)?;

        Ok(ReleaseSettings {
            branch,
            remote: self.remote.clone(),
            name,
        })
    }
}

/// Check a strftime template renders, so a bad one fails at startup
/// rather than mid-push.
fn validate_name_template(template: &str) -> Result<(), ConfigError> {
    use std::fmt::Write as _;

    let mut rendered = String::new();
    if write!(rendered, "{}", chrono::Local::now().format(template)).is_err() {
        return Err(ConfigError::InvalidValue(format!(
            "release name '{template}' is not a valid date format"
        )));
    }
    Ok(())
}

fn required(value: &Option<String>, key: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.clone()),
        _ => Err(ConfigError::MissingRequired(key)),
    }
}

// =============================================================================
// Resolved settings
// =============================================================================

/// Fully-resolved hook settings: requiredness checked, defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct HookSettings {
    /// API credentials, sent with every Trello request.
    pub credentials: Credentials,
    /// Board holding the cards.
    pub board_id: String,
    /// Target list for card moves (and release source), if configured.
    pub list_id: Option<String>,
    /// Branch restriction, if configured.
    pub branch: Option<String>,
    /// Print progress notes.
    pub verbose: bool,
    /// Unresolved card references abort the push.
    pub strict: bool,
    /// Process force-pushes and prune stale comments.
    pub force_override: bool,
    /// Scan the whole range for duplicates.
    pub exhaustive: bool,
    /// Release trigger settings, if configured.
    pub release: Option<ReleaseSettings>,
}

/// Resolved `[release]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSettings {
    /// Branch whose pushes trigger a release.
    pub branch: String,
    /// Remote filter, if any.
    pub remote: Option<String>,
    /// strftime template for the new list's name.
    pub name: String,
}
