//! core::config
//!
//! Configuration loading for the hook.
//!
//! # Sources
//!
//! 1. `$GIT_TRELLO_CONFIG` - explicit config file path, if set
//! 2. `.git/trello/config.toml` - canonical repo-scoped location
//!
//! A missing file is not an error: the credential trio may come entirely
//! from `TRELLO_API_KEY`, `TRELLO_OAUTH_TOKEN` and `TRELLO_BOARD_ID`,
//! which also override file values when both are present.
//!
//! # Failure model
//!
//! Read and parse failures are fatal. Requiredness is not checked at
//! load time; [`Config::resolve`] performs it so commands fail with
//! `<key> is required` before touching git or the network.

mod schema;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use schema::{
    HookConfig, HookSettings, ReleaseConfig, ReleaseSettings, DEFAULT_RELEASE_NAME,
};

/// Env var naming an explicit config file path.
pub const CONFIG_PATH_ENV: &str = "GIT_TRELLO_CONFIG";
/// Env var overriding `api_key`.
pub const API_KEY_ENV: &str = "TRELLO_API_KEY";
/// Env var overriding `oauth_token`.
pub const OAUTH_TOKEN_ENV: &str = "TRELLO_OAUTH_TOKEN";
/// Env var overriding `board_id`.
pub const BOARD_ID_ENV: &str = "TRELLO_BOARD_ID";

/// Relative location of the config file under the git dir.
const REPO_CONFIG_PATH: &str = "trello/config.toml";

/// Errors from configuration loading and resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a config file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path that failed.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A required option is absent from both file and environment.
    #[error("{0} is required")]
    MissingRequired(&'static str),

    /// An option is present but unusable.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded (but not yet resolved) configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    hook: HookConfig,
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration for the repository whose git dir is given.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError`/`ParseError` for an unreadable or
    /// malformed file. A missing file at the canonical location is fine;
    /// a missing file at an explicit `$GIT_TRELLO_CONFIG` path is not.
    pub fn load(git_dir: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load_file(&PathBuf::from(path))?,
            None => {
                let path = git_dir.join(REPO_CONFIG_PATH);
                if path.is_file() {
                    Self::load_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        apply_env_overrides(&mut config.hook);
        Ok(config)
    }

    /// Load exactly one file (no env handling). Used by `load` and tests.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let hook: HookConfig = toml::from_str(&raw).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            hook,
            path: Some(path.to_path_buf()),
        })
    }

    /// The file this config came from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Raw parsed schema.
    pub fn hook(&self) -> &HookConfig {
        &self.hook
    }

    /// Resolve into engine-ready settings.
    ///
    /// # Errors
    ///
    /// See [`HookConfig::resolve`].
    pub fn resolve(&self) -> Result<HookSettings, ConfigError> {
        self.hook.resolve()
    }
}

/// Credentials from the environment beat file values.
fn apply_env_overrides(hook: &mut HookConfig) {
    for (var, slot) in [
        (API_KEY_ENV, &mut hook.api_key),
        (OAUTH_TOKEN_ENV, &mut hook.oauth_token),
        (BOARD_ID_ENV, &mut hook.board_id),
    ] {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                *slot = Some(value);
            }
        }
    }
}
