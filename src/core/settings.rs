//! Validated run settings
//!
//! Values arrive from clap (flags with environment fallbacks) as a
//! [`SettingsArgs`] and are checked once, before any network or disk work.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::git::TransportOptions;
use crate::mirror::RunOptions;

pub const DEFAULT_BASE_URL: &str = "https://gitlab.com";
pub const DEFAULT_DEST_DIR: &str = "./backups";
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

/// Shortest accepted network timeout
const MIN_TIMEOUT: Duration = Duration::from_millis(100);

/// Configuration errors. All of them are fatal for the run.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GITLAB_TOKEN is not set")]
    MissingToken,

    #[error("git executable not found on PATH")]
    GitNotFound,

    #[error("invalid base URL '{0}': {1}")]
    InvalidBaseUrl(String, String),

    #[error("invalid timeout '{0}': {1}")]
    InvalidTimeout(String, String),

    #[error("invalid destination '{0}': {1}")]
    InvalidDestination(String, String),
}

/// Unvalidated inputs, one field per command-line option.
#[derive(Clone)]
pub struct SettingsArgs {
    pub group_path: String,
    pub base_url: String,
    pub dest: PathBuf,
    pub concurrency: usize,
    pub timeout_secs: f64,
    pub verify_ssl: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub json: bool,
    pub token: Option<String>,
}

impl Default for SettingsArgs {
    fn default() -> Self {
        Self {
            group_path: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            dest: PathBuf::from(DEFAULT_DEST_DIR),
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            verify_ssl: true,
            dry_run: false,
            verbose: false,
            json: false,
            token: None,
        }
    }
}

/// Settings for one backup run.
#[derive(Clone)]
pub struct Settings {
    pub group_path: String,
    pub base_url: String,
    pub dest: PathBuf,
    pub concurrency: usize,
    pub timeout: Duration,
    pub verify_ssl: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub json: bool,
    token: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("group_path", &self.group_path)
            .field("base_url", &self.base_url)
            .field("dest", &self.dest)
            .field("concurrency", &self.concurrency)
            .field("timeout", &self.timeout)
            .field("verify_ssl", &self.verify_ssl)
            .field("dry_run", &self.dry_run)
            .field("token", &"***")
            .finish()
    }
}

impl Settings {
    /// Validate raw arguments, requiring `git` on PATH.
    pub fn from_args(args: SettingsArgs) -> Result<Self, ConfigError> {
        which::which("git").map_err(|_| ConfigError::GitNotFound)?;
        Self::validate(args)
    }

    /// Validation without the PATH lookup.
    pub fn validate(args: SettingsArgs) -> Result<Self, ConfigError> {
        let token = args
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let base_url = args.base_url.trim().trim_end_matches('/').to_string();
        let parsed = url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(base_url.clone(), e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl(
                base_url,
                "scheme must be http or https".to_string(),
            ));
        }

        let dest = std::path::absolute(expand_home(&args.dest)).map_err(|e| {
            ConfigError::InvalidDestination(args.dest.display().to_string(), e.to_string())
        })?;

        let timeout = Duration::try_from_secs_f64(args.timeout_secs)
            .map_err(|e| {
                ConfigError::InvalidTimeout(args.timeout_secs.to_string(), e.to_string())
            })?
            .max(MIN_TIMEOUT);

        Ok(Self {
            group_path: args.group_path.trim_matches('/').to_string(),
            base_url,
            dest,
            concurrency: args.concurrency.max(1),
            timeout,
            verify_ssl: args.verify_ssl,
            dry_run: args.dry_run,
            verbose: args.verbose,
            json: args.json,
            token,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn transport(&self) -> TransportOptions {
        TransportOptions {
            timeout: self.timeout,
            verify_tls: self.verify_ssl,
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            backup_root: self.dest.clone(),
            token: self.token.clone(),
            concurrency: self.concurrency,
            dry_run: self.dry_run,
            group_root: self.group_path.clone(),
        }
    }
}

/// Replace a leading `~` with the user's home directory. Other paths, and
/// `~user` forms, are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Interpret a boolean environment value. Unknown values keep `default`.
pub fn parse_bool_env(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
