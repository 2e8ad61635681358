//! Configuration for shelfwatch.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (which also read SHELFWATCH_SERVER_URL,
//!    SHELFWATCH_USER_ID and SHELFWATCH_API_KEY)
//! 2. Environment variable SHELFWATCH_HOME
//! 3. Config file (.shelfwatch/config.yaml)
//! 4. Defaults (~/.shelfwatch)
//!
//! Config file discovery:
//! - Searches the current directory and parents for .shelfwatch/config.yaml
//! - Paths in the config file are relative to the project root (the parent
//!   of .shelfwatch/)
//!
//! The result is a plain [`ResolvedConfig`] value built once at startup and
//! passed to whatever needs it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::output::OutputFormat;

/// Upper bound on items fetched per poll
pub const MAX_LIMIT: u32 = 200;

/// Longest allowed poll interval (one week)
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Directory holding the config file inside a project
pub const CONFIG_DIR: &str = ".shelfwatch";

const DEFAULT_INTERVAL_MINUTES: u64 = 2;
const DEFAULT_LIMIT: u32 = 50;
const DEFAULT_REFRESH_SECONDS: u64 = 60;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_TITLE: &str = "Latest Added Media";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub poll: PollSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub paths: PathsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSection {
    pub url: Option<String>,
    pub user_id: Option<String>,
    pub api_key: Option<String>,
    /// Accept self-signed certificates
    pub accept_invalid_certs: Option<bool>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollSection {
    pub interval_minutes: Option<u64>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSection {
    /// Artifact path (relative to the project root)
    pub path: Option<String>,
    pub format: Option<OutputFormat>,
    pub refresh_seconds: Option<u64>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsSection {
    /// State directory (relative to the project root)
    pub home: Option<String>,
    /// Change state file (relative to the project root)
    pub state: Option<String>,
}

/// Values supplied on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server_url: Option<String>,
    pub user_id: Option<String>,
    pub api_key: Option<String>,
    pub insecure: bool,
    pub interval_minutes: Option<u64>,
    pub limit: Option<u32>,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// State directory
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub server: ServerSettings,
    pub poll: PollSettings,
    pub output: OutputSettings,
    /// Change state file
    pub state_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub url: String,
    pub user_id: String,
    pub api_key: String,
    pub accept_invalid_certs: bool,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    pub interval_minutes: u64,
    pub limit: u32,
}

impl PollSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub refresh_seconds: u64,
    pub title: String,
}

/// Settings that make polling impossible
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing setting: {0} (set it in .shelfwatch/config.yaml, a flag or the environment)")]
    Missing(&'static str),

    #[error("Poll interval must be at least one minute")]
    ZeroInterval,

    #[error("Poll interval of {0} minutes exceeds the maximum of {}", MAX_INTERVAL_MINUTES)]
    IntervalTooLarge(u64),

    #[error("Result limit {0} is outside 1..={}", MAX_LIMIT)]
    LimitOutOfRange(u32),
}

impl ResolvedConfig {
    /// Check everything a poll needs
    pub fn validate_for_polling(&self) -> Result<(), ConfigError> {
        if self.server.url.trim().is_empty() {
            return Err(ConfigError::Missing("server.url"));
        }
        if self.server.user_id.trim().is_empty() {
            return Err(ConfigError::Missing("server.user_id"));
        }
        if self.server.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("server.api_key"));
        }
        if self.poll.interval_minutes == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.poll.interval_minutes > MAX_INTERVAL_MINUTES {
            return Err(ConfigError::IntervalTooLarge(self.poll.interval_minutes));
        }
        if self.poll.limit == 0 || self.poll.limit > MAX_LIMIT {
            return Err(ConfigError::LimitOutOfRange(self.poll.limit));
        }
        Ok(())
    }

    /// API key with all but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        let key = &self.server.api_key;
        let count = key.chars().count();
        if count <= 4 {
            return "*".repeat(count);
        }
        let tail: String = key.chars().skip(count - 4).collect();
        format!("{}{}", "*".repeat(count - 4), tail)
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Load configuration from all sources, searching from the current directory
pub fn load(overrides: &Overrides) -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    load_from(&cwd, overrides)
}

/// Load configuration, searching for the config file from `start`
pub fn load_from(start: &Path, overrides: &Overrides) -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(CONFIG_DIR);

    let file = match find_config_file(start) {
        Some(path) => {
            let parsed = load_config_file(&path)?;
            Some((path, parsed))
        }
        None => None,
    };

    let env_home = std::env::var("SHELFWATCH_HOME").ok().map(PathBuf::from);

    Ok(resolve(file, overrides, env_home, default_home))
}

/// Merge a parsed config file, overrides and environment into a config
pub fn resolve(
    file: Option<(PathBuf, ConfigFile)>,
    overrides: &Overrides,
    env_home: Option<PathBuf>,
    default_home: PathBuf,
) -> ResolvedConfig {
    let (config_file, parsed) = match file {
        Some((path, parsed)) => (Some(path), parsed),
        None => (None, ConfigFile::default()),
    };

    // Base directory is the parent of .shelfwatch/ (the project root)
    let base_dir = config_file
        .as_deref()
        .and_then(Path::parent)
        .and_then(Path::parent)
        .map(Path::to_path_buf);

    let resolve_opt = |value: &Option<String>| -> Option<PathBuf> {
        value
            .as_deref()
            .map(|v| match &base_dir {
                Some(base) => resolve_path(base, v),
                None => PathBuf::from(v),
            })
    };

    let home = env_home
        .or_else(|| resolve_opt(&parsed.paths.home))
        .unwrap_or(default_home);

    let server = ServerSettings {
        url: overrides
            .server_url
            .clone()
            .or(parsed.server.url)
            .unwrap_or_default(),
        user_id: overrides
            .user_id
            .clone()
            .or(parsed.server.user_id)
            .unwrap_or_default(),
        api_key: overrides
            .api_key
            .clone()
            .or(parsed.server.api_key)
            .unwrap_or_default(),
        accept_invalid_certs: overrides.insecure
            || parsed.server.accept_invalid_certs.unwrap_or(false),
        timeout_seconds: parsed
            .server
            .timeout_seconds
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
    };

    let poll = PollSettings {
        interval_minutes: overrides
            .interval_minutes
            .or(parsed.poll.interval_minutes)
            .unwrap_or(DEFAULT_INTERVAL_MINUTES),
        limit: overrides
            .limit
            .or(parsed.poll.limit)
            .unwrap_or(DEFAULT_LIMIT),
    };

    let format = overrides
        .format
        .or(parsed.output.format)
        .unwrap_or_default();

    let output_path = overrides
        .output
        .clone()
        .or_else(|| resolve_opt(&parsed.output.path))
        .unwrap_or_else(|| home.join(format!("latest.{}", format.extension())));

    let output = OutputSettings {
        path: output_path,
        format,
        refresh_seconds: parsed
            .output
            .refresh_seconds
            .unwrap_or(DEFAULT_REFRESH_SECONDS),
        title: parsed
            .output
            .title
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
    };

    let state_path = resolve_opt(&parsed.paths.state).unwrap_or_else(|| home.join("state.json"));

    ResolvedConfig {
        home,
        config_file,
        server,
        poll,
        output,
        state_path,
    }
}
