//! Process configuration resolved from the environment
//!
//! All environment access happens here, once, at startup. The rest of the
//! crate receives a `Settings` value and never reads the environment itself.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use url::Url;

use crate::error::RadarError;

/// Default X API v2 base URL
pub const DEFAULT_API_BASE: &str = "https://api.x.com/2";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

const TOKEN_VARS: [&str; 2] = ["X_BEARER_TOKEN", "TWITTER_BEARER_TOKEN"];
const CACHE_DIR_VARS: [&str; 2] = ["X_RADAR_CACHE_DIR", "X_SCOUT_CACHE_DIR"];
const API_BASE_VAR: &str = "X_RADAR_API_BASE";
const TIMEOUT_VAR: &str = "X_RADAR_TIMEOUT_SECS";

/// Resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Bearer token, if one is configured. Only required on a cache miss.
    pub bearer_token: Option<String>,
    /// Cache directory, `None` if no location could be determined
    pub cache_dir: Option<PathBuf>,
    /// Base URL every request path is appended to
    pub api_base: Url,
    /// Upper bound on a single HTTP request
    pub timeout: Duration,
}

impl Settings {
    /// Reads settings from the process environment
    pub fn from_env() -> Result<Self, RadarError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary lookup function
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RadarError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let bearer_token = first(&TOKEN_VARS);

        let cache_dir = first(&CACHE_DIR_VARS)
            .map(PathBuf::from)
            .or_else(default_cache_dir);

        let api_base = match first(&[API_BASE_VAR]) {
            Some(raw) => Url::parse(&raw)
                .map_err(|e| RadarError::Config(format!("Invalid {API_BASE_VAR} '{raw}': {e}")))?,
            None => Url::parse(DEFAULT_API_BASE)
                .map_err(|e| RadarError::Internal(format!("bad default API base: {e}")))?,
        };
        if api_base.cannot_be_a_base() {
            return Err(RadarError::Config(format!(
                "Invalid {API_BASE_VAR} '{api_base}': not a base URL"
            )));
        }

        let timeout = match first(&[TIMEOUT_VAR]) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(RadarError::Config(format!(
                        "Invalid {TIMEOUT_VAR} '{raw}': expected a positive number of seconds"
                    )))
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            bearer_token,
            cache_dir,
            api_base,
            timeout,
        })
    }
}

/// Platform cache directory for x-radar
///
/// `~/.cache/x-radar` on Linux, `%LOCALAPPDATA%\x-radar\cache` on Windows.
/// Returns `None` if no home directory can be determined.
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "x-radar").map(|dirs| dirs.cache_dir().to_path_buf())
}
