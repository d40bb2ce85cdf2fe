// Configuration loading.
// Reads GHE_REPOS_* environment variables into a typed Config with defaults and validation.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::cache::paths;
use crate::error::{FinderError, Result};

const ENV_PREFIX: &str = "GHE_REPOS_";

/// Runtime configuration for the fetch-cache pipeline and the CLI.
#[derive(Clone)]
pub struct Config {
    /// Scheme and host of the GitHub Enterprise instance.
    pub host: String,
    /// API path prefix, always starting and ending with `/`.
    pub api_path: String,
    /// Personal access token sent with every request.
    pub token: Option<String>,
    /// Directory holding cache entries.
    pub cache_dir: PathBuf,
    /// Name of the cache entry for the repository list.
    pub cache_key: String,
    /// Age up to which cached data is served without a refresh.
    pub freshness_window: Duration,
    /// Upper bound on pages followed in a single fetch.
    pub max_pages: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Verify server certificates. Only disabled by explicit opt-in.
    pub verify_tls: bool,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Base URL that relative API paths are resolved against.
    pub fn api_base(&self) -> Result<Url> {
        let base = format!("{}{}", self.host, self.api_path);
        Url::parse(&base).map_err(|e| FinderError::InvalidUrl(format!("{}: {}", base, e)))
    }

    pub fn validate(&self) -> Result<()> {
        let base = self.api_base()?;
        if base.scheme() != "https" && base.scheme() != "http" {
            return Err(FinderError::Config(format!(
                "host must use http or https, got '{}'",
                base.scheme()
            )));
        }
        if self.max_pages == 0 {
            return Err(FinderError::Config(
                "max pages must be at least 1".to_string(),
            ));
        }
        if self.cache_key.is_empty() || self.cache_key.contains(['/', '\\']) {
            return Err(FinderError::Config(format!(
                "invalid cache key '{}'",
                self.cache_key
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("api_path", &self.api_path)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("cache_dir", &self.cache_dir)
            .field("cache_key", &self.cache_key)
            .field("freshness_window", &self.freshness_window)
            .field("max_pages", &self.max_pages)
            .field("timeout", &self.timeout)
            .field("verify_tls", &self.verify_tls)
            .field("log_level", &self.log_level)
            .field("log_file", &self.log_file)
            .finish()
    }
}

/// Loads [`Config`] from prefixed environment variables.
pub struct ConfigLoader {
    vars: BTreeMap<String, String>,
}

impl ConfigLoader {
    /// Loader over the current process environment.
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Loader over an explicit set of variables (useful for tests).
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn load(&self) -> Result<Config> {
        let mut layered: BTreeMap<String, String> = self
            .vars
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(ENV_PREFIX)
                    .map(|stripped| (stripped.to_string(), value.clone()))
            })
            .filter(|(_, value)| !value.is_empty())
            .collect();

        let host = layered
            .remove("HOST")
            .map(|h| h.trim_end_matches('/').to_string())
            .ok_or_else(|| {
                FinderError::Config(format!("{}HOST is not set", ENV_PREFIX))
            })?;
        let api_path = normalize_api_path(
            &layered
                .remove("API_PATH")
                .unwrap_or_else(default_api_path),
        );
        let token = layered
            .remove("TOKEN")
            .or_else(|| self.vars.get("GITHUB_TOKEN").filter(|t| !t.is_empty()).cloned());
        let cache_dir = match layered.remove("CACHE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => paths::cache_dir().ok_or_else(|| {
                FinderError::Config(format!(
                    "no cache directory available; set {}CACHE_DIR",
                    ENV_PREFIX
                ))
            })?,
        };
        let cache_key = layered
            .remove("CACHE_KEY")
            .unwrap_or_else(default_cache_key);
        let freshness_secs = parse_or(&mut layered, "FRESHNESS_SECS", default_freshness_secs())?;
        let max_pages = parse_or(&mut layered, "MAX_PAGES", default_max_pages())?;
        let timeout_secs = parse_or(&mut layered, "TIMEOUT_SECS", default_timeout_secs())?;
        let insecure = parse_or(&mut layered, "INSECURE_SKIP_TLS_VERIFY", false)?;
        let log_level = layered
            .remove("LOG_LEVEL")
            .unwrap_or_else(default_log_level);
        let log_file = layered.remove("LOG_FILE").map(PathBuf::from);

        let config = Config {
            host,
            api_path,
            token,
            cache_dir,
            cache_key,
            freshness_window: Duration::from_secs(freshness_secs),
            max_pages,
            timeout: Duration::from_secs(timeout_secs),
            verify_tls: !insecure,
            log_level,
            log_file,
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_or<T: std::str::FromStr>(
    layered: &mut BTreeMap<String, String>,
    key: &str,
    default: T,
) -> Result<T> {
    match layered.remove(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            FinderError::Config(format!("invalid value '{}' for {}{}", raw, ENV_PREFIX, key))
        }),
        None => Ok(default),
    }
}

/// Ensure the API prefix starts and ends with a single `/`.
fn normalize_api_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

fn default_api_path() -> String {
    "/api/v3/".to_string()
}

fn default_cache_key() -> String {
    "repos.json".to_string()
}

fn default_freshness_secs() -> u64 {
    300
}

fn default_max_pages() -> usize {
    100
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}
