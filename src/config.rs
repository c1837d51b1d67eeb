// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file
//! (`$SWANLAB_CONFIG`, else `~/.swanlab/config.toml`), then environment
//! variables. The API key additionally falls back to `~/.swanlab/netrc`.
//!
//! | Variable            | Field          |
//! |---------------------|----------------|
//! | `SWANLAB_API_KEY`   | `api_key`      |
//! | `SWANLAB_HOST`      | `host`         |
//! | `SWANLAB_API_HOST`  | `api_host`     |
//! | `API_TIMEOUT`       | `timeout_secs` |
//! | `SWANLAB_CACHE_DIR` | `cache_dir`    |

use crate::error::{Result, SwanError};
use crate::netrc::Netrc;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "https://swanlab.cn";
pub const DEFAULT_API_HOST: &str = "https://api.swanlab.cn";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CACHE_DIR: &str = ".cache";

pub const ENV_API_KEY: &str = "SWANLAB_API_KEY";
pub const ENV_HOST: &str = "SWANLAB_HOST";
pub const ENV_API_HOST: &str = "SWANLAB_API_HOST";
pub const ENV_TIMEOUT: &str = "API_TIMEOUT";
pub const ENV_CACHE_DIR: &str = "SWANLAB_CACHE_DIR";
pub const ENV_CONFIG: &str = "SWANLAB_CONFIG";

/// SwanLab client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwanConfig {
    /// API key; never read from the TOML file
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Website host
    pub host: String,
    /// API host
    pub api_host: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Default directory for metric exports
    pub cache_dir: PathBuf,
}

impl Default for SwanConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            host: DEFAULT_HOST.into(),
            api_host: DEFAULT_API_HOST.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

impl SwanConfig {
    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| SwanError::Configuration(format!("TOML parse error: {}", e)))
    }

    /// Load from TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SwanError::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Generate sample config
    pub fn sample_toml() -> String {
        r#"# SwanLab client configuration
host = "https://swanlab.cn"
api_host = "https://api.swanlab.cn"
timeout_secs = 30
cache_dir = ".cache"
# The API key is read from SWANLAB_API_KEY or ~/.swanlab/netrc
"#
        .into()
    }

    /// `~/.swanlab`
    pub fn home_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".swanlab"))
    }

    /// `~/.swanlab/netrc`
    pub fn netrc_path() -> Option<PathBuf> {
        Self::home_dir().map(|d| d.join("netrc"))
    }

    /// Load the full configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|name| std::env::var(name).ok(), Self::home_dir())
    }

    /// Load with an explicit environment lookup and settings directory
    ///
    /// `home` stands in for `~/.swanlab`: `config.toml` and `netrc` are read
    /// from it when present. `None` skips both.
    pub fn load_with<F>(env: F, home: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| env(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let file = match env(ENV_CONFIG) {
            Some(path) => Some(PathBuf::from(path)),
            None => home
                .as_ref()
                .map(|d| d.join("config.toml"))
                .filter(|p| p.is_file()),
        };
        let mut config = match file {
            Some(path) => {
                debug!("loading configuration from {}", path.display());
                Self::from_toml_file(&path)?
            }
            None => Self::default(),
        };

        if let Some(host) = env(ENV_HOST) {
            config.host = host;
        }
        if let Some(api_host) = env(ENV_API_HOST) {
            config.api_host = api_host;
        }
        if let Some(timeout) = env(ENV_TIMEOUT) {
            config.timeout_secs = timeout.parse().map_err(|_| {
                SwanError::Configuration(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_TIMEOUT, timeout
                ))
            })?;
        }
        if let Some(dir) = env(ENV_CACHE_DIR) {
            config.cache_dir = PathBuf::from(dir);
        }

        config.api_key = env(ENV_API_KEY).or_else(|| {
            let path = home.as_ref()?.join("netrc");
            let netrc = Netrc::load(&path)?;
            debug!("reading API key from {}", path.display());
            netrc.password_for(config.netrc_machines().iter().map(String::as_str))
        });

        Ok(config)
    }

    /// Machine names tried in the netrc file, in order
    pub fn netrc_machines(&self) -> Vec<String> {
        let mut machines = vec![self.api_host.trim_end_matches('/').to_string()];
        for raw in [&self.api_host, &self.host] {
            let host = url::Url::parse(raw)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string));
            if let Some(host) = host {
                if !machines.contains(&host) {
                    machines.push(host);
                }
            }
        }
        machines
    }

    /// The API key, or a configuration error naming where it is looked up
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            let netrc = Self::netrc_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "~/.swanlab/netrc".into());
            SwanError::Configuration(format!(
                "{} not found. Set the {} environment variable or add the key \
                 as the password of the API host in {}",
                ENV_API_KEY, ENV_API_KEY, netrc
            ))
        })
    }

    /// Base URL of the REST API
    pub fn api_base(&self) -> String {
        format!("{}/api", self.api_host.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
