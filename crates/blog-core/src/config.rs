use home::home_dir;
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

use crate::{
    constant::{
        CONFIG_DIR, CONFIG_ENV, CONFIG_FILE, DEFAULT_LOG_FILTER, DEFAULT_PORT, DEFAULT_TIMEOUT_MS,
    },
    BlogError, BlogResult,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    /// Socket address of the post store. Should be <ip>:<port>
    /// Example: 127.0.0.1:8080
    pub socket: SocketAddr,
    /// Upper bound on a single store call, in milliseconds.
    pub request_timeout_ms: u64,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            socket: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), DEFAULT_PORT),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

impl BlogConfig {
    /// Where the config lives when no path is given: `$BLOGCONF`, or
    /// `~/.blog/blog.toml`, or `./.blog/blog.toml` without a home directory.
    pub fn default_path() -> BlogResult<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let base = match home_dir() {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        Ok(base.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Read the config at `path` (or the default path). A missing file gives
    /// the defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> BlogResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        if !path.try_exists()? {
            debug!(?path, "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&raw).map_err(|err| {
            BlogError::config_error(format!("Unable to parse {}: {}", path.display(), err))
        })?;
        debug!(?path, "loaded config");
        Ok(config)
    }

    /// Write the config to path
    pub fn save(&self, path: &Path) -> BlogResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)
            .map_err(|err| BlogError::config_error(err.to_string()))?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
