//! Server configuration.
//!
//! Every field has a default, so an empty or missing file is a valid
//! configuration. A YAML file can override any subset:
//!
//! ```yaml
//! server:
//!   bind_addr: 127.0.0.1
//!   mode: forever
//!   max_connections: 16
//! files:
//!   root: ./public
//!   confine_to_root: true
//! limits:
//!   max_request_bytes: 8192
//!   read_timeout_secs: 10
//! wire:
//!   line_ending: crlf
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::http::request::DEFAULT_DOCUMENT;
use crate::http::response::LineEnding;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "DFA_HTTPD_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub files: FilesConfig,
    pub limits: LimitsConfig,
    pub wire: WireConfig,
}

/// Whether the process handles a single connection or keeps accepting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServeMode {
    /// Accept one connection, answer it, exit.
    #[default]
    Once,
    /// Accept until interrupted, one task per connection.
    Forever,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Listen backlog.
    pub backlog: u32,
    pub mode: ServeMode,
    /// Upper bound on connections handled at once in `forever` mode.
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            backlog: 25,
            mode: ServeMode::Once,
            max_connections: 64,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory resources are resolved against.
    pub root: PathBuf,
    /// Served for a request of `/`.
    pub default_document: String,
    /// Answer 404 for resources containing `..` or root components.
    pub confine_to_root: bool,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            default_document: DEFAULT_DOCUMENT.to_string(),
            confine_to_root: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest request head accepted before the connection is dropped.
    pub max_request_bytes: usize,
    /// How long a single read may block. `None` waits forever.
    pub read_timeout_secs: Option<u64>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_bytes: 64 * 1024,
            read_timeout_secs: None,
        }
    }
}

impl LimitsConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireConfig {
    pub line_ending: LineEnding,
}

impl Config {
    /// Loads from `path`, or from the file named by `DFA_HTTPD_CONFIG`, or
    /// falls back to defaults when neither is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);

        match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg = serde_yaml::from_str(text).context("Failed to parse YAML")?;
        Ok(cfg)
    }
}
