use crate::domain::error::FetchError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: Logging,
}

/// Connection pool and TLS settings, fixed for the lifetime of a `Fetcher`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClientConfig {
    #[serde(default = "default_max_total_connections")]
    pub max_total_connections: usize,
    #[serde(default = "default_max_connections_per_route")]
    pub max_connections_per_route: usize,
    #[serde(default = "default_timeout_secs")]
    pub socket_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// How long a request may wait for a free connection slot
    #[serde(default = "default_timeout_secs")]
    pub connection_request_timeout_secs: u64,
    #[serde(default = "default_pool_idle_timeout_secs")]
    pub pool_idle_timeout_secs: u64,
    /// Skip TLS verification entirely: self-signed, expired and otherwise
    /// untrusted certificates pass, and so does a certificate issued for a
    /// different hostname. Off by default; only turn on for hosts you
    /// already trust on a network you control.
    #[serde(default)]
    pub accept_self_signed: bool,
    #[serde(default = "default_tls_sni")]
    pub tls_sni: bool,
    pub http_proxy: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Logging {
    #[serde(default = "default_enable")]
    pub enable: bool,
    pub path: Option<String>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            enable: true,
            path: None,
            level: "WARN".to_string(),
        }
    }
}

impl Logging {
    /// Map the configured level name to an `EnvFilter` directive
    pub fn level_directive(&self) -> &'static str {
        match self.level.to_ascii_uppercase().as_str() {
            "TRACE" => "trace",
            "DEBUG" => "debug",
            "INFO" => "info",
            "WARN" => "warn",
            "ERROR" => "error",
            _ => "warn",
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_total_connections: default_max_total_connections(),
            max_connections_per_route: default_max_connections_per_route(),
            socket_timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_timeout_secs(),
            connection_request_timeout_secs: default_timeout_secs(),
            pool_idle_timeout_secs: default_pool_idle_timeout_secs(),
            accept_self_signed: false,
            tls_sni: default_tls_sni(),
            http_proxy: None,
        }
    }
}

impl ClientConfig {
    pub fn socket_timeout(&self) -> Duration {
        Duration::from_secs(self.socket_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn connection_request_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_request_timeout_secs)
    }

    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }

    /// Reject values that would leave the pool unusable
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.max_total_connections == 0 {
            return Err(FetchError::Config(
                "max_total_connections must be at least 1".to_string(),
            ));
        }
        if self.max_connections_per_route == 0 {
            return Err(FetchError::Config(
                "max_connections_per_route must be at least 1".to_string(),
            ));
        }
        if self.max_connections_per_route > self.max_total_connections {
            return Err(FetchError::Config(format!(
                "max_connections_per_route ({}) exceeds max_total_connections ({})",
                self.max_connections_per_route, self.max_total_connections
            )));
        }
        Ok(())
    }
}

// Defaults
fn default_max_total_connections() -> usize {
    200
}
fn default_max_connections_per_route() -> usize {
    20
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_pool_idle_timeout_secs() -> u64 {
    30
}
fn default_tls_sni() -> bool {
    true
}
fn default_enable() -> bool {
    true
}
fn default_log_level() -> String {
    "WARN".to_string()
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pagefetch").join("config.toml"))
}

pub fn parse_config(content: &str) -> Result<Config, FetchError> {
    let config = toml::from_str::<Config>(content)?;
    config.client.validate()?;
    Ok(config)
}

/// Read and validate the config at `path`. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, FetchError> {
    match fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e.into()),
    }
}

/// The user's config, or defaults when there is none or it does not parse.
///
/// Runs before logging is set up, so a rejected file is reported on stderr.
pub fn load_config() -> Config {
    let Some(path) = get_config_path() else {
        return Config::default();
    };
    load_config_from(&path).unwrap_or_else(|e| {
        eprintln!("Ignoring {}: {}", path.display(), e);
        Config::default()
    })
}

/// Write the default config to `path` unless a file is already there.
/// Returns whether anything was written.
pub fn write_config_sample(path: &Path) -> Result<bool, FetchError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let sample = toml::to_string_pretty(&Config::default())
        .map_err(|e| FetchError::Config(format!("cannot render sample config: {}", e)))?;
    fs::write(path, sample)?;
    Ok(true)
}
