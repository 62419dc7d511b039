//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::defaults::{default_accounts_path, default_listen_address, default_server_name};
use super::limits::LimitsConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
///
/// Every table is optional; an empty file yields a server on port 5555
/// using `accounts.txt` in the working directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server information.
    #[serde(default)]
    pub server: ServerConfig,
    /// Network listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Credential file location.
    #[serde(default)]
    pub accounts: AccountsConfig,
    /// Per-connection limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name used in logs.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Prometheus metrics HTTP port. Absent or 0 disables the endpoint.
    pub metrics_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            metrics_port: None,
        }
    }
}

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:5555").
    #[serde(default = "default_listen_address")]
    pub address: SocketAddr,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_listen_address(),
        }
    }
}

/// Credential file configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountsConfig {
    /// `loginId:password` file, loaded at startup and rewritten at shutdown.
    #[serde(default = "default_accounts_path")]
    pub path: PathBuf,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            path: default_accounts_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.name, "chanrelay");
        assert_eq!(config.listen.address.port(), 5555);
        assert_eq!(config.accounts.path, PathBuf::from("accounts.txt"));
        assert!(config.server.metrics_port.is_none());
    }

    #[test]
    fn full_file_parses() {
        let toml = r#"
[server]
name = "relay-1"
metrics_port = 9100

[listen]
address = "127.0.0.1:7000"

[accounts]
path = "/var/lib/chanrelay/accounts.txt"

[limits]
message_rate_per_second = 2.5
message_burst = 5.0
max_line_length = 512
send_queue = 16
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.name, "relay-1");
        assert_eq!(config.server.metrics_port, Some(9100));
        assert_eq!(config.listen.address.to_string(), "127.0.0.1:7000");
        assert_eq!(config.limits.max_line_length, 512);
        assert_eq!(config.limits.send_queue, 16);
    }

    #[test]
    fn example_config_is_valid() {
        let config: Config = toml::from_str(include_str!("../../config.example.toml")).unwrap();
        assert_eq!(config.server.metrics_port, Some(0));
        assert!(crate::config::validation::validate(&config).is_ok());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load("/nonexistent/chanrelay.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn load_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[listen]\naddress = 5555\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }
}
