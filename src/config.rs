//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::display::DEFAULT_SERIES_CAPACITY;
use crate::supervisor::ReconnectPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Console server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory with the browser dashboard build, served at `/`
    #[serde(default)]
    pub static_dir: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> usize {
    64
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            max_connections: default_max_connections(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Synthetic telemetry feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_enabled")]
    pub enabled: bool,

    /// How often camera readouts are published
    #[serde(default = "default_camera_interval")]
    pub camera_interval_ms: u64,

    /// How often the averaged frame rate is published
    #[serde(default = "default_fps_interval")]
    pub fps_interval_ms: u64,

    /// Frame cap of the simulated render loop
    #[serde(default = "default_frame_cap")]
    pub frame_cap: u32,
}

fn default_feed_enabled() -> bool {
    true
}

fn default_camera_interval() -> u64 {
    100
}

fn default_fps_interval() -> u64 {
    500
}

fn default_frame_cap() -> u32 {
    105
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enabled: default_feed_enabled(),
            camera_interval_ms: default_camera_interval(),
            fps_interval_ms: default_fps_interval(),
            frame_cap: default_frame_cap(),
        }
    }
}

/// Dashboard client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Liveness check cadence
    #[serde(default = "default_check_interval")]
    pub check_interval_ms: u64,

    /// Frame-rate samples kept for the chart
    #[serde(default = "default_fps_history")]
    pub fps_history: usize,

    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

fn default_endpoint() -> String {
    "ws://localhost:8080/ws".to_string()
}

fn default_check_interval() -> u64 {
    250
}

fn default_fps_history() -> usize {
    DEFAULT_SERIES_CAPACITY
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            check_interval_ms: default_check_interval(),
            fps_history: default_fps_history(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms.max(1))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("telemetry-console").join("config.toml")),
            Some(PathBuf::from("/etc/telemetry-console/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Server overrides
        if let Some(host) = var("CONSOLE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("CONSOLE_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Some(dir) = var("CONSOLE_STATIC_DIR") {
            self.server.static_dir = Some(dir);
        }

        // Client overrides
        if let Some(endpoint) = var("CONSOLE_ENDPOINT") {
            self.client.endpoint = endpoint;
        }

        // Logging overrides
        if let Some(level) = var("CONSOLE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("CONSOLE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Telemetry Console Configuration
#
# Environment variables override these settings:
# - CONSOLE_HOST
# - CONSOLE_PORT
# - CONSOLE_STATIC_DIR
# - CONSOLE_ENDPOINT
# - CONSOLE_LOG_LEVEL
# - CONSOLE_LOG_FORMAT

[server]
# Console server host
host = "0.0.0.0"

# Console server port
port = 8080

# Directory with the browser dashboard build, served at /
# static_dir = "console-ui/dist"

# Maximum concurrent dashboard connections
max_connections = 64

[feed]
# Publish synthetic camera and frame-rate telemetry
enabled = true

# Camera readout interval (ms)
camera_interval_ms = 100

# Averaged frame-rate interval (ms)
fps_interval_ms = 500

# Frame cap of the simulated render loop
frame_cap = 105

[client]
# Telemetry feed to watch
endpoint = "ws://localhost:8080/ws"

# Liveness check cadence (ms)
check_interval_ms = 250

# Frame-rate samples kept for the chart
fps_history = 120

[client.reconnect]
# immediate: reconnect as fast as the transport allows
# backoff: wait initial_delay_ms * 2^(failures - 1), capped at max_delay_ms
policy = "immediate"
# policy = "backoff"
# initial_delay_ms = 1000
# max_delay_ms = 30000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.addr(), "0.0.0.0:8080");
        assert_eq!(config.client.endpoint, "ws://localhost:8080/ws");
        assert_eq!(config.client.check_interval(), Duration::from_millis(250));
        assert_eq!(config.client.reconnect, ReconnectPolicy::Immediate);
        assert_eq!(config.feed.frame_cap, 105);
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.server.port, defaults.server.port);
        assert_eq!(config.server.static_dir, None);
        assert_eq!(config.feed.camera_interval_ms, defaults.feed.camera_interval_ms);
        assert_eq!(config.client.fps_history, defaults.client.fps_history);
        assert_eq!(config.client.reconnect, defaults.client.reconnect);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [client]
            endpoint = "ws://renderer:9000/ws"

            [client.reconnect]
            policy = "backoff"
            initial_delay_ms = 500
            max_delay_ms = 4000
            "#,
        )
        .unwrap();

        assert_eq!(config.client.endpoint, "ws://renderer:9000/ws");
        assert_eq!(config.client.check_interval_ms, 250);
        assert_eq!(
            config.client.reconnect,
            ReconnectPolicy::Backoff {
                initial_delay_ms: 500,
                max_delay_ms: 4_000
            }
        );
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9090\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 9090);

        std::fs::write(&path, "[server\nport = ").unwrap();
        match Config::load(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected parse error, got {:?}", other),
        }

        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CONSOLE_PORT", "9999"),
            ("CONSOLE_ENDPOINT", "ws://10.0.0.2:9999/ws"),
            ("CONSOLE_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.client.endpoint, "ws://10.0.0.2:9999/ws");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_invalid_port_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "CONSOLE_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.server.port, 8080);
    }
}
