//! Configuration resolution for thinkrelay.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`<config dir>/thinkrelay/settings.json`)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)
//!
//! Files may be partial: only the keys they contain override lower layers.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Complete thinkrelay configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

/// HTTP listener and storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// History database file. `None` resolves to [`default_database_path`].
    pub database_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            database_path: None,
        }
    }
}

/// Inference backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Ollama base URL, without the `/api/...` suffix.
    pub base_url: String,
    pub model: String,
    /// Bound on connecting and receiving response headers (seconds).
    pub connect_timeout_secs: u64,
    /// Longest accepted NDJSON line from the backend.
    pub max_line_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "deepseek-r1:70b".to_string(),
            connect_timeout_secs: 30,
            max_line_bytes: 1024 * 1024, // 1 MiB
        }
    }
}

impl UpstreamConfig {
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Event stream behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Upstream silence (seconds) after which a keepalive event is sent.
    pub keepalive_secs: u64,
    /// Send an `error` event instead of `done` when saving the exchange fails.
    pub report_persistence_errors: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            keepalive_secs: 5,
            report_persistence_errors: false,
        }
    }
}

impl StreamConfig {
    pub const fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }
}

/// Load configuration with hierarchical resolution.
///
/// `explicit` is a file passed on the command line; unlike the global file it
/// must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut layered = serde_json::to_value(Config::default())?;

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            merge_json(&mut layered, read_config_file(&global_path)?);
        }
    }

    if let Some(path) = explicit {
        merge_json(&mut layered, read_config_file(path)?);
    }

    let mut config: Config = serde_json::from_value(layered)
        .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate()?;

    Ok(config)
}

impl Config {
    /// Reject values the relay cannot run with.
    ///
    /// A zero keepalive interval makes the watchdog permanently due, and a
    /// zero connect timeout fails every backend request.
    pub fn validate(&self) -> Result<()> {
        if self.stream.keepalive_secs == 0 {
            return Err(Error::Config("stream.keepalive_secs must be at least 1".into()));
        }
        if self.upstream.connect_timeout_secs == 0 {
            return Err(Error::Config(
                "upstream.connect_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("thinkrelay").join("settings.json"))
}

/// Get the default history database path.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("thinkrelay").join("history.db"))
}

fn read_config_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Recursively overlay `overlay` onto `base`. Objects merge key by key,
/// everything else replaces.
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Apply `THINKRELAY_*` overrides. Unparseable values are ignored.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(addr) = lookup("THINKRELAY_LISTEN_ADDR").and_then(|v| v.parse().ok()) {
        config.server.listen_addr = addr;
    }
    if let Some(path) = lookup("THINKRELAY_DB_PATH") {
        config.server.database_path = Some(PathBuf::from(path));
    }
    if let Some(url) = lookup("THINKRELAY_OLLAMA_URL") {
        config.upstream.base_url = url;
    }
    if let Some(model) = lookup("THINKRELAY_MODEL") {
        config.upstream.model = model;
    }
    if let Some(n) = lookup("THINKRELAY_CONNECT_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.upstream.connect_timeout_secs = n;
    }
    if let Some(n) = lookup("THINKRELAY_KEEPALIVE_SECS").and_then(|v| v.parse().ok()) {
        config.stream.keepalive_secs = n;
    }
    if let Some(flag) = lookup("THINKRELAY_REPORT_PERSISTENCE_ERRORS").and_then(|v| v.parse().ok())
    {
        config.stream.report_persistence_errors = flag;
    }
}
