//! Runtime configuration.
//!
//! tellopad runs on built-in defaults.  A TOML file is read only when
//! `TELLOPAD_CONFIG` names one, and `TELLOPAD_*` environment variables
//! override individual fields either way.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tellopad_types::TelloError;

/// Where controller events come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    /// Replay a JSON-lines recording.
    Replay(PathBuf),
    /// Receive JSON events from a gamepad bridge on this address.
    Udp(SocketAddr),
}

impl InputSpec {
    /// Parse `replay:<path>` or `udp:<addr>`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.split_once(':') {
            Some(("replay", path)) if !path.is_empty() => Ok(Self::Replay(PathBuf::from(path))),
            Some(("udp", addr)) => addr
                .parse()
                .map(Self::Udp)
                .map_err(|e| format!("Invalid input bridge address '{}': {}", addr, e)),
            _ => Err(format!(
                "Invalid input '{}': expected replay:<path> or udp:<addr>",
                raw
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Local UDP port replies are received on.
    #[serde(default = "default_local_port")]
    pub local_port: u16,

    /// Command port used for named presets.
    #[serde(default = "default_command_port")]
    pub command_port: u16,

    /// Pause after each setup command, in milliseconds.
    #[serde(default = "default_setup_delay_ms")]
    pub setup_delay_ms: u64,

    /// Dispatch loop polling period, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Play the startup rumble when a controller is detected.
    #[serde(default = "default_rumble")]
    pub rumble: bool,

    /// Input source, see [`InputSpec::parse`].
    #[serde(default = "default_input")]
    pub input: String,

    /// Named targets, e.g. `tello = "192.168.10.1"`.  Must stay the last
    /// field: TOML tables follow plain values.
    #[serde(default = "default_presets")]
    pub presets: BTreeMap<String, String>,
}

fn default_local_port() -> u16 {
    9000
}
fn default_command_port() -> u16 {
    8889
}
fn default_presets() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("tello".to_string(), "192.168.10.1".to_string()),
        ("laptop".to_string(), "192.168.1.13".to_string()),
    ])
}
fn default_setup_delay_ms() -> u64 {
    500
}
fn default_poll_interval_ms() -> u64 {
    5
}
fn default_rumble() -> bool {
    true
}
fn default_input() -> String {
    "udp:127.0.0.1:9100".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_port: default_local_port(),
            command_port: default_command_port(),
            setup_delay_ms: default_setup_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            rumble: default_rumble(),
            input: default_input(),
            presets: default_presets(),
        }
    }
}

impl Config {
    pub fn setup_delay(&self) -> Duration {
        Duration::from_millis(self.setup_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn input_spec(&self) -> Result<InputSpec, String> {
        InputSpec::parse(&self.input)
    }
}

/// Load the configuration: defaults, then the `TELLOPAD_CONFIG` file if set,
/// then environment overrides.
pub fn load() -> Result<Config, TelloError> {
    let mut cfg = match std::env::var("TELLOPAD_CONFIG") {
        Ok(path) => load_from(Path::new(&path))?,
        Err(_) => Config::default(),
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load a TOML config file.  Missing fields take their defaults.
pub(crate) fn load_from(path: &Path) -> Result<Config, TelloError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        TelloError::Config(format!("Failed to read config at {}: {}", path.display(), e))
    })?;
    toml::from_str(&raw).map_err(|e| TelloError::Config(format!("Failed to parse config: {}", e)))
}

/// Apply `TELLOPAD_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `TELLOPAD_LOCAL_PORT` | `local_port` |
/// | `TELLOPAD_POLL_MS` | `poll_interval_ms` |
/// | `TELLOPAD_SETUP_DELAY_MS` | `setup_delay_ms` |
/// | `TELLOPAD_INPUT` | `input` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Some(port) = env_parse::<u16>("TELLOPAD_LOCAL_PORT") {
        cfg.local_port = port;
    }
    if let Some(ms) = env_parse::<u64>("TELLOPAD_POLL_MS") {
        cfg.poll_interval_ms = ms;
    }
    if let Some(ms) = env_parse::<u64>("TELLOPAD_SETUP_DELAY_MS") {
        cfg.setup_delay_ms = ms;
    }
    if let Ok(v) = std::env::var("TELLOPAD_INPUT") {
        cfg.input = v;
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
