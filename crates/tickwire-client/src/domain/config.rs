//! Client configuration.
//!
//! [`ClientConfig`] is built once at startup: defaults, then an optional TOML
//! file, then command-line overrides (applied in `main.rs`).  Every field has
//! a default so a partial file is valid:
//!
//! ```toml
//! server_url = "ws://localhost:8077/"
//! buffer_capacity = 25
//! overflow = "drop-newest"     # or "evict-oldest"
//! bridge = "background"        # or "per-tick"
//! tick_rate = 60
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tickwire_core::{OverflowPolicy, DEFAULT_CAPACITY};

/// Largest accepted `buffer_capacity`.  Far more lines than any screen shows.
pub const MAX_BUFFER_CAPACITY: usize = 10_000;

/// Largest accepted `channel_capacity`.
pub const MAX_CHANNEL_CAPACITY: usize = 65_536;

/// Largest accepted `max_in_flight`.  Each attempt is an OS thread.
pub const MAX_IN_FLIGHT: usize = 64;

/// Error type for loading and validating the client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid config value for '{field}': {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// How received frames get from the transport into the inbound buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BridgeMode {
    /// A dedicated receiver thread feeds a bounded channel that each tick
    /// polls without blocking.
    #[default]
    Background,
    /// Each tick launches one deadline-bound drain attempt on its own thread.
    PerTick,
}

impl fmt::Display for BridgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background => f.write_str("background"),
            Self::PerTick => f.write_str("per-tick"),
        }
    }
}

impl FromStr for BridgeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "background" => Ok(Self::Background),
            "per-tick" => Ok(Self::PerTick),
            other => Err(format!(
                "unknown bridge mode '{other}' (expected 'background' or 'per-tick')"
            )),
        }
    }
}

/// All runtime settings for the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// WebSocket endpoint of the echo server.
    pub server_url: String,
    /// Logical screen width in pixels.
    pub width: i32,
    /// Logical screen height in pixels.
    pub height: i32,
    /// Maximum number of received lines kept for display.
    pub buffer_capacity: usize,
    /// What happens to lines arriving once the buffer is full.
    pub overflow: OverflowPolicy,
    /// How the receive side is bridged into the render loop.
    pub bridge: BridgeMode,
    /// Render ticks per second.
    pub tick_rate: u32,
    /// Per-tick drain deadline in milliseconds ([`BridgeMode::PerTick`]).
    pub drain_deadline_ms: u64,
    /// Frames the receiver thread may queue ahead of the render loop
    /// ([`BridgeMode::Background`]).
    pub channel_capacity: usize,
    /// Concurrent drain attempts allowed ([`BridgeMode::PerTick`]).
    pub max_in_flight: usize,
    /// File the client writes its log to.
    pub log_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://localhost:8077/".to_string(),
            width: 640,
            height: 480,
            buffer_capacity: DEFAULT_CAPACITY,
            overflow: OverflowPolicy::DropNewest,
            bridge: BridgeMode::Background,
            tick_rate: 60,
            drain_deadline_ms: 1000,
            channel_capacity: 64,
            max_in_flight: 4,
            log_file: PathBuf::from("tickwire-client.log"),
        }
    }
}

impl ClientConfig {
    /// Reads and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`]
    /// for malformed TOML, [`ConfigError::Invalid`] for out-of-range values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::load`], minus I/O.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values a session cannot start with.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &str) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            }
        }

        if !(self.server_url.starts_with("ws://") || self.server_url.starts_with("wss://")) {
            return Err(invalid("server_url", "must start with ws:// or wss://"));
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(invalid("width/height", "must be positive"));
        }
        if self.tick_rate == 0 {
            return Err(invalid("tick_rate", "must be at least 1"));
        }
        if self.drain_deadline_ms == 0 {
            return Err(invalid("drain_deadline_ms", "must be at least 1"));
        }
        if self.buffer_capacity > MAX_BUFFER_CAPACITY {
            return Err(invalid(
                "buffer_capacity",
                &format!("must be at most {MAX_BUFFER_CAPACITY}"),
            ));
        }
        if !(1..=MAX_CHANNEL_CAPACITY).contains(&self.channel_capacity) {
            return Err(invalid(
                "channel_capacity",
                &format!("must be between 1 and {MAX_CHANNEL_CAPACITY}"),
            ));
        }
        if !(1..=MAX_IN_FLIGHT).contains(&self.max_in_flight) {
            return Err(invalid(
                "max_in_flight",
                &format!("must be between 1 and {MAX_IN_FLIGHT}"),
            ));
        }
        Ok(())
    }

    /// Time between two render ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }

    /// Deadline given to each per-tick drain attempt.
    pub fn drain_deadline(&self) -> Duration {
        Duration::from_millis(self.drain_deadline_ms)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_settings() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.server_url, "ws://localhost:8077/");
        assert_eq!((cfg.width, cfg.height), (640, 480));
        assert_eq!(cfg.buffer_capacity, 25);
        assert_eq!(cfg.overflow, OverflowPolicy::DropNewest);
        assert_eq!(cfg.bridge, BridgeMode::Background);
        assert_eq!(cfg.drain_deadline(), Duration::from_secs(1));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_tick_interval_at_60_hz() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.tick_interval(), Duration::from_nanos(16_666_666));
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let cfg = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides_only_given_fields() {
        // Arrange
        let text = r#"
            server_url = "ws://10.0.0.5:9000/"
            overflow = "evict-oldest"
            bridge = "per-tick"
        "#;

        // Act
        let cfg = ClientConfig::from_toml_str(text).unwrap();

        // Assert
        assert_eq!(cfg.server_url, "ws://10.0.0.5:9000/");
        assert_eq!(cfg.overflow, OverflowPolicy::EvictOldest);
        assert_eq!(cfg.bridge, BridgeMode::PerTick);
        assert_eq!(cfg.buffer_capacity, 25);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = ClientConfig::from_toml_str("tick_rate = \"fast\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_tick_rate_is_rejected() {
        let result = ClientConfig::from_toml_str("tick_rate = 0");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "tick_rate", .. })
        ));
    }

    #[test]
    fn test_non_websocket_url_is_rejected() {
        let cfg = ClientConfig {
            server_url: "http://localhost:8077/".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "server_url", .. })
        ));
    }

    #[test]
    fn test_zero_channel_capacity_is_rejected() {
        let cfg = ClientConfig {
            channel_capacity: 0,
            ..ClientConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_oversized_buffer_capacity_is_rejected() {
        let result = ClientConfig::from_toml_str("buffer_capacity = 1000000000000");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "buffer_capacity", .. })
        ));
    }

    #[test]
    fn test_oversized_channel_capacity_is_rejected() {
        let result = ClientConfig::from_toml_str("channel_capacity = 4611686018427387904");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "channel_capacity", .. })
        ));
    }

    #[test]
    fn test_capacity_limits_are_inclusive() {
        // Arrange
        let cfg = ClientConfig {
            buffer_capacity: MAX_BUFFER_CAPACITY,
            channel_capacity: MAX_CHANNEL_CAPACITY,
            max_in_flight: MAX_IN_FLIGHT,
            ..ClientConfig::default()
        };

        // Act / Assert
        assert!(cfg.validate().is_ok());
        let over = ClientConfig {
            max_in_flight: MAX_IN_FLIGHT + 1,
            ..cfg
        };
        assert!(matches!(
            over.validate(),
            Err(ConfigError::Invalid { field: "max_in_flight", .. })
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = ClientConfig::load(Path::new("/nonexistent/tickwire.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_bridge_mode_parse_and_display_agree() {
        for mode in [BridgeMode::Background, BridgeMode::PerTick] {
            assert_eq!(mode.to_string().parse::<BridgeMode>(), Ok(mode));
        }
        assert!("sometimes".parse::<BridgeMode>().is_err());
    }
}
