//! Echo server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

/// Port the client dials by default (`ws://localhost:8077/`).
pub const DEFAULT_PORT: u16 = 8077;

/// Errors building an [`EchoConfig`] from user input.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The bind host is not an IP address.
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),
}

/// Runtime configuration for the echo server.
///
/// ```rust
/// use tickwire_echo::domain::EchoConfig;
///
/// let cfg = EchoConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 8077);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: SocketAddr,
}

impl EchoConfig {
    /// Builds a config from a host string and a port.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidBindAddress`] if `host` is not an IPv4 or IPv6
    /// address.
    pub fn new(host: &str, port: u16) -> Result<Self, ConfigError> {
        let ip: IpAddr = host
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(host.to_string()))?;
        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
        })
    }
}

impl Default for EchoConfig {
    /// Listens on every interface, port 8077.
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
        }
    }
}
