//! Domain layer for the Tickwire client.
//!
//! Plain data: the client configuration and how it is read from TOML.  No
//! sockets, threads, or terminal access here.

pub mod config;

pub use config::{BridgeMode, ClientConfig, ConfigError};
