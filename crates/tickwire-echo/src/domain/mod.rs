//! Domain layer for tickwire-echo.
//!
//! Only configuration lives here; the server has no other state worth
//! modelling.

pub mod config;

pub use config::{ConfigError, EchoConfig};
