//! Tickwire echo server entry point.
//!
//! Accepts WebSocket connections and sends every data frame back to its
//! sender unchanged.  This is the remote end the Tickwire client talks to.
//!
//! # Usage
//!
//! ```text
//! tickwire-echo [OPTIONS]
//!
//! Options:
//!   --bind <ADDR>   IP address to listen on [default: 0.0.0.0]
//!   --port <PORT>   TCP port to listen on   [default: 8077]
//! ```
//!
//! | Variable              | Default   | Description          |
//! |-----------------------|-----------|----------------------|
//! | `TICKWIRE_ECHO_BIND`  | `0.0.0.0` | Listen address       |
//! | `TICKWIRE_ECHO_PORT`  | `8077`    | Listen port          |
//!
//! The log level is read from `RUST_LOG` (default `info`).

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tickwire_echo::domain::EchoConfig;
use tickwire_echo::infrastructure::run_server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Tickwire WebSocket echo server.
#[derive(Debug, Parser)]
#[command(
    name = "tickwire-echo",
    about = "WebSocket server that echoes every frame back to its sender",
    version
)]
struct Cli {
    /// IP address to bind the listener to.
    ///
    /// `0.0.0.0` accepts connections on every interface; `127.0.0.1` only
    /// from this machine.
    #[arg(long, default_value = "0.0.0.0", env = "TICKWIRE_ECHO_BIND")]
    bind: String,

    /// TCP port to listen on.
    #[arg(long, default_value_t = 8077, env = "TICKWIRE_ECHO_PORT")]
    port: u16,
}

impl Cli {
    /// Converts the parsed arguments into an [`EchoConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--bind` is not an IP address.
    fn into_echo_config(self) -> anyhow::Result<EchoConfig> {
        Ok(EchoConfig::new(&self.bind, self.port)?)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. Logging is initialised; `RUST_LOG` picks the level.
/// 2. The command line is parsed into an [`EchoConfig`].
/// 3. A Ctrl+C task is spawned that clears the shared `running` flag.
/// 4. [`run_server`] binds the port and echoes frames until the flag clears.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // Falls back to `info` when `RUST_LOG` is absent or does not parse.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Parse CLI arguments ───────────────────────────────────────────────────
    //
    // clap exits with a usage message on unknown flags; a bad `--bind` value
    // comes back as an error from `into_echo_config`.
    let config = Cli::parse().into_echo_config()?;
    info!("Tickwire echo server starting on {}", config.bind_addr);

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    //
    // Only the eventual value matters, so `Relaxed` is enough on both sides.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    // Ctrl+C (SIGINT on Unix) clears the flag; the accept loop notices within
    // 200 ms and returns.
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    // ── Serve until shutdown ──────────────────────────────────────────────────
    run_server(config, running).await?;

    info!("Tickwire echo server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["tickwire-echo"]);
        assert_eq!(cli.bind, "0.0.0.0");
        assert_eq!(cli.port, 8077);
    }

    #[test]
    fn test_cli_port_override() {
        let cli = Cli::parse_from(["tickwire-echo", "--port", "9999"]);
        assert_eq!(cli.port, 9999);
    }

    #[test]
    fn test_into_echo_config_defaults() {
        let config = Cli::parse_from(["tickwire-echo"]).into_echo_config().unwrap();
        assert_eq!(config, EchoConfig::default());
    }

    #[test]
    fn test_into_echo_config_invalid_bind_returns_error() {
        // Arrange
        let cli = Cli {
            bind: "not.an.ip".to_string(),
            port: 8077,
        };

        // Act
        let result = cli.into_echo_config();

        // Assert: must return an error, not panic
        assert!(result.is_err());
    }
}
