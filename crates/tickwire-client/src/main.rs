//! Tickwire client entry point.
//!
//! Connects to the echo server, then runs a fixed-tick render loop in the
//! terminal: `Space` moves the player up and sends its position, `F` toggles
//! fullscreen, `Q` quits.  Every echoed line is shown bottom-up.
//!
//! # Usage
//!
//! ```text
//! tickwire-client [OPTIONS]
//!
//! Options:
//!   --config <PATH>             TOML config file
//!   --server-url <URL>          [default: ws://localhost:8077/]
//!   --width <PX> --height <PX>  logical screen size [default: 640x480]
//!   --buffer-capacity <N>       lines kept for display [default: 25]
//!   --overflow <POLICY>         drop-newest | evict-oldest
//!   --bridge <MODE>             background | per-tick
//!   --tick-rate <HZ>            [default: 60]
//!   --log-file <PATH>           [default: tickwire-client.log]
//! ```
//!
//! Values come from the defaults, then the config file, then the flags.
//!
//! | Variable              | Description             |
//! |-----------------------|-------------------------|
//! | `TICKWIRE_SERVER_URL` | Same as `--server-url`  |
//! | `TICKWIRE_LOG_FILE`   | Same as `--log-file`    |
//!
//! The terminal belongs to the game, so logs go to the log file.  The level is
//! read from `RUST_LOG` (default `info`).
//!
//! # Loop
//!
//! ```text
//! main()
//!  └─ WsTransport::connect()     -- fails fast: the only fatal network error
//!  └─ Session::new()             -- inbound buffer + frame bridge + game
//!  └─ run()
//!       ├─ KeyInput::poll_until(next tick)
//!       ├─ Session::step()       -- drain bridge, update game, maybe send
//!       └─ Game::draw() -> CellSurface -> TerminalRenderer
//!  └─ Session::shutdown()        -- close transport, join receiver
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tickwire_client::application::{Session, TickOutcome};
use tickwire_client::domain::{BridgeMode, ClientConfig};
use tickwire_client::infrastructure::terminal::{CellSurface, KeyInput, TerminalRenderer};
use tickwire_client::infrastructure::transport::WsTransport;
use tickwire_core::{BlockingTransport, OverflowPolicy};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Tickwire fixed-tick WebSocket client.
#[derive(Debug, Parser)]
#[command(
    name = "tickwire-client",
    about = "Sends the player's position over a WebSocket and shows what comes back",
    version
)]
struct Cli {
    /// TOML config file.  Flags given on the command line override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// WebSocket URL of the echo server.
    #[arg(long, env = "TICKWIRE_SERVER_URL")]
    server_url: Option<String>,

    /// Logical screen width in pixels.
    #[arg(long)]
    width: Option<i32>,

    /// Logical screen height in pixels.
    #[arg(long)]
    height: Option<i32>,

    /// Maximum number of echoed lines kept on screen.
    #[arg(long)]
    buffer_capacity: Option<usize>,

    /// What to do with lines arriving once the buffer is full.
    #[arg(long)]
    overflow: Option<OverflowPolicy>,

    /// How received frames reach the render loop.
    #[arg(long)]
    bridge: Option<BridgeMode>,

    /// Render ticks per second.
    #[arg(long)]
    tick_rate: Option<u32>,

    /// Where to write the log.
    #[arg(long, env = "TICKWIRE_LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn into_client_config(self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ClientConfig::default(),
        };

        if let Some(url) = self.server_url {
            config.server_url = url;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(capacity) = self.buffer_capacity {
            config.buffer_capacity = capacity;
        }
        if let Some(overflow) = self.overflow {
            config.overflow = overflow;
        }
        if let Some(bridge) = self.bridge {
            config.bridge = bridge;
        }
        if let Some(rate) = self.tick_rate {
            config.tick_rate = rate;
        }
        if let Some(log_file) = self.log_file {
            config.log_file = log_file;
        }

        config.validate()?;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_client_config()?;
    init_logging(&config.log_file)?;

    info!(
        server_url = %config.server_url,
        bridge = %config.bridge,
        capacity = config.buffer_capacity,
        "Tickwire client starting"
    );

    let transport: Arc<dyn BlockingTransport> = Arc::new(
        WsTransport::connect(&config.server_url)
            .with_context(|| format!("could not reach {}", config.server_url))?,
    );
    let mut session = Session::new(&config, transport)?;

    let result = run(&config, &mut session);
    session.shutdown();

    info!("Tickwire client stopped");
    result
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Runs the render loop until the player quits or input fails.
fn run(config: &ClientConfig, session: &mut Session) -> anyhow::Result<()> {
    let mut renderer = TerminalRenderer::new();
    renderer.enter().context("failed to set up the terminal")?;

    let mut input = KeyInput::new();
    let game = session.game();
    let mut surface = CellSurface::for_screen(game.width(), game.height());
    let tick = config.tick_interval();
    let mut next_tick = Instant::now() + tick;

    let result = loop {
        let keys = match input.poll_until(next_tick) {
            Ok(keys) => keys,
            Err(e) => break Err(e).context("failed to read key input"),
        };

        // A stalled terminal should not cause a burst of catch-up ticks.
        let now = Instant::now();
        next_tick = if next_tick + tick < now {
            now + tick
        } else {
            next_tick + tick
        };

        if session.step(keys) == TickOutcome::Quit {
            break Ok(());
        }

        surface.clear();
        session.game().draw(&mut surface);
        if let Err(e) = renderer.draw(&surface) {
            warn!("draw failed: {e:#}");
        }
    };

    renderer.exit().context("failed to restore the terminal")?;
    result
}

// ── Tests ─────────────────────────────────────────────────────────────────────
