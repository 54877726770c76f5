//! One client session over a blocking transport.
//!
//! The session owns everything with a lifetime tied to the connection: the
//! inbound buffer, the frame bridge, and the game.  [`Session::shutdown`]
//! releases them in order: transport first, so the receiver wakes up, then
//! the bridge threads.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use tickwire_core::{BlockingTransport, InboundBuffer, TransportError};
use tracing::{info, warn};

use crate::application::frame_bridge::FrameBridge;
use crate::application::game::{Game, InputState, TickOutcome};
use crate::domain::{BridgeMode, ClientConfig};

/// Errors that end (or prevent) a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The transport could not be established.
    #[error("could not connect: {0}")]
    Connect(#[from] TransportError),

    /// The receiver thread could not be started.
    #[error("could not start the frame bridge: {0}")]
    Spawn(#[source] io::Error),
}

/// A connected client: transport, bridge, buffer and game.
pub struct Session {
    transport: Arc<dyn BlockingTransport>,
    inbox: Arc<InboundBuffer>,
    bridge: FrameBridge,
    game: Game<dyn BlockingTransport>,
}

impl Session {
    /// Wires a session around an already connected transport.
    ///
    /// # Errors
    ///
    /// [`SessionError::Spawn`] if the background receiver cannot be started.
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn BlockingTransport>,
    ) -> Result<Self, SessionError> {
        let inbox = Self::inbox_for(config);
        let game = Game::new(
            config.width,
            config.height,
            Arc::clone(&inbox),
            Arc::clone(&transport),
        );
        Self::assemble(config, transport, inbox, game)
    }

    /// Like [`Session::new`] but with reproducible position-report rolls.
    ///
    /// # Errors
    ///
    /// Same as [`Session::new`].
    pub fn with_seed(
        config: &ClientConfig,
        transport: Arc<dyn BlockingTransport>,
        seed: u64,
    ) -> Result<Self, SessionError> {
        let inbox = Self::inbox_for(config);
        let game = Game::with_seed(
            config.width,
            config.height,
            Arc::clone(&inbox),
            Arc::clone(&transport),
            seed,
        );
        Self::assemble(config, transport, inbox, game)
    }

    fn inbox_for(config: &ClientConfig) -> Arc<InboundBuffer> {
        Arc::new(InboundBuffer::new(config.buffer_capacity, config.overflow))
    }

    fn assemble(
        config: &ClientConfig,
        transport: Arc<dyn BlockingTransport>,
        inbox: Arc<InboundBuffer>,
        game: Game<dyn BlockingTransport>,
    ) -> Result<Self, SessionError> {
        let bridge = match config.bridge {
            BridgeMode::Background => FrameBridge::background(
                Arc::clone(&transport),
                Arc::clone(&inbox),
                config.channel_capacity,
            )
            .map_err(SessionError::Spawn)?,
            BridgeMode::PerTick => FrameBridge::per_tick(
                Arc::clone(&transport),
                Arc::clone(&inbox),
                config.drain_deadline(),
                config.max_in_flight,
            ),
        };

        info!(
            capacity = inbox.capacity(),
            overflow = %inbox.policy(),
            bridge = %config.bridge,
            "session started"
        );

        Ok(Self {
            transport,
            inbox,
            bridge,
            game,
        })
    }

    /// Runs one tick: drain the bridge, then apply `input`.
    pub fn step(&mut self, input: InputState) -> TickOutcome {
        self.bridge.tick();
        self.game.set_link(self.bridge.state().clone());
        self.game.update(input)
    }

    pub fn game(&self) -> &Game<dyn BlockingTransport> {
        &self.game
    }

    pub fn inbox(&self) -> &Arc<InboundBuffer> {
        &self.inbox
    }

    pub fn bridge(&self) -> &FrameBridge {
        &self.bridge
    }

    /// Closes the transport and stops the bridge.
    pub fn shutdown(self) {
        if let Err(e) = self.transport.close() {
            warn!("error while closing transport: {e}");
        }
        self.bridge.shutdown();
        info!(
            kept = self.inbox.len(),
            dropped = self.inbox.dropped(),
            evicted = self.inbox.evicted(),
            send_failures = self.game.send_failures(),
            "session ended"
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
