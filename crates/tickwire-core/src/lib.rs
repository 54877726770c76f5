//! # tickwire-core
//!
//! Shared building blocks for the Tickwire client: the bounded inbound line
//! buffer, the player model, and the transport contracts that both the native
//! and the browser socket implement.
//!
//! This crate has no dependencies on sockets, async runtimes, or terminals.
//! Everything here can be unit tested on any platform.
//!
//! - **`domain`** – The [`InboundBuffer`] that holds echoed lines for display,
//!   and the [`Player`] whose position is reported to the server.
//!
//! - **`transport`** – The capability traits ([`Transport`],
//!   [`BlockingTransport`], [`HandlerTransport`]) and the [`TransportError`]
//!   taxonomy shared by every implementation.

pub mod domain;
pub mod transport;

pub use domain::inbound::{InboundBuffer, OverflowPolicy, PushOutcome, DEFAULT_CAPACITY};
pub use domain::player::{position_report, Player, Point};
pub use transport::{
    BlockingTransport, FrameHandler, HandlerTransport, Transport, TransportError, MESSAGE_EVENT,
};
