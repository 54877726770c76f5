//! tickwire-echo library crate.
//!
//! A WebSocket server that returns every data frame to the client that sent
//! it, with the same payload and the same frame type.  The Tickwire client
//! uses it as its remote end; tests use it as a real peer.
//!
//! ```text
//! tickwire-client  ── text frame ──▶  [tickwire-echo]
//!                  ◀── same frame ──
//!   domain/          EchoConfig
//!   application/     echo_reply: which frame (if any) answers an inbound one
//!   infrastructure/  accept loop + one tokio task per connection
//! ```

/// Domain layer: configuration.
pub mod domain;

/// Application layer: reply rules.
pub mod application;

/// Infrastructure layer: WebSocket accept loop and per-connection tasks.
pub mod infrastructure;
