//! Infrastructure layer: the concrete sockets and the terminal host.
//!
//! - [`transport`] – the native WebSocket transport, the callback transport
//!   over a host socket, the browser socket (wasm32), and in-memory mocks.
//! - [`terminal`] – a character-cell drawing surface, the crossterm renderer
//!   and key input.

pub mod terminal;
pub mod transport;
