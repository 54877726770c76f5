//! Application layer for tickwire-echo.
//!
//! Decides how the server answers each inbound WebSocket message.  No I/O
//! happens here; the infrastructure layer reads, asks, and writes.

pub mod echo;

pub use echo::{echo_reply, EchoAction};
