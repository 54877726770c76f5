//! Infrastructure layer for tickwire-echo.
//!
//! Binds the listener, performs the WebSocket upgrade, and runs one echo task
//! per accepted connection until the shutdown flag is cleared.

pub mod ws_server;

pub use ws_server::{run_server, serve};
