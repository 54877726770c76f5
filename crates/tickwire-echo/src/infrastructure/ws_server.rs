//! WebSocket echo server: accept loop and per-connection echo tasks.
//!
//! 1. Bind a TCP listener on the configured address.
//! 2. Accept connections in a loop, checking the shutdown flag between
//!    accepts.
//! 3. Upgrade each connection to a WebSocket and hand it to its own task.
//! 4. In that task, read messages and write back whatever
//!    [`echo_reply`] says, until the client closes or the stream fails.
//!
//! A failing connection only ends its own task; it never takes the server
//! down.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Error as WsError};
use tracing::{debug, error, info, warn};

use crate::application::{echo_reply, EchoAction};
use crate::domain::EchoConfig;

/// How long one `accept()` may wait before the shutdown flag is re-checked.
const ACCEPT_POLL: Duration = Duration::from_millis(200);

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds `config.bind_addr` and serves until `running` is set to `false`.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound (port in use, missing
/// permission).
pub async fn run_server(config: EchoConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    // Binding is the only step that can fail the whole server; everything
    // after it fails per connection.
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind echo listener on {}", config.bind_addr))?;

    serve(listener, running).await
}

/// Runs the accept loop on an already bound listener.
///
/// Tests bind `127.0.0.1:0` themselves and pass the listener in so they can
/// learn the port before the server starts.
///
/// # Errors
///
/// Returns an error if the listener's local address cannot be read.
pub async fn serve(listener: TcpListener, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let local_addr = listener
        .local_addr()
        .context("failed to read echo listener address")?;
    info!("echo server listening on ws://{local_addr}/");

    // ── Accept loop ───────────────────────────────────────────────────────────
    //
    // `accept()` is wrapped in a short timeout so the shutdown flag is polled
    // even when no client ever connects.
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        match timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                debug!("new connection from {peer_addr}");
                // One task per client, so a slow reader never stalls the
                // others or the accept loop.
                tokio::spawn(handle_connection(stream, peer_addr));
            }
            Ok(Err(e)) => {
                // Transient (e.g. too many open files); keep serving.
                error!("accept error: {e}");
            }
            Err(_) => {
                // No connection within ACCEPT_POLL.
            }
        }
    }

    Ok(())
}

// ── Per-connection handler ────────────────────────────────────────────────────

async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr) {
    match run_echo_session(stream, peer_addr).await {
        Ok(echoed) => info!("session {peer_addr} closed after {echoed} frames"),
        Err(e) => warn!("session {peer_addr} closed with error: {e:#}"),
    }
}

/// Upgrades `stream` and echoes frames until the client leaves.
///
/// Returns the number of frames echoed.
async fn run_echo_session(stream: TcpStream, peer_addr: SocketAddr) -> anyhow::Result<u64> {
    // HTTP upgrade: reads the client's handshake request and answers with
    // `101 Switching Protocols`.
    let mut ws = accept_async(stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    info!("WebSocket session established: {peer_addr}");

    // ── Echo loop ─────────────────────────────────────────────────────────────
    //
    // tungstenite answers pings on its own while we read; `echo_reply`
    // decides what happens to everything else.
    let mut echoed = 0u64;
    loop {
        let inbound = match ws.next().await {
            Some(Ok(msg)) => msg,
            // A client that vanishes without a close frame is a normal
            // end of session here, not a server error.
            Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                debug!("session {peer_addr}: connection closed");
                break;
            }
            Some(Err(e)) => {
                return Err(e).with_context(|| format!("session {peer_addr}: read failed"));
            }
            None => {
                debug!("session {peer_addr}: stream ended");
                break;
            }
        };

        match echo_reply(inbound) {
            EchoAction::Reply(reply) => {
                ws.send(reply)
                    .await
                    .with_context(|| format!("session {peer_addr}: write failed"))?;
                echoed += 1;
            }
            EchoAction::Ignore => {}
            EchoAction::Close => {
                debug!("session {peer_addr}: close frame received");
                // Pushes out the close reply tungstenite queued on read.
                let _ = ws.flush().await;
                break;
            }
        }
    }

    Ok(echoed)
}
