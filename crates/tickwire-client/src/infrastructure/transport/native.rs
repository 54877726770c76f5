//! Native blocking WebSocket transport.
//!
//! # Threading
//!
//! The render loop and the receiver thread are plain OS threads, but
//! tokio-tungstenite is async.  `WsTransport` owns a small tokio runtime (one
//! worker, thread name `tickwire-net`) and every public call is a `block_on`
//! into it.  `Runtime::block_on` may be entered from several threads at once,
//! which is what lets `send` (render thread) and `receive` (receiver thread)
//! run at the same time.
//!
//! The socket is split into its two halves, each behind its own async mutex,
//! so a `receive` parked on a silent peer never holds up a `send`.
//!
//! # Shutdown
//!
//! `close` flips a `watch` channel before sending the close frame.  Every
//! `receive` selects on that channel, so a thread blocked in `receive`
//! returns [`TransportError::Closed`] immediately instead of waiting for the
//! peer.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tickwire_core::{BlockingTransport, Transport, TransportError};
use tokio::net::TcpStream;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long `close` waits for the close frame to go out.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// A connected WebSocket with blocking `send` / `receive`.
pub struct WsTransport {
    url: String,
    runtime: Runtime,
    sink: AsyncMutex<SplitSink<WsStream, Message>>,
    stream: AsyncMutex<SplitStream<WsStream>>,
    closed: AtomicBool,
    shutdown: watch::Sender<bool>,
}

impl WsTransport {
    /// Opens a WebSocket to `url` and completes the handshake.
    ///
    /// # Errors
    ///
    /// [`TransportError::ConnectFailed`] if the TCP connect or the handshake
    /// fails, [`TransportError::Io`] if the runtime cannot be started.
    pub fn connect(url: &str) -> Result<Self, TransportError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("tickwire-net")
            .enable_all()
            .build()?;

        debug!(%url, "sending WebSocket handshake request");
        let (ws, response) =
            runtime
                .block_on(connect_async(url))
                .map_err(|e| TransportError::ConnectFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
        debug!(
            status = %response.status(),
            headers = ?response.headers(),
            "WebSocket handshake response"
        );
        info!(%url, "connected");

        let (sink, stream) = ws.split();
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            url: url.to_string(),
            runtime,
            sink: AsyncMutex::new(sink),
            stream: AsyncMutex::new(stream),
            closed: AtomicBool::new(false),
            shutdown,
        })
    }

    /// Reads the next text frame, giving up at `limit` (if any) or as soon as
    /// the transport is closed.
    async fn read(&self, limit: Option<Duration>) -> Result<Option<String>, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let mut shutdown = self.shutdown.subscribe();

        // The lock wait counts against the limit too: overlapping drain
        // attempts queue on the stream half.
        let next = async {
            let mut stream = self.stream.lock().await;
            next_text(&mut stream).await
        };
        let bounded = async {
            match limit {
                Some(limit) => match tokio::time::timeout(limit, next).await {
                    Ok(frame) => frame.map(Some),
                    Err(_) => Ok(None),
                },
                None => next.await.map(Some),
            }
        };

        tokio::select! {
            _ = shutdown.wait_for(|closed| *closed) => Err(TransportError::Closed),
            result = bounded => result,
        }
    }
}

/// Skips control frames and returns the payload of the next text frame.
async fn next_text(stream: &mut SplitStream<WsStream>) -> Result<String, TransportError> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => return Ok(text),
            Some(Ok(Message::Binary(bytes))) => {
                return Err(TransportError::MalformedFrame(format!(
                    "expected a text frame, got {} binary bytes",
                    bytes.len()
                )));
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {
                trace!("control frame skipped");
            }
            Some(Ok(Message::Close(frame))) => {
                debug!(?frame, "close frame from peer");
                return Err(TransportError::PeerClosed);
            }
            Some(Err(e)) => return Err(map_ws_error(e)),
            None => return Err(TransportError::PeerClosed),
        }
    }
}

fn map_ws_error(error: WsError) -> TransportError {
    match error {
        WsError::ConnectionClosed
        | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
            TransportError::PeerClosed
        }
        WsError::AlreadyClosed => TransportError::Closed,
        WsError::Io(e) => TransportError::Io(e),
        e @ (WsError::Utf8 | WsError::Protocol(_) | WsError::Capacity(_)) => {
            TransportError::MalformedFrame(e.to_string())
        }
        other => TransportError::Io(io::Error::other(other)),
    }
}

impl Transport for WsTransport {
    fn send(&self, text: &str) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.runtime
            .block_on(async {
                let mut sink = self.sink.lock().await;
                sink.send(Message::Text(text.to_string())).await
            })
            .map_err(map_ws_error)
    }

    fn close(&self) -> Result<(), TransportError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        // Wake any receive first; it must not wait for the peer.
        self.shutdown.send_replace(true);
        debug!(url = %self.url, "closing WebSocket");

        let result = self.runtime.block_on(async {
            let mut sink = self.sink.lock().await;
            tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await
        });

        match result {
            Ok(Ok(())) | Ok(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => Ok(()),
            Ok(Err(e)) => Err(map_ws_error(e)),
            Err(_) => {
                warn!("close frame not sent within {CLOSE_TIMEOUT:?}");
                Ok(())
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl BlockingTransport for WsTransport {
    fn receive(&self) -> Result<String, TransportError> {
        match self.runtime.block_on(self.read(None))? {
            Some(frame) => Ok(frame),
            None => Err(TransportError::PeerClosed),
        }
    }

    fn receive_timeout(&self, timeout: Duration) -> Result<Option<String>, TransportError> {
        self.runtime.block_on(self.read(Some(timeout)))
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        if let Err(e) = Transport::close(self) {
            debug!("error closing WebSocket on drop: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_to_closed_port_is_connect_failure() {
        // Arrange: grab a free port, then release it so nothing listens there
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = format!("ws://127.0.0.1:{port}/");

        // Act
        let result = WsTransport::connect(&url);

        // Assert
        match result {
            Err(TransportError::ConnectFailed { url: failed, .. }) => assert_eq!(failed, url),
            Err(other) => panic!("expected ConnectFailed, got {other}"),
            Ok(_) => panic!("connect to a closed port must fail"),
        }
    }

    #[test]
    fn test_peer_close_maps_to_peer_closed() {
        assert!(matches!(
            map_ws_error(WsError::ConnectionClosed),
            TransportError::PeerClosed
        ));
        assert!(matches!(
            map_ws_error(WsError::Protocol(
                ProtocolError::ResetWithoutClosingHandshake
            )),
            TransportError::PeerClosed
        ));
    }

    #[test]
    fn test_bad_payload_maps_to_malformed_frame() {
        assert!(matches!(
            map_ws_error(WsError::Utf8),
            TransportError::MalformedFrame(_)
        ));
    }

    #[test]
    fn test_local_close_maps_to_closed() {
        assert!(matches!(
            map_ws_error(WsError::AlreadyClosed),
            TransportError::Closed
        ));
    }
}
