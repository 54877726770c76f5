//! Integration tests for the echo server over a real loopback socket.
//!
//! Each test binds `127.0.0.1:0`, starts [`serve`] on that listener, and talks
//! to it with a tokio-tungstenite client.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use futures_util::{SinkExt, Stream, StreamExt};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use tickwire_echo::infrastructure::serve;

const STEP: Duration = Duration::from_secs(5);

/// Starts the server on an ephemeral port and returns its address and the
/// shutdown flag.
async fn start_server() -> (SocketAddr, Arc<AtomicBool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let running = Arc::new(AtomicBool::new(true));
    tokio::spawn(serve(listener, Arc::clone(&running)));
    (addr, running)
}

/// Reads the next data frame, skipping control frames.
async fn next_data<S>(ws: &mut S) -> Message
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let msg = timeout(STEP, ws.next())
            .await
            .expect("timed out waiting for echo")
            .expect("stream ended")
            .expect("read error");
        if msg.is_text() || msg.is_binary() {
            return msg;
        }
    }
}

#[tokio::test]
async fn test_text_frame_is_echoed_unchanged() {
    // Arrange
    let (addr, running) = start_server().await;
    let (mut ws, _) = connect_async(format!("ws://{addr}/")).await.expect("connect");

    // Act
    ws.send(Message::Text("pos(320, 239); roll: 7".to_string()))
        .await
        .expect("send");

    // Assert: same payload, same frame type
    assert_eq!(
        next_data(&mut ws).await,
        Message::Text("pos(320, 239); roll: 7".to_string())
    );
    running.store(false, Ordering::Relaxed);
}

#[tokio::test]
async fn test_binary_frame_is_echoed_as_binary() {
    let (addr, running) = start_server().await;
    let (mut ws, _) = connect_async(format!("ws://{addr}/")).await.expect("connect");

    ws.send(Message::Binary(vec![1, 2, 3])).await.expect("send");

    assert_eq!(next_data(&mut ws).await, Message::Binary(vec![1, 2, 3]));
    running.store(false, Ordering::Relaxed);
}

#[tokio::test]
async fn test_frames_are_echoed_in_order() {
    let (addr, running) = start_server().await;
    let (mut ws, _) = connect_async(format!("ws://{addr}/")).await.expect("connect");

    for i in 1..=30 {
        ws.send(Message::Text(i.to_string())).await.expect("send");
    }

    for i in 1..=30 {
        assert_eq!(next_data(&mut ws).await, Message::Text(i.to_string()));
    }
    running.store(false, Ordering::Relaxed);
}

#[tokio::test]
async fn test_connections_are_independent() {
    // Arrange: two clients on the same server
    let (addr, running) = start_server().await;
    let (mut a, _) = connect_async(format!("ws://{addr}/")).await.expect("connect a");
    let (mut b, _) = connect_async(format!("ws://{addr}/")).await.expect("connect b");

    // Act
    a.send(Message::Text("from a".to_string())).await.expect("send a");
    b.send(Message::Text("from b".to_string())).await.expect("send b");

    // Assert: each client only hears its own frame
    assert_eq!(next_data(&mut a).await, Message::Text("from a".to_string()));
    assert_eq!(next_data(&mut b).await, Message::Text("from b".to_string()));
    running.store(false, Ordering::Relaxed);
}

#[tokio::test]
async fn test_client_close_ends_session_cleanly() {
    let (addr, running) = start_server().await;
    let (mut ws, _) = connect_async(format!("ws://{addr}/")).await.expect("connect");

    ws.close(None).await.expect("close");

    // The server answers the close handshake and the stream ends.
    let end = timeout(STEP, async {
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;
    assert!(end.is_ok(), "stream must end after close");
    running.store(false, Ordering::Relaxed);
}

#[tokio::test]
async fn test_serve_returns_after_shutdown_flag_cleared() {
    // Arrange
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let running = Arc::new(AtomicBool::new(true));
    let handle = tokio::spawn(serve(listener, Arc::clone(&running)));

    // Act
    running.store(false, Ordering::Relaxed);

    // Assert: the accept loop notices within one poll interval
    let result = timeout(STEP, handle).await.expect("serve did not stop");
    assert!(result.expect("serve task panicked").is_ok());
}
