use thiserror::Error;

/// Errors that can occur on any transport.
///
/// None of them abort the process.  The caller decides: a failed send skips
/// one tick's update, a failed receive degrades the link, and only a failed
/// connect prevents the session from starting.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection (TCP connect or WebSocket handshake) failed.
    #[error("failed to connect to {url}: {reason}")]
    ConnectFailed { url: String, reason: String },

    /// The remote side closed the connection.
    #[error("connection closed by peer")]
    PeerClosed,

    /// A frame arrived that is not valid UTF-8 text.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// The transport was used after it had been closed locally.
    #[error("transport is closed")]
    Closed,

    /// An I/O error occurred on the established connection.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A handler was registered for an event the transport does not emit.
    #[error("unsupported event '{0}'")]
    UnsupportedEvent(String),

    /// The host socket rejected an operation.
    #[error("host socket error: {0}")]
    Host(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_failed_message_names_url() {
        let err = TransportError::ConnectFailed {
            url: "ws://localhost:8077/".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to connect to ws://localhost:8077/: connection refused"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: TransportError = io.into();
        assert!(matches!(err, TransportError::Io(_)));
    }
}
