//! Transport contracts shared by every socket implementation.
//!
//! Two kinds of socket sit behind the same sending interface:
//!
//! ```text
//!                    ┌──────────── Transport ─────────────┐
//!                    │  send(text)   close()   is_closed() │
//!                    └───────────────┬────────────────────┘
//!               ┌────────────────────┴────────────────────┐
//!      BlockingTransport                           HandlerTransport
//!   receive() / receive_timeout()          register_handler("message", f)
//!   pull: the caller blocks until a        push: the host calls `f` once per
//!   frame arrives (native socket)          arriving frame (browser socket)
//! ```
//!
//! The render loop only ever needs [`Transport::send`].  The receive side is
//! wired once at startup: a blocking transport is handed to the frame bridge,
//! a handler transport gets an inbox handler registered on it.

mod error;

use std::time::Duration;

pub use error::TransportError;

/// The only event a [`HandlerTransport`] accepts handlers for.
pub const MESSAGE_EVENT: &str = "message";

/// Callback invoked with the payload of each arriving frame.
pub type FrameHandler = Box<dyn FnMut(String) + 'static>;

/// Sending half of every transport.
pub trait Transport {
    /// Sends one text frame.
    ///
    /// # Errors
    ///
    /// [`TransportError::Closed`] after [`Transport::close`], or the error the
    /// underlying socket reported.
    fn send(&self, text: &str) -> Result<(), TransportError>;

    /// Closes the transport.  Calling it more than once is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the error the socket reported while sending its close frame.
    /// The transport counts as closed either way.
    fn close(&self) -> Result<(), TransportError>;

    /// Returns `true` once [`Transport::close`] has been called.
    fn is_closed(&self) -> bool;
}

/// A transport whose receive side is a blocking pull.
///
/// Implementations must allow `send` and `receive` to run concurrently from
/// different threads; `close` must wake a thread blocked in `receive`.
pub trait BlockingTransport: Transport + Send + Sync {
    /// Blocks until one text frame arrives.
    ///
    /// # Errors
    ///
    /// [`TransportError::PeerClosed`] when the stream ends,
    /// [`TransportError::MalformedFrame`] for a non-text data frame, and
    /// [`TransportError::Closed`] once the transport has been closed locally.
    fn receive(&self) -> Result<String, TransportError>;

    /// Like [`BlockingTransport::receive`] but gives up after `timeout`,
    /// returning `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Same as [`BlockingTransport::receive`].
    fn receive_timeout(&self, timeout: Duration) -> Result<Option<String>, TransportError>;
}

/// A transport whose receive side is pushed by the host's event loop.
pub trait HandlerTransport: Transport {
    /// Installs `handler` for `event`, replacing any earlier handler.
    ///
    /// # Errors
    ///
    /// [`TransportError::UnsupportedEvent`] for anything but
    /// [`MESSAGE_EVENT`], [`TransportError::Closed`] after close.
    fn register_handler(&self, event: &str, handler: FrameHandler) -> Result<(), TransportError>;

    /// Removes and releases the installed handler, if any.
    fn deregister_handler(&self);
}
