//! Push-style transport over a host-managed socket.
//!
//! The host (a browser, or a test double) owns the socket and its event loop.
//! We only get to call `send` and to install a callback the host invokes once
//! per arriving frame.  [`HostSocket`] is that minimal surface;
//! [`CallbackSocketTransport`] turns it into a [`HandlerTransport`].
//!
//! Host callbacks are host-side resources.  The transport tracks whether one
//! is installed and releases it on [`Transport::close`] (and on drop) before
//! closing the socket, so nothing stays reachable from the host once the
//! transport is gone.

use std::cell::Cell;
use std::rc::Rc;

use tickwire_core::{FrameHandler, HandlerTransport, Transport, TransportError, MESSAGE_EVENT};
use tracing::{debug, warn};

/// The operations a host socket offers.
pub trait HostSocket {
    /// Sends one text frame without waiting for it to leave.
    fn send_text(&self, text: &str) -> Result<(), TransportError>;

    /// Installs the message callback, or removes it with `None`.  Removing
    /// must release whatever the host held for the previous callback.
    fn set_message_callback(&self, handler: Option<FrameHandler>) -> Result<(), TransportError>;

    fn close(&self) -> Result<(), TransportError>;
}

impl<S: HostSocket + ?Sized> HostSocket for Rc<S> {
    fn send_text(&self, text: &str) -> Result<(), TransportError> {
        (**self).send_text(text)
    }

    fn set_message_callback(&self, handler: Option<FrameHandler>) -> Result<(), TransportError> {
        (**self).set_message_callback(handler)
    }

    fn close(&self) -> Result<(), TransportError> {
        (**self).close()
    }
}

/// A [`HandlerTransport`] over any [`HostSocket`].
pub struct CallbackSocketTransport<S: HostSocket> {
    socket: S,
    closed: Cell<bool>,
    has_handler: Cell<bool>,
}

impl<S: HostSocket> CallbackSocketTransport<S> {
    pub fn new(socket: S) -> Self {
        Self {
            socket,
            closed: Cell::new(false),
            has_handler: Cell::new(false),
        }
    }

    pub fn socket(&self) -> &S {
        &self.socket
    }

    pub fn has_handler(&self) -> bool {
        self.has_handler.get()
    }
}

impl<S: HostSocket> Transport for CallbackSocketTransport<S> {
    fn send(&self, text: &str) -> Result<(), TransportError> {
        if self.closed.get() {
            return Err(TransportError::Closed);
        }
        self.socket.send_text(text)
    }

    fn close(&self) -> Result<(), TransportError> {
        if self.closed.replace(true) {
            return Ok(());
        }
        self.deregister_handler();
        debug!("closing host socket");
        self.socket.close()
    }

    fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl<S: HostSocket> HandlerTransport for CallbackSocketTransport<S> {
    fn register_handler(&self, event: &str, handler: FrameHandler) -> Result<(), TransportError> {
        if event != MESSAGE_EVENT {
            return Err(TransportError::UnsupportedEvent(event.to_string()));
        }
        if self.closed.get() {
            return Err(TransportError::Closed);
        }
        self.socket.set_message_callback(Some(handler))?;
        self.has_handler.set(true);
        Ok(())
    }

    fn deregister_handler(&self) {
        if !self.has_handler.replace(false) {
            return;
        }
        if let Err(e) = self.socket.set_message_callback(None) {
            warn!("failed to release message callback: {e}");
        }
    }
}

impl<S: HostSocket> Drop for CallbackSocketTransport<S> {
    fn drop(&mut self) {
        if let Err(e) = Transport::close(self) {
            warn!("error closing host socket on drop: {e}");
        }
    }
}
