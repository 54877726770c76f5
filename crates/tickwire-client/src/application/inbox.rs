//! Receive path for push-style transports.
//!
//! A [`HandlerTransport`] calls back into us once per frame from the host's
//! event loop, so there is no bridge and no deadline: the handler does the
//! capacity check and the append right there.

use std::sync::Arc;

use tickwire_core::{FrameHandler, HandlerTransport, InboundBuffer, TransportError, MESSAGE_EVENT};
use tracing::trace;

/// Builds the handler that appends each frame to `inbox`.
pub fn inbox_handler(inbox: Arc<InboundBuffer>) -> FrameHandler {
    Box::new(move |frame: String| {
        if inbox.rejects_new_lines() {
            trace!("inbound buffer at capacity; frame ignored");
            return;
        }
        inbox.push(frame);
    })
}

/// Registers [`inbox_handler`] for the message event on `transport`.
///
/// # Errors
///
/// Whatever [`HandlerTransport::register_handler`] reports, typically
/// [`TransportError::Closed`].
pub fn attach_inbox<T>(transport: &T, inbox: Arc<InboundBuffer>) -> Result<(), TransportError>
where
    T: HandlerTransport + ?Sized,
{
    transport.register_handler(MESSAGE_EVENT, inbox_handler(inbox))
}
