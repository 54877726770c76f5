//! Browser host socket (wasm32 only).
//!
//! [`BrowserSocket`] adapts `web_sys::WebSocket` to [`HostSocket`].  The
//! message callback is a `Closure` owned by the socket: it stays alive while
//! installed and is dropped, after `onmessage` has been cleared, when the
//! handler is removed.  It is never `forget`-ed, so closing the transport
//! really frees it.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use tickwire_core::{FrameHandler, InboundBuffer, TransportError};
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{MessageEvent, WebSocket};

use crate::application::inbox::attach_inbox;
use crate::infrastructure::transport::callback::{CallbackSocketTransport, HostSocket};

type MessageClosure = Closure<dyn FnMut(MessageEvent)>;

/// A `web_sys::WebSocket` plus the closure currently set as `onmessage`.
pub struct BrowserSocket {
    socket: WebSocket,
    on_message: RefCell<Option<MessageClosure>>,
}

fn host_error(context: &str, value: JsValue) -> TransportError {
    TransportError::Host(format!("{context}: {value:?}"))
}

impl BrowserSocket {
    /// Creates the socket.  The browser connects in the background.
    ///
    /// # Errors
    ///
    /// [`TransportError::ConnectFailed`] if the browser rejects the URL.
    pub fn open(url: &str) -> Result<Self, TransportError> {
        let socket = WebSocket::new(url).map_err(|e| TransportError::ConnectFailed {
            url: url.to_string(),
            reason: format!("{e:?}"),
        })?;
        debug!(%url, "browser WebSocket created");
        Ok(Self {
            socket,
            on_message: RefCell::new(None),
        })
    }

    fn clear_callback(&self) {
        self.socket.set_onmessage(None);
        // Dropping the closure frees its JS-side function.
        self.on_message.borrow_mut().take();
    }
}

impl HostSocket for BrowserSocket {
    fn send_text(&self, text: &str) -> Result<(), TransportError> {
        self.socket
            .send_with_str(text)
            .map_err(|e| host_error("send failed", e))
    }

    fn set_message_callback(&self, handler: Option<FrameHandler>) -> Result<(), TransportError> {
        self.clear_callback();
        let Some(mut handler) = handler else {
            return Ok(());
        };

        let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
            match event.data().as_string() {
                Some(text) => handler(text),
                None => warn!("non-text message event ignored"),
            }
        }) as Box<dyn FnMut(MessageEvent)>);

        self.socket
            .set_onmessage(Some(closure.as_ref().unchecked_ref()));
        *self.on_message.borrow_mut() = Some(closure);
        Ok(())
    }

    fn close(&self) -> Result<(), TransportError> {
        self.clear_callback();
        self.socket
            .close()
            .map_err(|e| host_error("close failed", e))
    }
}

/// Opens a browser socket whose frames land in `inbox`.
///
/// # Errors
///
/// [`TransportError::ConnectFailed`] if the socket cannot be created.
pub fn connect_browser(
    url: &str,
    inbox: Arc<InboundBuffer>,
) -> Result<CallbackSocketTransport<Rc<BrowserSocket>>, TransportError> {
    let transport = CallbackSocketTransport::new(Rc::new(BrowserSocket::open(url)?));
    attach_inbox(&transport, inbox)?;
    Ok(transport)
}
