//! In-memory transports for tests.
//!
//! [`MockTransport`] is a scripted [`BlockingTransport`]: tests queue frames
//! or errors with [`MockTransport::push_frame`] / [`MockTransport::push_error`]
//! and a blocked `receive()` wakes up to take them, exactly like a socket
//! read.  Every `send` is recorded in [`MockTransport::sent`].
//!
//! [`MockHostSocket`] stands in for a browser `WebSocket`: it records sends
//! and lets a test play the host's event loop with
//! [`MockHostSocket::deliver`].
//!
//! ```ignore
//! let transport = Arc::new(MockTransport::new());
//! transport.push_frame("pos(320, 239); roll: 7");
//!
//! let frame = transport.receive().unwrap();
//! assert_eq!(frame, "pos(320, 239); roll: 7");
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Condvar, Mutex, MutexGuard, PoisonError,
};
use std::time::{Duration, Instant};

use tickwire_core::{BlockingTransport, FrameHandler, Transport, TransportError};

use crate::infrastructure::transport::callback::HostSocket;

// ── MockTransport ─────────────────────────────────────────────────────────────

/// A blocking transport fed from an in-memory queue.
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Every text passed to a successful `send`, in order.
    pub sent: Mutex<Vec<String>>,
    /// Number of `receive` / `receive_timeout` calls made.
    pub receive_calls: AtomicUsize,
    /// When `true`, `send` fails with an I/O error.
    pub should_fail_send: AtomicBool,
    inbound: Mutex<VecDeque<Result<String, TransportError>>>,
    arrived: Condvar,
    closed: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a frame for the next receive.
    pub fn push_frame(&self, frame: impl Into<String>) {
        self.queue().push_back(Ok(frame.into()));
        self.arrived.notify_all();
    }

    /// Queues an error for the next receive.
    pub fn push_error(&self, error: TransportError) {
        self.queue().push_back(Err(error));
        self.arrived.notify_all();
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<Result<String, TransportError>>> {
        self.inbound.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits until a scripted result is available, the transport is closed,
    /// or `deadline` passes (`None` waits forever).
    fn next(&self, deadline: Option<Instant>) -> Result<Option<String>, TransportError> {
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        let mut queue = self.queue();
        loop {
            if self.is_closed() {
                return Err(TransportError::Closed);
            }
            if let Some(next) = queue.pop_front() {
                return next.map(Some);
            }
            match deadline {
                None => {
                    queue = self
                        .arrived
                        .wait(queue)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Ok(None);
                    }
                    queue = self
                        .arrived
                        .wait_timeout(queue, left)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
            }
        }
    }
}

impl Transport for MockTransport {
    fn send(&self, text: &str) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        if self.should_fail_send.load(Ordering::SeqCst) {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock send failure",
            )));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());
        Ok(())
    }

    fn close(&self) -> Result<(), TransportError> {
        // Taking the queue lock orders the flag with any waiter's check.
        let _queue = self.queue();
        self.closed.store(true, Ordering::SeqCst);
        self.arrived.notify_all();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl BlockingTransport for MockTransport {
    fn receive(&self) -> Result<String, TransportError> {
        match self.next(None)? {
            Some(frame) => Ok(frame),
            // Unreachable without a deadline; treat as the stream ending.
            None => Err(TransportError::PeerClosed),
        }
    }

    fn receive_timeout(&self, timeout: Duration) -> Result<Option<String>, TransportError> {
        self.next(Some(Instant::now() + timeout))
    }
}

// ── MockHostSocket ────────────────────────────────────────────────────────────

/// A single-threaded host socket, like the one a browser hands out.
#[derive(Default)]
pub struct MockHostSocket {
    /// Every text passed to `send_text`.
    pub sent: RefCell<Vec<String>>,
    /// Set once `close` has been called on the socket.
    pub closed: Cell<bool>,
    /// When `true`, `send_text` fails.
    pub should_fail: Cell<bool>,
    handler: RefCell<Option<FrameHandler>>,
    /// Bumped by every `set_message_callback`, so `deliver` can tell whether
    /// the running handler was replaced or removed.
    generation: Cell<u64>,
}

impl MockHostSocket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plays one "message" event.  Returns `false` if no handler was
    /// installed to receive it.
    pub fn deliver(&self, text: &str) -> bool {
        // Take the handler out while it runs so it may touch the socket.
        let Some(mut handler) = self.handler.borrow_mut().take() else {
            return false;
        };
        let generation = self.generation.get();
        handler(text.to_string());
        // Put it back only if it is still the installed handler.
        if self.generation.get() == generation {
            *self.handler.borrow_mut() = Some(handler);
        }
        true
    }

    pub fn has_handler(&self) -> bool {
        self.handler.borrow().is_some()
    }
}

impl HostSocket for MockHostSocket {
    fn send_text(&self, text: &str) -> Result<(), TransportError> {
        if self.should_fail.get() {
            return Err(TransportError::Host("mock socket send failure".to_string()));
        }
        self.sent.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn set_message_callback(&self, handler: Option<FrameHandler>) -> Result<(), TransportError> {
        self.generation.set(self.generation.get() + 1);
        *self.handler.borrow_mut() = handler;
        Ok(())
    }

    fn close(&self) -> Result<(), TransportError> {
        self.closed.set(true);
        Ok(())
    }
}
