//! Frame bridge: moves frames from a blocking transport into the inbound
//! buffer without ever blocking the render tick.
//!
//! Two drivers are available, chosen by [`BridgeMode`]:
//!
//! - **Background** (default).  One receiver thread owns the blocking
//!   `receive()` loop and feeds a bounded channel.  Each tick empties the
//!   channel with `try_recv`, so a tick costs a few lock operations at most.
//!   The channel bound gives backpressure: when the render loop falls behind,
//!   the receiver stops reading the socket instead of queueing without limit.
//!
//! - **PerTick**.  Every tick launches one [`DrainAttempt`] on its own thread
//!   with a fresh deadline.  Attempts from consecutive ticks may overlap; the
//!   buffer serializes their appends.  The number of attempts in flight is
//!   capped so a silent peer cannot pile up threads.
//!
//! In both modes the first receive failure degrades the link: nothing more is
//! drained and the render loop keeps drawing what it already has.

use std::fmt;
use std::io;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tickwire_core::{BlockingTransport, InboundBuffer, TransportError};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::sync::Semaphore;
use tracing::{debug, info, trace, warn};

use crate::application::drain::{DrainAttempt, DrainOutcome};
use crate::application::link::LinkState;
use crate::domain::BridgeMode;

/// What the receiver thread hands to the render loop.
#[derive(Debug)]
pub enum InboundEvent {
    Frame(String),
    /// Receiving stopped because of this error.  Sent at most once.
    Failed(TransportError),
}

// ── Background receiver ───────────────────────────────────────────────────────

/// The thread that owns the blocking receive loop.
#[derive(Debug)]
struct BackgroundReceiver {
    handle: JoinHandle<()>,
}

impl BackgroundReceiver {
    fn spawn(
        transport: Arc<dyn BlockingTransport>,
        events: mpsc::Sender<InboundEvent>,
    ) -> io::Result<Self> {
        let handle = thread::Builder::new()
            .name("tickwire-receiver".to_string())
            .spawn(move || receive_loop(transport.as_ref(), &events))?;
        Ok(Self { handle })
    }

    fn join(self) {
        if self.handle.join().is_err() {
            warn!("receiver thread panicked");
        }
    }
}

fn receive_loop(transport: &dyn BlockingTransport, events: &mpsc::Sender<InboundEvent>) {
    debug!("receiver thread started");
    loop {
        match transport.receive() {
            Ok(frame) => {
                trace!(len = frame.len(), "frame received");
                if events.blocking_send(InboundEvent::Frame(frame)).is_err() {
                    debug!("frame bridge gone; receiver stopping");
                    break;
                }
            }
            Err(TransportError::Closed) => {
                debug!("transport closed locally; receiver stopping");
                break;
            }
            Err(e) => {
                warn!("receive failed: {e}");
                let _ = events.blocking_send(InboundEvent::Failed(e));
                break;
            }
        }
    }
}

// ── Per-tick driver ───────────────────────────────────────────────────────────

struct PerTickDriver {
    transport: Arc<dyn BlockingTransport>,
    deadline: Duration,
    max_in_flight: usize,
    in_flight: Arc<AtomicUsize>,
    outcomes_tx: mpsc::UnboundedSender<DrainOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<DrainOutcome>,
    attempts: Vec<JoinHandle<()>>,
    launched: u64,
}

/// Decrements the in-flight count when an attempt thread finishes, panicking
/// or not.
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl PerTickDriver {
    fn launch(&mut self, inbox: &Arc<InboundBuffer>) {
        self.attempts.retain(|handle| !handle.is_finished());

        if self.in_flight.load(Ordering::Acquire) >= self.max_in_flight {
            trace!("per-tick drain skipped: {} attempts in flight", self.max_in_flight);
            return;
        }
        // A full hard-capped buffer would only turn the attempt away.  The
        // attempt still checks again, since a concurrent one may fill it.
        if inbox.rejects_new_lines() {
            trace!("per-tick drain skipped: inbound buffer at capacity");
            return;
        }

        // The deadline starts with the tick, not with the thread.
        let attempt = DrainAttempt::starting_now(self.deadline);
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let transport = Arc::clone(&self.transport);
        let inbox = Arc::clone(inbox);
        let outcomes = self.outcomes_tx.clone();

        let spawned = thread::Builder::new()
            .name("tickwire-drain".to_string())
            .spawn(move || {
                let _guard = guard;
                let outcome = attempt.run(transport.as_ref(), &inbox);
                let _ = outcomes.send(outcome);
            });

        match spawned {
            Ok(handle) => {
                self.launched += 1;
                self.attempts.push(handle);
            }
            // The closure (and its guard) was dropped, so the count is already
            // back down.
            Err(e) => warn!("failed to spawn drain attempt: {e}"),
        }
    }

    /// Collects finished attempts.  Returns the first failure, if any.
    fn collect(&mut self) -> Option<TransportError> {
        let mut failure = None;
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            match outcome {
                DrainOutcome::Failed(e) if failure.is_none() => failure = Some(e),
                other => trace!(?other, "drain attempt finished"),
            }
        }
        failure
    }

    fn join(self) {
        debug!(launched = self.launched, "joining drain attempts");
        for handle in self.attempts {
            if handle.join().is_err() {
                warn!("drain attempt thread panicked");
            }
        }
    }
}

// ── FrameBridge ───────────────────────────────────────────────────────────────

enum Driver {
    Background {
        events: mpsc::Receiver<InboundEvent>,
        receiver: BackgroundReceiver,
    },
    PerTick(PerTickDriver),
}

/// Feeds an [`InboundBuffer`] from a [`BlockingTransport`], one
/// [`FrameBridge::tick`] per render tick.
pub struct FrameBridge {
    inbox: Arc<InboundBuffer>,
    state: LinkState,
    driver: Driver,
}

impl fmt::Debug for FrameBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBridge")
            .field("mode", &self.mode())
            .field("state", &self.state)
            .field("buffered", &self.inbox.len())
            .finish()
    }
}

impl FrameBridge {
    /// Starts the background receiver thread.
    ///
    /// `channel_capacity` frames may be queued between the receiver and the
    /// render loop.  It is clamped to what a tokio channel can hold.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the receiver thread cannot be spawned.
    pub fn background(
        transport: Arc<dyn BlockingTransport>,
        inbox: Arc<InboundBuffer>,
        channel_capacity: usize,
    ) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel(channel_capacity.clamp(1, Semaphore::MAX_PERMITS));
        let receiver = BackgroundReceiver::spawn(transport, tx)?;
        info!(channel_capacity, "frame bridge started (background receiver)");

        Ok(Self {
            inbox,
            state: LinkState::Connected,
            driver: Driver::Background {
                events: rx,
                receiver,
            },
        })
    }

    /// Creates a bridge that launches one drain attempt per tick, each bound
    /// to `deadline`, with at most `max_in_flight` running at once.
    pub fn per_tick(
        transport: Arc<dyn BlockingTransport>,
        inbox: Arc<InboundBuffer>,
        deadline: Duration,
        max_in_flight: usize,
    ) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        info!(?deadline, max_in_flight, "frame bridge started (per-tick drains)");

        Self {
            inbox,
            state: LinkState::Connected,
            driver: Driver::PerTick(PerTickDriver {
                transport,
                deadline,
                max_in_flight: max_in_flight.max(1),
                in_flight: Arc::new(AtomicUsize::new(0)),
                outcomes_tx,
                outcomes_rx,
                attempts: Vec::new(),
                launched: 0,
            }),
        }
    }

    /// Which driver this bridge runs.
    pub fn mode(&self) -> BridgeMode {
        match self.driver {
            Driver::Background { .. } => BridgeMode::Background,
            Driver::PerTick(_) => BridgeMode::PerTick,
        }
    }

    /// Advances the bridge by one tick.  Never blocks on the network.
    pub fn tick(&mut self) {
        match &mut self.driver {
            Driver::Background { events, .. } => loop {
                match events.try_recv() {
                    Ok(InboundEvent::Frame(frame)) => {
                        self.inbox.push(frame);
                    }
                    Ok(InboundEvent::Failed(e)) => {
                        Self::degrade(&mut self.state, e);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if self.state.is_connected() {
                            info!("receiver finished; link closed");
                            self.state = LinkState::Closed;
                        }
                        break;
                    }
                }
            },
            Driver::PerTick(driver) => {
                if let Some(e) = driver.collect() {
                    Self::degrade(&mut self.state, e);
                }
                if self.state.is_connected() {
                    driver.launch(&self.inbox);
                }
            }
        }
    }

    fn degrade(state: &mut LinkState, error: TransportError) {
        if !state.is_connected() {
            return;
        }
        *state = match error {
            TransportError::Closed => LinkState::Closed,
            other => {
                warn!("link degraded: {other}");
                LinkState::Degraded(other.to_string())
            }
        };
    }

    pub fn state(&self) -> &LinkState {
        &self.state
    }

    pub fn inbox(&self) -> &Arc<InboundBuffer> {
        &self.inbox
    }

    /// Drain attempts currently running (always 0 in background mode).
    pub fn in_flight(&self) -> usize {
        match &self.driver {
            Driver::Background { .. } => 0,
            Driver::PerTick(driver) => driver.in_flight.load(Ordering::Acquire),
        }
    }

    /// Drain attempts started so far (always 0 in background mode).
    pub fn attempts_launched(&self) -> u64 {
        match &self.driver {
            Driver::Background { .. } => 0,
            Driver::PerTick(driver) => driver.launched,
        }
    }

    /// Stops the bridge and waits for its threads.
    ///
    /// Close the transport first: that is what wakes a receiver blocked in
    /// `receive()`.  Frames still queued in the channel are discarded.
    pub fn shutdown(self) {
        match self.driver {
            Driver::Background { events, receiver } => {
                // Unblocks a receiver stuck in `blocking_send`.
                drop(events);
                receiver.join();
            }
            Driver::PerTick(driver) => driver.join(),
        }
        debug!("frame bridge stopped");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
