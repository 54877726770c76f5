//! One deadline-bound attempt to move a frame from a blocking transport into
//! the inbound buffer.
//!
//! The attempt checks, in order:
//!
//! 1. the deadline has passed: give up without touching the transport;
//! 2. the buffer would reject the line anyway: give up without reading;
//! 3. otherwise receive once, bounded by whatever is left of the deadline.

use std::time::{Duration, Instant};

use tickwire_core::{BlockingTransport, InboundBuffer, PushOutcome, TransportError};
use tracing::{debug, trace};

/// What a single [`DrainAttempt::run`] did.
#[derive(Debug)]
pub enum DrainOutcome {
    /// The deadline had already passed; no receive was issued.
    DeadlineElapsed,
    /// The buffer was full (or filled up while receiving); nothing appended.
    AtCapacity,
    /// One frame was appended.
    Appended,
    /// The receive timed out at the deadline without a frame.
    Idle,
    /// The transport failed.  The caller decides whether to keep draining.
    Failed(TransportError),
}

/// A drain attempt bound to one tick's deadline.
#[derive(Debug, Clone, Copy)]
pub struct DrainAttempt {
    deadline: Instant,
}

impl DrainAttempt {
    pub fn new(deadline: Instant) -> Self {
        Self { deadline }
    }

    /// Deadline `budget` from now.
    pub fn starting_now(budget: Duration) -> Self {
        Self::new(Instant::now() + budget)
    }

    /// Runs the attempt against `transport`, appending into `inbox`.
    pub fn run<T>(&self, transport: &T, inbox: &InboundBuffer) -> DrainOutcome
    where
        T: BlockingTransport + ?Sized,
    {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            trace!("drain skipped: deadline elapsed");
            return DrainOutcome::DeadlineElapsed;
        }

        if inbox.rejects_new_lines() {
            trace!("drain skipped: inbound buffer at capacity");
            return DrainOutcome::AtCapacity;
        }

        match transport.receive_timeout(remaining) {
            Ok(Some(frame)) => match inbox.push(frame) {
                PushOutcome::Appended | PushOutcome::Evicted(_) => DrainOutcome::Appended,
                // Another writer filled the buffer while this one was reading.
                PushOutcome::Dropped => DrainOutcome::AtCapacity,
            },
            Ok(None) => DrainOutcome::Idle,
            Err(e) => {
                debug!("drain attempt failed: {e}");
                DrainOutcome::Failed(e)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
