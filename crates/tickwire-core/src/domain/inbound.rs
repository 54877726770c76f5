//! Bounded log of lines received from the server.
//!
//! The [`InboundBuffer`] sits between the network side (a background receiver
//! thread, per-tick drain attempts, or a browser message callback) and the
//! render loop, which reads a snapshot once per frame.  Writers and the reader
//! run on different execution contexts, so every operation takes the internal
//! lock for the shortest possible time.
//!
//! # Overflow
//!
//! The buffer never holds more than `capacity` lines.  What happens to a line
//! that arrives when the buffer is full is decided by [`OverflowPolicy`]:
//!
//! ```text
//! DropNewest  (default)   [1 2 3 ... 25] + 26  →  [1 2 3 ... 25]      26 dropped
//! EvictOldest             [1 2 3 ... 25] + 26  →  [2 3 4 ... 26]      1 evicted
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Number of lines kept when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 25;

/// What to do with a line that arrives while the buffer is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Hard ceiling: the new line is discarded and the buffer is unchanged.
    #[default]
    DropNewest,
    /// Sliding window: the oldest line is removed to make room.
    EvictOldest,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DropNewest => f.write_str("drop-newest"),
            Self::EvictOldest => f.write_str("evict-oldest"),
        }
    }
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop-newest" => Ok(Self::DropNewest),
            "evict-oldest" => Ok(Self::EvictOldest),
            other => Err(format!(
                "unknown overflow policy '{other}' (expected 'drop-newest' or 'evict-oldest')"
            )),
        }
    }
}

/// Result of a single [`InboundBuffer::push`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The line was appended.
    Appended,
    /// The buffer was full and the line was discarded.
    Dropped,
    /// The line was appended after removing the returned oldest line.
    Evicted(String),
}

#[derive(Debug, Default)]
struct Lines {
    lines: VecDeque<String>,
    dropped: u64,
    evicted: u64,
}

/// A capacity-bounded, arrival-ordered list of text lines.
///
/// Share it with `Arc<InboundBuffer>`; all methods take `&self`.
///
/// # Example
///
/// ```rust
/// use tickwire_core::{InboundBuffer, OverflowPolicy, PushOutcome};
///
/// let buffer = InboundBuffer::new(2, OverflowPolicy::DropNewest);
/// buffer.push("a");
/// buffer.push("b");
/// assert_eq!(buffer.push("c"), PushOutcome::Dropped);
/// assert_eq!(buffer.snapshot(), vec!["a".to_string(), "b".to_string()]);
/// ```
#[derive(Debug)]
pub struct InboundBuffer {
    capacity: usize,
    policy: OverflowPolicy,
    inner: Mutex<Lines>,
}

impl InboundBuffer {
    /// Creates an empty buffer holding at most `capacity` lines.
    ///
    /// Storage grows with the lines actually kept; only a default-sized
    /// block is reserved up front, whatever `capacity` says.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            capacity,
            policy,
            inner: Mutex::new(Lines {
                lines: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
                ..Lines::default()
            }),
        }
    }

    /// Creates an empty hard-capped buffer of `capacity` lines.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, OverflowPolicy::DropNewest)
    }

    /// Appends `line`, applying the overflow policy when full.
    pub fn push(&self, line: impl Into<String>) -> PushOutcome {
        let mut inner = self.lock();

        if inner.lines.len() < self.capacity {
            inner.lines.push_back(line.into());
            return PushOutcome::Appended;
        }

        match self.policy {
            OverflowPolicy::DropNewest => {
                inner.dropped += 1;
                trace!(dropped = inner.dropped, "inbound buffer full; line dropped");
                PushOutcome::Dropped
            }
            OverflowPolicy::EvictOldest => match inner.lines.pop_front() {
                Some(oldest) => {
                    inner.lines.push_back(line.into());
                    inner.evicted += 1;
                    PushOutcome::Evicted(oldest)
                }
                // Zero capacity: nothing to evict and nowhere to put the line.
                None => {
                    inner.dropped += 1;
                    PushOutcome::Dropped
                }
            },
        }
    }

    /// Returns `true` when a [`OverflowPolicy::DropNewest`] buffer would
    /// discard the next line.
    ///
    /// Drain attempts use this to skip a receive entirely.  A sliding-window
    /// buffer is never "full" in that sense because it always admits the line.
    pub fn rejects_new_lines(&self) -> bool {
        self.policy == OverflowPolicy::DropNewest && self.is_full()
    }

    /// Returns `true` when the buffer holds `capacity` lines.
    pub fn is_full(&self) -> bool {
        self.lock().lines.len() >= self.capacity
    }

    /// Number of lines currently held.
    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    /// Returns `true` when no line has been kept yet.
    pub fn is_empty(&self) -> bool {
        self.lock().lines.is_empty()
    }

    /// Maximum number of lines.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Overflow policy the buffer was created with.
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Lines discarded because the buffer was full.
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }

    /// Lines removed to make room under [`OverflowPolicy::EvictOldest`].
    pub fn evicted(&self) -> u64 {
        self.lock().evicted
    }

    /// Copies the current lines, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().lines.iter().cloned().collect()
    }

    // A writer that panicked mid-push cannot leave the deque half-updated,
    // so a poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Lines> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InboundBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
