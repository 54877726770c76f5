//! Health of the receive side as seen by the render loop.

use std::fmt;

/// Whether frames can still arrive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Connected,
    /// Receiving failed; no further frames will be drained.  The string is
    /// the error that caused it.
    Degraded(String),
    /// The transport was closed locally.
    Closed,
}

impl LinkState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::Degraded(reason) => write!(f, "degraded: {reason}"),
            Self::Closed => f.write_str("closed"),
        }
    }
}
