//! Domain entities for Tickwire.
//!
//! Pure state with no I/O.  The inbound buffer is the only type here that is
//! shared across threads, and it carries its own lock so callers never need
//! to wrap it.

/// Bounded, internally synchronized log of received lines.
pub mod inbound;

/// Player position and the outbound position report.
pub mod player;
