//! Application layer: everything between a transport and a drawing surface.
//!
//! - [`drain`] – one deadline-bound attempt to move a frame into the buffer.
//! - [`frame_bridge`] – feeds the buffer from a blocking transport without
//!   stalling the render loop.
//! - [`inbox`] – the handler installed on push-style transports.
//! - [`link`] – connected / degraded state shown by the render loop.
//! - [`game`] – player input, position reports, and the per-tick draw.
//! - [`session`] – owns one connected transport plus the pieces above.

pub mod drain;
pub mod game;
pub mod inbox;
pub mod link;

#[cfg(not(target_arch = "wasm32"))]
pub mod frame_bridge;
#[cfg(not(target_arch = "wasm32"))]
pub mod session;

pub use drain::{DrainAttempt, DrainOutcome};
pub use game::{Game, InputState, Surface, TickOutcome, LINE_HEIGHT, PLAYER_SIZE};
pub use inbox::{attach_inbox, inbox_handler};
pub use link::LinkState;

#[cfg(not(target_arch = "wasm32"))]
pub use frame_bridge::FrameBridge;
#[cfg(not(target_arch = "wasm32"))]
pub use session::{Session, SessionError};
