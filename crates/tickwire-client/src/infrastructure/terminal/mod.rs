//! Terminal host for the render loop.
//!
//! The game draws in logical pixels; [`CellSurface`] maps them onto a grid of
//! character cells.  [`TerminalRenderer`] puts that grid on screen with
//! crossterm and [`KeyInput`] turns key events into an
//! [`InputState`](crate::application::InputState).

pub mod mock;
pub mod surface;

#[cfg(not(target_arch = "wasm32"))]
pub mod input;
#[cfg(not(target_arch = "wasm32"))]
pub mod renderer;

pub use mock::RecordingSurface;
pub use surface::{CellSurface, CELL_HEIGHT, CELL_WIDTH};

#[cfg(not(target_arch = "wasm32"))]
pub use input::{apply_key, KeyInput};
#[cfg(not(target_arch = "wasm32"))]
pub use renderer::TerminalRenderer;
