//! Key input for the terminal host.
//!
//! | Key             | Action             |
//! |-----------------|--------------------|
//! | `Space`         | move up and report |
//! | `f` / `F`       | toggle fullscreen  |
//! | `q` / `Q`       | quit               |
//! | `Ctrl+C`        | quit               |

use std::io;
use std::time::Instant;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::application::game::InputState;

/// Folds one key event into `state`.
pub fn apply_key(state: &mut InputState, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => state.quit = true,
        KeyCode::Char('q') | KeyCode::Char('Q') => state.quit = true,
        KeyCode::Char('f') | KeyCode::Char('F') => {
            // Two presses within one tick cancel out.
            state.toggle_fullscreen = !state.toggle_fullscreen;
        }
        KeyCode::Char(' ') => state.move_up = true,
        _ => {}
    }
}

/// Polls crossterm for key events.
#[derive(Debug, Default)]
pub struct KeyInput;

impl KeyInput {
    pub fn new() -> Self {
        Self
    }

    /// Collects key events until `deadline`, which doubles as the tick pacing.
    ///
    /// # Errors
    ///
    /// Returns the terminal's I/O error.
    pub fn poll_until(&mut self, deadline: Instant) -> io::Result<InputState> {
        let mut state = InputState::default();
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() || !event::poll(left)? {
                return Ok(state);
            }
            if let Event::Key(key) = event::read()? {
                apply_key(&mut state, key);
            }
        }
    }
}
