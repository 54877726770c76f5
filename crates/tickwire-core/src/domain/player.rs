//! The player square and the position report it sends to the server.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// An integer position in logical screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The player character.  Owned by the render loop and mutated only there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub coords: Point,
}

impl Player {
    /// Creates a player at the center of a `width` x `height` screen.
    pub fn centered(width: i32, height: i32) -> Self {
        Self {
            coords: Point::new(width / 2, height / 2),
        }
    }

    /// Moves the player one pixel up the screen.
    pub fn move_up(&mut self) {
        self.coords.y -= 1;
    }
}

/// Formats the text frame sent after each move: `pos(<x>, <y>); roll: <r>`.
///
/// `r` is drawn uniformly from `[0, y)`.  At or above the top edge (`y <= 0`)
/// the range is empty and the roll is `0`.
///
/// ```rust
/// use rand::{rngs::StdRng, SeedableRng};
/// use tickwire_core::{position_report, Point};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let report = position_report(Point::new(320, 0), &mut rng);
/// assert_eq!(report, "pos(320, 0); roll: 0");
/// ```
pub fn position_report<R: Rng + ?Sized>(at: Point, rng: &mut R) -> String {
    let roll = if at.y > 0 { rng.gen_range(0..at.y) } else { 0 };
    format!("pos({}, {}); roll: {}", at.x, at.y, roll)
}
