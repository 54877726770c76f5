//! The render loop's state machine: one [`Game::update`] and one
//! [`Game::draw`] per tick.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tickwire_core::{position_report, InboundBuffer, Player, Transport};
use tracing::{debug, info, warn};

use crate::application::link::LinkState;

/// Vertical distance between two buffered lines, in logical pixels.
pub const LINE_HEIGHT: i32 = 14;

/// Side length of the player square, in logical pixels.
pub const PLAYER_SIZE: i32 = 20;

const HELP_TEXT: &str = "space: move   f: fullscreen   q: quit";

/// The two drawing primitives the game needs.
pub trait Surface {
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn draw_text(&mut self, text: &str, x: i32, y: i32);
}

/// Keys seen since the previous tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub quit: bool,
    pub toggle_fullscreen: bool,
    pub move_up: bool,
}

/// Whether the render loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Quit,
}

/// Player, buffered lines, and the transport position reports go out on.
pub struct Game<T: Transport + ?Sized> {
    width: i32,
    height: i32,
    player: Player,
    inbox: Arc<InboundBuffer>,
    transport: Arc<T>,
    rng: StdRng,
    fullscreen: bool,
    link: LinkState,
    send_failures: u64,
}

impl<T: Transport + ?Sized> Game<T> {
    /// Creates a game with the player centered and an entropy-seeded roll.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(width: i32, height: i32, inbox: Arc<InboundBuffer>, transport: Arc<T>) -> Self {
        Self::with_rng(width, height, inbox, transport, StdRng::from_entropy())
    }

    /// Creates a game whose rolls are reproducible.
    pub fn with_seed(
        width: i32,
        height: i32,
        inbox: Arc<InboundBuffer>,
        transport: Arc<T>,
        seed: u64,
    ) -> Self {
        Self::with_rng(width, height, inbox, transport, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        width: i32,
        height: i32,
        inbox: Arc<InboundBuffer>,
        transport: Arc<T>,
        rng: StdRng,
    ) -> Self {
        Self {
            width,
            height,
            player: Player::centered(width, height),
            inbox,
            transport,
            rng,
            fullscreen: false,
            link: LinkState::Connected,
            send_failures: 0,
        }
    }

    /// Applies one tick of input.
    ///
    /// A move sends a position report for the new position.  If the send
    /// fails the move is not applied; the session carries on.
    pub fn update(&mut self, input: InputState) -> TickOutcome {
        if input.quit {
            info!("quit requested");
            return TickOutcome::Quit;
        }

        if input.toggle_fullscreen {
            self.fullscreen = !self.fullscreen;
            debug!(fullscreen = self.fullscreen, "fullscreen toggled");
        }

        if input.move_up {
            let mut moved = self.player.clone();
            moved.move_up();
            let report = position_report(moved.coords, &mut self.rng);
            match self.transport.send(&report) {
                Ok(()) => {
                    debug!(%report, "position sent");
                    self.player = moved;
                }
                Err(e) => {
                    self.send_failures += 1;
                    warn!("send failed, move skipped: {e}");
                }
            }
        }

        TickOutcome::Continue
    }

    /// Paints the player, the buffered lines and any status text.
    ///
    /// Lines stack bottom-up in arrival order: the oldest sits on the bottom
    /// edge.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        let at = self.player.coords;
        surface.fill_rect(at.x, at.y, PLAYER_SIZE, PLAYER_SIZE);

        for (k, line) in self.inbox.snapshot().iter().enumerate() {
            let row = i32::try_from(k + 1).unwrap_or(i32::MAX);
            let y = self.height.saturating_sub(row.saturating_mul(LINE_HEIGHT));
            surface.draw_text(line, 0, y);
        }

        let mut status_y = 0;
        if !self.fullscreen {
            surface.draw_text(HELP_TEXT, 0, status_y);
            status_y += LINE_HEIGHT;
        }
        if !self.link.is_connected() {
            surface.draw_text(&format!("link {}", self.link), 0, status_y);
        }
    }

    pub fn set_link(&mut self, link: LinkState) {
        if link != self.link {
            debug!(%link, "link state changed");
            self.link = link;
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn link(&self) -> &LinkState {
        &self.link
    }

    /// Sends that failed since the game started.
    pub fn send_failures(&self) -> u64 {
        self.send_failures
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::terminal::mock::RecordingSurface;
    use crate::infrastructure::transport::mock::MockTransport;
    use tickwire_core::Point;

    fn game_with(transport: Arc<MockTransport>, inbox: Arc<InboundBuffer>) -> Game<MockTransport> {
        Game::with_seed(640, 480, inbox, transport, 7)
    }

    const MOVE: InputState = InputState {
        quit: false,
        toggle_fullscreen: false,
        move_up: true,
    };

    #[test]
    fn test_move_sends_report_for_new_position() {
        // Arrange
        let transport = Arc::new(MockTransport::new());
        let mut game = game_with(Arc::clone(&transport), Arc::default());

        // Act
        let outcome = game.update(MOVE);

        // Assert
        assert_eq!(outcome, TickOutcome::Continue);
        assert_eq!(game.player().coords, Point::new(320, 239));
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("pos(320, 239); roll: "), "got {}", sent[0]);
    }

    #[test]
    fn test_roll_stays_below_y() {
        let transport = Arc::new(MockTransport::new());
        let mut game = game_with(Arc::clone(&transport), Arc::default());

        for _ in 0..50 {
            game.update(MOVE);
        }

        for (i, report) in transport.sent.lock().unwrap().iter().enumerate() {
            let y = 239 - i as i32;
            let roll: i32 = report.rsplit(' ').next().unwrap().parse().unwrap();
            assert!((0..y).contains(&roll), "roll {roll} outside [0, {y})");
        }
    }

    #[test]
    fn test_failed_send_skips_move_and_keeps_running() {
        // Arrange
        let transport = Arc::new(MockTransport::new());
        transport
            .should_fail_send
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let mut game = game_with(Arc::clone(&transport), Arc::default());

        // Act
        let outcome = game.update(MOVE);

        // Assert
        assert_eq!(outcome, TickOutcome::Continue);
        assert_eq!(game.player().coords, Point::new(320, 240));
        assert_eq!(game.send_failures(), 1);
    }

    #[test]
    fn test_send_after_close_is_an_error_not_a_crash() {
        let transport = Arc::new(MockTransport::new());
        transport.close().unwrap();
        let mut game = game_with(Arc::clone(&transport), Arc::default());

        assert_eq!(game.update(MOVE), TickOutcome::Continue);
        assert_eq!(game.send_failures(), 1);
    }

    #[test]
    fn test_quit_ends_without_sending() {
        let transport = Arc::new(MockTransport::new());
        let mut game = game_with(Arc::clone(&transport), Arc::default());

        let outcome = game.update(InputState {
            quit: true,
            move_up: true,
            ..InputState::default()
        });

        assert_eq!(outcome, TickOutcome::Quit);
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_fullscreen_toggles_and_hides_help() {
        // Arrange
        let mut game = game_with(Arc::new(MockTransport::new()), Arc::default());
        let toggle = InputState {
            toggle_fullscreen: true,
            ..InputState::default()
        };

        // Act
        game.update(toggle);
        let mut surface = RecordingSurface::default();
        game.draw(&mut surface);

        // Assert
        assert!(game.is_fullscreen());
        assert!(surface.texts.iter().all(|(text, _, _)| text != HELP_TEXT));

        game.update(toggle);
        assert!(!game.is_fullscreen());
    }

    #[test]
    fn test_draw_stacks_lines_bottom_up_oldest_first() {
        // Arrange
        let inbox = Arc::new(InboundBuffer::default());
        inbox.push("first");
        inbox.push("second");
        inbox.push("third");
        let game = game_with(Arc::new(MockTransport::new()), inbox);
        let mut surface = RecordingSurface::default();

        // Act
        game.draw(&mut surface);

        // Assert
        assert_eq!(surface.rects, vec![(320, 240, PLAYER_SIZE, PLAYER_SIZE)]);
        assert!(surface.texts.contains(&("first".to_string(), 0, 466)));
        assert!(surface.texts.contains(&("second".to_string(), 0, 452)));
        assert!(surface.texts.contains(&("third".to_string(), 0, 438)));
    }

    #[test]
    fn test_degraded_link_is_shown() {
        let mut game = game_with(Arc::new(MockTransport::new()), Arc::default());
        game.set_link(LinkState::Degraded("connection closed by peer".to_string()));
        let mut surface = RecordingSurface::default();

        game.draw(&mut surface);

        assert!(surface
            .texts
            .iter()
            .any(|(text, _, _)| text == "link degraded: connection closed by peer"));
    }
}
