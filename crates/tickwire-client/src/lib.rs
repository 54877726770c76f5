//! # tickwire-client
//!
//! A fixed-tick client that sends the player's position over a WebSocket on
//! every move and shows the echoed lines on screen.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────── render loop (main thread, fixed tick) ────────────┐
//!  │  KeyInput ──► Session::step ──► Game::update ──► Transport::send
//!  │                    │                                          │
//!  │                    ▼                                          │
//!  │              FrameBridge::tick ◄── bounded channel ◄─┐        │
//!  │                    │                                 │        │
//!  │                    ▼                                 │        │
//!  │              InboundBuffer ──► Game::draw ──► Surface │        │
//!  └──────────────────────────────────────────────────────┼────────┘
//!                                                         │
//!                      receiver thread: BlockingTransport::receive()
//! ```
//!
//! The render loop never blocks on the network.  On the browser host the
//! socket pushes frames through a registered handler instead, so no bridge is
//! needed there (see [`application::attach_inbox`]).
//!
//! - **`domain`** – [`domain::ClientConfig`] and its TOML loading.
//! - **`application`** – The drain attempt, the frame bridge, the game and
//!   the session that ties them together.
//! - **`infrastructure`** – The native and browser transports, the terminal
//!   surface and key input.

pub mod application;
pub mod domain;
pub mod infrastructure;
