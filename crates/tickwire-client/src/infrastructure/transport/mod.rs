//! Concrete transports.
//!
//! | Type                        | Receive side     | Host            |
//! |-----------------------------|------------------|-----------------|
//! | [`WsTransport`]             | blocking pull    | native process  |
//! | [`CallbackSocketTransport`] | pushed handler   | any [`HostSocket`] |
//! | `BrowserSocket`             | (a `HostSocket`) | wasm32 browser  |
//!
//! The session picks one by dependency injection; only the browser socket is
//! compiled conditionally, because `web_sys` exists only on wasm32.

pub mod callback;
pub mod mock;

#[cfg(target_arch = "wasm32")]
pub mod browser;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;

pub use callback::{CallbackSocketTransport, HostSocket};

#[cfg(target_arch = "wasm32")]
pub use browser::{connect_browser, BrowserSocket};
#[cfg(not(target_arch = "wasm32"))]
pub use native::WsTransport;
