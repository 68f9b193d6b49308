//! Contract between the runtime loop and the game.
//!
//! The runtime owns the window, GPU and renderer; a game only sees them through
//! `FrameCtx` once per redraw.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
