//! Dots engine crate.
//!
//! A small immediate-mode 2D batch renderer: games append squares, textured
//! quads, lines and circles each frame and the accumulator turns them into as
//! few draw calls as capacity and texture changes allow.
//!
//! Coordinates are logical pixels with the origin at the bottom-left and +Y up.

pub mod batch;
pub mod coords;
pub mod core;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod time;
pub mod window;
