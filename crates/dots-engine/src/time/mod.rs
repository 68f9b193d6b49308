//! Frame timing.
//!
//! `FrameClock` produces clamped per-frame deltas; `FpsCounter` reports a frame
//! rate once per elapsed second. Neither schedules anything.

mod fps;
mod frame_clock;

pub use fps::FpsCounter;
pub use frame_clock::{FrameClock, FrameTime};
