//! Geometry types shared by the batch core and the wgpu backend.
//!
//! Canonical CPU space:
//! - logical pixels
//! - origin bottom-left
//! - +X right, +Y up
//!
//! The backend maps this space to NDC with a viewport uniform, which matches an
//! `ortho(0, w, 0, h)` projection.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
