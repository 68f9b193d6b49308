//! Color model shared by the batch core and the backend.

mod color;

pub use color::Color;
