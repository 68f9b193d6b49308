//! Vertex batching.
//!
//! `BatchAccumulator` coalesces quads, squares, lines and polylines into as few
//! draw calls as possible. Geometry is appended by value into two fixed-capacity
//! batches (triangles, lines); a batch is flushed when the next primitive would
//! not fit, when the triangle texture changes, or at `end()`.
//!
//! Circles are drawn immediately as a line loop. They flush pending triangles first
//! but not pending lines, so a circle may appear above lines appended before it.
//!
//! GPU work goes through the [`GpuBackend`] trait; see `render::WgpuBatchBackend`
//! for the wgpu implementation.

mod accumulator;
mod backend;
mod buffer;
mod config;
mod error;
mod vertex;

#[cfg(test)]
pub(crate) mod recording;

pub use accumulator::{BatchAccumulator, FrameStats};
pub use backend::{BufferSlot, GpuBackend, ProgramKind, TextureId, TextureInfo, Topology, UsageHint};
pub use buffer::VertexBatch;
pub use config::BatchConfig;
pub use error::{BatchError, PrimitiveKind, StateViolation};
pub use vertex::{ColorVertex, TexturedVertex, Vertex};
