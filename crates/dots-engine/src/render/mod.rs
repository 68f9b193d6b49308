//! wgpu implementation of the batch backend.
//!
//! Convention:
//! - CPU geometry is in logical pixels, bottom-left origin, +Y up.
//! - The vertex shader converts to NDC using a viewport uniform.
//! - Texture coordinate `t = 0` is the bottom row of the image.

mod batch_backend;
mod staging;
mod target;

pub use batch_backend::WgpuBatchBackend;
pub use target::RenderTarget;

use crate::batch::BatchAccumulator;

/// Batch accumulator driving the wgpu backend.
pub type Renderer = BatchAccumulator<WgpuBatchBackend>;
