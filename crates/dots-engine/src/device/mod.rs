//! wgpu device and surface ownership.
//!
//! - creates the Instance/Adapter/Device/Queue for a window
//! - configures the surface and keeps it in sync with resizes
//! - hands out one `GpuFrame` (texture + view + encoder) per redraw

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame, SurfaceErrorAction};
pub use init::GpuInit;
