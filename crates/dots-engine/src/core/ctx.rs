use winit::window::Window;

use crate::batch::BatchError;
use crate::coords::Viewport;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::paint::Color;
use crate::render::{RenderTarget, Renderer};
use crate::time::FrameTime;

use super::app::AppControl;

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub renderer: &'a mut Renderer,
    pub time: FrameTime,
    /// Frames presented during the last full second.
    pub fps: u32,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Window size in logical pixels; the coordinate space draws are given in.
    pub fn viewport(&self) -> Viewport {
        let size = self.window.inner_size();
        Viewport::from_physical(size.width, size.height, self.window.scale_factor())
    }

    /// Clears the surface with `clear`, runs `draw` between `begin()` and `end()`,
    /// then presents the frame.
    ///
    /// If `draw` (or the bracket itself) fails, the pending vertices are dropped,
    /// the error is logged and only the cleared frame is presented.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> AppControl
    where
        F: FnOnce(&mut Renderer) -> Result<(), BatchError>,
    {
        let viewport = self.viewport();

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface is out of memory; exiting");
                        AppControl::Exit
                    }
                    _ => AppControl::Continue,
                };
            }
        };

        let clear = if self.gpu.surface_format().is_srgb() {
            clear.to_linear()
        } else {
            clear
        };

        // Clear pass, dropped before the batch pass borrows the encoder.
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("dots clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        match record(self.renderer, draw) {
            Ok(()) => {
                let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
                self.renderer.backend_mut().encode(&mut target, viewport);
            }
            Err(err) => {
                log::error!("frame aborted: {err}");
                self.renderer.abort_frame();
                self.renderer.backend_mut().discard_frame();
            }
        }

        self.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}

fn record<F>(renderer: &mut Renderer, draw: F) -> Result<(), BatchError>
where
    F: FnOnce(&mut Renderer) -> Result<(), BatchError>,
{
    renderer.begin()?;
    draw(renderer)?;
    renderer.end()
}
