use crate::coords::{Rect, Vec2};
use crate::paint::Color;

use super::config::{circle_vertex_count, LINE_VERTICES, QUAD_VERTICES};
use super::{
    BatchConfig, BatchError, BufferSlot, ColorVertex, GpuBackend, PrimitiveKind, ProgramKind,
    StateViolation, TextureId, TextureInfo, TexturedVertex, Topology, UsageHint, Vertex,
    VertexBatch,
};

/// Draw-call counters for the current (or last finished) frame.
///
/// Reset by `begin()`; left untouched by `end()` so they can be read afterwards.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub triangle_draws: u32,
    pub line_draws: u32,
    pub loop_draws: u32,
    pub vertices: u64,
}

impl FrameStats {
    #[inline]
    pub fn draw_calls(&self) -> u32 {
        self.triangle_draws + self.line_draws + self.loop_draws
    }
}

/// Immediate-mode batch renderer core.
///
/// Usage per frame:
///
/// ```ignore
/// batch.begin()?;
/// batch.append_square(Vec2::new(100.0, 100.0), 20.0, 20.0, Color::RED)?;
/// batch.append_line(Vec2::new(0.0, 0.0), Vec2::new(50.0, 50.0), Color::WHITE)?;
/// batch.end()?;
/// ```
///
/// Appends are only valid between `begin` and `end`. Each batch is flushed before
/// an append that would overflow it, so no vertex is ever dropped and the backing
/// storage is never written past its capacity.
pub struct BatchAccumulator<B: GpuBackend> {
    backend: B,
    config: BatchConfig,

    triangles: VertexBatch<TexturedVertex>,
    lines: VertexBatch<ColorVertex>,
    immediate: Vec<ColorVertex>,

    /// Texture used by the next `append_quad`.
    bound_texture: Option<TextureId>,
    /// Texture of the vertices currently in `triangles`.
    batch_texture: Option<TextureId>,

    drawing: bool,
    stats: FrameStats,
    allocated: bool,
}

impl<B: GpuBackend> BatchAccumulator<B> {
    /// Validates `config` and allocates the three vertex buffers on `backend`.
    pub fn new(config: BatchConfig, mut backend: B) -> Result<Self, BatchError> {
        config.validate()?;

        let sizes = [
            (BufferSlot::Triangles, config.triangle_capacity as u64 * TexturedVertex::STRIDE),
            (BufferSlot::Lines, config.line_capacity as u64 * ColorVertex::STRIDE),
            (BufferSlot::Immediate, config.immediate_capacity as u64 * ColorVertex::STRIDE),
        ];
        for (slot, size) in sizes {
            log::debug!("allocating {slot:?} vertex buffer ({size} bytes)");
            backend.allocate(slot, size, UsageHint::Stream);
        }

        log::info!(
            "batch renderer ready: {} triangle / {} line / {} loop vertices",
            config.triangle_capacity,
            config.line_capacity,
            config.immediate_capacity
        );

        Ok(Self {
            backend,
            triangles: VertexBatch::new(config.triangle_capacity),
            lines: VertexBatch::new(config.line_capacity),
            immediate: Vec::with_capacity(config.immediate_capacity),
            config,
            bound_texture: None,
            batch_texture: None,
            drawing: false,
            stats: FrameStats::default(),
            allocated: true,
        })
    }

    #[inline]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    #[inline]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Opens a frame. Fails once the renderer has been disposed.
    pub fn begin(&mut self) -> Result<(), BatchError> {
        if !self.allocated {
            return Err(BatchError::InvalidState(StateViolation::Disposed));
        }
        if self.drawing {
            return Err(BatchError::InvalidState(StateViolation::AlreadyDrawing));
        }
        self.triangles.clear();
        self.lines.clear();
        self.stats = FrameStats::default();
        self.drawing = true;
        Ok(())
    }

    /// Closes the frame, flushing whatever is still batched.
    pub fn end(&mut self) -> Result<(), BatchError> {
        if !self.drawing {
            return Err(BatchError::InvalidState(StateViolation::NotDrawing));
        }
        self.flush();
        self.flush_lines();
        self.drawing = false;
        log::trace!("frame ended: {:?}", self.stats);
        Ok(())
    }

    /// Drops pending vertices without drawing them and closes the frame.
    pub fn abort_frame(&mut self) {
        self.triangles.clear();
        self.lines.clear();
        self.drawing = false;
    }

    /// Sets the texture sampled by subsequent `append_quad` calls.
    ///
    /// `None` selects the backend's white texel. Binding alone never flushes; the
    /// next quad with a different texture does.
    #[inline]
    pub fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.bound_texture = texture;
    }

    /// Appends a textured quad from `p1` (bottom-left) to `p2` (top-right).
    ///
    /// `uv1` / `uv2` are the texture coordinates at `p1` / `p2`.
    pub fn append_quad(
        &mut self,
        p1: Vec2,
        p2: Vec2,
        uv1: Vec2,
        uv2: Vec2,
        color: Color,
    ) -> Result<(), BatchError> {
        self.ensure_drawing()?;
        let vertices = quad_vertices(p1, p2, uv1, uv2, color);
        self.push_triangles(self.bound_texture, &vertices)
    }

    /// Appends an untextured axis-aligned rectangle centered on `center`.
    pub fn append_square(
        &mut self,
        center: Vec2,
        width: f32,
        height: f32,
        color: Color,
    ) -> Result<(), BatchError> {
        self.ensure_drawing()?;
        let r = Rect::from_center(center, width, height);
        let vertices = quad_vertices(r.min(), r.max(), Vec2::zero(), Vec2::zero(), color);
        self.push_triangles(None, &vertices)
    }

    /// Draws the whole texture with its bottom-left corner at `pos`.
    ///
    /// Binds `texture` for subsequent quads.
    pub fn draw_texture(
        &mut self,
        texture: &TextureInfo,
        pos: Vec2,
        color: Color,
    ) -> Result<(), BatchError> {
        let size = Vec2::new(texture.width as f32, texture.height as f32);
        self.bind_texture(Some(texture.id));
        self.append_quad(pos, pos + size, Vec2::zero(), Vec2::new(1.0, 1.0), color)
    }

    /// Draws the pixel sub-rectangle `region` of `texture` at `pos`, unscaled.
    ///
    /// Binds `texture` for subsequent quads. An empty region draws nothing.
    pub fn draw_texture_region(
        &mut self,
        texture: &TextureInfo,
        pos: Vec2,
        region: Rect,
        color: Color,
    ) -> Result<(), BatchError> {
        self.ensure_drawing()?;
        self.bind_texture(Some(texture.id));
        if region.is_empty() {
            return Ok(());
        }
        let extent = Vec2::new(texture.width as f32, texture.height as f32);
        let uv = region.scaled_into(extent);
        self.append_quad(pos, pos + region.size, uv.min(), uv.max(), color)
    }

    /// Appends one line segment to the line batch.
    pub fn append_line(&mut self, p1: Vec2, p2: Vec2, color: Color) -> Result<(), BatchError> {
        self.ensure_drawing()?;
        self.push_line(p1, p2, color)
    }

    /// Appends `points.len() - 1` connected segments. Fewer than two points draw nothing.
    pub fn append_polyline(&mut self, points: &[Vec2], color: Color) -> Result<(), BatchError> {
        self.ensure_drawing()?;
        for pair in points.windows(2) {
            self.push_line(pair[0], pair[1], color)?;
        }
        Ok(())
    }

    /// Draws a circle outline with the configured angular step.
    pub fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) -> Result<(), BatchError> {
        self.append_circle(center, radius, color, self.config.circle_step)
    }

    /// Draws a circle outline as one immediate line-loop call.
    ///
    /// Emits `center + radius * (cos θ, sin θ)` for `θ = k * angular_step` below 2π.
    /// Pending triangles are flushed first; pending lines are not, so they may end
    /// up drawn after (above) this circle.
    pub fn append_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        color: Color,
        angular_step: f32,
    ) -> Result<(), BatchError> {
        self.ensure_drawing()?;

        let capacity = self.config.immediate_capacity;
        let count = match circle_vertex_count(angular_step) {
            Some(n) if n <= capacity => n,
            other => {
                return Err(BatchError::CapacityExceeded {
                    kind: PrimitiveKind::LineLoop,
                    required: other.unwrap_or(usize::MAX),
                    capacity,
                });
            }
        };

        if !self.triangles.is_empty() {
            self.flush();
        }

        self.immediate.clear();
        self.immediate.extend((0..count).map(|k| {
            let theta = k as f32 * angular_step;
            ColorVertex::new(center.on_circle(radius, theta), color)
        }));

        self.backend.bind_program(ProgramKind::Colored);
        self.backend.bind(BufferSlot::Immediate);
        self.backend
            .upload(BufferSlot::Immediate, 0, bytemuck::cast_slice(&self.immediate));
        self.backend.draw(Topology::LineLoop, 0, count as u32);

        self.stats.loop_draws += 1;
        self.stats.vertices += count as u64;
        log::trace!("line loop: {count} vertices");
        Ok(())
    }

    /// Submits the triangle batch, if any, and empties it.
    pub fn flush(&mut self) {
        if self.triangles.is_empty() || !self.allocated {
            return;
        }
        let count = self.triangles.len();

        self.backend.bind_program(ProgramKind::Textured);
        self.backend.bind_texture(self.batch_texture);
        self.backend.bind(BufferSlot::Triangles);
        self.backend.upload(BufferSlot::Triangles, 0, self.triangles.as_bytes());
        self.backend.draw(Topology::TriangleList, 0, count as u32);

        self.stats.triangle_draws += 1;
        self.stats.vertices += count as u64;
        log::trace!("flushed {count} triangle vertices");

        self.triangles.clear();
    }

    /// Submits the line batch, if any, and empties it.
    pub fn flush_lines(&mut self) {
        if self.lines.is_empty() || !self.allocated {
            return;
        }
        let count = self.lines.len();

        self.backend.bind_program(ProgramKind::Colored);
        self.backend.bind(BufferSlot::Lines);
        self.backend.upload(BufferSlot::Lines, 0, self.lines.as_bytes());
        self.backend.draw(Topology::LineList, 0, count as u32);

        self.stats.line_draws += 1;
        self.stats.vertices += count as u64;
        log::trace!("flushed {count} line vertices");

        self.lines.clear();
    }

    /// Releases the backend buffers. Safe to call more than once; also runs on drop.
    pub fn dispose(&mut self) {
        if !self.allocated {
            return;
        }
        for slot in BufferSlot::ALL {
            self.backend.delete(slot);
        }
        self.triangles.clear();
        self.lines.clear();
        self.allocated = false;
        self.drawing = false;
        log::info!("batch renderer disposed");
    }

    // ── private helpers ────────────────────────────────────────────────────

    #[inline]
    fn ensure_drawing(&self) -> Result<(), BatchError> {
        if self.drawing {
            Ok(())
        } else {
            Err(BatchError::InvalidState(StateViolation::NotDrawing))
        }
    }

    fn push_triangles(
        &mut self,
        texture: Option<TextureId>,
        vertices: &[TexturedVertex; QUAD_VERTICES],
    ) -> Result<(), BatchError> {
        if !self.triangles.is_empty() && self.batch_texture != texture {
            self.flush();
        }
        if !self.triangles.fits(vertices.len()) {
            self.flush();
        }
        self.batch_texture = texture;

        let capacity = self.triangles.capacity();
        self.triangles
            .push_slice(vertices)
            .map_err(|_| BatchError::CapacityExceeded {
                kind: PrimitiveKind::Triangles,
                required: QUAD_VERTICES,
                capacity,
            })
    }

    fn push_line(&mut self, p1: Vec2, p2: Vec2, color: Color) -> Result<(), BatchError> {
        if !self.lines.fits(LINE_VERTICES) {
            self.flush_lines();
        }

        let capacity = self.lines.capacity();
        self.lines
            .push_slice(&[ColorVertex::new(p1, color), ColorVertex::new(p2, color)])
            .map_err(|_| BatchError::CapacityExceeded {
                kind: PrimitiveKind::Lines,
                required: LINE_VERTICES,
                capacity,
            })
    }
}

impl<B: GpuBackend> Drop for BatchAccumulator<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Two counter-clockwise triangles: BL, TL, TR / BL, TR, BR.
fn quad_vertices(
    p1: Vec2,
    p2: Vec2,
    uv1: Vec2,
    uv2: Vec2,
    color: Color,
) -> [TexturedVertex; QUAD_VERTICES] {
    let bl = TexturedVertex::new(p1, color, uv1);
    let tl = TexturedVertex::new(Vec2::new(p1.x, p2.y), color, Vec2::new(uv1.x, uv2.y));
    let tr = TexturedVertex::new(p2, color, uv2);
    let br = TexturedVertex::new(Vec2::new(p2.x, p1.y), color, Vec2::new(uv2.x, uv1.y));
    [bl, tl, tr, bl, tr, br]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::recording::{Call, RecordingBackend};
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    fn accumulator(config: BatchConfig) -> BatchAccumulator<RecordingBackend> {
        BatchAccumulator::new(config, RecordingBackend::default()).unwrap()
    }

    fn small() -> BatchAccumulator<RecordingBackend> {
        accumulator(BatchConfig {
            triangle_capacity: 12,
            line_capacity: 4,
            ..BatchConfig::default()
        })
    }

    fn positions_tex(vs: &[TexturedVertex]) -> Vec<[f32; 2]> {
        vs.iter().map(|v| v.pos).collect()
    }

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn new_allocates_every_slot() {
        let acc = accumulator(BatchConfig::default());
        let calls = &acc.backend().calls;
        assert_eq!(
            calls[..3],
            [
                Call::Allocate(BufferSlot::Triangles, 582 * 28, UsageHint::Stream),
                Call::Allocate(BufferSlot::Lines, 818 * 20, UsageHint::Stream),
                Call::Allocate(BufferSlot::Immediate, 819 * 20, UsageHint::Stream),
            ]
        );
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = BatchConfig { triangle_capacity: 3, ..BatchConfig::default() };
        let err = BatchAccumulator::new(cfg, RecordingBackend::default()).err();
        assert!(matches!(
            err,
            Some(BatchError::CapacityExceeded { kind: PrimitiveKind::Triangles, .. })
        ));
    }

    #[test]
    fn dispose_deletes_each_slot_once() {
        let mut acc = small();
        acc.dispose();
        acc.dispose();
        let deletes = acc
            .backend()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Delete(_)))
            .count();
        assert_eq!(deletes, 3);
    }

    #[test]
    fn begin_after_dispose_is_rejected() {
        let mut acc = small();
        acc.dispose();
        let calls_before = acc.backend().calls.len();

        assert_eq!(
            acc.begin(),
            Err(BatchError::InvalidState(StateViolation::Disposed))
        );
        assert_eq!(
            acc.append_square(v(0.0, 0.0), 2.0, 2.0, Color::RED),
            Err(BatchError::InvalidState(StateViolation::NotDrawing))
        );
        assert!(acc.end().is_err());
        acc.flush();
        acc.flush_lines();
        assert_eq!(acc.backend().calls.len(), calls_before);
    }

    #[test]
    fn dispose_mid_frame_drops_pending_vertices() {
        let mut acc = small();
        acc.begin().unwrap();
        acc.append_square(v(0.0, 0.0), 2.0, 2.0, Color::RED).unwrap();
        acc.append_line(v(0.0, 0.0), v(1.0, 1.0), Color::RED).unwrap();
        acc.dispose();
        acc.flush();
        acc.flush_lines();

        assert!(!acc.is_drawing());
        assert!(acc.backend().draws.is_empty());
    }

    #[test]
    fn begin_end_without_appends_draws_nothing() {
        let mut acc = small();
        acc.begin().unwrap();
        acc.end().unwrap();
        assert!(acc.backend().draws.is_empty());
        assert_eq!(acc.stats().draw_calls(), 0);
    }

    // ── state errors ──────────────────────────────────────────────────────

    #[test]
    fn append_before_begin_is_invalid_state() {
        let mut acc = small();
        let not_drawing = Err(BatchError::InvalidState(StateViolation::NotDrawing));

        assert_eq!(acc.append_quad(v(0.0, 0.0), v(1.0, 1.0), v(0.0, 0.0), v(1.0, 1.0), Color::WHITE), not_drawing);
        assert_eq!(acc.append_square(v(0.0, 0.0), 1.0, 1.0, Color::WHITE), not_drawing);
        assert_eq!(acc.append_line(v(0.0, 0.0), v(1.0, 1.0), Color::WHITE), not_drawing);
        assert_eq!(acc.append_polyline(&[v(0.0, 0.0), v(1.0, 1.0)], Color::WHITE), not_drawing);
        assert_eq!(acc.draw_circle(v(0.0, 0.0), 1.0, Color::WHITE), not_drawing);
        assert!(acc.backend().draws.is_empty());
    }

    #[test]
    fn double_begin_is_invalid_state() {
        let mut acc = small();
        acc.begin().unwrap();
        assert_eq!(
            acc.begin(),
            Err(BatchError::InvalidState(StateViolation::AlreadyDrawing))
        );
        assert!(acc.is_drawing());
    }

    #[test]
    fn end_without_begin_is_invalid_state() {
        let mut acc = small();
        let err = acc.end().unwrap_err();
        assert!(err.is_invalid_state());
        assert_eq!(err.to_string(), "invalid batch state: renderer isn't drawing");
    }

    #[test]
    fn abort_frame_discards_pending_vertices() {
        let mut acc = small();
        acc.begin().unwrap();
        acc.append_square(v(0.0, 0.0), 2.0, 2.0, Color::RED).unwrap();
        acc.append_line(v(0.0, 0.0), v(1.0, 1.0), Color::RED).unwrap();
        acc.abort_frame();

        assert!(!acc.is_drawing());
        acc.begin().unwrap();
        acc.end().unwrap();
        assert!(acc.backend().draws.is_empty());
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn square_emits_two_ccw_triangles() {
        let mut acc = small();
        acc.begin().unwrap();
        acc.append_square(v(0.0, 0.0), 2.0, 2.0, Color::WHITE).unwrap();
        acc.end().unwrap();

        let draws = &acc.backend().draws;
        assert_eq!(draws.len(), 1);
        assert_eq!(
            positions_tex(&draws[0].textured()),
            vec![[-1.0, -1.0], [-1.0, 1.0], [1.0, 1.0], [-1.0, -1.0], [1.0, 1.0], [1.0, -1.0]]
        );
        assert_eq!(draws[0].texture, None);
    }

    #[test]
    fn quad_carries_corner_texcoords_and_color() {
        let mut acc = small();
        acc.begin().unwrap();
        acc.append_quad(v(10.0, 20.0), v(30.0, 40.0), v(0.0, 0.0), v(0.5, 1.0), Color::GREEN)
            .unwrap();
        acc.end().unwrap();

        let vs = acc.backend().draws[0].textured().to_vec();
        let uvs: Vec<[f32; 2]> = vs.iter().map(|v| v.uv).collect();
        assert_eq!(
            uvs,
            vec![[0.0, 0.0], [0.0, 1.0], [0.5, 1.0], [0.0, 0.0], [0.5, 1.0], [0.5, 0.0]]
        );
        assert_eq!(positions_tex(&vs)[5], [30.0, 20.0]);
        assert!(vs.iter().all(|v| v.color == [0.0, 1.0, 0.0]));
        assert_eq!(acc.backend().draws[0].program, Some(ProgramKind::Textured));
    }

    #[test]
    fn circle_quarter_step_hits_axes() {
        let mut acc = small();
        acc.begin().unwrap();
        acc.append_circle(v(0.0, 0.0), 1.0, Color::WHITE, FRAC_PI_2).unwrap();

        let draws = &acc.backend().draws;
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].topology, Topology::LineLoop);
        assert_eq!(draws[0].slot, BufferSlot::Immediate);

        let vs = draws[0].colored();
        let expected = [[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]];
        assert_eq!(vs.len(), expected.len());
        for (got, want) in vs.iter().zip(expected) {
            assert_abs_diff_eq!(got.pos[0], want[0], epsilon = 1e-6);
            assert_abs_diff_eq!(got.pos[1], want[1], epsilon = 1e-6);
        }
    }

    #[test]
    fn circle_beyond_immediate_capacity_is_rejected() {
        let mut acc = small();
        acc.begin().unwrap();
        let err = acc.append_circle(v(0.0, 0.0), 1.0, Color::WHITE, 0.001).unwrap_err();
        assert_eq!(
            err,
            BatchError::CapacityExceeded {
                kind: PrimitiveKind::LineLoop,
                required: 6284,
                capacity: 819,
            }
        );
        assert!(acc.backend().draws.is_empty());
    }

    #[test]
    fn polyline_connects_consecutive_points() {
        let mut acc = accumulator(BatchConfig::default());
        acc.begin().unwrap();
        acc.append_polyline(&[v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0), v(0.0, 1.0)], Color::BLUE)
            .unwrap();
        acc.append_polyline(&[v(5.0, 5.0)], Color::BLUE).unwrap();
        acc.end().unwrap();

        let draws = &acc.backend().draws;
        assert_eq!(draws.len(), 1);
        let pos: Vec<[f32; 2]> = draws[0].colored().iter().map(|v| v.pos).collect();
        assert_eq!(
            pos,
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 1.0], [1.0, 1.0], [0.0, 1.0]]
        );
    }

    #[test]
    fn line_colors_are_normalized() {
        let mut acc = small();
        acc.begin().unwrap();
        acc.append_line(v(0.0, 0.0), v(1.0, 1.0), Color::from_rgb_u8(255, 51, 0)).unwrap();
        acc.end().unwrap();

        let vs = acc.backend().draws[0].colored();
        assert!(vs.iter().all(|v| v.color == [1.0, 0.2, 0.0]));
    }

    #[test]
    fn texture_region_maps_pixels_to_uv() {
        let mut acc = small();
        let tex = TextureInfo { id: TextureId(3), width: 64, height: 32 };
        acc.begin().unwrap();
        acc.draw_texture_region(&tex, v(100.0, 100.0), Rect::new(16.0, 0.0, 16.0, 32.0), Color::WHITE)
            .unwrap();
        acc.end().unwrap();

        let draw = &acc.backend().draws[0];
        assert_eq!(draw.texture, Some(TextureId(3)));
        let vs = draw.textured();
        assert_eq!(vs[0].pos, [100.0, 100.0]);
        assert_eq!(vs[0].uv, [0.25, 0.0]);
        assert_eq!(vs[2].pos, [116.0, 132.0]);
        assert_eq!(vs[2].uv, [0.5, 1.0]);
    }

    #[test]
    fn draw_texture_covers_whole_image() {
        let mut acc = small();
        let tex = TextureInfo { id: TextureId(2), width: 64, height: 32 };
        acc.begin().unwrap();
        acc.draw_texture(&tex, v(10.0, 20.0), Color::WHITE).unwrap();
        acc.end().unwrap();

        let draw = &acc.backend().draws[0];
        assert_eq!(draw.texture, Some(TextureId(2)));
        let vs = draw.textured();
        assert_eq!(vs.len(), QUAD_VERTICES);
        assert_eq!(vs[0].pos, [10.0, 20.0]);
        assert_eq!(vs[0].uv, [0.0, 0.0]);
        assert_eq!(vs[2].pos, [74.0, 52.0]);
        assert_eq!(vs[2].uv, [1.0, 1.0]);
    }

    #[test]
    fn empty_texture_region_draws_nothing() {
        let mut acc = small();
        let tex = TextureInfo { id: TextureId(1), width: 8, height: 8 };
        acc.begin().unwrap();
        acc.draw_texture_region(&tex, v(0.0, 0.0), Rect::new(4.0, 4.0, 0.0, 4.0), Color::WHITE)
            .unwrap();
        acc.end().unwrap();
        assert!(acc.backend().draws.is_empty());
    }

    // ── batching & flush policy ───────────────────────────────────────────

    #[test]
    fn quads_over_capacity_split_into_ceil_batches_in_order() {
        let mut acc = small();
        acc.begin().unwrap();
        let mut expected = Vec::new();
        for i in 0..5 {
            let x = i as f32 * 10.0;
            acc.append_quad(v(x, 0.0), v(x + 5.0, 5.0), v(0.0, 0.0), v(1.0, 1.0), Color::WHITE)
                .unwrap();
            expected.extend(quad_vertices(v(x, 0.0), v(x + 5.0, 5.0), v(0.0, 0.0), v(1.0, 1.0), Color::WHITE));
        }
        acc.end().unwrap();

        let draws: Vec<_> = acc.backend().draws_of(Topology::TriangleList).collect();
        // 30 vertices, capacity 12.
        assert_eq!(draws.len(), 3);
        let sizes: Vec<usize> = draws.iter().map(|d| d.textured().len()).collect();
        assert_eq!(sizes, vec![12, 12, 6]);

        let flushed: Vec<TexturedVertex> =
            draws.iter().flat_map(|d| d.textured()).collect();
        assert_eq!(flushed, expected);
        assert_eq!(acc.stats().triangle_draws, 3);
    }

    #[test]
    fn lines_over_capacity_split_into_ceil_batches_in_order() {
        let mut acc = small();
        acc.begin().unwrap();
        for i in 0..5 {
            let x = i as f32;
            acc.append_line(v(x, 0.0), v(x, 1.0), Color::WHITE).unwrap();
        }
        acc.end().unwrap();

        let draws: Vec<_> = acc.backend().draws_of(Topology::LineList).collect();
        // 10 vertices, capacity 4.
        assert_eq!(draws.len(), 3);
        let xs: Vec<f32> = draws
            .iter()
            .flat_map(|d| d.colored().into_iter().map(|v| v.pos[0]))
            .collect();
        assert_eq!(xs, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0]);
        assert!(draws.iter().all(|d| d.slot == BufferSlot::Lines));
    }

    #[test]
    fn default_capacities_flush_full_batches() {
        let mut acc = accumulator(BatchConfig::default());
        let tri_cap = acc.config().triangle_capacity;
        let line_cap = acc.config().line_capacity;

        acc.begin().unwrap();
        let squares = 195;
        for i in 0..squares {
            acc.append_square(v(i as f32, 0.0), 1.0, 1.0, Color::WHITE).unwrap();
        }
        let segments = 819;
        for i in 0..segments {
            acc.append_line(v(i as f32, 0.0), v(i as f32, 1.0), Color::WHITE).unwrap();
        }
        acc.end().unwrap();

        let tri_total = squares * QUAD_VERTICES;
        let line_total = segments * LINE_VERTICES;
        assert_eq!(
            acc.backend().draws_of(Topology::TriangleList).count(),
            tri_total.div_ceil(tri_cap)
        );
        assert_eq!(
            acc.backend().draws_of(Topology::LineList).count(),
            line_total.div_ceil(line_cap)
        );
        assert_eq!(acc.stats().triangle_draws, 3);
        assert_eq!(acc.stats().line_draws, 3);
    }

    #[test]
    fn polyline_splits_across_line_flushes_in_order() {
        let mut acc = small();
        acc.begin().unwrap();
        let points: Vec<Vec2> = (0..5).map(|i| v(i as f32, i as f32)).collect();
        acc.append_polyline(&points, Color::WHITE).unwrap();
        acc.end().unwrap();

        let draws: Vec<_> = acc.backend().draws_of(Topology::LineList).collect();
        // 4 segments = 8 vertices, capacity 4.
        assert_eq!(draws.len(), 2);
        let xs: Vec<f32> = draws
            .iter()
            .flat_map(|d| d.colored().into_iter().map(|v| v.pos[0]))
            .collect();
        assert_eq!(xs, vec![0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0]);
    }

    #[test]
    fn uploads_always_start_at_offset_zero() {
        let mut acc = small();
        acc.begin().unwrap();
        for _ in 0..3 {
            acc.append_square(v(0.0, 0.0), 1.0, 1.0, Color::WHITE).unwrap();
        }
        acc.end().unwrap();

        let offsets: Vec<u64> = acc
            .backend()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Upload(_, offset, _) => Some(*offset),
                _ => None,
            })
            .collect();
        assert_eq!(offsets, vec![0, 0]);
    }

    #[test]
    fn circle_flushes_triangles_but_not_lines() {
        let mut acc = small();
        acc.begin().unwrap();
        acc.append_square(v(0.0, 0.0), 2.0, 2.0, Color::WHITE).unwrap();
        acc.append_line(v(0.0, 0.0), v(1.0, 1.0), Color::WHITE).unwrap();
        acc.draw_circle(v(0.0, 0.0), 5.0, Color::WHITE).unwrap();
        acc.end().unwrap();

        let order: Vec<Topology> = acc.backend().draws.iter().map(|d| d.topology).collect();
        assert_eq!(
            order,
            vec![Topology::TriangleList, Topology::LineLoop, Topology::LineList]
        );
    }

    #[test]
    fn texture_change_splits_triangle_batch() {
        let mut acc = small();
        acc.begin().unwrap();
        acc.bind_texture(Some(TextureId(1)));
        acc.append_quad(v(0.0, 0.0), v(1.0, 1.0), v(0.0, 0.0), v(1.0, 1.0), Color::WHITE).unwrap();
        acc.append_quad(v(1.0, 0.0), v(2.0, 1.0), v(0.0, 0.0), v(1.0, 1.0), Color::WHITE).unwrap();
        acc.bind_texture(Some(TextureId(2)));
        acc.append_quad(v(2.0, 0.0), v(3.0, 1.0), v(0.0, 0.0), v(1.0, 1.0), Color::WHITE).unwrap();
        acc.append_square(v(0.0, 0.0), 1.0, 1.0, Color::WHITE).unwrap();
        acc.end().unwrap();

        let textures: Vec<(Option<TextureId>, usize)> = acc
            .backend()
            .draws
            .iter()
            .map(|d| (d.texture, d.textured().len()))
            .collect();
        assert_eq!(
            textures,
            vec![(Some(TextureId(1)), 12), (Some(TextureId(2)), 6), (None, 6)]
        );
    }

    #[test]
    fn stats_reset_on_begin() {
        let mut acc = small();
        acc.begin().unwrap();
        acc.append_square(v(0.0, 0.0), 1.0, 1.0, Color::WHITE).unwrap();
        acc.append_line(v(0.0, 0.0), v(1.0, 1.0), Color::WHITE).unwrap();
        acc.end().unwrap();
        assert_eq!(
            acc.stats(),
            FrameStats { triangle_draws: 1, line_draws: 1, loop_draws: 0, vertices: 8 }
        );

        acc.begin().unwrap();
        assert_eq!(acc.stats(), FrameStats::default());
        acc.end().unwrap();
    }
}
