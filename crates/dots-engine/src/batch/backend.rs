/// GPU vertex buffer owned by the accumulator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferSlot {
    /// Textured triangle batch (`TexturedVertex`).
    Triangles,
    /// Line batch (`ColorVertex`).
    Lines,
    /// Scratch region for immediate line loops (`ColorVertex`).
    Immediate,
}

impl BufferSlot {
    pub const ALL: [BufferSlot; 3] = [BufferSlot::Triangles, BufferSlot::Lines, BufferSlot::Immediate];
}

/// How often a buffer's contents are replaced.
///
/// Every batch buffer is rewritten per flush, so `Stream` is the only hint.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UsageHint {
    /// Rewritten every batch, drawn a few times.
    Stream,
}

/// Primitive topology of a draw call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    TriangleList,
    LineList,
    /// Closed outline: the last vertex connects back to the first.
    LineLoop,
}

/// Shader program bound before a flush.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ProgramKind {
    /// Position + color + texture coordinates, sampled texture times color.
    Textured,
    /// Position + color.
    Colored,
}

/// Backend texture handle. `None` in APIs means the built-in white texel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(pub u32);

/// Texture handle plus its size in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureInfo {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

/// GPU collaborator used by `BatchAccumulator`.
///
/// Calls arrive in flush order: `bind_program`, `bind_texture` (textured only),
/// `bind`, `upload`, `draw`. Offsets and byte sizes refer to the bound slot.
pub trait GpuBackend {
    /// Reserves `size_bytes` of storage for `slot`.
    fn allocate(&mut self, slot: BufferSlot, size_bytes: u64, usage: UsageHint);

    /// Writes `data` into `slot` starting at `offset` bytes.
    fn upload(&mut self, slot: BufferSlot, offset: u64, data: &[u8]);

    /// Makes `slot` the vertex source for subsequent draws.
    fn bind(&mut self, slot: BufferSlot);

    /// Releases the storage of `slot`.
    fn delete(&mut self, slot: BufferSlot);

    fn bind_program(&mut self, program: ProgramKind);

    fn bind_texture(&mut self, texture: Option<TextureId>);

    /// Draws `vertex_count` vertices of the bound slot starting at `first_vertex`.
    fn draw(&mut self, topology: Topology, first_vertex: u32, vertex_count: u32);
}
