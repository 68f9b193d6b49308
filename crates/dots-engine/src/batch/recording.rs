//! Test double that records every backend call.

use super::{BufferSlot, ColorVertex, GpuBackend, ProgramKind, TextureId, TexturedVertex, Topology, UsageHint};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Allocate(BufferSlot, u64, UsageHint),
    Upload(BufferSlot, u64, Vec<u8>),
    Bind(BufferSlot),
    Delete(BufferSlot),
    Program(ProgramKind),
    Texture(Option<TextureId>),
    Draw(Topology, u32, u32),
}

/// One submitted draw with the state bound at the time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedDraw {
    pub topology: Topology,
    pub slot: BufferSlot,
    pub program: Option<ProgramKind>,
    pub texture: Option<TextureId>,
    pub bytes: Vec<u8>,
}

impl RecordedDraw {
    pub fn textured(&self) -> Vec<TexturedVertex> {
        read_vertices(&self.bytes)
    }

    pub fn colored(&self) -> Vec<ColorVertex> {
        read_vertices(&self.bytes)
    }
}

/// Byte buffers carry no vertex alignment, so read each vertex unaligned.
fn read_vertices<V: bytemuck::Pod>(bytes: &[u8]) -> Vec<V> {
    bytes
        .chunks_exact(std::mem::size_of::<V>())
        .map(bytemuck::pod_read_unaligned)
        .collect()
}

#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub calls: Vec<Call>,
    pub draws: Vec<RecordedDraw>,

    bound: Option<BufferSlot>,
    program: Option<ProgramKind>,
    texture: Option<TextureId>,
    last_upload: Vec<u8>,
}

impl RecordingBackend {
    pub fn draws_of(&self, topology: Topology) -> impl Iterator<Item = &RecordedDraw> {
        self.draws.iter().filter(move |d| d.topology == topology)
    }
}

impl GpuBackend for RecordingBackend {
    fn allocate(&mut self, slot: BufferSlot, size_bytes: u64, usage: UsageHint) {
        self.calls.push(Call::Allocate(slot, size_bytes, usage));
    }

    fn upload(&mut self, slot: BufferSlot, offset: u64, data: &[u8]) {
        self.last_upload = data.to_vec();
        self.calls.push(Call::Upload(slot, offset, data.to_vec()));
    }

    fn bind(&mut self, slot: BufferSlot) {
        self.bound = Some(slot);
        self.calls.push(Call::Bind(slot));
    }

    fn delete(&mut self, slot: BufferSlot) {
        self.calls.push(Call::Delete(slot));
    }

    fn bind_program(&mut self, program: ProgramKind) {
        self.program = Some(program);
        self.calls.push(Call::Program(program));
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.texture = texture;
        self.calls.push(Call::Texture(texture));
    }

    fn draw(&mut self, topology: Topology, first_vertex: u32, vertex_count: u32) {
        self.calls.push(Call::Draw(topology, first_vertex, vertex_count));

        let stride = match topology {
            Topology::TriangleList => std::mem::size_of::<TexturedVertex>(),
            Topology::LineList | Topology::LineLoop => std::mem::size_of::<ColorVertex>(),
        };
        let start = first_vertex as usize * stride;
        let end = start + vertex_count as usize * stride;

        self.draws.push(RecordedDraw {
            topology,
            slot: self.bound.expect("draw without a bound slot"),
            program: self.program,
            texture: self.texture,
            bytes: self.last_upload[start..end].to_vec(),
        });
    }
}
