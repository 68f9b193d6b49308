use std::ops::Range;

use crate::batch::{BufferSlot, ColorVertex, ProgramKind, TextureId, TexturedVertex, Topology, Vertex};

/// A draw recorded during the frame, resolved to absolute vertex indices of its
/// slot's frame buffer.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct StagedDraw {
    pub slot: BufferSlot,
    pub program: ProgramKind,
    pub topology: Topology,
    pub texture: Option<TextureId>,
    pub vertices: Range<u32>,
}

#[derive(Debug, Default)]
struct SlotStaging {
    bytes: Vec<u8>,
    /// Byte offset that upload offset 0 refers to.
    region_start: usize,
}

/// CPU side of a frame: every slot's uploads, each flush in its own region.
///
/// The accumulator reuses offset 0 of a slot for every batch. wgpu executes all
/// buffer writes before the frame's render pass, so each batch is moved to a fresh
/// region here instead of overwriting the previous one.
#[derive(Debug)]
pub(super) struct FrameStaging {
    slots: [SlotStaging; 3],
    bound: Option<BufferSlot>,
    program: ProgramKind,
    texture: Option<TextureId>,
    draws: Vec<StagedDraw>,
}

impl Default for FrameStaging {
    fn default() -> Self {
        Self {
            slots: Default::default(),
            bound: None,
            program: ProgramKind::Colored,
            texture: None,
            draws: Vec::new(),
        }
    }
}

pub(super) fn slot_index(slot: BufferSlot) -> usize {
    match slot {
        BufferSlot::Triangles => 0,
        BufferSlot::Lines => 1,
        BufferSlot::Immediate => 2,
    }
}

pub(super) fn slot_stride(slot: BufferSlot) -> usize {
    match slot {
        BufferSlot::Triangles => TexturedVertex::STRIDE as usize,
        BufferSlot::Lines | BufferSlot::Immediate => ColorVertex::STRIDE as usize,
    }
}

impl FrameStaging {
    #[inline]
    pub fn bind(&mut self, slot: BufferSlot) {
        self.bound = Some(slot);
    }

    #[inline]
    pub fn set_program(&mut self, program: ProgramKind) {
        self.program = program;
    }

    #[inline]
    pub fn set_texture(&mut self, texture: Option<TextureId>) {
        self.texture = texture;
    }

    pub fn upload(&mut self, slot: BufferSlot, offset: u64, data: &[u8]) {
        let s = &mut self.slots[slot_index(slot)];
        let start = s.region_start + offset as usize;
        let end = start + data.len();
        if s.bytes.len() < end {
            s.bytes.resize(end, 0);
        }
        s.bytes[start..end].copy_from_slice(data);
    }

    pub fn draw(&mut self, topology: Topology, first_vertex: u32, vertex_count: u32) {
        let Some(slot) = self.bound else {
            log::warn!("draw({topology:?}) without a bound vertex buffer; skipped");
            return;
        };
        let stride = slot_stride(slot);
        let s = &mut self.slots[slot_index(slot)];

        let first = s.region_start + first_vertex as usize * stride;
        let end = first + vertex_count as usize * stride;
        if vertex_count == 0 || end > s.bytes.len() {
            log::warn!(
                "draw({topology:?}) of {vertex_count} vertices exceeds uploaded {slot:?} data; skipped"
            );
            return;
        }

        let vertices = if topology == Topology::LineLoop {
            // No loop topology in wgpu: re-emit the run closed by its first vertex
            // and draw it as a strip.
            let run = s.bytes.len().next_multiple_of(stride);
            s.bytes.resize(run, 0);
            s.bytes.extend_from_within(first..end);
            s.bytes.extend_from_within(first..first + stride);
            let v0 = (run / stride) as u32;
            v0..v0 + vertex_count + 1
        } else {
            let v0 = (first / stride) as u32;
            v0..v0 + vertex_count
        };

        s.region_start = s.bytes.len().next_multiple_of(stride);
        s.bytes.resize(s.region_start, 0);

        self.draws.push(StagedDraw {
            slot,
            program: self.program,
            topology,
            texture: self.texture,
            vertices,
        });
    }

    /// Staged bytes of `slot`, padded to the 4-byte copy alignment.
    pub fn bytes(&mut self, slot: BufferSlot) -> &[u8] {
        let s = &mut self.slots[slot_index(slot)];
        let padded = s.bytes.len().next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT as usize);
        s.bytes.resize(padded, 0);
        &s.bytes
    }

    #[inline]
    pub fn draws(&self) -> &[StagedDraw] {
        &self.draws
    }

    /// Forgets the frame; keeps allocations for the next one.
    pub fn clear(&mut self) {
        for s in &mut self.slots {
            s.bytes.clear();
            s.region_start = 0;
        }
        self.draws.clear();
        self.bound = None;
    }

    /// Drops staged data for one slot (buffer deleted).
    pub fn forget(&mut self, slot: BufferSlot) {
        let s = &mut self.slots[slot_index(slot)];
        s.bytes.clear();
        s.region_start = 0;
        self.draws.retain(|d| d.slot != slot);
    }
}
