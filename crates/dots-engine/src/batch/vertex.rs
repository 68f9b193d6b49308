use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::Color;

/// CPU vertex layout that can be uploaded verbatim.
pub trait Vertex: Pod {
    /// Number of `f32` components per vertex.
    const FLOATS: usize;

    /// Size of one vertex in bytes.
    const STRIDE: u64 = (Self::FLOATS * std::mem::size_of::<f32>()) as u64;
}

/// Untextured vertex (5 floats): line batches and immediate line loops.
///
///  offset  0  pos    [f32; 2]   loc 0
///  offset  8  color  [f32; 3]   loc 1
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub pos: [f32; 2],
    pub color: [f32; 3],
}

impl ColorVertex {
    #[inline]
    pub fn new(pos: Vec2, color: Color) -> Self {
        Self {
            pos: pos.to_array(),
            color: color.to_array(),
        }
    }

    pub const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x3  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

impl Vertex for ColorVertex {
    const FLOATS: usize = 5;
}

/// Textured vertex (7 floats): the triangle batch.
///
///  offset  0  pos    [f32; 2]   loc 0
///  offset  8  color  [f32; 3]   loc 1
///  offset 20  uv     [f32; 2]   loc 2
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub pos: [f32; 2],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    #[inline]
    pub fn new(pos: Vec2, color: Color, uv: Vec2) -> Self {
        Self {
            pos: pos.to_array(),
            color: color.to_array(),
            uv: uv.to_array(),
        }
    }

    pub const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x3, // color
        2 => Float32x2  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

impl Vertex for TexturedVertex {
    const FLOATS: usize = 7;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_match_float_counts() {
        assert_eq!(std::mem::size_of::<ColorVertex>() as u64, ColorVertex::STRIDE);
        assert_eq!(std::mem::size_of::<TexturedVertex>() as u64, TexturedVertex::STRIDE);
        assert_eq!(ColorVertex::STRIDE, 20);
        assert_eq!(TexturedVertex::STRIDE, 28);
    }
}
