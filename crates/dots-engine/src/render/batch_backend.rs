use anyhow::{ensure, Result};
use bytemuck::{Pod, Zeroable};

use crate::batch::{
    BufferSlot, ColorVertex, GpuBackend, ProgramKind, TextureId, TextureInfo, TexturedVertex,
    Topology, UsageHint,
};
use crate::coords::Viewport;

use super::staging::{slot_index, FrameStaging};
use super::RenderTarget;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ViewportUniform {
    size: [f32; 2],
    linearize: f32,
    _pad: f32,
}

#[derive(Debug, Default)]
struct SlotBuffer {
    buffer: Option<wgpu::Buffer>,
    size: u64,
}

struct GpuTexture {
    // Kept alive for the bind group.
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct Pipelines {
    textured: wgpu::RenderPipeline,
    lines: wgpu::RenderPipeline,
    loops: wgpu::RenderPipeline,
}

/// `GpuBackend` over wgpu.
///
/// Draws are staged on the CPU while the accumulator runs and turned into GPU
/// work by `encode`, once per frame.
pub struct WgpuBatchBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,

    staging: FrameStaging,
    slots: [SlotBuffer; 3],

    viewport_ubo: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,
    texture_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    textures: Vec<GpuTexture>,
    pipelines: Pipelines,

    warned_unsupported: bool,
}

impl WgpuBatchBackend {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let viewport_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("dots viewport bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ViewportUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("dots texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("dots viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("dots viewport bind group"),
            layout: &viewport_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("dots sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let pipelines = create_pipelines(device, surface_format, &viewport_bgl, &texture_bgl);

        let mut backend = Self {
            device: device.clone(),
            queue: queue.clone(),
            surface_format,
            staging: FrameStaging::default(),
            slots: Default::default(),
            viewport_ubo,
            viewport_bind_group,
            texture_bgl,
            sampler,
            textures: Vec::new(),
            pipelines,
            warned_unsupported: false,
        };

        // Id 0: the white texel untextured quads sample.
        let white = backend.upload_texture(1, 1, &[255; 4]);
        backend.textures.push(white);

        backend
    }

    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Uploads a tightly packed RGBA8 image (top row first) as an sRGB texture.
    pub fn create_texture_rgba8(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureInfo> {
        ensure!(width > 0 && height > 0, "texture has zero size ({width}x{height})");
        let expected = width as usize * height as usize * 4;
        ensure!(
            pixels.len() == expected,
            "texture data is {} bytes, {width}x{height} RGBA8 needs {expected}",
            pixels.len()
        );
        let max = self.device.limits().max_texture_dimension_2d;
        ensure!(
            width <= max && height <= max,
            "texture {width}x{height} exceeds device limit {max}"
        );

        let texture = self.upload_texture(width, height, pixels);
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(texture);

        log::debug!("created texture {id:?} ({width}x{height})");
        Ok(TextureInfo { id, width, height })
    }

    /// Records the staged draws into `target` and empties the staging.
    ///
    /// `viewport` is the logical size that vertex positions are expressed in.
    pub fn encode(&mut self, target: &mut RenderTarget<'_>, viewport: Viewport) {
        if self.staging.draws().is_empty() || !viewport.is_valid() {
            self.staging.clear();
            return;
        }

        let uniform = ViewportUniform {
            size: [viewport.width, viewport.height],
            linearize: if self.surface_format.is_srgb() { 1.0 } else { 0.0 },
            _pad: 0.0,
        };
        self.queue
            .write_buffer(&self.viewport_ubo, 0, bytemuck::bytes_of(&uniform));

        for slot in BufferSlot::ALL {
            let bytes = self.staging.bytes(slot);
            if bytes.is_empty() {
                continue;
            }
            let len = bytes.len() as u64;
            let entry = &mut self.slots[slot_index(slot)];
            if entry.buffer.is_none() {
                log::warn!("{slot:?} vertex buffer was deleted; staged draws dropped");
                continue;
            }
            if entry.size < len {
                let size = len.next_power_of_two();
                log::debug!("growing {slot:?} vertex buffer to {size} bytes");
                entry.buffer = Some(create_vertex_buffer(&self.device, slot, size));
                entry.size = size;
            }
            if let Some(buffer) = entry.buffer.as_ref() {
                self.queue.write_buffer(buffer, 0, bytes);
            }
        }

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("dots batch pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_bind_group(0, &self.viewport_bind_group, &[]);

        for draw in self.staging.draws() {
            let pipeline = match (draw.program, draw.topology) {
                (ProgramKind::Textured, Topology::TriangleList) => &self.pipelines.textured,
                (ProgramKind::Colored, Topology::LineList) => &self.pipelines.lines,
                (ProgramKind::Colored, Topology::LineLoop) => &self.pipelines.loops,
                (program, topology) => {
                    if !self.warned_unsupported {
                        log::warn!("no pipeline for {program:?} {topology:?}; draw skipped");
                        self.warned_unsupported = true;
                    }
                    continue;
                }
            };
            let Some(buffer) = self.slots[slot_index(draw.slot)].buffer.as_ref() else {
                continue;
            };

            rpass.set_pipeline(pipeline);
            if draw.program == ProgramKind::Textured {
                let texture = draw
                    .texture
                    .and_then(|id| self.textures.get(id.0 as usize))
                    .unwrap_or(&self.textures[0]);
                rpass.set_bind_group(1, &texture.bind_group, &[]);
            }
            rpass.set_vertex_buffer(0, buffer.slice(..));
            rpass.draw(draw.vertices.clone(), 0..1);
        }

        drop(rpass);
        self.staging.clear();
    }

    /// Drops everything staged for the current frame.
    pub fn discard_frame(&mut self) {
        self.staging.clear();
    }

    fn upload_texture(&self, width: u32, height: u32, pixels: &[u8]) -> GpuTexture {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("dots texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("dots texture bind group"),
            layout: &self.texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        GpuTexture {
            _texture: texture,
            bind_group,
        }
    }
}

impl GpuBackend for WgpuBatchBackend {
    fn allocate(&mut self, slot: BufferSlot, size_bytes: u64, usage: UsageHint) {
        let size = size_bytes
            .max(wgpu::COPY_BUFFER_ALIGNMENT)
            .next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        log::debug!("allocating {slot:?} GPU buffer: {size} bytes ({usage:?})");
        let entry = &mut self.slots[slot_index(slot)];
        entry.buffer = Some(create_vertex_buffer(&self.device, slot, size));
        entry.size = size;
    }

    fn upload(&mut self, slot: BufferSlot, offset: u64, data: &[u8]) {
        self.staging.upload(slot, offset, data);
    }

    fn bind(&mut self, slot: BufferSlot) {
        self.staging.bind(slot);
    }

    fn delete(&mut self, slot: BufferSlot) {
        let entry = &mut self.slots[slot_index(slot)];
        if let Some(buffer) = entry.buffer.take() {
            buffer.destroy();
        }
        entry.size = 0;
        self.staging.forget(slot);
    }

    fn bind_program(&mut self, program: ProgramKind) {
        self.staging.set_program(program);
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.staging.set_texture(texture);
    }

    fn draw(&mut self, topology: Topology, first_vertex: u32, vertex_count: u32) {
        log::trace!("draw {topology:?}: {vertex_count} vertices from {first_vertex}");
        self.staging.draw(topology, first_vertex, vertex_count);
    }
}

fn create_vertex_buffer(device: &wgpu::Device, slot: BufferSlot, size: u64) -> wgpu::Buffer {
    let label = match slot {
        BufferSlot::Triangles => "dots triangle vbo",
        BufferSlot::Lines => "dots line vbo",
        BufferSlot::Immediate => "dots immediate vbo",
    };
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_pipelines(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    viewport_bgl: &wgpu::BindGroupLayout,
    texture_bgl: &wgpu::BindGroupLayout,
) -> Pipelines {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("dots batch shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/batch.wgsl").into()),
    });

    let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("dots textured pipeline layout"),
        bind_group_layouts: &[viewport_bgl, texture_bgl],
        immediate_size: 0,
    });
    let colored_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("dots colored pipeline layout"),
        bind_group_layouts: &[viewport_bgl],
        immediate_size: 0,
    });

    let build = |label: &str,
                 layout: &wgpu::PipelineLayout,
                 vs: &str,
                 fs: &str,
                 buffer: wgpu::VertexBufferLayout<'static>,
                 topology: wgpu::PrimitiveTopology| {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(vs),
                compilation_options: Default::default(),
                buffers: &[buffer],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(fs),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    };

    Pipelines {
        textured: build(
            "dots textured pipeline",
            &textured_layout,
            "vs_textured",
            "fs_textured",
            TexturedVertex::layout(),
            wgpu::PrimitiveTopology::TriangleList,
        ),
        lines: build(
            "dots line pipeline",
            &colored_layout,
            "vs_colored",
            "fs_colored",
            ColorVertex::layout(),
            wgpu::PrimitiveTopology::LineList,
        ),
        loops: build(
            "dots line loop pipeline",
            &colored_layout,
            "vs_colored",
            "fs_colored",
            ColorVertex::layout(),
            wgpu::PrimitiveTopology::LineStrip,
        ),
    }
}
