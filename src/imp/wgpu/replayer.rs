// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Turns frozen order-index textures into reveal textures for one threshold.

use bytemuck::{Pod, Zeroable};

use crate::config::CanvasSize;
use crate::imp::wgpu::BoundDevice;
use crate::imp::wgpu::recorder::RecordTarget;
use crate::pixel_formats::{OutputKind, REVEAL_FORMAT};

const SHADER: &str = include_str!("replay.wgsl");

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ReplayParams {
    threshold: u32,
    _pad: [u32; 3],
}

#[derive(Debug)]
pub(super) struct RevealTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

impl RevealTarget {
    pub(super) fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }
    pub(super) fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

#[derive(Debug)]
pub(super) struct OrderReplayer {
    params: wgpu::Buffer,
    pipeline: wgpu::RenderPipeline,
    targets: Vec<RevealTarget>,
}

impl OrderReplayer {
    pub(super) fn new(
        bound_device: &BoundDevice,
        canvas: CanvasSize,
        output: OutputKind,
        sources: &[RecordTarget],
    ) -> Self {
        let device = bound_device.device();
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("replay"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });
        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("replay threshold"),
            size: std::mem::size_of::<ReplayParams>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        //color stamps sit on binding 1, depth stamps on binding 2
        let (order_binding, sample_type) = match output {
            OutputKind::Color => (1, wgpu::TextureSampleType::Float { filterable: false }),
            OutputKind::Depth => (2, wgpu::TextureSampleType::Depth),
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("replay"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: order_binding,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("replay"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("replay"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_fullscreen"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            primitive: Default::default(),
            depth_stencil: None,
            multisample: Default::default(),
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some(output.replay_entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: REVEAL_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        let targets = sources
            .iter()
            .enumerate()
            .map(|(index, source)| {
                let texture = device.create_texture(&wgpu::TextureDescriptor {
                    label: Some(&format!("reveal {index}")),
                    size: wgpu::Extent3d {
                        width: canvas.width(),
                        height: canvas.height(),
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: REVEAL_FORMAT,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING
                        | wgpu::TextureUsages::COPY_SRC,
                    view_formats: &[],
                });
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("replay {index}")),
                    layout: &bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: params.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: order_binding,
                            resource: wgpu::BindingResource::TextureView(source.view()),
                        },
                    ],
                });
                RevealTarget {
                    texture,
                    view,
                    bind_group,
                }
            })
            .collect();

        OrderReplayer {
            params,
            pipeline,
            targets,
        }
    }

    pub(super) fn targets(&self) -> &[RevealTarget] {
        &self.targets
    }

    /// Uploads `threshold`.  Takes effect for work submitted after this call.
    pub(super) fn set_threshold(&self, queue: &wgpu::Queue, threshold: u32) {
        let params = ReplayParams {
            threshold,
            _pad: [0; 3],
        };
        queue.write_buffer(&self.params, 0, bytemuck::bytes_of(&params));
    }

    /// Encodes one full-screen pass per variant.
    pub(super) fn replay(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.push_debug_group("replay order");
        for target in &self.targets {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("replay"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &target.bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }
        encoder.pop_debug_group();
    }
}
