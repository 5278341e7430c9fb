// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Lays reveal textures side by side on the presentable surface.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::imp::wgpu::BoundDevice;
use crate::imp::wgpu::replayer::RevealTarget;

const SHADER: &str = include_str!("composite.wgsl");

/// Vertices per strip, drawn as a triangle strip.
const STRIP_VERTICES: u32 = 4;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct StripVertex {
    pub(crate) position: [f32; 2],
    pub(crate) uv: [f32; 2],
}

/**
Clip-space quads for `strips` equal-width columns, left to right.

Each strip is top-left, top-right, bottom-left, bottom-right, with `v = 0` at the top.
`flip` mirrors each strip's horizontal texture coordinate.
*/
pub(crate) fn strip_vertices(strips: usize, flip: bool) -> Vec<StripVertex> {
    let (u_left, u_right) = if flip { (1.0, 0.0) } else { (0.0, 1.0) };
    let width = 2.0 / strips as f32;
    (0..strips)
        .flat_map(|strip| {
            let edge = |i: usize| if i == strips { 1.0 } else { -1.0 + width * i as f32 };
            let (left, right) = (edge(strip), edge(strip + 1));
            [
                StripVertex {
                    position: [left, 1.0],
                    uv: [u_left, 0.0],
                },
                StripVertex {
                    position: [right, 1.0],
                    uv: [u_right, 0.0],
                },
                StripVertex {
                    position: [left, -1.0],
                    uv: [u_left, 1.0],
                },
                StripVertex {
                    position: [right, -1.0],
                    uv: [u_right, 1.0],
                },
            ]
        })
        .collect()
}

#[derive(Debug)]
pub(super) struct FrameCompositor {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    bind_groups: Vec<wgpu::BindGroup>,
}

impl FrameCompositor {
    pub(super) fn new(
        bound_device: &BoundDevice,
        surface_format: wgpu::TextureFormat,
        flip: bool,
        reveals: &[RevealTarget],
    ) -> Self {
        let device = bound_device.device();
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("composite"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("reveal"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("composite"),
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
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("composite"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("composite"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_stretch"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<StripVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
                }],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_stretch"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("composite strips"),
            contents: bytemuck::cast_slice(&strip_vertices(reveals.len(), flip)),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let bind_groups = reveals
            .iter()
            .enumerate()
            .map(|(index, reveal)| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("composite {index}")),
                    layout: &bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(reveal.view()),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                })
            })
            .collect();
        FrameCompositor {
            pipeline,
            vertex_buffer,
            bind_groups,
        }
    }

    /// Encodes the composite into `target`, which must have the surface format this
    /// compositor was built for.
    pub(super) fn composite(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("composite"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
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
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        for (strip, bind_group) in self.bind_groups.iter().enumerate() {
            let first = strip as u32 * STRIP_VERTICES;
            render_pass.set_bind_group(0, bind_group, &[]);
            render_pass.draw(first..first + STRIP_VERTICES, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tile_the_surface() {
        let vertices = strip_vertices(3, false);
        assert_eq!(vertices.len(), 12);
        assert_eq!(vertices[0].position, [-1.0, 1.0]);
        assert_eq!(vertices[11].position, [1.0, -1.0]);
        //neighbouring strips share an edge
        for strip in 0..2 {
            let right = vertices[strip * 4 + 1].position[0];
            let next_left = vertices[(strip + 1) * 4].position[0];
            assert_eq!(right, next_left);
        }
    }

    #[test]
    fn one_winding_with_v_down() {
        for vertex in strip_vertices(2, false).chunks(4) {
            assert_eq!(vertex[0].uv, [0.0, 0.0]);
            assert_eq!(vertex[1].uv, [1.0, 0.0]);
            assert_eq!(vertex[2].uv, [0.0, 1.0]);
            assert_eq!(vertex[3].uv, [1.0, 1.0]);
            assert!(vertex[0].position[1] > vertex[2].position[1]);
        }
    }

    #[test]
    fn flip_mirrors_u_only() {
        let plain = strip_vertices(2, false);
        let flipped = strip_vertices(2, true);
        for (a, b) in plain.iter().zip(&flipped) {
            assert_eq!(a.position, b.position);
            assert_eq!(b.uv[0], 1.0 - a.uv[0]);
            assert_eq!(b.uv[1], a.uv[1]);
        }
    }
}
