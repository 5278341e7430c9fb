// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The order recorder.

Every configured variant gets an order-index texture and one slot of a shared counter
buffer.  A recording clears the counter block, then draws each variant with a fragment
stage that bumps its slot with `atomicAdd` and stamps the old value into the pixel.

Slots are packed four bytes apart.  Storage bindings must start on a
`min_storage_buffer_offset_alignment` boundary (256 bytes on most hardware), so instead
of offsetting the binding each variant binds the whole block and reads its slot index
from a small uniform.
*/

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::config::{CanvasSize, Configuration};
use crate::images::fence::{Fence, FenceEvent, FenceSchedule};
use crate::imp::wgpu::BoundDevice;
use crate::pixel_formats::OutputKind;
use crate::variant::{ClipPosition, TestVariant, Topology};

const SHADER: &str = include_str!("record.wgsl");

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SlotParams {
    slot: u32,
    _pad: [u32; 3],
}

/// Per-variant recording resources.
#[derive(Debug)]
pub(super) struct RecordTarget {
    variant: TestVariant,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    vertex_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl RecordTarget {
    pub(super) fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }
    pub(super) fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

#[derive(Debug)]
pub(super) struct OrderRecorder {
    output: OutputKind,
    counters: wgpu::Buffer,
    targets: Vec<RecordTarget>,
    list_pipeline: wgpu::RenderPipeline,
    strip_pipeline: wgpu::RenderPipeline,
}

fn order_texture(
    device: &wgpu::Device,
    canvas: CanvasSize,
    output: OutputKind,
    variant: TestVariant,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&format!("order indices ({variant})")),
        size: wgpu::Extent3d {
            width: canvas.width(),
            height: canvas.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: output.order_format(),
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

fn pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    output: OutputKind,
    topology: Topology,
) -> wgpu::RenderPipeline {
    let (label, primitive_topology) = match topology {
        Topology::TriangleList => ("record list", wgpu::PrimitiveTopology::TriangleList),
        Topology::TriangleStrip => ("record strip", wgpu::PrimitiveTopology::TriangleStrip),
    };
    let color_targets = [Some(wgpu::ColorTargetState {
        format: output.order_format(),
        blend: None,
        write_mask: wgpu::ColorWrites::ALL,
    })];
    let (targets, depth_stencil): (&[Option<wgpu::ColorTargetState>], _) = match output {
        OutputKind::Color => (&color_targets, None),
        OutputKind::Depth => (
            &[],
            Some(wgpu::DepthStencilState {
                format: output.order_format(),
                depth_write_enabled: true,
                //later stamps are larger, so the last fragment wins
                depth_compare: wgpu::CompareFunction::Greater,
                stencil: Default::default(),
                bias: Default::default(),
            }),
        ),
    };
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_record"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<ClipPosition>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x4],
            }],
        },
        primitive: wgpu::PrimitiveState {
            topology: primitive_topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            //every test shape must be visible regardless of winding
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil,
        multisample: Default::default(),
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(output.record_entry_point()),
            compilation_options: Default::default(),
            targets,
        }),
        multiview: None,
        cache: None,
    })
}

fn mark(encoder: &mut wgpu::CommandEncoder, schedule: &mut FenceSchedule, event: FenceEvent) {
    encoder.insert_debug_marker(&event.marker());
    schedule.push(event);
}

impl OrderRecorder {
    pub(super) fn new(bound_device: &BoundDevice, config: &Configuration) -> Self {
        let device = bound_device.device();
        let output = config.output();
        let canvas = config.canvas_size();
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("record"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });
        let counters = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("order counters"),
            size: (config.variants().len() * std::mem::size_of::<u32>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("record"),
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
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("record"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let list_pipeline = pipeline(device, &layout, &module, output, Topology::TriangleList);
        let strip_pipeline = pipeline(device, &layout, &module, output, Topology::TriangleStrip);

        let targets = config
            .variants()
            .iter()
            .enumerate()
            .map(|(slot, &variant)| {
                let texture = order_texture(device, canvas, output, variant);
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("vertices ({variant})")),
                    contents: bytemuck::cast_slice(variant.vertices()),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("slot ({variant})")),
                    contents: bytemuck::bytes_of(&SlotParams {
                        slot: slot as u32,
                        _pad: [0; 3],
                    }),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("record ({variant})")),
                    layout: &bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: params.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: counters.as_entire_binding(),
                        },
                    ],
                });
                RecordTarget {
                    variant,
                    texture,
                    view,
                    vertex_buffer,
                    bind_group,
                }
            })
            .collect();

        OrderRecorder {
            output,
            counters,
            targets,
            list_pipeline,
            strip_pipeline,
        }
    }

    pub(super) fn targets(&self) -> &[RecordTarget] {
        &self.targets
    }

    pub(super) fn output(&self) -> OutputKind {
        self.output
    }

    /// Zeroes every counter slot, between the barrier pair that guards the block.
    fn clear_counters(&self, encoder: &mut wgpu::CommandEncoder, schedule: &mut FenceSchedule) {
        mark(encoder, schedule, FenceEvent::Wait(Fence::Barrier1));
        encoder.clear_buffer(&self.counters, 0, None);
        mark(encoder, schedule, FenceEvent::ClearCounters);
        mark(encoder, schedule, FenceEvent::Signal(Fence::Barrier0));
    }

    /**
    Encodes one recording of every variant.

    Returns the fence events in the order they were encoded.  Each event is also left in
    the command stream as a debug marker.
    */
    pub(super) fn record(&self, encoder: &mut wgpu::CommandEncoder) -> FenceSchedule {
        let mut schedule = FenceSchedule::new();
        encoder.push_debug_group("record order");

        self.clear_counters(encoder, &mut schedule);

        for (index, target) in self.targets.iter().enumerate() {
            mark(encoder, &mut schedule, FenceEvent::Wait(Fence::Barrier0));
            let draw = FenceEvent::Draw(index);
            encoder.push_debug_group(&draw.marker());
            {
                let mut color_attachments = Vec::new();
                let mut depth_stencil_attachment = None;
                match self.output {
                    OutputKind::Color => color_attachments.push(Some(wgpu::RenderPassColorAttachment {
                        view: &target.view,
                        depth_slice: None,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(OutputKind::clear_color()),
                            store: wgpu::StoreOp::Store,
                        },
                    })),
                    OutputKind::Depth => {
                        depth_stencil_attachment = Some(wgpu::RenderPassDepthStencilAttachment {
                            view: &target.view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(OutputKind::clear_depth()),
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        })
                    }
                }
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some(target.variant.name()),
                    color_attachments: &color_attachments,
                    depth_stencil_attachment,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                render_pass.set_bind_group(0, &target.bind_group, &[]);
                render_pass.set_vertex_buffer(0, target.vertex_buffer.slice(..));
                for draw in target.variant.draws() {
                    let pipeline = match draw.topology {
                        Topology::TriangleList => &self.list_pipeline,
                        Topology::TriangleStrip => &self.strip_pipeline,
                    };
                    render_pass.set_pipeline(pipeline);
                    render_pass.draw(draw.vertices, 0..1);
                }
            }
            encoder.pop_debug_group();
            schedule.push(draw);
            mark(encoder, &mut schedule, FenceEvent::Signal(Fence::Barrier1));
        }

        encoder.pop_debug_group();
        schedule
    }
}
