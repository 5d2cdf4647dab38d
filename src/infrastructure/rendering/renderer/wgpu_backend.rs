//! `wgpu` implementation of [`GpuBackend`].
//!
//! Pane state and draws are queued while the frame is assembled and encoded
//! into a single render pass by [`WgpuBackend::finish_frame`].

use super::pane::{BufferSlot, GpuBackend, PaneRect, Topology};
use crate::domain::chart::Color;
use crate::domain::errors::{AppError, RenderingResult};
use crate::domain::logging::{LogComponent, get_logger};
use crate::infrastructure::rendering::gpu_structures::{ChartVertex, PaneUniforms, quad_indices};
use std::collections::HashMap;

const INITIAL_VERTEX_CAPACITY: usize = 4096;
const INITIAL_PANE_CAPACITY: usize = 4;

struct SlotBuffer {
    vertices: wgpu::Buffer,
    indices: Option<wgpu::Buffer>,
    capacity: usize,
}

#[derive(Debug, Clone, Copy)]
struct PendingDraw {
    pane: usize,
    slot: BufferSlot,
    topology: Topology,
    vertex_count: u32,
}

pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_size: (u32, u32),

    line_pipeline: wgpu::RenderPipeline,
    quad_pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: u64,
    pane_capacity: usize,

    buffers: HashMap<BufferSlot, SlotBuffer>,
    panes: Vec<(PaneRect, PaneUniforms)>,
    current_pane: Option<usize>,
    pending: Vec<PendingDraw>,
}

impl WgpuBackend {
    /// Requests a headless adapter and device. Hosts that already own a
    /// device should use [`from_device`](Self::from_device).
    pub async fn request(format: wgpu::TextureFormat, width: u32, height: u32) -> RenderingResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| AppError::RenderingError(format!("Failed to find adapter: {:?}", e)))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Chart Device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| AppError::RenderingError(format!("Failed to create device: {:?}", e)))?;

        Ok(Self::from_device(device, queue, format, width, height))
    }

    pub fn from_device(
        device: wgpu::Device,
        queue: wgpu::Queue,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_stride = aligned_stride(
            std::mem::size_of::<PaneUniforms>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<PaneUniforms>() as u64),
                },
                count: None,
            }],
            label: Some("pane_uniform_layout"),
        });

        let (uniform_buffer, uniform_bind_group) =
            create_uniforms(&device, &uniform_layout, uniform_stride, INITIAL_PANE_CAPACITY);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Pane Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../pane_shader.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Pane Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let line_pipeline =
            create_pipeline(&device, &pipeline_layout, &shader, format, wgpu::PrimitiveTopology::LineList);
        let quad_pipeline =
            create_pipeline(&device, &pipeline_layout, &shader, format, wgpu::PrimitiveTopology::TriangleList);

        get_logger().info(
            LogComponent::Infrastructure("WgpuBackend"),
            &format!("✅ Pane pipelines ready: {}x{}, format {:?}", width, height, format),
        );

        Self {
            device,
            queue,
            surface_size: (width, height),
            line_pipeline,
            quad_pipeline,
            uniform_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
            pane_capacity: INITIAL_PANE_CAPACITY,
            buffers: HashMap::new(),
            panes: Vec::new(),
            current_pane: None,
            pending: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.surface_size = (width, height);
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    fn ensure_slot(&mut self, slot: BufferSlot, vertex_count: usize) {
        let fits = self.buffers.get(&slot).is_some_and(|b| b.capacity >= vertex_count);
        if fits {
            return;
        }
        let capacity = vertex_count.next_power_of_two().max(INITIAL_VERTEX_CAPACITY);
        let vertices = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pane Vertex Buffer"),
            size: (capacity * std::mem::size_of::<ChartVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let indices = matches!(slot, BufferSlot::PriceQuads | BufferSlot::VolumeQuads).then(|| {
            let indices = quad_indices(capacity / 4);
            let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Pane Quad Index Buffer"),
                size: (indices.len() * std::mem::size_of::<u32>()) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.queue.write_buffer(&buffer, 0, bytemuck::cast_slice(&indices));
            buffer
        });
        get_logger().debug(
            LogComponent::Infrastructure("WgpuBackend"),
            &format!("📦 {:?} buffer grown to {} vertices", slot, capacity),
        );
        self.buffers.insert(slot, SlotBuffer { vertices, indices, capacity });
    }

    fn ensure_pane_capacity(&mut self) {
        if self.panes.len() <= self.pane_capacity {
            return;
        }
        self.pane_capacity = self.panes.len().next_power_of_two();
        let (buffer, bind_group) =
            create_uniforms(&self.device, &self.uniform_layout, self.uniform_stride, self.pane_capacity);
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
    }

    /// Encodes every queued draw into one pass over `view`. With `clear`
    /// set the target is cleared first, otherwise drawn over.
    pub fn finish_frame(&mut self, view: &wgpu::TextureView, clear: Option<Color>) -> RenderingResult<()> {
        let (surface_w, surface_h) = self.surface_size;
        if surface_w == 0 || surface_h == 0 {
            self.reset_frame();
            return Err(AppError::RenderingError("surface has zero size".to_string()));
        }

        self.ensure_pane_capacity();
        for (index, (_, uniforms)) in self.panes.iter().enumerate() {
            self.queue.write_buffer(
                &self.uniform_buffer,
                index as u64 * self.uniform_stride,
                bytemuck::bytes_of(uniforms),
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Chart Encoder") });
        {
            let load = match clear {
                Some(c) => wgpu::LoadOp::Clear(wgpu::Color {
                    r: c.r as f64,
                    g: c.g as f64,
                    b: c.b as f64,
                    a: c.a as f64,
                }),
                None => wgpu::LoadOp::Load,
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Chart Pane Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations { load, store: wgpu::StoreOp::Store },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for draw in &self.pending {
                let Some((rect, _)) = self.panes.get(draw.pane) else { continue };
                let Some(buffer) = self.buffers.get(&draw.slot) else { continue };
                let Some(scissor) = clip_to_surface(rect, surface_w, surface_h) else { continue };
                let top = rect.top_down_y(surface_h as f32);
                // The viewport may not leave the target; a stale surface size skips the pane
                if rect.x < 0.0
                    || top < 0.0
                    || rect.x + rect.width > surface_w as f32
                    || top + rect.height > surface_h as f32
                {
                    continue;
                }

                pass.set_viewport(rect.x, top, rect.width, rect.height, 0.0, 1.0);
                pass.set_scissor_rect(scissor.0, scissor.1, scissor.2, scissor.3);
                pass.set_bind_group(
                    0,
                    &self.uniform_bind_group,
                    &[(draw.pane as u64 * self.uniform_stride) as u32],
                );
                pass.set_vertex_buffer(0, buffer.vertices.slice(..));
                match (draw.topology, &buffer.indices) {
                    (Topology::Quads, Some(indices)) => {
                        pass.set_pipeline(&self.quad_pipeline);
                        pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..(draw.vertex_count / 4) * 6, 0, 0..1);
                    }
                    (Topology::Lines, _) => {
                        pass.set_pipeline(&self.line_pipeline);
                        pass.draw(0..draw.vertex_count, 0..1);
                    }
                    (Topology::Quads, None) => {}
                }
            }
            // Leave the pass with full-surface scissor
            pass.set_scissor_rect(0, 0, surface_w, surface_h);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.reset_frame();
        Ok(())
    }

    fn reset_frame(&mut self) {
        self.pending.clear();
        self.panes.clear();
        self.current_pane = None;
    }
}

impl GpuBackend for WgpuBackend {
    fn write_vertices(&mut self, slot: BufferSlot, vertices: &[ChartVertex]) {
        if vertices.is_empty() {
            return;
        }
        self.ensure_slot(slot, vertices.len());
        if let Some(buffer) = self.buffers.get(&slot) {
            self.queue.write_buffer(&buffer.vertices, 0, bytemuck::cast_slice(vertices));
        }
    }

    fn set_pane(&mut self, rect: PaneRect, view_proj: [[f32; 4]; 4]) {
        self.panes.push((rect, PaneUniforms { view_proj }));
        self.current_pane = Some(self.panes.len() - 1);
    }

    fn draw(&mut self, slot: BufferSlot, topology: Topology, vertex_count: u32) {
        if let Some(pane) = self.current_pane {
            self.pending.push(PendingDraw { pane, slot, topology, vertex_count });
        }
    }

    fn clear_pane(&mut self) {
        self.current_pane = None;
    }
}

fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// Scissor rect in top-down pixels, clipped to the surface
fn clip_to_surface(rect: &PaneRect, surface_w: u32, surface_h: u32) -> Option<(u32, u32, u32, u32)> {
    let left = rect.x.max(0.0).floor() as u32;
    let top = rect.top_down_y(surface_h as f32).max(0.0).floor() as u32;
    let right = ((rect.x + rect.width).ceil().max(0.0) as u32).min(surface_w);
    let bottom = ((rect.top_down_y(surface_h as f32) + rect.height).ceil().max(0.0) as u32).min(surface_h);
    (right > left && bottom > top).then(|| (left, top, right - left, bottom - top))
}

fn create_uniforms(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    panes: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Pane Uniform Buffer"),
        size: stride * panes as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<PaneUniforms>() as u64),
            }),
        }],
        label: Some("pane_uniform_bind_group"),
    });
    (buffer, bind_group)
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Pane Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[ChartVertex::desc()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
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
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}
