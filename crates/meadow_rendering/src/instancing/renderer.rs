//! wgpu implementation of the device seam.
//!
//! One pipeline, three vertex slots (base mesh, static attributes,
//! dynamic attributes), one instanced draw per frame. Buffer allocation
//! runs under an out-of-memory error scope so initialize either gets
//! both instance buffers or neither. Dynamic writes go through
//! `Queue::write_buffer_with`, a scoped staging acquisition that is
//! released when the view drops, on every exit path.

use wgpu::util::DeviceExt;

use super::instance_data::{CameraUniform, DynamicInstance, MeshVertex, StaticInstance, BLADE_MESH};
use super::surface::FieldSurface;
use crate::error::{FieldError, FieldResult};

/// WGSL for the field pipeline. Shading is deliberately minimal; the
/// core only guarantees correct per-instance data binding.
const FIELD_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> camera: Camera;

struct VsIn {
    @location(0) corner: vec2<f32>,
    @location(1) instance_pos: vec2<f32>,
    @location(2) basis: vec4<f32>,
    @location(3) phase: f32,
    @location(4) sway: vec2<f32>,
};

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) height: f32,
};

@vertex
fn vs_main(in: VsIn) -> VsOut {
    let ground = mat2x2<f32>(in.basis.xy, in.basis.zw) * vec2<f32>(in.corner.x, 0.0);
    // The tip follows the displacement field, the root stays planted.
    let bend = in.sway * in.corner.y * (0.75 + 0.25 * sin(in.phase));
    let world = vec3<f32>(
        in.instance_pos.x + ground.x + bend.x,
        in.corner.y,
        in.instance_pos.y + ground.y + bend.y,
    );

    var out: VsOut;
    out.clip = camera.view_proj * vec4<f32>(world, 1.0);
    out.height = in.corner.y;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let root = vec3<f32>(0.13, 0.35, 0.08);
    let tip = vec3<f32>(0.38, 0.65, 0.18);
    return vec4<f32>(mix(root, tip, in.height), 1.0);
}
"#;

/// The two fixed-size device buffers, allocated together.
struct InstanceBuffers {
    static_buffer: wgpu::Buffer,
    dynamic_buffer: wgpu::Buffer,
}

/// Instanced field renderer backed by wgpu.
///
/// Implements [`FieldSurface`]: the surrounding application creates the
/// device and swapchain, hands this renderer a target view each frame
/// via [`WgpuFieldRenderer::begin_frame`], and drives it through the
/// field core.
pub struct WgpuFieldRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh_buffer: wgpu::Buffer,
    buffers: Option<InstanceBuffers>,
    target: Option<wgpu::TextureView>,
}

impl WgpuFieldRenderer {
    /// Builds the pipeline and shared resources. Instance buffers are
    /// allocated later, through the [`FieldSurface`] seam.
    #[must_use]
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("field shader"),
            source: wgpu::ShaderSource::Wgsl(FIELD_SHADER.into()),
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("field camera"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("field camera layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("field camera bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("field pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("field pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[
                    MeshVertex::layout(),
                    StaticInstance::layout(),
                    DynamicInstance::layout(),
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let mesh_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blade mesh"),
            contents: bytemuck::cast_slice(&BLADE_MESH),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            device,
            queue,
            pipeline,
            camera_buffer,
            camera_bind_group,
            mesh_buffer,
            buffers: None,
            target: None,
        }
    }

    /// Binds the color target for the upcoming frame's draw.
    pub fn begin_frame(&mut self, target: wgpu::TextureView) {
        self.target = Some(target);
    }

    /// True once the instance buffers have been allocated.
    #[must_use]
    pub const fn is_allocated(&self) -> bool {
        self.buffers.is_some()
    }
}

impl FieldSurface for WgpuFieldRenderer {
    fn allocate_instance_buffers(
        &mut self,
        static_data: &[u8],
        dynamic_len: u64,
    ) -> FieldResult<()> {
        if static_data.is_empty() && dynamic_len == 0 {
            // An empty field allocates nothing; draws are no-ops anyway.
            return Ok(());
        }

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let static_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("field static instances"),
            contents: static_data,
            usage: wgpu::BufferUsages::VERTEX,
        });

        let dynamic_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("field dynamic instances"),
            size: dynamic_len,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Both buffers or neither: commit only after the scope is clean.
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(FieldError::OutOfDeviceMemory(error.to_string()));
        }

        self.buffers = Some(InstanceBuffers {
            static_buffer,
            dynamic_buffer,
        });
        Ok(())
    }

    fn write_dynamic(&mut self, offset: u64, data: &[u8]) -> FieldResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        let Some(buffers) = &self.buffers else {
            return Err(FieldError::InvalidConfig {
                reason: "dynamic buffer not allocated".to_owned(),
            });
        };
        let Some(size) = wgpu::BufferSize::new(data.len() as u64) else {
            return Ok(());
        };

        match self
            .queue
            .write_buffer_with(&buffers.dynamic_buffer, offset, size)
        {
            Some(mut view) => {
                view.copy_from_slice(data);
                // Dropping the view releases the staging acquisition.
                Ok(())
            }
            None => Err(FieldError::DeviceBusy),
        }
    }

    fn draw_instanced(&mut self, instance_count: u32, camera: &CameraUniform) -> FieldResult<()> {
        if instance_count == 0 {
            return Ok(());
        }
        let Some(buffers) = &self.buffers else {
            return Err(FieldError::InvalidConfig {
                reason: "instance buffers not allocated".to_owned(),
            });
        };
        let Some(target) = &self.target else {
            return Err(FieldError::InvalidConfig {
                reason: "no frame target bound; call begin_frame first".to_owned(),
            });
        };

        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("field encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("field pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_vertex_buffer(0, self.mesh_buffer.slice(..));
            pass.set_vertex_buffer(1, buffers.static_buffer.slice(..));
            pass.set_vertex_buffer(2, buffers.dynamic_buffer.slice(..));
            pass.draw(0..BLADE_MESH.len() as u32, 0..instance_count);
        }
        self.queue.submit(Some(encoder.finish()));

        Ok(())
    }

    fn release_instance_buffers(&mut self) {
        self.buffers = None;
        self.target = None;
    }
}
