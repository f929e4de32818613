use std::collections::HashMap;

use glam::Mat4;
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline};

use super::offscreen::{COLOR_FORMAT, DEPTH_FORMAT, OffscreenTarget};
use crate::core::GpuContext;
use crate::model::{Material, Mesh, Model, ModelId, Vertex};
use crate::scene::{ModelDisposer, SceneContainer};
use crate::types::{CameraUniform, LightUniform, MeshUniform};

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

/// GPU buffers of one mesh
struct GpuMesh {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    index_count: u32,
    uniform_buffer: Buffer,
    bind_group: BindGroup,
    material: Material,
}

/// GPU buffers of every mesh in a model
struct GpuModel {
    meshes: Vec<GpuMesh>,
}

impl GpuModel {
    fn destroy(self) {
        for mesh in self.meshes {
            mesh.vertex_buffer.destroy();
            mesh.index_buffer.destroy();
            mesh.uniform_buffer.destroy();
        }
    }
}

/// Draws the active model of a scene with ambient + directional shading
pub struct MeshRenderer {
    gpu: GpuContext,
    pipeline: RenderPipeline,
    camera_buffer: Buffer,
    light_buffer: Buffer,
    frame_bind_group: BindGroup,
    mesh_layout: BindGroupLayout,
    resident: HashMap<ModelId, GpuModel>,
}

impl MeshRenderer {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = gpu.device();

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light Buffer"),
            size: std::mem::size_of::<LightUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Frame Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let mesh_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Bind Group Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Frame Bind Group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline = Self::create_pipeline(device, &frame_layout, &mesh_layout);

        Self {
            gpu: gpu.clone(),
            pipeline,
            camera_buffer,
            light_buffer,
            frame_bind_group,
            mesh_layout,
            resident: HashMap::new(),
        }
    }

    /// Draw `scene` into `target`, clearing it to the scene background
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &OffscreenTarget,
        scene: &SceneContainer,
    ) {
        let queue = self.gpu.queue();
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[scene.camera.to_uniform()]),
        );
        queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::cast_slice(&[scene.light_uniform()]),
        );

        if let Some(model) = scene.active_model() {
            self.make_resident(model);
            self.write_mesh_uniforms(model);
        }

        let [r, g, b, a] = scene.background;
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let Some(gpu_model) = scene.active_model_id().and_then(|id| self.resident.get(&id)) else {
            return;
        };

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for mesh in &gpu_model.meshes {
            render_pass.set_bind_group(1, &mesh.bind_group, &[]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    /// Upload a model's meshes unless they are already on the GPU
    fn make_resident(&mut self, model: &Model) {
        if self.resident.contains_key(&model.id) {
            return;
        }

        let device = self.gpu.device();
        let meshes = model
            .meshes
            .iter()
            .filter(|m| !m.indices.is_empty())
            .map(|m| Self::upload_mesh(device, &self.mesh_layout, m))
            .collect();

        log::debug!("Uploaded model {:?} ({}) to GPU", model.id, model.name());
        self.resident.insert(model.id, GpuModel { meshes });
    }

    fn write_mesh_uniforms(&self, model: &Model) {
        let Some(gpu_model) = self.resident.get(&model.id) else {
            return;
        };

        let matrix = model.transform.matrix();
        let normal = matrix.inverse().transpose();
        for mesh in &gpu_model.meshes {
            let uniform = mesh_uniform(&matrix, &normal, &mesh.material);
            self.gpu
                .queue()
                .write_buffer(&mesh.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
    }

    fn upload_mesh(device: &Device, layout: &BindGroupLayout, mesh: &Mesh) -> GpuMesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let material = mesh.material.unwrap_or_default();
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Uniforms"),
            contents: bytemuck::cast_slice(&[mesh_uniform(&Mat4::IDENTITY, &Mat4::IDENTITY, &material)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            uniform_buffer,
            bind_group,
            material,
        }
    }

    fn create_pipeline(
        device: &Device,
        frame_layout: &BindGroupLayout,
        mesh_layout: &BindGroupLayout,
    ) -> RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/mesh.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[frame_layout, mesh_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &VERTEX_ATTRIBUTES,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Uploaded meshes have arbitrary winding
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

impl ModelDisposer for MeshRenderer {
    fn dispose(&mut self, model: Model) {
        debug_assert!(!model.is_builtin_default(), "built-in model must stay resident");

        if let Some(gpu_model) = self.resident.remove(&model.id) {
            log::debug!("Released GPU buffers of model {:?}", model.id);
            gpu_model.destroy();
        }
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn mesh_uniform(model: &Mat4, normal: &Mat4, material: &Material) -> MeshUniform {
    MeshUniform {
        model: model.to_cols_array_2d(),
        normal: normal.to_cols_array_2d(),
        base_color: material.base_color,
        shininess: material.shininess,
        _pad: [0.0; 3],
    }
}
