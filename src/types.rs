/// Camera uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

/// Per-mesh transform and surface data
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model matrix, stored as mat4 for alignment
    pub normal: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    pub shininess: f32,
    pub _pad: [f32; 3],
}

/// Ambient plus one directional light
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// rgb * intensity, w unused
    pub ambient: [f32; 4],
    /// Direction the light travels from, normalized, w unused
    pub direction: [f32; 4],
    /// rgb * intensity, w unused
    pub directional: [f32; 4],
}
