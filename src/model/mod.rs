//! CPU-side model representation shared by the loaders, the scene and the
//! mesh renderer.

mod torus_knot;

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::math::AABB;

pub use torus_knot::{TorusKnot, load_default};

/// Vertex layout uploaded to the GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// Identity used to key GPU resources
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

impl ModelId {
    /// Reserved for the built-in torus knot
    pub const DEFAULT: ModelId = ModelId(0);

    pub fn next() -> Self {
        ModelId(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelOrigin {
    BuiltinDefault,
    Uploaded { name: String },
}

/// Phong-style surface parameters
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub base_color: [f32; 4],
    pub shininess: f32,
}

impl Material {
    pub const fn new(base_color: [f32; 4], shininess: f32) -> Self {
        Self {
            base_color,
            shininess,
        }
    }
}

impl Default for Material {
    /// White, shininess 100
    fn default() -> Self {
        Self::new([1.0, 1.0, 1.0, 1.0], 100.0)
    }
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: Option<String>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: Option<Material>,
}

impl Mesh {
    /// Build a mesh from raw attributes, computing smooth normals when absent
    /// or when their count does not match the positions.
    pub fn from_attributes(
        name: Option<String>,
        positions: Vec<[f32; 3]>,
        normals: Option<Vec<[f32; 3]>>,
        indices: Vec<u32>,
    ) -> Self {
        let normals = match normals {
            Some(n) if n.len() == positions.len() => n,
            _ => compute_normals(&positions, &indices),
        };

        let vertices = positions
            .into_iter()
            .zip(normals)
            .map(|(p, n)| Vertex::new(p, n))
            .collect();

        Self {
            name,
            vertices,
            indices,
            material: None,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_points(self.vertices.iter().map(|v| Vec3::from_array(v.position)))
    }
}

/// Local transform: `translate(position) * rotate * scale * translate(-pivot)`.
/// The pivot lets the model spin about its own center after normalization.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, XYZ order
    pub rotation: Vec3,
    pub scale: f32,
    pub pivot: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
            pivot: Vec3::ZERO,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.position)
            * Mat4::from_translation(-self.pivot)
    }
}

#[derive(Clone, Debug)]
pub struct Model {
    pub id: ModelId,
    pub origin: ModelOrigin,
    pub meshes: Vec<Mesh>,
    pub transform: Transform,
}

impl Model {
    pub fn uploaded(name: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        Self {
            id: ModelId::next(),
            origin: ModelOrigin::Uploaded { name: name.into() },
            meshes,
            transform: Transform::default(),
        }
    }

    pub fn is_builtin_default(&self) -> bool {
        self.origin == ModelOrigin::BuiltinDefault
    }

    pub fn name(&self) -> &str {
        match &self.origin {
            ModelOrigin::BuiltinDefault => "torus knot",
            ModelOrigin::Uploaded { name } => name,
        }
    }

    /// Give every mesh without a material the default one
    pub fn assign_default_materials(&mut self) {
        for mesh in self.meshes.iter_mut().filter(|m| m.material.is_none()) {
            mesh.material = Some(Material::default());
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    /// Bounds of the raw vertex data, ignoring the transform
    pub fn local_bounds(&self) -> Option<AABB> {
        self.meshes
            .iter()
            .filter_map(Mesh::bounds)
            .reduce(|a, b| a.union(&b))
    }

    /// Bounds of every vertex after the model transform is applied
    pub fn world_bounds(&self) -> Option<AABB> {
        let matrix = self.transform.matrix();
        AABB::from_points(self.meshes.iter().flat_map(|m| {
            m.vertices
                .iter()
                .map(move |v| matrix.transform_point3(Vec3::from_array(v.position)))
        }))
    }
}

/// Area-weighted smooth vertex normals
pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let p0 = Vec3::from_array(positions[a]);
        let p1 = Vec3::from_array(positions[b]);
        let p2 = Vec3::from_array(positions[c]);
        let face = (p1 - p0).cross(p2 - p0);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }

    accum
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_mesh() -> Mesh {
        Mesh::from_attributes(
            None,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            None,
            vec![0, 1, 2],
        )
    }

    #[test]
    fn computed_normals_follow_winding() {
        let mesh = triangle_mesh();
        for v in &mesh.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn mismatched_normals_are_recomputed() {
        let mesh = Mesh::from_attributes(
            None,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            Some(vec![[1.0, 0.0, 0.0]]),
            vec![0, 1, 2],
        );
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn default_materials_fill_only_missing() {
        let mut tinted = triangle_mesh();
        tinted.material = Some(Material::new([1.0, 0.0, 0.0, 1.0], 10.0));
        let mut model = Model::uploaded("two.obj", vec![tinted, triangle_mesh()]);

        model.assign_default_materials();

        assert_eq!(model.meshes[0].material.unwrap().base_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(model.meshes[1].material, Some(Material::default()));
    }

    #[test]
    fn uploaded_models_get_distinct_ids() {
        let a = Model::uploaded("a.obj", vec![triangle_mesh()]);
        let b = Model::uploaded("b.obj", vec![triangle_mesh()]);
        assert_ne!(a.id, b.id);
        assert_ne!(a.id, ModelId::DEFAULT);
        assert!(!a.is_builtin_default());
    }

    #[test]
    fn pivot_moves_center_to_position() {
        let transform = Transform {
            pivot: Vec3::new(1.0, 2.0, 3.0),
            scale: 2.0,
            ..Default::default()
        };
        let p = transform.matrix().transform_point3(Vec3::new(1.0, 2.0, 3.0));
        assert!(p.abs_diff_eq(Vec3::ZERO, 1e-6));
    }
}
