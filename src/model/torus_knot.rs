use std::f32::consts::TAU;

use glam::Vec3;

use super::{Material, Mesh, Model, ModelId, ModelOrigin, Transform, Vertex};

/// Parametrized (p, q) torus knot swept by a circular tube
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TorusKnot {
    pub radius: f32,
    pub tube: f32,
    pub tubular_segments: u32,
    pub radial_segments: u32,
    pub p: u32,
    pub q: u32,
}

impl Default for TorusKnot {
    fn default() -> Self {
        Self {
            radius: 1.0,
            tube: 0.3,
            tubular_segments: 100,
            radial_segments: 16,
            p: 2,
            q: 3,
        }
    }
}

impl TorusKnot {
    fn curve_point(&self, u: f32) -> Vec3 {
        let qu_over_p = self.q as f32 / self.p as f32 * u;
        let cs = qu_over_p.cos();
        Vec3::new(
            self.radius * (2.0 + cs) * 0.5 * u.cos(),
            self.radius * (2.0 + cs) * 0.5 * u.sin(),
            self.radius * qu_over_p.sin() * 0.5,
        )
    }

    /// Generate the tube surface. Seams are duplicated so every ring has
    /// `radial_segments + 1` vertices.
    pub fn build(&self) -> Mesh {
        let ring = self.radial_segments + 1;
        let mut vertices = Vec::with_capacity(((self.tubular_segments + 1) * ring) as usize);

        for i in 0..=self.tubular_segments {
            let u = i as f32 / self.tubular_segments as f32 * self.p as f32 * TAU;
            let p1 = self.curve_point(u);
            let p2 = self.curve_point(u + 0.01);

            // Frenet-like frame along the curve
            let t = p2 - p1;
            let n = p2 + p1;
            let b = t.cross(n);
            let n = b.cross(t).normalize();
            let b = b.normalize();

            for j in 0..=self.radial_segments {
                let v = j as f32 / self.radial_segments as f32 * TAU;
                let cx = -self.tube * v.cos();
                let cy = self.tube * v.sin();
                let position = p1 + n * cx + b * cy;
                let normal = (position - p1).normalize();
                vertices.push(Vertex::new(position.to_array(), normal.to_array()));
            }
        }

        let mut indices =
            Vec::with_capacity((self.tubular_segments * self.radial_segments * 6) as usize);
        for j in 1..=self.tubular_segments {
            for i in 1..=self.radial_segments {
                let a = ring * (j - 1) + (i - 1);
                let b = ring * j + (i - 1);
                let c = ring * j + i;
                let d = ring * (j - 1) + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Mesh {
            name: Some("torus knot".to_string()),
            vertices,
            indices,
            material: Some(Material::default()),
        }
    }
}

/// The built-in model shown at startup
pub fn load_default() -> Model {
    Model {
        id: ModelId::DEFAULT,
        origin: ModelOrigin::BuiltinDefault,
        meshes: vec![TorusKnot::default().build()],
        transform: Transform::default(),
    }
}
