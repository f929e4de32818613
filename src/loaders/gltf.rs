use glam::{Mat3, Mat4, Vec3};
use gltf::mesh::Mode;

use super::{ModelFormat, ModelLoader};
use crate::error::{Result, ViewerError};
use crate::model::{Material, Mesh};

/// Loads self-contained glTF (embedded data URIs) and binary GLB files
pub struct SceneGraphLoader;

impl ModelLoader for SceneGraphLoader {
    fn format(&self) -> ModelFormat {
        ModelFormat::SceneGraph
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<Mesh>> {
        let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes).map_err(parse_error)?;

        // No base path: buffers pointing at external files are rejected
        let buffers = gltf::import_buffers(&document, None, blob).map_err(parse_error)?;

        log::debug!(
            "glTF document: {} scenes, {} nodes, {} meshes, {} materials",
            document.scenes().count(),
            document.nodes().count(),
            document.meshes().count(),
            document.materials().count()
        );

        let mut meshes = Vec::new();
        match document.default_scene().or_else(|| document.scenes().next()) {
            Some(scene) => {
                for node in scene.nodes() {
                    process_node(&node, &buffers, &Mat4::IDENTITY, &mut meshes)?;
                }
            }
            None => {
                // Scene-less documents still carry meshes worth showing
                for mesh in document.meshes() {
                    process_mesh(&mesh, &buffers, &Mat4::IDENTITY, &mut meshes)?;
                }
            }
        }

        Ok(meshes)
    }
}

fn parse_error(err: gltf::Error) -> ViewerError {
    ViewerError::parse(ModelFormat::SceneGraph, err.to_string())
}

/// Recursively processes glTF nodes, baking transforms into the vertices
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    meshes: &mut Vec<Mesh>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, meshes)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, meshes)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    meshes: &mut Vec<Mesh>,
) -> Result<()> {
    let name = mesh.name().map(str::to_string);
    let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();

    for primitive in mesh.primitives() {
        let mode = primitive.mode();
        if !is_triangle_mode(mode) {
            log::warn!("Skipping {:?} primitive in mesh {:?}: not triangles", mode, name);
            continue;
        }

        let reader =
            primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| {
                ViewerError::parse(ModelFormat::SceneGraph, "mesh primitive has no positions")
            })?
            .map(|p| transform.transform_point3(Vec3::from_array(p)).to_array())
            .collect();

        if positions.is_empty() {
            continue;
        }

        let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|normals| {
            normals
                .map(|n| {
                    (normal_matrix * Vec3::from_array(n))
                        .try_normalize()
                        .unwrap_or(Vec3::Y)
                        .to_array()
                })
                .collect()
        });

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(ViewerError::parse(
                ModelFormat::SceneGraph,
                format!("index {} out of range for {} vertices", bad, positions.len()),
            ));
        }

        let indices = to_triangle_list(mode, indices);
        if indices.is_empty() {
            continue;
        }

        let mut out = Mesh::from_attributes(name.clone(), positions, normals, indices);
        out.material = explicit_material(&primitive.material());
        meshes.push(out);
    }

    Ok(())
}

fn is_triangle_mode(mode: Mode) -> bool {
    matches!(mode, Mode::Triangles | Mode::TriangleStrip | Mode::TriangleFan)
}

/// Unroll strips and fans into a plain triangle list. Odd strip triangles
/// swap their first and last corner to keep a consistent winding.
fn to_triangle_list(mode: Mode, indices: Vec<u32>) -> Vec<u32> {
    match mode {
        Mode::TriangleStrip => indices
            .windows(3)
            .enumerate()
            .flat_map(|(i, w)| {
                if i % 2 == 0 {
                    [w[0], w[1], w[2]]
                } else {
                    [w[2], w[1], w[0]]
                }
            })
            .collect(),
        Mode::TriangleFan => match indices.split_first() {
            Some((&hub, rim)) => rim
                .windows(2)
                .flat_map(|w| [hub, w[0], w[1]])
                .collect(),
            None => Vec::new(),
        },
        _ => indices,
    }
}

/// Material referenced by the primitive, or `None` when it falls back to the
/// glTF implicit default
fn explicit_material(material: &gltf::Material) -> Option<Material> {
    material.index()?;

    let pbr = material.pbr_metallic_roughness();
    let roughness = pbr.roughness_factor().clamp(0.0, 1.0);
    Some(Material::new(
        pbr.base_color_factor(),
        (1.0 - roughness) * 100.0 + 1.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_gltf_bytes() {
        let err = SceneGraphLoader.parse(b"not a model").unwrap_err();
        assert!(matches!(
            err,
            ViewerError::Parse {
                format: ModelFormat::SceneGraph,
                ..
            }
        ));
    }

    #[test]
    fn rejects_truncated_glb_header() {
        let err = SceneGraphLoader.parse(b"glTF\x02\x00\x00\x00").unwrap_err();
        assert!(matches!(err, ViewerError::Parse { .. }));
    }

    #[test]
    fn strip_alternates_winding() {
        let list = to_triangle_list(Mode::TriangleStrip, vec![0, 1, 2, 3, 4]);
        assert_eq!(list, vec![0, 1, 2, 3, 2, 1, 2, 3, 4]);
    }

    #[test]
    fn fan_shares_first_vertex() {
        let list = to_triangle_list(Mode::TriangleFan, vec![7, 1, 2, 3, 4]);
        assert_eq!(list, vec![7, 1, 2, 7, 2, 3, 7, 3, 4]);
    }

    #[test]
    fn short_strips_and_fans_yield_nothing() {
        assert!(to_triangle_list(Mode::TriangleStrip, vec![0, 1]).is_empty());
        assert!(to_triangle_list(Mode::TriangleFan, vec![0, 1]).is_empty());
        assert!(to_triangle_list(Mode::TriangleFan, Vec::new()).is_empty());
    }

    #[test]
    fn lists_pass_through() {
        assert_eq!(to_triangle_list(Mode::Triangles, vec![2, 1, 0]), vec![2, 1, 0]);
        assert!(!is_triangle_mode(Mode::Lines));
        assert!(is_triangle_mode(Mode::TriangleFan));
    }

    #[test]
    fn empty_document_has_no_meshes() {
        let json = br#"{"asset":{"version":"2.0"}}"#;
        let meshes = SceneGraphLoader.parse(json).unwrap();
        assert!(meshes.is_empty());
    }
}
